//! Service extensions advertised in the EHLO reply.

use std::fmt;

/// One EHLO keyword line, interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Extension {
    /// `STARTTLS` (RFC 3207).
    StartTls,
    /// `AUTH` with the advertised SASL mechanisms, in server order.
    Auth(Vec<AuthMechanism>),
    /// `SIZE` (RFC 1870). `None` or `Some(0)` means no fixed limit.
    Size(Option<usize>),
    /// `8BITMIME` (RFC 6152).
    EightBitMime,
    /// `PIPELINING`
    Pipelining,
    /// `SMTPUTF8`
    SmtpUtf8,
    /// Any other keyword, kept verbatim.
    Other(String),
}

impl Extension {
    /// Interprets one line of the EHLO reply (code already stripped).
    ///
    /// Keywords are case-insensitive.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let (keyword, args) = line
            .trim()
            .split_once(' ')
            .unwrap_or((line.trim(), ""));

        if keyword.eq_ignore_ascii_case("STARTTLS") {
            Self::StartTls
        } else if keyword.eq_ignore_ascii_case("AUTH") {
            Self::Auth(args.split_whitespace().map(AuthMechanism::from_name).collect())
        } else if keyword.eq_ignore_ascii_case("SIZE") {
            Self::Size(args.trim().parse().ok())
        } else if keyword.eq_ignore_ascii_case("8BITMIME") {
            Self::EightBitMime
        } else if keyword.eq_ignore_ascii_case("PIPELINING") {
            Self::Pipelining
        } else if keyword.eq_ignore_ascii_case("SMTPUTF8") {
            Self::SmtpUtf8
        } else {
            Self::Other(line.to_string())
        }
    }
}

/// A SASL mechanism name from the `AUTH` keyword.
///
/// Only [`Plain`](Self::Plain) and [`Login`](Self::Login) are spoken; the
/// rest are recorded so errors can say what the server offered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AuthMechanism {
    /// `PLAIN` (RFC 4616).
    Plain,
    /// `LOGIN`
    Login,
    /// Any other mechanism, upper-cased.
    Other(String),
}

impl AuthMechanism {
    /// Maps an advertised name, ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let upper = name.to_ascii_uppercase();
        match upper.as_str() {
            "PLAIN" => Self::Plain,
            "LOGIN" => Self::Login,
            _ => Self::Other(upper),
        }
    }

    /// Name as sent after `AUTH`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain => "PLAIN",
            Self::Login => "LOGIN",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for AuthMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
