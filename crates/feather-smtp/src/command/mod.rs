//! Client commands and their wire form.

use crate::types::{Address, AuthMechanism, MailParams};
use std::fmt;

/// A command the client sends, one line each.
///
/// [`Display`](fmt::Display) writes the line without its CRLF terminator;
/// [`Command::to_wire`] appends it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `EHLO <client hostname>`
    Ehlo(String),
    /// `STARTTLS`
    StartTls,
    /// `AUTH <mechanism> [initial response]`
    Auth(AuthMechanism, Option<String>),
    /// Base64 line answering a 334 challenge.
    AuthResponse(String),
    /// `MAIL FROM:<sender>` followed by ESMTP parameters.
    MailFrom(Address, MailParams),
    /// `RCPT TO:<recipient>`
    RcptTo(Address),
    /// `DATA`
    Data,
    /// `QUIT`
    Quit,
}

impl Command {
    /// Returns the CRLF-terminated line.
    #[must_use]
    pub fn to_wire(&self) -> Vec<u8> {
        format!("{self}\r\n").into_bytes()
    }

    /// Whether the line carries credentials.
    #[must_use]
    pub const fn is_sensitive(&self) -> bool {
        matches!(self, Self::Auth(..) | Self::AuthResponse(_))
    }

    /// Returns a form safe to log: the verb only for credential lines.
    #[must_use]
    pub fn redacted(&self) -> String {
        match self {
            Self::Auth(mechanism, _) => format!("AUTH {}", mechanism.as_str()),
            Self::AuthResponse(_) => "<credentials>".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ehlo(hostname) => write!(f, "EHLO {hostname}"),
            Self::StartTls => f.write_str("STARTTLS"),
            Self::Auth(mechanism, None) => write!(f, "AUTH {}", mechanism.as_str()),
            Self::Auth(mechanism, Some(initial)) => {
                write!(f, "AUTH {} {initial}", mechanism.as_str())
            }
            Self::AuthResponse(line) => f.write_str(line),
            Self::MailFrom(from, MailParams { body, size }) => {
                write!(f, "MAIL FROM:<{}>", from.as_str())?;
                if let Some(body) = body {
                    write!(f, " BODY={}", body.as_str())?;
                }
                if let Some(size) = size {
                    write!(f, " SIZE={size}")?;
                }
                Ok(())
            }
            Self::RcptTo(to) => write!(f, "RCPT TO:<{}>", to.as_str()),
            Self::Data => f.write_str("DATA"),
            Self::Quit => f.write_str("QUIT"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::BodyType;

    fn addr(s: &str) -> Address {
        Address::new(s).unwrap()
    }

    #[test]
    fn wire_lines_end_with_crlf() {
        assert_eq!(
            Command::Ehlo("client.example.com".into()).to_wire(),
            b"EHLO client.example.com\r\n"
        );
        assert_eq!(Command::RcptTo(addr("b@x.com")).to_wire(), b"RCPT TO:<b@x.com>\r\n");
        assert_eq!(Command::StartTls.to_wire(), b"STARTTLS\r\n");
        assert_eq!(Command::Data.to_wire(), b"DATA\r\n");
        assert_eq!(Command::Quit.to_wire(), b"QUIT\r\n");
    }

    #[test]
    fn mail_from_appends_parameters_in_fixed_order() {
        let bare = Command::MailFrom(addr("a@x.com"), MailParams::default());
        assert_eq!(bare.to_string(), "MAIL FROM:<a@x.com>");

        let full = Command::MailFrom(
            addr("a@x.com"),
            MailParams {
                body: Some(BodyType::EightBitMime),
                size: Some(12345),
            },
        );
        assert_eq!(full.to_string(), "MAIL FROM:<a@x.com> BODY=8BITMIME SIZE=12345");
        assert!(!full.is_sensitive());
    }

    #[test]
    fn credentials_are_redacted() {
        let plain = Command::Auth(AuthMechanism::Plain, Some("AHVzZXIAcGFzcw==".into()));
        assert_eq!(plain.to_string(), "AUTH PLAIN AHVzZXIAcGFzcw==");
        assert!(plain.is_sensitive());
        assert_eq!(plain.redacted(), "AUTH PLAIN");

        let login = Command::Auth(AuthMechanism::Login, None);
        assert_eq!(login.to_string(), "AUTH LOGIN");

        let answer = Command::AuthResponse("dXNlcg==".into());
        assert_eq!(answer.to_string(), "dXNlcg==");
        assert_eq!(answer.redacted(), "<credentials>");
        assert_eq!(Command::Quit.redacted(), "QUIT");
    }
}
