//! Server replies.

use std::fmt;

/// First digit of a reply code, as defined by RFC 5321 §4.2.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// 2yz: the command was accepted.
    Completed,
    /// 3yz: the server waits for more input.
    Intermediate,
    /// 4yz: the command failed but may succeed later.
    Transient,
    /// 5yz: the command failed and will keep failing.
    Permanent,
}

/// A three-digit reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReplyCode(u16);

impl ReplyCode {
    /// 220, greeting.
    pub const SERVICE_READY: Self = Self(220);
    /// 221, reply to QUIT.
    pub const CLOSING: Self = Self(221);
    /// 250, action completed.
    pub const OK: Self = Self(250);
    /// 334, next SASL challenge.
    pub const AUTH_CONTINUE: Self = Self(334);
    /// 354, send the message.
    pub const START_DATA: Self = Self(354);
    /// 421, server is shutting the channel.
    pub const SERVICE_UNAVAILABLE: Self = Self(421);
    /// 450, mailbox temporarily unavailable.
    pub const MAILBOX_BUSY: Self = Self(450);
    /// 535, credentials rejected.
    pub const AUTH_FAILED: Self = Self(535);
    /// 550, mailbox does not exist or refuses mail.
    pub const MAILBOX_UNAVAILABLE: Self = Self(550);

    /// Wraps a raw code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Numeric value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Classifies the code, or `None` for codes outside 200..=599.
    #[must_use]
    pub const fn severity(self) -> Option<Severity> {
        match self.0 / 100 {
            2 => Some(Severity::Completed),
            3 => Some(Severity::Intermediate),
            4 => Some(Severity::Transient),
            5 => Some(Severity::Permanent),
            _ => None,
        }
    }

    /// 2yz.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self.severity(), Some(Severity::Completed))
    }

    /// 4yz.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self.severity(), Some(Severity::Transient))
    }

    /// 5yz.
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        matches!(self.severity(), Some(Severity::Permanent))
    }
}

impl fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A complete, possibly multi-line, reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Code shared by every line.
    pub code: ReplyCode,
    /// Text after the code on each line, separator stripped.
    pub lines: Vec<String>,
}

impl Reply {
    /// Builds a reply from its parts.
    #[must_use]
    pub const fn new(code: ReplyCode, lines: Vec<String>) -> Self {
        Self { code, lines }
    }

    /// Whether the code is 2yz.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code.is_success()
    }

    /// Reply text with lines joined by `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lines.iter().rev().find(|l| !l.is_empty()) {
            Some(last) => write!(f, "{} {last}", self.code),
            None => self.code.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_follows_first_digit() {
        assert_eq!(ReplyCode::OK.severity(), Some(Severity::Completed));
        assert_eq!(ReplyCode::START_DATA.severity(), Some(Severity::Intermediate));
        assert_eq!(ReplyCode::SERVICE_UNAVAILABLE.severity(), Some(Severity::Transient));
        assert_eq!(ReplyCode::MAILBOX_UNAVAILABLE.severity(), Some(Severity::Permanent));
        assert_eq!(ReplyCode::new(199).severity(), None);
        assert_eq!(ReplyCode::new(600).severity(), None);

        assert!(ReplyCode::MAILBOX_BUSY.is_transient());
        assert!(!ReplyCode::MAILBOX_BUSY.is_permanent());
        assert!(!ReplyCode::START_DATA.is_success());
    }

    #[test]
    fn text_keeps_every_line() {
        let reply = Reply::new(
            ReplyCode::SERVICE_READY,
            vec!["mx.example.com ESMTP".into(), "Ready".into()],
        );
        assert_eq!(reply.text(), "mx.example.com ESMTP\nReady");
        assert_eq!(reply.to_string(), "220 Ready");
        assert_eq!(Reply::new(ReplyCode::OK, vec![String::new()]).to_string(), "250");
    }
}
