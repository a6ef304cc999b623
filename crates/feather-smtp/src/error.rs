//! Error types for SMTP operations.

use crate::types::{Reply, ReplyCode};
use std::io;
use std::time::Duration;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error used to carry causes this crate does not classify.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// SMTP error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Human-readable delivery failure reported by the server.
    ///
    /// Server rejections are rendered as `"<code> <text>"`, see [`Error::rejected`].
    #[error("{0}")]
    Custom(String),

    /// Failure whose underlying cause is not classified by this crate.
    #[error("Unknown error: {0}")]
    Unknown(#[source] BoxError),

    /// Protocol error (unexpected or malformed response).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Envelope cannot be delivered as constructed.
    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// Transport configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Message exceeds the size advertised by the server.
    #[error("Message of {size} bytes exceeds server limit of {limit} bytes")]
    MessageTooLarge {
        /// Payload size in bytes.
        size: usize,
        /// Limit advertised through the SIZE extension.
        limit: usize,
    },

    /// Feature not supported by server.
    #[error("Server does not support {0}")]
    NotSupported(String),

    /// The exchange did not finish within the configured timeout.
    #[error("SMTP exchange timed out after {0:?}")]
    Timeout(Duration),

    /// The delivery task was aborted before it finished.
    #[error("SMTP delivery was cancelled")]
    Cancelled,
}

impl Error {
    /// Creates a delivery failure from a negative server reply.
    #[must_use]
    pub fn rejected(reply: &Reply) -> Self {
        let text = reply.text();
        if text.is_empty() {
            Self::Custom(reply.code.to_string())
        } else {
            Self::Custom(format!("{} {text}", reply.code))
        }
    }

    /// Wraps an arbitrary error as [`Error::Unknown`].
    pub fn unknown(cause: impl Into<BoxError>) -> Self {
        Self::Unknown(cause.into())
    }

    /// Returns the reply code of a server rejection, if this is one.
    #[must_use]
    pub fn reply_code(&self) -> Option<ReplyCode> {
        let Self::Custom(message) = self else {
            return None;
        };
        let digits = message.get(..3)?;
        if message.len() > 3 && !message[3..].starts_with(' ') {
            return None;
        }
        digits.parse::<u16>().ok().map(ReplyCode::new)
    }

    /// Returns true if this is a permanent server rejection (5xx).
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        self.reply_code().is_some_and(ReplyCode::is_permanent)
    }

    /// Returns true if this is a transient server rejection (4xx).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.reply_code().is_some_and(ReplyCode::is_transient)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rejected_renders_code_and_text() {
        let reply = Reply::new(
            ReplyCode::MAILBOX_UNAVAILABLE,
            vec!["5.1.1 User unknown".to_string()],
        );
        let err = Error::rejected(&reply);
        assert_eq!(err.to_string(), "550 5.1.1 User unknown");
        assert_eq!(err.reply_code(), Some(ReplyCode::MAILBOX_UNAVAILABLE));
        assert!(err.is_permanent());
        assert!(!err.is_transient());
    }

    #[test]
    fn rejected_without_text() {
        let reply = Reply::new(ReplyCode::MAILBOX_BUSY, vec![String::new()]);
        let err = Error::rejected(&reply);
        assert_eq!(err.to_string(), "450");
        assert!(err.is_transient());
    }

    #[test]
    fn custom_message_without_code() {
        let err = Error::Custom("relay denied".into());
        assert_eq!(err.reply_code(), None);
        assert!(!err.is_permanent());
    }

    #[test]
    fn unknown_keeps_source() {
        let err = Error::unknown(io::Error::other("boom"));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "boom");
    }
}
