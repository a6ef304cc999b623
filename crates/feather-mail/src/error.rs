//! Caller-facing error taxonomy for sending mail.

use crate::validation::ValidationError;
use std::error::Error as StdError;

/// Boxed, thread-safe error used as the preserved cause of [`MailError::Unknown`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Why a send failed.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// The mail failed policy checks; nothing was sent.
    #[error("Mail validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The delivery layer reported a failure with a message, e.g. a server
    /// rejection such as `550 5.1.1 No such user`.
    #[error("{0}")]
    Custom(String),

    /// Any other failure; the original error is preserved.
    #[error("Mail delivery failed: {0}")]
    Unknown(#[source] BoxError),
}

impl MailError {
    /// Wraps any error as [`MailError::Unknown`].
    pub fn unknown(cause: impl Into<BoxError>) -> Self {
        Self::Unknown(cause.into())
    }

    /// Returns true for validation failures.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns the validation failure, if this is one.
    #[must_use]
    pub const fn validation_error(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the preserved cause of an [`MailError::Unknown`].
    #[must_use]
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Self::Unknown(cause) => Some(cause.as_ref()),
            _ => None,
        }
    }

    /// Returns the preserved cause as a concrete type.
    #[must_use]
    pub fn downcast_cause<E: StdError + 'static>(&self) -> Option<&E> {
        self.cause()?.downcast_ref::<E>()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn validation_converts_and_is_recognised() {
        let err = MailError::from(ValidationError::NoRecipients);
        assert!(err.is_validation());
        assert_eq!(err.validation_error(), Some(&ValidationError::NoRecipients));
        assert!(err.cause().is_none());
    }

    #[test]
    fn custom_displays_verbatim() {
        let err = MailError::Custom("550 5.1.1 No such user".into());
        assert_eq!(err.to_string(), "550 5.1.1 No such user");
        assert!(!err.is_validation());
    }

    #[test]
    fn unknown_preserves_cause() {
        let err = MailError::unknown(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        let cause = err.downcast_cause::<io::Error>().unwrap();
        assert_eq!(cause.kind(), io::ErrorKind::ConnectionReset);
        assert_eq!(StdError::source(&err).unwrap().to_string(), "reset");
        assert!(err.downcast_cause::<std::fmt::Error>().is_none());
    }
}
