//! Driver construction errors and transport error mapping.

use feather_mail::{BoxError, MailError};
use feather_smtp::Error as SmtpError;

/// Failure to assemble an [`SmtpMailClient`](crate::SmtpMailClient).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No runtime handle was supplied and the builder ran outside a Tokio runtime.
    #[error("No Tokio runtime available; pass one with SmtpMailClientBuilder::runtime")]
    NoRuntime,

    /// The SMTP configuration is unusable.
    #[error("Invalid SMTP configuration: {0}")]
    Invalid(#[from] SmtpError),

    /// The configuration file is not valid TOML for this driver.
    #[error("Failed to parse driver configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration file could not be read.
    #[error("Failed to read driver configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Translates a failure from encoding, envelope construction or delivery into
/// a [`MailError`].
///
/// - [`SmtpError::Custom`] becomes [`MailError::Custom`] with the message unchanged.
/// - [`SmtpError::Unknown`] becomes [`MailError::Unknown`] with the same cause.
/// - Any other SMTP error, and any error that is not an SMTP error at all,
///   becomes [`MailError::Unknown`] carrying the original error.
#[must_use]
pub fn map_transport_error(error: BoxError) -> MailError {
    match error.downcast::<SmtpError>() {
        Ok(smtp) => match *smtp {
            SmtpError::Custom(message) => MailError::Custom(message),
            SmtpError::Unknown(cause) => MailError::Unknown(cause),
            other => MailError::unknown(other),
        },
        Err(original) => MailError::Unknown(original),
    }
}

/// SMTP-specific inspection of a [`MailError`].
pub trait MailErrorExt {
    /// Returns the SMTP error preserved in an `Unknown` failure.
    fn smtp_error(&self) -> Option<&SmtpError>;

    /// Returns true if the delivery was cancelled before it completed.
    fn is_cancelled(&self) -> bool {
        matches!(self.smtp_error(), Some(SmtpError::Cancelled))
    }

    /// Returns true if the delivery ran out of time.
    fn is_timeout(&self) -> bool {
        matches!(self.smtp_error(), Some(SmtpError::Timeout(_)))
    }
}

impl MailErrorExt for MailError {
    fn smtp_error(&self) -> Option<&SmtpError> {
        self.downcast_cause::<SmtpError>()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io;
    use std::time::Duration;

    #[test]
    fn custom_is_verbatim() {
        let err = map_transport_error(Box::new(SmtpError::Custom("550 5.1.1 No such user".into())));
        assert!(matches!(err, MailError::Custom(ref m) if m == "550 5.1.1 No such user"));
    }

    #[test]
    fn unknown_cause_is_unwrapped() {
        let cause = io::Error::new(io::ErrorKind::BrokenPipe, "pipe");
        let err = map_transport_error(Box::new(SmtpError::unknown(cause)));
        let io = err.downcast_cause::<io::Error>().unwrap();
        assert_eq!(io.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn other_smtp_errors_are_preserved() {
        let err = map_transport_error(Box::new(SmtpError::Timeout(Duration::from_secs(3))));
        assert!(err.is_timeout());
        assert!(!err.is_cancelled());
        assert!(matches!(
            err.smtp_error(),
            Some(SmtpError::Timeout(d)) if *d == Duration::from_secs(3)
        ));

        let err = map_transport_error(Box::new(SmtpError::Cancelled));
        assert!(err.is_cancelled());
    }

    #[test]
    fn foreign_errors_are_preserved() {
        let err = map_transport_error(Box::new(io::Error::other("elsewhere")));
        match err {
            MailError::Unknown(cause) => {
                assert_eq!(cause.downcast_ref::<io::Error>().unwrap().to_string(), "elsewhere");
            }
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn non_unknown_errors_have_no_smtp_error() {
        assert!(MailError::Custom("x".into()).smtp_error().is_none());
        assert!(!MailError::Custom("x".into()).is_cancelled());
    }
}
