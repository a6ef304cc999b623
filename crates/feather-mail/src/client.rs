//! Driver-agnostic mail sending interface.

use crate::error::MailError;
use crate::model::Mail;
use crate::validation::ValidationError;
use async_trait::async_trait;

/// Something that can validate and send mail.
///
/// Implemented by delivery drivers; application code depends on this trait
/// rather than on a concrete transport.
#[async_trait]
pub trait MailClient: Send + Sync {
    /// Checks `mail` against the client's policy without sending it.
    async fn validate(&self, mail: &Mail) -> Result<(), ValidationError>;

    /// Validates, encodes and delivers `mail` in one attempt.
    async fn send(&self, mail: &Mail) -> Result<(), MailError>;
}
