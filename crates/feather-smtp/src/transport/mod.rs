//! Envelope transport.
//!
//! [`Transport`] is the seam between code that has a fully built [`Envelope`]
//! and whatever delivers it. [`SmtpTransport`] is the network implementation.

mod config;
mod smtp;

pub use config::{Configuration, Credentials, Security};
pub use smtp::SmtpTransport;

use crate::Envelope;
use async_trait::async_trait;

/// Delivers envelopes.
///
/// Implementations own connection handling, pooling and admission control;
/// callers may invoke [`Transport::send`] concurrently.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Failure type reported by [`Transport::send`].
    type Error: std::error::Error + Send + Sync + 'static;

    /// Delivers one envelope.
    ///
    /// Dropping the returned future before it completes cancels the delivery.
    async fn send(&self, envelope: Envelope) -> Result<(), Self::Error>;
}
