//! SMTP envelope: who the message is from, who receives it, and the DATA payload.

use crate::error::{Error, Result};
use crate::types::Address;
use bytes::Bytes;

/// Sender, recipients and payload for one delivery attempt.
///
/// Recipients keep the order they were given in; duplicates are not removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    from: Address,
    recipients: Vec<Address>,
    data: Bytes,
}

impl Envelope {
    /// Creates an envelope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEnvelope`] if there are no recipients and
    /// [`Error::InvalidAddress`] if any address is malformed.
    pub fn new<I, R>(from: impl Into<String>, recipients: I, data: impl Into<Bytes>) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        let from = Address::new(from)?;
        let recipients = recipients
            .into_iter()
            .map(Address::new)
            .collect::<Result<Vec<_>>>()?;

        if recipients.is_empty() {
            return Err(Error::InvalidEnvelope("no recipients".into()));
        }

        Ok(Self {
            from,
            recipients,
            data: data.into(),
        })
    }

    /// Returns the reverse-path (`MAIL FROM`) address.
    #[must_use]
    pub const fn from(&self) -> &Address {
        &self.from
    }

    /// Returns the forward-path (`RCPT TO`) addresses.
    #[must_use]
    pub fn recipients(&self) -> &[Address] {
        &self.recipients
    }

    /// Returns the DATA payload.
    #[must_use]
    pub const fn data(&self) -> &Bytes {
        &self.data
    }
}
