//! Pre-send mail validation.

use crate::model::{Address, Mail};
use async_trait::async_trait;

/// Default upper bound for the combined size of all attachments (25 MiB).
pub const DEFAULT_MAX_ATTACHMENT_SIZE: usize = 25 * 1024 * 1024;

/// Maximum length of an address (RFC 5321 path limit).
const MAX_ADDRESS_LENGTH: usize = 254;

/// Reason a mail was refused before any delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Sender address is malformed.
    #[error("Invalid sender address: {0:?}")]
    InvalidSender(String),
    /// No to, cc or bcc recipient.
    #[error("At least one recipient is required")]
    NoRecipients,
    /// A recipient address is malformed.
    #[error("Invalid recipient address: {0:?}")]
    InvalidRecipient(String),
    /// A Reply-To address is malformed.
    #[error("Invalid reply-to address: {0:?}")]
    InvalidReplyTo(String),
    /// Subject contains a line break.
    #[error("Subject must be a single line")]
    InvalidSubject,
    /// Attachments exceed the configured limit.
    #[error("Attachments total {size} bytes, limit is {limit}")]
    AttachmentsTooLarge {
        /// Combined attachment size.
        size: usize,
        /// Configured limit.
        limit: usize,
    },
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::InvalidSender(_) => "Sender address is not valid",
            Self::NoRecipients => "At least one recipient is required",
            Self::InvalidRecipient(_) => "Recipient address is not valid",
            Self::InvalidReplyTo(_) => "Reply-to address is not valid",
            Self::InvalidSubject => "Subject must be a single line",
            Self::AttachmentsTooLarge { .. } => "Attachments are too large",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidSender(_) => "from",
            Self::NoRecipients | Self::InvalidRecipient(_) => "recipients",
            Self::InvalidReplyTo(_) => "reply_to",
            Self::InvalidSubject => "subject",
            Self::AttachmentsTooLarge { .. } => "attachments",
        }
    }
}

/// Content policy applied before a mail is sent.
#[async_trait]
pub trait MailValidator: Send + Sync {
    /// Checks `mail`, returning the first policy violation.
    async fn validate(&self, mail: &Mail) -> Result<(), ValidationError>;
}

/// Address-syntax and size checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicMailValidator {
    max_attachment_size: usize,
}

impl Default for BasicMailValidator {
    fn default() -> Self {
        Self {
            max_attachment_size: DEFAULT_MAX_ATTACHMENT_SIZE,
        }
    }
}

impl BasicMailValidator {
    /// Creates a validator with the given combined attachment limit in bytes.
    #[must_use]
    pub const fn new(max_attachment_size: usize) -> Self {
        Self {
            max_attachment_size,
        }
    }

    /// Returns the combined attachment limit in bytes.
    #[must_use]
    pub const fn max_attachment_size(&self) -> usize {
        self.max_attachment_size
    }

    /// Runs the checks synchronously.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, checking the sender,
    /// recipients, reply-to addresses, subject and attachments in that order.
    pub fn check(&self, mail: &Mail) -> Result<(), ValidationError> {
        if !is_valid_email(&mail.from().email) {
            return Err(ValidationError::InvalidSender(mail.from().email.clone()));
        }

        let mut recipients = mail.all_recipients().peekable();
        if recipients.peek().is_none() {
            return Err(ValidationError::NoRecipients);
        }
        if let Some(bad) = first_invalid(recipients) {
            return Err(ValidationError::InvalidRecipient(bad.email.clone()));
        }
        if let Some(bad) = first_invalid(mail.reply_to_addresses().iter()) {
            return Err(ValidationError::InvalidReplyTo(bad.email.clone()));
        }

        if mail.subject().contains(['\r', '\n']) {
            return Err(ValidationError::InvalidSubject);
        }

        let size: usize = mail.attachments().iter().map(|a| a.size()).sum();
        if size > self.max_attachment_size {
            return Err(ValidationError::AttachmentsTooLarge {
                size,
                limit: self.max_attachment_size,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl MailValidator for BasicMailValidator {
    async fn validate(&self, mail: &Mail) -> Result<(), ValidationError> {
        self.check(mail).inspect_err(|e| {
            tracing::debug!(field = e.field(), error = %e, "mail rejected by validator");
        })
    }
}

fn first_invalid<'a>(mut addresses: impl Iterator<Item = &'a Address>) -> Option<&'a Address> {
    addresses.find(|a| !is_valid_email(&a.email))
}

/// Basic email address syntax check.
///
/// Requires exactly one `@`, a non-empty local part and a dotted domain with
/// no empty labels. Whitespace, control characters and angle brackets are
/// rejected, as is anything longer than 254 characters.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.len() > MAX_ADDRESS_LENGTH {
        return false;
    }
    if email
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '<' || c == '>')
    {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
}
