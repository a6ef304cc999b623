//! Turning a [`Mail`] into the DATA payload.

use crate::model::{Address, Body, Mail};
use bytes::Bytes;
use chrono::Utc;
use feather_mime::encoding::encode_rfc2047;
use feather_mime::{ContentType, MessageBuilder, Part};
use rand::Rng;
use rand::distributions::Alphanumeric;

/// Failure to produce a payload.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    /// An attachment declares a content type that cannot be written.
    #[error("Attachment {name:?} has an invalid content type")]
    Attachment {
        /// Attachment file name.
        name: String,
        /// Parse failure.
        #[source]
        source: feather_mime::Error,
    },

    /// The MIME message could not be assembled.
    #[error("MIME assembly failed: {0}")]
    Mime(#[from] feather_mime::Error),
}

/// Serializes a mail into an RFC 5322 message.
pub trait MailEncoder: Send + Sync {
    /// Encodes `mail` into wire bytes with CRLF line endings.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodingError`] if the mail cannot be represented.
    fn encode(&self, mail: &Mail) -> Result<Bytes, EncodingError>;
}

/// MIME encoder: headers, a quoted-printable body, Base64 attachments.
///
/// Bcc recipients are never written to the headers.
#[derive(Debug, Clone, Default)]
pub struct MimeMailEncoder {
    boundary: Option<String>,
}

impl MimeMailEncoder {
    /// Creates an encoder with random MIME boundaries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a fixed MIME boundary prefix.
    #[must_use]
    pub fn with_boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = Some(boundary.into());
        self
    }
}

impl MailEncoder for MimeMailEncoder {
    fn encode(&self, mail: &Mail) -> Result<Bytes, EncodingError> {
        let mut builder = MessageBuilder::new()
            .header("Date", Utc::now().to_rfc2822())
            .header("Message-ID", message_id(&mail.from().email))
            .header("From", format_mailbox(mail.from()));

        for (name, list) in [
            ("To", mail.to_recipients()),
            ("Cc", mail.cc_recipients()),
            ("Reply-To", mail.reply_to_addresses()),
        ] {
            if !list.is_empty() {
                builder = builder.header(name, format_list(list));
            }
        }

        builder = builder.header("Subject", encode_rfc2047(mail.subject()));
        builder = match mail.body() {
            Body::PlainText(text) => builder.text_body(text.as_str()),
            Body::Html(html) => builder.html_body(html.as_str()),
        };

        for attachment in mail.attachments() {
            let content_type = ContentType::parse(&attachment.content_type).map_err(|source| {
                EncodingError::Attachment {
                    name: attachment.name.clone(),
                    source,
                }
            })?;
            builder = builder.attach(Part::attachment(
                &attachment.name,
                content_type,
                &attachment.data,
            ));
        }

        if let Some(boundary) = &self.boundary {
            builder = builder.boundary(boundary.as_str());
        }

        Ok(Bytes::from(builder.build()?))
    }
}

fn message_id(sender: &str) -> String {
    let domain = sender
        .rsplit_once('@')
        .map_or("localhost", |(_, domain)| domain);
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(20)
        .map(char::from)
        .collect();
    format!("<{}.{token}@{domain}>", Utc::now().timestamp())
}

fn format_list(addresses: &[Address]) -> String {
    addresses
        .iter()
        .map(format_mailbox)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders `Name <email>`, quoting or encoding the display name as needed.
fn format_mailbox(address: &Address) -> String {
    let Some(name) = address.name.as_deref().filter(|n| !n.is_empty()) else {
        return address.email.clone();
    };

    let phrase = if !name.is_ascii() || name.chars().any(char::is_control) {
        encode_rfc2047(name)
    } else if name.chars().all(|c| c == ' ' || is_atext(c)) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
    };
    format!("{phrase} <{}>", address.email)
}

fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~".contains(c)
}
