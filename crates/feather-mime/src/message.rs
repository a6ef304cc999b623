//! MIME message assembly.

use crate::content_type::ContentType;
use crate::encoding::{encode_base64_wrapped, encode_quoted_printable, encode_rfc2047};
use crate::error::{Error, Result};
use crate::header::Headers;
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::fmt;

/// Content-Transfer-Encoding of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII, written as-is.
    SevenBit,
    /// Quoted-Printable encoding.
    QuotedPrintable,
    /// Base64 encoding.
    Base64,
}

impl TransferEncoding {
    /// Returns the header value for this encoding.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SevenBit => "7bit",
            Self::QuotedPrintable => "quoted-printable",
            Self::Base64 => "base64",
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A leaf MIME entity with its body already transfer-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    content_type: ContentType,
    transfer_encoding: TransferEncoding,
    disposition: Option<String>,
    body: String,
}

impl Part {
    /// Creates a text part, Quoted-Printable encoded.
    #[must_use]
    pub fn text(content_type: ContentType, text: &str) -> Self {
        Self {
            content_type,
            transfer_encoding: TransferEncoding::QuotedPrintable,
            disposition: None,
            body: encode_quoted_printable(text),
        }
    }

    /// Creates an attachment part, Base64 encoded.
    #[must_use]
    pub fn attachment(filename: &str, content_type: ContentType, data: &[u8]) -> Self {
        Self {
            content_type,
            transfer_encoding: TransferEncoding::Base64,
            disposition: Some(format!("attachment; filename={}", quote_filename(filename))),
            body: encode_base64_wrapped(data),
        }
    }

    /// Returns the content type.
    #[must_use]
    pub const fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// Returns the transfer encoding.
    #[must_use]
    pub const fn transfer_encoding(&self) -> TransferEncoding {
        self.transfer_encoding
    }

    /// Returns the Content-Disposition value, if any.
    #[must_use]
    pub fn disposition(&self) -> Option<&str> {
        self.disposition.as_deref()
    }

    /// Returns the encoded body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    fn write_to(&self, out: &mut String) {
        out.push_str(&format!("Content-Type: {}\r\n", self.content_type));
        out.push_str(&format!(
            "Content-Transfer-Encoding: {}\r\n",
            self.transfer_encoding
        ));
        if let Some(disposition) = &self.disposition {
            out.push_str(&format!("Content-Disposition: {disposition}\r\n"));
        }
        out.push_str("\r\n");
        out.push_str(&self.body);
        if !self.body.ends_with("\r\n") {
            out.push_str("\r\n");
        }
    }
}

fn quote_filename(filename: &str) -> String {
    let encoded = encode_rfc2047(filename);
    let escaped = encoded.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

enum Entity {
    Leaf(Part),
    Multipart {
        content_type: ContentType,
        boundary: String,
        parts: Vec<Entity>,
    },
}

impl Entity {
    fn write_to(&self, out: &mut String) {
        match self {
            Self::Leaf(part) => part.write_to(out),
            Self::Multipart {
                content_type,
                boundary,
                parts,
            } => {
                out.push_str(&format!("Content-Type: {content_type}\r\n\r\n"));
                for part in parts {
                    out.push_str(&format!("--{boundary}\r\n"));
                    part.write_to(out);
                }
                out.push_str(&format!("--{boundary}--\r\n"));
            }
        }
    }
}

/// Builds a complete RFC 5322 message.
///
/// A text body and an HTML body together become `multipart/alternative`;
/// attachments wrap the body in `multipart/mixed`.
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    headers: Headers,
    text: Option<String>,
    html: Option<String>,
    attachments: Vec<Part>,
    boundary: Option<String>,
}

impl MessageBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a top-level header. Values are written verbatim; encode
    /// non-ASCII text with [`encode_rfc2047`] first.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(name, value);
        self
    }

    /// Sets the plain text body.
    #[must_use]
    pub fn text_body(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the HTML body.
    #[must_use]
    pub fn html_body(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Appends an attachment part.
    #[must_use]
    pub fn attach(mut self, part: Part) -> Self {
        self.attachments.push(part);
        self
    }

    /// Uses a fixed boundary prefix instead of a random one.
    #[must_use]
    pub fn boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = Some(boundary.into());
        self
    }

    /// Assembles the message with CRLF line endings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`] if a header would corrupt the message
    /// and [`Error::EmptyMessage`] if there is neither a body nor an attachment.
    pub fn build(self) -> Result<Vec<u8>> {
        self.headers.validate()?;

        let prefix = self.boundary.unwrap_or_else(random_boundary);
        let mut boundaries = (0..).map(|n| format!("{prefix}.{n}"));
        let mut next_boundary = || boundaries.next().unwrap_or_default();

        let body = match (self.text, self.html) {
            (Some(text), Some(html)) => {
                let boundary = next_boundary();
                Some(Entity::Multipart {
                    content_type: ContentType::multipart_alternative(&boundary),
                    boundary,
                    parts: vec![
                        Entity::Leaf(Part::text(ContentType::text_plain(), &text)),
                        Entity::Leaf(Part::text(ContentType::text_html(), &html)),
                    ],
                })
            }
            (Some(text), None) => Some(Entity::Leaf(Part::text(ContentType::text_plain(), &text))),
            (None, Some(html)) => Some(Entity::Leaf(Part::text(ContentType::text_html(), &html))),
            (None, None) => None,
        };

        let root = if self.attachments.is_empty() {
            body.ok_or(Error::EmptyMessage)?
        } else {
            let boundary = next_boundary();
            let parts = body
                .into_iter()
                .chain(self.attachments.into_iter().map(Entity::Leaf))
                .collect();
            Entity::Multipart {
                content_type: ContentType::multipart_mixed(&boundary),
                boundary,
                parts,
            }
        };

        let mut out = self.headers.to_string();
        out.push_str("MIME-Version: 1.0\r\n");
        root.write_to(&mut out);
        Ok(out.into_bytes())
    }
}

fn random_boundary() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect();
    format!("=_feather_{token}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn build(builder: MessageBuilder) -> String {
        String::from_utf8(builder.build().unwrap()).unwrap()
    }

    #[test]
    fn test_single_text_part() {
        let message = build(
            MessageBuilder::new()
                .header("From", "a@x.com")
                .header("Subject", "Hi")
                .text_body("Hello\nWorld"),
        );
        assert_eq!(
            message,
            "From: a@x.com\r\n\
             Subject: Hi\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\
             Content-Transfer-Encoding: quoted-printable\r\n\
             \r\n\
             Hello\r\n\
             World\r\n"
        );
    }

    #[test]
    fn test_alternative_parts() {
        let message = build(
            MessageBuilder::new()
                .text_body("plain")
                .html_body("<p>html</p>")
                .boundary("B"),
        );
        assert!(
            message.contains("Content-Type: multipart/alternative; boundary=B.0\r\n\r\n--B.0\r\n")
        );
        let plain = message.find("text/plain").unwrap();
        let html = message.find("text/html").unwrap();
        assert!(plain < html);
        assert!(message.ends_with("--B.0--\r\n"));
    }

    #[test]
    fn test_attachments_wrap_body_in_mixed() {
        let message = build(
            MessageBuilder::new()
                .text_body("plain")
                .html_body("<p>html</p>")
                .attach(Part::attachment(
                    "notes.txt",
                    ContentType::new("text", "plain"),
                    b"hello",
                ))
                .boundary("B"),
        );
        assert!(message.contains("multipart/mixed; boundary=B.1"));
        assert!(message.contains("--B.1\r\nContent-Type: multipart/alternative; boundary=B.0"));
        assert!(message.contains(
            "Content-Transfer-Encoding: base64\r\n\
             Content-Disposition: attachment; filename=\"notes.txt\"\r\n\
             \r\n\
             aGVsbG8=\r\n--B.1--\r\n"
        ));
    }

    #[test]
    fn test_attachment_only() {
        let message = build(MessageBuilder::new().boundary("B").attach(Part::attachment(
            "a.bin",
            ContentType::octet_stream(),
            &[0xff],
        )));
        assert!(message.contains("multipart/mixed; boundary=B.0"));
        assert_eq!(message.matches("Content-Type:").count(), 2);
    }

    #[test]
    fn test_non_ascii_filename_is_encoded() {
        let part = Part::attachment("résumé.pdf", ContentType::octet_stream(), b"x");
        assert!(part.disposition().unwrap().contains("=?utf-8?B?"));
    }

    #[test]
    fn test_empty_message() {
        let err = MessageBuilder::new().header("From", "a@x.com").build().unwrap_err();
        assert!(matches!(err, Error::EmptyMessage));
    }

    #[test]
    fn test_header_injection_rejected() {
        let err = MessageBuilder::new()
            .header("Subject", "hi\r\nBcc: x@y.com")
            .text_body("body")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidHeader(_)));
    }

    #[test]
    fn test_random_boundaries_differ() {
        assert_ne!(random_boundary(), random_boundary());
        assert!(random_boundary().starts_with("=_feather_"));
    }
}
