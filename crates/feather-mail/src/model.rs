//! Outgoing mail object model.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A mailbox: an email address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    /// Bare address, e.g. `user@example.com`.
    pub email: String,
    /// Display name, e.g. `Jane Doe`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Address {
    /// Creates an address without a display name.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    /// Creates an address with a display name.
    pub fn named(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: Some(name.into()),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} <{}>", self.email),
            None => f.write_str(&self.email),
        }
    }
}

impl From<&str> for Address {
    fn from(email: &str) -> Self {
        Self::new(email)
    }
}

impl From<String> for Address {
    fn from(email: String) -> Self {
        Self::new(email)
    }
}

/// Message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum Body {
    /// `text/plain` body.
    PlainText(String),
    /// `text/html` body.
    Html(String),
}

/// A file attached to a mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// File name shown to the recipient.
    pub name: String,
    /// MIME type, e.g. `application/pdf`.
    pub content_type: String,
    /// Raw file contents.
    pub data: Bytes,
}

impl Attachment {
    /// Creates an attachment.
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Returns the size of the contents in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// One outbound message.
///
/// Built with [`Mail::new`] and the consuming setters; there are no mutating
/// accessors afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mail {
    from: Address,
    #[serde(default)]
    to: Vec<Address>,
    #[serde(default)]
    cc: Vec<Address>,
    #[serde(default)]
    bcc: Vec<Address>,
    #[serde(default)]
    reply_to: Vec<Address>,
    subject: String,
    body: Body,
    #[serde(default)]
    attachments: Vec<Attachment>,
}

impl Mail {
    /// Creates a mail with no recipients.
    pub fn new(from: impl Into<Address>, subject: impl Into<String>, body: Body) -> Self {
        Self {
            from: from.into(),
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            reply_to: Vec::new(),
            subject: subject.into(),
            body,
            attachments: Vec::new(),
        }
    }

    /// Adds a recipient.
    #[must_use]
    pub fn to(mut self, recipient: impl Into<Address>) -> Self {
        self.to.push(recipient.into());
        self
    }

    /// Adds a CC recipient.
    #[must_use]
    pub fn cc(mut self, recipient: impl Into<Address>) -> Self {
        self.cc.push(recipient.into());
        self
    }

    /// Adds a BCC recipient.
    #[must_use]
    pub fn bcc(mut self, recipient: impl Into<Address>) -> Self {
        self.bcc.push(recipient.into());
        self
    }

    /// Adds a Reply-To address.
    #[must_use]
    pub fn reply_to(mut self, address: impl Into<Address>) -> Self {
        self.reply_to.push(address.into());
        self
    }

    /// Adds an attachment.
    #[must_use]
    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Sender.
    #[must_use]
    pub const fn from(&self) -> &Address {
        &self.from
    }

    /// Primary recipients.
    #[must_use]
    pub fn to_recipients(&self) -> &[Address] {
        &self.to
    }

    /// Carbon-copy recipients.
    #[must_use]
    pub fn cc_recipients(&self) -> &[Address] {
        &self.cc
    }

    /// Blind carbon-copy recipients.
    #[must_use]
    pub fn bcc_recipients(&self) -> &[Address] {
        &self.bcc
    }

    /// Reply-To addresses.
    #[must_use]
    pub fn reply_to_addresses(&self) -> &[Address] {
        &self.reply_to
    }

    /// Subject line.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Body.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Attachments in the order they were added.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Returns every recipient: to, then cc, then bcc.
    pub fn all_recipients(&self) -> impl Iterator<Item = &Address> {
        self.to.iter().chain(&self.cc).chain(&self.bcc)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_order() {
        let mail = Mail::new("a@x.com", "Hi", Body::PlainText("hello".into()))
            .bcc("d@x.com")
            .to("b@x.com")
            .cc("c@x.com")
            .to(Address::named("e@x.com", "Eve"));

        let all: Vec<&str> = mail.all_recipients().map(|a| a.email.as_str()).collect();
        assert_eq!(all, ["b@x.com", "e@x.com", "c@x.com", "d@x.com"]);
        assert_eq!(mail.from().email, "a@x.com");
    }

    #[test]
    fn address_display() {
        assert_eq!(Address::new("a@x.com").to_string(), "a@x.com");
        assert_eq!(Address::named("a@x.com", "Ann").to_string(), "Ann <a@x.com>");
    }

    #[test]
    fn serde_round_trip_for_queueing() {
        let mail = Mail::new(
            Address::named("a@x.com", "Ann"),
            "Report",
            Body::Html("<p>hi</p>".into()),
        )
        .to("b@x.com")
        .attach(Attachment::new("r.txt", "text/plain", &b"data"[..]));

        let json = serde_json::to_string(&mail).unwrap();
        let back: Mail = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mail);
    }

    #[test]
    fn deserializes_minimal_mail() {
        let mail: Mail = serde_json::from_str(
            r#"{"from": {"email": "a@x.com"}, "subject": "s",
                "body": {"type": "plain_text", "content": "hello"}}"#,
        )
        .unwrap();
        assert!(mail.to_recipients().is_empty());
        assert_eq!(mail.body(), &Body::PlainText("hello".into()));
    }
}
