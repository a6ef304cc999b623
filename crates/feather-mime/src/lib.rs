//! # feather-mime
//!
//! MIME message generation for outgoing email.
//!
//! ## Features
//!
//! - **Ordered headers**: headers are written in insertion order with CRLF endings
//! - **Content types**: `type/subtype` with ordered, quoted-when-needed parameters
//! - **Transfer encodings**: Base64 (76-column lines) and Quoted-Printable
//! - **Header encoding**: RFC 2047 encoded words for non-ASCII text
//! - **Multipart**: `multipart/alternative` for text + HTML, `multipart/mixed`
//!   for attachments
//!
//! ## Quick Start
//!
//! ```ignore
//! use feather_mime::{ContentType, MessageBuilder, Part};
//!
//! let message = MessageBuilder::new()
//!     .header("From", "sender@example.com")
//!     .header("To", "recipient@example.com")
//!     .header("Subject", "Report")
//!     .text_body("Please find the report attached.")
//!     .attach(Part::attachment(
//!         "report.pdf",
//!         ContentType::new("application", "pdf"),
//!         &pdf_bytes,
//!     ))
//!     .build()?;
//! ```
//!
//! ### Encoding
//!
//! ```ignore
//! use feather_mime::encoding::{encode_quoted_printable, encode_rfc2047};
//!
//! let body = encode_quoted_printable("Héllo, Wørld!");
//! let subject = encode_rfc2047("Grüße aus Köln");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod content_type;
mod error;
mod header;
mod message;

pub mod encoding;

pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::Headers;
pub use message::{MessageBuilder, Part, TransferEncoding};
