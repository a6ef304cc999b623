//! # feather-smtp
//!
//! Async SMTP client (RFC 5321) and the envelope transport built on top of it.
//!
//! ## Features
//!
//! - **Type-state connection management**: compile-time enforcement of valid
//!   SMTP state transitions
//! - **Envelope transport**: [`SmtpTransport`] delivers an [`Envelope`] in one
//!   connection, with admission control and a delivery timeout
//! - **TLS support**: both implicit TLS (port 465) and STARTTLS
//! - **Authentication**: PLAIN and LOGIN
//! - **Extensions**: SIZE and 8BITMIME are honoured when advertised
//!
//! ## Quick Start
//!
//! ```ignore
//! use feather_smtp::{Configuration, Envelope, Security, SmtpTransport, Transport};
//!
//! #[tokio::main]
//! async fn main() -> feather_smtp::Result<()> {
//!     let config = Configuration::new("smtp.example.com")
//!         .with_security(Security::StartTls)
//!         .with_credentials("user@example.com", "password");
//!     let transport = SmtpTransport::new(config, tokio::runtime::Handle::current())?;
//!
//!     let envelope = Envelope::new(
//!         "sender@example.com",
//!         ["recipient@example.com"],
//!         &b"Subject: Test\r\n\r\nHello, World!\r\n"[..],
//!     )?;
//!     transport.send(envelope).await
//! }
//! ```
//!
//! ## Connection States
//!
//! The protocol client uses the type-state pattern:
//!
//! ```text
//! ┌──────────────┐
//! │  Connected   │ ─── auth_plain() / auth_login() ───→ Authenticated
//! └──────────────┘
//!        │
//!        └─── mail_from() ───→ MailTransaction ───→ RecipientAdded ───→ Data
//! ```
//!
//! ## Modules
//!
//! - [`command`]: SMTP command builders
//! - [`connection`]: Connection management and type-state client
//! - [`parser`]: Reply parser
//! - [`transport`]: Envelope transport and its configuration
//! - [`types`]: Core SMTP types (addresses, extensions, replies)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod envelope;
mod error;
pub mod parser;
pub mod transport;
pub mod types;

pub use connection::{
    Authenticated, Client, Connected, Data, MailTransaction, RecipientAdded, ServerInfo,
    SmtpConnection,
};
pub use envelope::Envelope;
pub use error::{BoxError, Error, Result};
pub use transport::{Configuration, Credentials, Security, SmtpTransport, Transport};
pub use types::{
    Address, AuthMechanism, BodyType, Extension, MailParams, Reply, ReplyCode, Severity,
};
