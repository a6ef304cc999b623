//! # feather-mail-driver-smtp
//!
//! Mail driver that delivers [`Mail`](feather_mail::Mail) over SMTP.
//!
//! A send runs in a fixed order: validate, collect recipients (`to`, then
//! `cc`, then `bcc`), encode, build one [`Envelope`](feather_smtp::Envelope)
//! and hand it to the transport. Failures come back as
//! [`MailError`](feather_mail::MailError):
//!
//! - `Validation` when the validator rejects the mail (nothing is sent)
//! - `Custom` with the server's reply text when the server refuses the mail
//! - `Unknown` for everything else, with the original error as its cause
//!
//! ## Quick Start
//!
//! ```ignore
//! use feather_mail::{Body, Mail, MimeMailEncoder};
//! use feather_mail_driver_smtp::SmtpMailClient;
//! use feather_smtp::{Configuration, Security};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let configuration = Configuration::new("smtp.example.com")
//!         .with_security(Security::StartTls)
//!         .with_credentials("mailer@example.com", "password");
//!     let client = SmtpMailClient::builder(configuration, MimeMailEncoder::new()).build()?;
//!
//!     let mail = Mail::new("mailer@example.com", "Welcome", Body::PlainText("Hi!".into()))
//!         .to("user@example.com");
//!     client.send(&mail).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Runtime
//!
//! Deliveries run as tasks on a Tokio runtime handle given to
//! [`SmtpMailClientBuilder::runtime`]; without one, the builder uses the
//! runtime it is called from. Dropping a `send` future aborts its delivery,
//! which is visible through [`MailErrorExt::is_cancelled`] when the transport
//! reports it.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod config;
mod error;

pub use client::{SmtpMailClient, SmtpMailClientBuilder, envelope_recipients};
pub use config::{DriverConfig, ValidationConfig};
pub use error::{ConfigError, MailErrorExt, map_transport_error};

pub use feather_mail;
pub use feather_smtp;
