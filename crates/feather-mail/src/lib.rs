//! # feather-mail
//!
//! Shared building blocks for mail drivers: the outgoing mail model, content
//! validation, MIME encoding and the error taxonomy returned from `send`.
//!
//! This crate provides:
//! - [`Mail`], [`Address`], [`Body`], [`Attachment`]
//! - [`MailValidator`] with the default [`BasicMailValidator`]
//! - [`MailEncoder`] with the default [`MimeMailEncoder`]
//! - [`MailError`]: `Validation`, `Custom` or `Unknown`
//! - [`MailClient`], the trait drivers implement

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod encoder;
mod error;
mod model;
mod validation;

pub use client::MailClient;
pub use encoder::{EncodingError, MailEncoder, MimeMailEncoder};
pub use error::{BoxError, MailError};
pub use model::{Address, Attachment, Body, Mail};
pub use validation::{
    BasicMailValidator, DEFAULT_MAX_ATTACHMENT_SIZE, MailValidator, ValidationError,
    is_valid_email,
};
