//! Failures while assembling a message.

/// Shorthand for results in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a message could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A header name or value would corrupt the header block.
    #[error("Header cannot be written: {0}")]
    InvalidHeader(String),

    /// A media type string did not parse.
    #[error("Malformed media type: {0}")]
    InvalidContentType(String),

    /// The builder had neither a body nor an attachment.
    #[error("Message has no body and no attachments")]
    EmptyMessage,
}
