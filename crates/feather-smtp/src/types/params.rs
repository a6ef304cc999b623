//! `MAIL FROM` parameters (RFC 1870, RFC 6152).

/// Value of the `BODY=` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    /// `BODY=7BIT`
    SevenBit,
    /// `BODY=8BITMIME`, only valid when the server advertises 8BITMIME.
    EightBitMime,
}

impl BodyType {
    /// Returns the parameter value as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SevenBit => "7BIT",
            Self::EightBitMime => "8BITMIME",
        }
    }
}

/// Optional ESMTP parameters attached to `MAIL FROM`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MailParams {
    /// `BODY=` parameter.
    pub body: Option<BodyType>,
    /// `SIZE=` parameter, the declared payload size in bytes.
    pub size: Option<usize>,
}
