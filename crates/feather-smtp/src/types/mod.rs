//! Core SMTP types.

mod address;
mod extension;
mod params;
mod reply;

pub use address::Address;
pub use extension::{AuthMechanism, Extension};
pub use params::{BodyType, MailParams};
pub use reply::{Reply, ReplyCode, Severity};
