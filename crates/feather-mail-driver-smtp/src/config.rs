//! Driver configuration file.
//!
//! ```toml
//! [smtp]
//! host = "smtp.example.com"
//! security = "starttls"
//! timeout_secs = 20
//!
//! [smtp.credentials]
//! username = "mailer@example.com"
//! password = "secret"
//!
//! [validation]
//! max_attachment_size = 10485760
//! ```

use crate::error::ConfigError;
use feather_mail::{BasicMailValidator, DEFAULT_MAX_ATTACHMENT_SIZE};
use feather_smtp::Configuration;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything needed to assemble an [`SmtpMailClient`](crate::SmtpMailClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// SMTP server connection settings.
    pub smtp: Configuration,
    /// Settings for the default validator.
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Settings for [`BasicMailValidator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Combined attachment size limit in bytes.
    #[serde(default = "default_max_attachment_size")]
    pub max_attachment_size: usize,
}

const fn default_max_attachment_size() -> usize {
    DEFAULT_MAX_ATTACHMENT_SIZE
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_attachment_size: default_max_attachment_size(),
        }
    }
}

impl DriverConfig {
    /// Creates a configuration with default validation settings.
    #[must_use]
    pub fn new(smtp: Configuration) -> Self {
        Self {
            smtp,
            validation: ValidationConfig::default(),
        }
    }

    /// Parses and checks a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for unusable SMTP settings.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.smtp.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`DriverConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            host = %config.smtp.host,
            "loaded mail driver configuration"
        );
        Ok(config)
    }

    /// Returns the validator described by the `[validation]` table.
    #[must_use]
    pub const fn validator(&self) -> BasicMailValidator {
        BasicMailValidator::new(self.validation.max_attachment_size)
    }
}
