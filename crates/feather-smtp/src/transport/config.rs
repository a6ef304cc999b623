//! Connection parameters for [`SmtpTransport`](super::SmtpTransport).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Security/encryption mode for connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Security {
    /// No encryption (not recommended).
    None,
    /// Implicit TLS (connect directly with TLS).
    Tls,
    /// STARTTLS upgrade after plaintext connect.
    #[default]
    StartTls,
}

impl Security {
    /// Get default port for the security mode.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::None => 25,
            Self::StartTls => 587,
            Self::Tls => 465,
        }
    }

    /// Get display name for the security mode.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::None => "None (insecure)",
            Self::Tls => "SSL/TLS",
            Self::StartTls => "STARTTLS",
        }
    }
}

/// Username and password for SMTP AUTH.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Username for authentication.
    pub username: String,
    /// Password for authentication.
    pub password: String,
}

impl Credentials {
    /// Creates credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// SMTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Server hostname.
    pub host: String,
    /// Server port; the default depends on [`Security`].
    #[serde(default)]
    pub port: Option<u16>,
    /// Security mode.
    #[serde(default)]
    pub security: Security,
    /// Credentials; AUTH is skipped when absent.
    #[serde(default)]
    pub credentials: Option<Credentials>,
    /// Hostname announced in EHLO.
    #[serde(default = "default_helo_name")]
    pub helo_name: String,
    /// Upper bound for one complete delivery, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum number of deliveries in flight at once.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_helo_name() -> String {
    "localhost".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_max_connections() -> usize {
    8
}

impl Configuration {
    /// Creates a configuration for `host` with defaults for everything else.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            security: Security::default(),
            credentials: None,
            helo_name: default_helo_name(),
            timeout_secs: default_timeout_secs(),
            max_connections: default_max_connections(),
        }
    }

    /// Sets an explicit port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the security mode.
    #[must_use]
    pub const fn with_security(mut self, security: Security) -> Self {
        self.security = security;
        self
    }

    /// Sets AUTH credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    /// Sets the EHLO hostname.
    #[must_use]
    pub fn with_helo_name(mut self, helo_name: impl Into<String>) -> Self {
        self.helo_name = helo_name.into();
        self
    }

    /// Sets the delivery timeout. The value is kept in whole seconds,
    /// rounded up.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let partial = u64::from(timeout.subsec_nanos() > 0);
        self.timeout_secs = timeout.as_secs().saturating_add(partial);
        self
    }

    /// Sets the number of concurrent deliveries.
    #[must_use]
    pub const fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Returns the port to connect to.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
            .unwrap_or_else(|| self.security.default_port())
    }

    /// Returns the delivery timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Checks that the configuration can be used to connect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the first unusable field.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::InvalidConfiguration("host is empty".into()));
        }
        if self.port == Some(0) {
            return Err(Error::InvalidConfiguration("port must be 1-65535".into()));
        }
        if self.helo_name.trim().is_empty() || self.helo_name.contains(char::is_whitespace) {
            return Err(Error::InvalidConfiguration(
                "helo_name must be a single non-empty word".into(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::InvalidConfiguration(
                "timeout_secs must be positive".into(),
            ));
        }
        if self.max_connections == 0 || self.max_connections > Semaphore::MAX_PERMITS {
            return Err(Error::InvalidConfiguration(format!(
                "max_connections must be between 1 and {}",
                Semaphore::MAX_PERMITS
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_ports_follow_security() {
        assert_eq!(Configuration::new("h").port(), 587);
        assert_eq!(
            Configuration::new("h").with_security(Security::Tls).port(),
            465
        );
        assert_eq!(
            Configuration::new("h").with_security(Security::None).port(),
            25
        );
        assert_eq!(Configuration::new("h").with_port(2525).port(), 2525);
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: Configuration = serde_json::from_str(
            r#"{"host": "smtp.example.com", "security": "tls",
                "credentials": {"username": "u", "password": "p"}}"#,
        )
        .unwrap();
        assert_eq!(config.security, Security::Tls);
        assert_eq!(config.port(), 465);
        assert_eq!(config.helo_name, "localhost");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.credentials, Some(Credentials::new("u", "p")));
    }

    #[test]
    fn validate_rejects_unusable_values() {
        assert!(Configuration::new("smtp.example.com").validate().is_ok());
        assert!(Configuration::new(" ").validate().is_err());
        assert!(Configuration::new("h").with_port(0).validate().is_err());
        assert!(
            Configuration::new("h")
                .with_max_connections(0)
                .validate()
                .is_err()
        );
        assert!(
            Configuration::new("h")
                .with_helo_name("two words")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn validate_caps_max_connections() {
        let at_cap = Configuration::new("h").with_max_connections(Semaphore::MAX_PERMITS);
        assert!(at_cap.validate().is_ok());

        let err = Configuration::new("h")
            .with_max_connections(usize::MAX / 2)
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn timeout_rounds_up_to_whole_seconds() {
        let config = Configuration::new("h").with_timeout(Duration::from_millis(1500));
        assert_eq!(config.timeout(), Duration::from_secs(2));

        let config = Configuration::new("h").with_timeout(Duration::from_millis(200));
        assert_eq!(config.timeout(), Duration::from_secs(1));
        assert!(config.validate().is_ok());

        let config = Configuration::new("h").with_timeout(Duration::from_secs(3));
        assert_eq!(config.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn credentials_debug_hides_password() {
        let rendered = format!("{:?}", Credentials::new("user", "hunter2"));
        assert!(rendered.contains("user"));
        assert!(!rendered.contains("hunter2"));
    }
}
