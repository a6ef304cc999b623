//! Network transport speaking SMTP to a single relay.

use super::{Configuration, Credentials, Security, Transport};
use crate::Envelope;
use crate::connection::{
    Authenticated, Client, Connected, ServerInfo, SmtpConnection, connect, connect_tls,
};
use crate::error::{Error, Result};
use crate::types::{AuthMechanism, BodyType, MailParams};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, warn};

/// Delivers envelopes to the configured relay, one connection per envelope.
///
/// At most [`Configuration::max_connections`] deliveries run at once; further
/// callers wait for a slot. Deliveries run as tasks on the runtime passed to
/// [`SmtpTransport::new`], and a delivery is aborted when the caller stops
/// waiting for it.
#[derive(Debug, Clone)]
pub struct SmtpTransport {
    config: Arc<Configuration>,
    runtime: Handle,
    permits: Arc<Semaphore>,
}

impl SmtpTransport {
    /// Creates a transport. No connection is opened until the first send.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `config` is unusable.
    pub fn new(config: Configuration, runtime: Handle) -> Result<Self> {
        config.validate()?;
        let permits = Arc::new(Semaphore::new(config.max_connections));
        Ok(Self {
            config: Arc::new(config),
            runtime,
            permits,
        })
    }

    /// Returns the configuration this transport connects with.
    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }
}

#[async_trait]
impl Transport for SmtpTransport {
    type Error = Error;

    async fn send(&self, envelope: Envelope) -> Result<()> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(Error::unknown)?;

        let config = Arc::clone(&self.config);
        let span = tracing::debug_span!("smtp_delivery", host = %config.host, port = config.port());
        let mut task = AbortOnDrop(self.runtime.spawn(
            async move {
                let _permit = permit;
                deliver(&config, &envelope).await
            }
            .instrument(span),
        ));

        match (&mut task.0).await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(Error::Cancelled),
            Err(e) => Err(Error::unknown(e)),
        }
    }
}

/// Aborts the wrapped task when dropped, so cancellation reaches the delivery.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn deliver(config: &Configuration, envelope: &Envelope) -> Result<()> {
    let timeout = config.timeout();
    tokio::time::timeout(timeout, exchange(config, envelope))
        .await
        .map_err(|_| Error::Timeout(timeout))?
}

async fn exchange(config: &Configuration, envelope: &Envelope) -> Result<()> {
    debug!(security = config.security.display_name(), "connecting");
    let stream = match config.security {
        Security::Tls => connect_tls(&config.host, config.port()).await?,
        Security::StartTls | Security::None => connect(&config.host, config.port()).await?,
    };

    let client = Client::from_stream(stream)
        .await?
        .ehlo(&config.helo_name)
        .await?;

    let client = if config.security == Security::StartTls {
        client.starttls(&config.host, &config.helo_name).await?
    } else {
        client
    };

    let params = mail_params(client.server_info(), envelope)?;
    let from = envelope.from().clone();
    let transaction = match &config.credentials {
        Some(credentials) => {
            authenticate(client, credentials)
                .await?
                .mail_from(from, params)
                .await?
        }
        None => client.mail_from(from, params).await?,
    };

    let (first, rest) = envelope
        .recipients()
        .split_first()
        .ok_or_else(|| Error::InvalidEnvelope("no recipients".into()))?;
    let mut client = transaction.rcpt_to(first.clone()).await?;
    for recipient in rest {
        client = client.rcpt_to(recipient.clone()).await?;
    }

    let client = client.data().await?.send_message(envelope.data()).await?;
    debug!(
        recipients = envelope.recipients().len(),
        bytes = envelope.data().len(),
        "envelope delivered"
    );

    // The message is already accepted at this point.
    if let Err(e) = client.quit().await {
        warn!(error = %e, "QUIT failed after delivery");
    }
    Ok(())
}

async fn authenticate(
    client: Client<Connected>,
    credentials: &Credentials,
) -> Result<Client<Authenticated>> {
    let mechanisms = client.server_info().auth_mechanisms();
    let Credentials { username, password } = credentials;

    if mechanisms.is_empty() || mechanisms.contains(&AuthMechanism::Plain) {
        client.auth_plain(username, password).await
    } else if mechanisms.contains(&AuthMechanism::Login) {
        client.auth_login(username, password).await
    } else {
        Err(Error::NotSupported(format!(
            "AUTH PLAIN or LOGIN (server offers {})",
            mechanisms
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }
}

fn mail_params(server: &ServerInfo, envelope: &Envelope) -> Result<MailParams> {
    let size = envelope.data().len();
    if let Some(limit) = server.max_message_size() {
        if size > limit {
            return Err(Error::MessageTooLarge { size, limit });
        }
    }

    let body = if !envelope.data().is_ascii() && server.supports_8bitmime() {
        Some(BodyType::EightBitMime)
    } else {
        None
    };

    Ok(MailParams {
        body,
        size: server.supports_size().then_some(size),
    })
}
