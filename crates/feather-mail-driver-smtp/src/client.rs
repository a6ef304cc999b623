//! The SMTP mail client.

use crate::config::DriverConfig;
use crate::error::{ConfigError, map_transport_error};
use async_trait::async_trait;
use feather_mail::{
    BasicMailValidator, BoxError, Mail, MailClient, MailEncoder, MailError, MailValidator,
    MimeMailEncoder, ValidationError,
};
use feather_smtp::{Configuration, Envelope, SmtpTransport, Transport};
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{Instrument, Span, debug, warn};

/// Sends [`Mail`] through a [`Transport`], SMTP by default.
///
/// Every [`send`](Self::send) validates the mail, encodes it, hands one
/// envelope to the transport and maps any failure onto [`MailError`]. The
/// client holds no per-send state, so one instance can be cloned and shared
/// across tasks; concurrency limits live in the transport.
pub struct SmtpMailClient<T = SmtpTransport> {
    validator: Arc<dyn MailValidator>,
    encoder: Arc<dyn MailEncoder>,
    transport: Arc<T>,
    span: Span,
}

impl SmtpMailClient {
    /// Starts building a client that delivers over SMTP.
    pub fn builder(
        configuration: Configuration,
        encoder: impl MailEncoder + 'static,
    ) -> SmtpMailClientBuilder {
        SmtpMailClientBuilder {
            configuration,
            encoder: Arc::new(encoder),
            validator: None,
            runtime: None,
            span: None,
        }
    }

    /// Builds a client from a loaded [`DriverConfig`] with the MIME encoder.
    ///
    /// # Errors
    ///
    /// Same as [`SmtpMailClientBuilder::build`].
    pub fn from_config(config: DriverConfig) -> Result<Self, ConfigError> {
        let validator = config.validator();
        Self::builder(config.smtp, MimeMailEncoder::new())
            .validator(validator)
            .build()
    }
}

impl<T: Transport> SmtpMailClient<T> {
    /// Creates a client around an existing transport, with the default
    /// validator and diagnostic span.
    pub fn with_transport(transport: T, encoder: impl MailEncoder + 'static) -> Self {
        Self {
            validator: Arc::new(BasicMailValidator::default()),
            encoder: Arc::new(encoder),
            transport: Arc::new(transport),
            span: default_span(),
        }
    }

    /// Replaces the validator.
    #[must_use]
    pub fn with_validator(mut self, validator: impl MailValidator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    /// Replaces the span that send spans are recorded under.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Checks `mail` against the validator without sending it.
    ///
    /// # Errors
    ///
    /// Returns the validator's [`ValidationError`].
    pub async fn validate(&self, mail: &Mail) -> Result<(), ValidationError> {
        self.validator.validate(mail).await
    }

    /// Validates, encodes and delivers `mail` as a single envelope.
    ///
    /// Recipients are `to`, then `cc`, then `bcc`, in order and without
    /// deduplication. Nothing is retried; calling `send` twice delivers twice.
    ///
    /// # Errors
    ///
    /// - [`MailError::Validation`] if the validator rejects the mail; the
    ///   transport is not used.
    /// - [`MailError::Custom`] with the server's reply when the transport
    ///   reports a rejection.
    /// - [`MailError::Unknown`] for everything else, including encoding
    ///   failures, with the original error as its cause.
    pub async fn send(&self, mail: &Mail) -> Result<(), MailError> {
        let span = tracing::debug_span!(parent: &self.span, "send", from = %mail.from().email);
        async {
            let result = self.send_inner(mail).await;
            if let Err(e) = &result {
                warn!(error = %e, "mail not sent");
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn send_inner(&self, mail: &Mail) -> Result<(), MailError> {
        self.validate(mail).await?;
        self.deliver(mail).await.map_err(map_transport_error)
    }

    async fn deliver(&self, mail: &Mail) -> Result<(), BoxError> {
        let recipients = envelope_recipients(mail);
        let data = self.encoder.encode(mail)?;
        debug!(recipients = recipients.len(), bytes = data.len(), "mail encoded");

        let envelope = Envelope::new(mail.from().email.as_str(), recipients, data)?;
        self.transport.send(envelope).await?;
        debug!("mail handed to transport");
        Ok(())
    }
}

/// Returns the envelope recipients of `mail`: the bare addresses of `to`,
/// then `cc`, then `bcc`.
#[must_use]
pub fn envelope_recipients(mail: &Mail) -> Vec<String> {
    mail.all_recipients().map(|a| a.email.clone()).collect()
}

fn default_span() -> Span {
    tracing::info_span!("feather.mail.smtp")
}

impl<T> Clone for SmtpMailClient<T> {
    fn clone(&self) -> Self {
        Self {
            validator: Arc::clone(&self.validator),
            encoder: Arc::clone(&self.encoder),
            transport: Arc::clone(&self.transport),
            span: self.span.clone(),
        }
    }
}

impl<T> fmt::Debug for SmtpMailClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpMailClient")
            .field("transport", &std::any::type_name::<T>())
            .field("span", &self.span)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T: Transport + 'static> MailClient for SmtpMailClient<T> {
    async fn validate(&self, mail: &Mail) -> Result<(), ValidationError> {
        Self::validate(self, mail).await
    }

    async fn send(&self, mail: &Mail) -> Result<(), MailError> {
        Self::send(self, mail).await
    }
}

/// Assembles an [`SmtpMailClient`] backed by [`SmtpTransport`].
pub struct SmtpMailClientBuilder {
    configuration: Configuration,
    encoder: Arc<dyn MailEncoder>,
    validator: Option<Arc<dyn MailValidator>>,
    runtime: Option<Handle>,
    span: Option<Span>,
}

impl SmtpMailClientBuilder {
    /// Sets the validator. Defaults to [`BasicMailValidator::default`].
    #[must_use]
    pub fn validator(mut self, validator: impl MailValidator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Sets the runtime deliveries run on. Defaults to the runtime
    /// [`build`](Self::build) is called from.
    #[must_use]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Sets the parent span for send spans. Defaults to `feather.mail.smtp`.
    #[must_use]
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Creates the client. No connection is opened.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoRuntime`] if no runtime was given and none is
    /// current, and [`ConfigError::Invalid`] if the configuration is unusable.
    pub fn build(self) -> Result<SmtpMailClient, ConfigError> {
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| ConfigError::NoRuntime)?,
        };
        let transport = SmtpTransport::new(self.configuration, runtime)?;
        debug!(
            host = %transport.configuration().host,
            port = transport.configuration().port(),
            security = transport.configuration().security.display_name(),
            "SMTP mail client ready"
        );

        Ok(SmtpMailClient {
            validator: self
                .validator
                .unwrap_or_else(|| Arc::new(BasicMailValidator::default())),
            encoder: self.encoder,
            transport: Arc::new(transport),
            span: self.span.unwrap_or_else(default_span),
        })
    }
}

impl fmt::Debug for SmtpMailClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpMailClientBuilder")
            .field("configuration", &self.configuration)
            .field("runtime", &self.runtime.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use feather_mail::{Address, Body};

    #[test]
    fn recipients_are_concatenated_in_order() {
        let mail = Mail::new("a@x.com", "s", Body::PlainText(String::new()))
            .bcc("z@x.com")
            .cc(Address::named("c@x.com", "Cee"))
            .to("b@x.com")
            .to("b@x.com");
        assert_eq!(
            envelope_recipients(&mail),
            ["b@x.com", "b@x.com", "c@x.com", "z@x.com"]
        );
    }

    fn builder() -> SmtpMailClientBuilder {
        SmtpMailClient::builder(Configuration::new("mx.example.com"), MimeMailEncoder::new())
    }

    #[test]
    fn build_without_runtime_fails() {
        let err = builder().build().unwrap_err();
        assert!(matches!(err, ConfigError::NoRuntime));
    }

    #[test]
    fn build_with_explicit_runtime() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let client = builder()
            .runtime(runtime.handle().clone())
            .build()
            .unwrap();
        assert_eq!(client.transport().configuration().host, "mx.example.com");
    }

    #[tokio::test]
    async fn build_picks_up_current_runtime() {
        assert!(builder().build().is_ok());
    }

    #[tokio::test]
    async fn build_rejects_invalid_configuration() {
        let err = SmtpMailClient::builder(
            Configuration::new("mx.example.com").with_max_connections(0),
            MimeMailEncoder::new(),
        )
        .build()
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[tokio::test]
    async fn oversized_connection_limit_is_an_error() {
        let smtp = Configuration::new("mx.example.com").with_max_connections(usize::MAX >> 1);
        let err = SmtpMailClient::from_config(DriverConfig::new(smtp)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
