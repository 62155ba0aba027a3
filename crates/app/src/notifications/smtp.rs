//! SMTP notifier built on `lettre`.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    time::Duration,
};

use async_trait::async_trait;
use lettre::{
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::debug;
use zeroize::Zeroizing;

use crate::notifications::{CodeDelivery, Notifier, NotifierError};

#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Zeroizing<String>,
    pub from_address: String,
    pub from_name: String,

    /// Shown to customers as the help contact.
    pub support_address: String,

    /// Upper bound on a single SMTP conversation.
    pub timeout: Duration,
}

impl Debug for SmtpSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("from_address", &self.from_address)
            .field("from_name", &self.from_name)
            .field("support_address", &self.support_address)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Sends deliveries over an authenticated STARTTLS connection.
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    support_address: String,
}

impl SmtpNotifier {
    /// Build the transport. No connection is opened until the first delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay host or sender address is invalid.
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotifierError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
            .port(settings.port)
            .timeout(Some(settings.timeout));

        if let Some(username) = &settings.username {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                settings.password.as_str().to_owned(),
            ));
        }

        let from = Mailbox::new(
            Some(settings.from_name.clone()),
            settings.from_address.parse::<Address>()?,
        );

        Ok(Self {
            transport: builder.build(),
            from,
            support_address: settings.support_address.clone(),
        })
    }

    fn build_message(&self, delivery: &CodeDelivery) -> Result<Message, NotifierError> {
        let to = Mailbox::new(None, delivery.recipient.parse::<Address>()?);

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(delivery.subject())
            .header(ContentType::TEXT_HTML)
            .body(delivery.html_body(&self.support_address))?;

        Ok(message)
    }
}

impl Debug for SmtpNotifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SmtpNotifier")
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn deliver(&self, delivery: CodeDelivery) -> Result<(), NotifierError> {
        let message = self.build_message(&delivery)?;

        let response = self.transport.send(message).await?;

        debug!(
            recipient = %delivery.recipient,
            codes = delivery.codes.len(),
            code = %response.code(),
            "smtp accepted delivery"
        );

        Ok(())
    }
}
