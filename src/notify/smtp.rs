//! Email sender using an SMTP relay (Gmail by default).

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use super::{Notifier, OutboundEmail};

/// SMTP relay settings
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender address (usually same as username)
    pub from_email: String,
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Invalid email address '{address}': {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("Email has no recipients")]
    NoRecipients,

    #[error("Failed to build email message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// SMTP-backed notifier
#[derive(Clone)]
pub struct SmtpNotifier {
    from: Mailbox,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let from = parse_mailbox(&config.from_email)?;

        let creds = Credentials::new(config.username.clone(), config.password.clone());

        // STARTTLS on the submission port
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self { from, mailer })
    }

    pub fn build_message(&self, email: &OutboundEmail) -> Result<Message, NotifyError> {
        if email.to.is_empty() {
            return Err(NotifyError::NoRecipients);
        }

        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN);

        for recipient in &email.to {
            builder = builder.to(parse_mailbox(recipient)?);
        }

        Ok(builder.body(email.body.clone())?)
    }

    pub async fn try_send(&self, email: &OutboundEmail) -> Result<(), NotifyError> {
        let message = self.build_message(email)?;
        self.mailer.send(message).await?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, email: &OutboundEmail) -> bool {
        match self.try_send(email).await {
            Ok(()) => {
                tracing::info!(
                    to = %email.to.join(", "),
                    subject = %email.subject,
                    "Email sent successfully"
                );
                true
            }
            Err(e) => {
                tracing::error!(subject = %email.subject, "SMTP send failed: {}", e);
                false
            }
        }
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.trim().parse().map_err(|source| NotifyError::Address {
        address: address.to_string(),
        source,
    })
}
