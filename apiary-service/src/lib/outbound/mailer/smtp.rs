use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Message;
use lettre::Tokio1Executor;

use crate::config::MailConfig;
use crate::domain::account::errors::MailerError;
use crate::domain::account::ports::Mailer;
use crate::domain::user::models::EmailAddress;

/// Plain-text mail over SMTP.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the transport from configuration. No connection is opened until
    /// the first message is sent.
    ///
    /// # Errors
    /// * `InvalidAddress` - `from` is not a valid mailbox
    /// * `TransportFailed` - Relay host cannot be used for STARTTLS
    pub fn from_config(config: &MailConfig) -> Result<Self, MailerError> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| MailerError::InvalidAddress(format!("{}: {}", config.from, e)))?;

        let mut builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                .map_err(|e| MailerError::TransportFailed(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
        };
        builder = builder.port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &EmailAddress, subject: &str, body: &str) -> Result<(), MailerError> {
        let recipient = to
            .as_str()
            .parse::<Mailbox>()
            .map_err(|e| MailerError::InvalidAddress(format!("{}: {}", to, e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailerError::BuildFailed(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailerError::TransportFailed(e.to_string()))?;

        tracing::info!(to = %to, subject, "Mail sent");
        Ok(())
    }
}
