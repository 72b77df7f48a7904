pub mod log;
pub mod smtp;

use async_trait::async_trait;

use crate::config::MailConfig;
use crate::domain::account::errors::MailerError;
use crate::domain::account::ports::Mailer;
use crate::domain::user::models::EmailAddress;

pub use self::log::LogMailer;
pub use self::smtp::SmtpMailer;

/// Mailer selected by configuration at startup.
pub enum OutboundMailer {
    Smtp(SmtpMailer),
    Log(LogMailer),
}

impl OutboundMailer {
    /// # Errors
    /// * `InvalidAddress` / `TransportFailed` - SMTP settings are unusable
    pub fn from_config(config: &MailConfig) -> Result<Self, MailerError> {
        if config.enabled {
            Ok(OutboundMailer::Smtp(SmtpMailer::from_config(config)?))
        } else {
            Ok(OutboundMailer::Log(LogMailer::new()))
        }
    }
}

#[async_trait]
impl Mailer for OutboundMailer {
    async fn send(&self, to: &EmailAddress, subject: &str, body: &str) -> Result<(), MailerError> {
        match self {
            OutboundMailer::Smtp(mailer) => mailer.send(to, subject, body).await,
            OutboundMailer::Log(mailer) => mailer.send(to, subject, body).await,
        }
    }
}
