use async_trait::async_trait;

use crate::domain::account::errors::MailerError;
use crate::domain::account::ports::Mailer;
use crate::domain::user::models::EmailAddress;

/// Mailer for deployments without SMTP. Messages only reach the log; the
/// body (and any reset link in it) is emitted at debug level.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &EmailAddress, subject: &str, body: &str) -> Result<(), MailerError> {
        tracing::info!(to = %to, subject, "Mail delivery disabled, message not sent");
        tracing::debug!(to = %to, body, "Undelivered message body");
        Ok(())
    }
}
