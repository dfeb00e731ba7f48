use async_trait::async_trait;

use crate::shared::infrastructure::mailer::{Email, MailError, Mailer};

/// Writes outgoing emails to the log instead of a mail relay.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMailer;

#[async_trait]
impl Mailer for TracingMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        if email.to.trim().is_empty() {
            return Err(MailError::MissingRecipient);
        }
        tracing::info!(to = %email.to, subject = %email.subject, "email dispatched");
        Ok(())
    }
}
