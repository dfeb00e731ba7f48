use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::shared::infrastructure::mailer::{Email, MailError, Mailer};

/// Keeps every sent email so tests can assert on the outbox.
#[derive(Default)]
pub struct InMemoryMailer {
    sent: Mutex<Vec<Email>>,
    is_offline: bool,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    pub async fn sent(&self) -> Vec<Email> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        if self.is_offline {
            return Err(MailError::Transport("Mailer offline".into()));
        }
        if email.to.trim().is_empty() {
            return Err(MailError::MissingRecipient);
        }
        self.sent.lock().await.push(email);
        Ok(())
    }
}
