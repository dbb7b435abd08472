//! In-memory mailer for development and tests

use crate::domain::EmailMessage;
use crate::error::{NotificationError, NotificationResult};
use crate::ports::Mailer;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Keeps every sent message in memory.
#[derive(Default)]
pub struct OutboxMailer {
    sent: Mutex<Vec<EmailMessage>>,
    failing: AtomicBool,
}

impl OutboxMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send fail as if the provider were down.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().clone()
    }

    /// Messages addressed to `recipient`.
    pub fn sent_to(&self, recipient: &str) -> Vec<EmailMessage> {
        self.sent
            .lock()
            .iter()
            .filter(|m| m.to.iter().any(|t| t == recipient))
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }
}

#[async_trait]
impl Mailer for OutboxMailer {
    async fn send(&self, message: EmailMessage) -> NotificationResult<()> {
        message.validate()?;
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotificationError::ProviderUnavailable(
                "outbox offline".into(),
            ));
        }
        debug!(to = ?message.to, subject = %message.subject, "[au-06] Email queued in outbox");
        self.sent.lock().push(message);
        Ok(())
    }
}
