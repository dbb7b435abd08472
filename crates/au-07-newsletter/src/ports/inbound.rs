//! Driving Ports (API - Inbound)

use crate::domain::{SubscribeOutcome, Subscriber, SubscriberStatus};
use crate::error::NewsletterResult;
use async_trait::async_trait;
use shared_types::{Page, PageRequest};

/// Primary Newsletter API
#[async_trait]
pub trait NewsletterApi: Send + Sync {
    /// Single opt-in subscribe. `source` tags where the form was.
    async fn subscribe(&self, email: &str, source: Option<&str>)
        -> NewsletterResult<SubscribeOutcome>;

    /// Idempotent for an already unsubscribed token.
    async fn unsubscribe(&self, token: &str) -> NewsletterResult<Subscriber>;

    async fn list(
        &self,
        status: Option<SubscriberStatus>,
        page: PageRequest,
    ) -> NewsletterResult<Page<Subscriber>>;

    async fn count_active(&self) -> NewsletterResult<u64>;
}
