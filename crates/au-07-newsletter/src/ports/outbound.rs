//! Driven Ports (SPI - Outbound Dependencies)

use crate::domain::{Subscriber, SubscriberStatus};
use crate::error::NewsletterResult;
use async_trait::async_trait;
use shared_types::{Page, PageRequest};

/// Subscriber persistence.
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Fails with `DuplicateEmail` when the email is taken.
    async fn insert(&self, subscriber: &Subscriber) -> NewsletterResult<()>;

    /// Fails with `NotFound` for unknown ids.
    async fn update(&self, subscriber: &Subscriber) -> NewsletterResult<()>;

    async fn find_by_email(&self, email: &str) -> NewsletterResult<Option<Subscriber>>;

    async fn find_by_token(&self, token: &str) -> NewsletterResult<Option<Subscriber>>;

    /// Newest first.
    async fn list(
        &self,
        status: Option<SubscriberStatus>,
        page: PageRequest,
    ) -> NewsletterResult<Page<Subscriber>>;

    async fn count(&self, status: SubscriberStatus) -> NewsletterResult<u64>;
}
