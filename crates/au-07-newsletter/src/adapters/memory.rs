//! In-memory subscriber repository

use crate::domain::{Subscriber, SubscriberStatus};
use crate::error::{NewsletterError, NewsletterResult};
use crate::ports::outbound::SubscriberRepository;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Page, PageRequest, SubscriberId};
use std::collections::HashMap;

/// `SubscriberRepository` over a hash map.
#[derive(Default)]
pub struct InMemorySubscriberRepository {
    subscribers: RwLock<HashMap<SubscriberId, Subscriber>>,
}

impl InMemorySubscriberRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, predicate: impl Fn(&Subscriber) -> bool) -> Option<Subscriber> {
        self.subscribers
            .read()
            .values()
            .find(|s| predicate(s))
            .cloned()
    }
}

#[async_trait]
impl SubscriberRepository for InMemorySubscriberRepository {
    async fn insert(&self, subscriber: &Subscriber) -> NewsletterResult<()> {
        let mut subscribers = self.subscribers.write();
        if subscribers.values().any(|s| s.email == subscriber.email) {
            return Err(NewsletterError::DuplicateEmail(subscriber.email.clone()));
        }
        subscribers.insert(subscriber.id, subscriber.clone());
        Ok(())
    }

    async fn update(&self, subscriber: &Subscriber) -> NewsletterResult<()> {
        match self.subscribers.write().get_mut(&subscriber.id) {
            Some(stored) => {
                *stored = subscriber.clone();
                Ok(())
            }
            None => Err(NewsletterError::NotFound),
        }
    }

    async fn find_by_email(&self, email: &str) -> NewsletterResult<Option<Subscriber>> {
        Ok(self.find(|s| s.email == email))
    }

    async fn find_by_token(&self, token: &str) -> NewsletterResult<Option<Subscriber>> {
        Ok(self.find(|s| s.token == token))
    }

    async fn list(
        &self,
        status: Option<SubscriberStatus>,
        page: PageRequest,
    ) -> NewsletterResult<Page<Subscriber>> {
        let mut matching: Vec<Subscriber> = self
            .subscribers
            .read()
            .values()
            .filter(|s| status.map_or(true, |st| s.status == st))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page.paginate(matching))
    }

    async fn count(&self, status: SubscriberStatus) -> NewsletterResult<u64> {
        Ok(self
            .subscribers
            .read()
            .values()
            .filter(|s| s.status == status)
            .count() as u64)
    }
}
