//! Newsletter Service

use crate::domain::{
    generate_token, normalize_source, SubscribeOutcome, Subscriber, SubscriberStatus,
};
use crate::error::{NewsletterError, NewsletterResult};
use crate::ports::inbound::NewsletterApi;
use crate::ports::outbound::SubscriberRepository;
use async_trait::async_trait;
use chrono::Utc;
use shared_bus::{EventPublisher, StoreEvent};
use shared_types::{normalize_email, Page, PageRequest};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Newsletter Service implementation
pub struct NewsletterService<R: SubscriberRepository + ?Sized> {
    repo: Arc<R>,
    publisher: Arc<dyn EventPublisher>,
    /// Serializes subscribe/unsubscribe so one email never gets two rows.
    write_lock: Mutex<()>,
}

impl<R: SubscriberRepository + ?Sized> NewsletterService<R> {
    pub fn new(repo: Arc<R>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            repo,
            publisher,
            write_lock: Mutex::new(()),
        }
    }

    fn fresh_token() -> String {
        generate_token(&mut rand::thread_rng())
    }

    async fn announce(&self, subscriber: &Subscriber) {
        self.publisher
            .publish(StoreEvent::NewsletterSubscribed {
                email: subscriber.email.clone(),
                unsubscribe_token: subscriber.token.clone(),
            })
            .await;
    }
}

#[async_trait]
impl<R: SubscriberRepository + ?Sized> NewsletterApi for NewsletterService<R> {
    async fn subscribe(
        &self,
        email: &str,
        source: Option<&str>,
    ) -> NewsletterResult<SubscribeOutcome> {
        let email = normalize_email(email)?;
        let source = normalize_source(source)?;
        let now = Utc::now();

        let outcome = {
            let _guard = self.write_lock.lock().await;
            match self.repo.find_by_email(&email).await? {
                Some(existing) if existing.is_active() => {
                    SubscribeOutcome::AlreadySubscribed(existing)
                }
                Some(mut existing) => {
                    existing.reactivate(Self::fresh_token(), source, now);
                    self.repo.update(&existing).await?;
                    SubscribeOutcome::Resubscribed(existing)
                }
                None => {
                    let subscriber = Subscriber::active(email, source, Self::fresh_token(), now);
                    self.repo.insert(&subscriber).await?;
                    SubscribeOutcome::Subscribed(subscriber)
                }
            }
        };

        match &outcome {
            SubscribeOutcome::AlreadySubscribed(s) => {
                debug!(subscriber_id = %s.id, "[au-07] Already subscribed");
            }
            SubscribeOutcome::Subscribed(s) | SubscribeOutcome::Resubscribed(s) => {
                info!(
                    subscriber_id = %s.id,
                    source = %s.source,
                    outcome = outcome.as_str(),
                    "[au-07] Newsletter subscription"
                );
                self.announce(s).await;
            }
        }
        Ok(outcome)
    }

    async fn unsubscribe(&self, token: &str) -> NewsletterResult<Subscriber> {
        let token = token.trim();
        if token.is_empty() {
            return Err(NewsletterError::NotFound);
        }

        let _guard = self.write_lock.lock().await;
        let mut subscriber = self
            .repo
            .find_by_token(token)
            .await?
            .ok_or(NewsletterError::NotFound)?;
        if subscriber.status == SubscriberStatus::Unsubscribed {
            return Ok(subscriber);
        }

        subscriber.unsubscribe(Utc::now());
        self.repo.update(&subscriber).await?;
        info!(subscriber_id = %subscriber.id, "[au-07] Unsubscribed");
        Ok(subscriber)
    }

    async fn list(
        &self,
        status: Option<SubscriberStatus>,
        page: PageRequest,
    ) -> NewsletterResult<Page<Subscriber>> {
        self.repo.list(status, page).await
    }

    async fn count_active(&self) -> NewsletterResult<u64> {
        self.repo.count(SubscriberStatus::Active).await
    }
}
