//! `SubscriberRepository` over `newsletter_subscribers` (unique `email`).

use super::client::{BaasClient, BaasError, Query};
use async_trait::async_trait;
use au_07_newsletter::{
    NewsletterError, NewsletterResult, Subscriber, SubscriberRepository, SubscriberStatus,
};
use shared_types::{Page, PageRequest};
use std::sync::Arc;

const SUBSCRIBERS: &str = "newsletter_subscribers";

impl From<BaasError> for NewsletterError {
    fn from(err: BaasError) -> Self {
        NewsletterError::Storage(err.to_string())
    }
}

pub struct BaasSubscriberRepository {
    client: Arc<BaasClient>,
}

impl BaasSubscriberRepository {
    pub fn new(client: Arc<BaasClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SubscriberRepository for BaasSubscriberRepository {
    async fn insert(&self, subscriber: &Subscriber) -> NewsletterResult<()> {
        match self
            .client
            .insert::<_, serde_json::Value>(SUBSCRIBERS, subscriber)
            .await
        {
            Ok(_) => Ok(()),
            Err(BaasError::Conflict(_)) => {
                Err(NewsletterError::DuplicateEmail(subscriber.email.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, subscriber: &Subscriber) -> NewsletterResult<()> {
        let updated: Vec<serde_json::Value> = self
            .client
            .update(SUBSCRIBERS, &Query::new().eq("id", subscriber.id), subscriber)
            .await?;
        if updated.is_empty() {
            return Err(NewsletterError::NotFound);
        }
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> NewsletterResult<Option<Subscriber>> {
        Ok(self
            .client
            .select_one(SUBSCRIBERS, Query::new().eq("email", email))
            .await?)
    }

    async fn find_by_token(&self, token: &str) -> NewsletterResult<Option<Subscriber>> {
        Ok(self
            .client
            .select_one(SUBSCRIBERS, Query::new().eq("token", token))
            .await?)
    }

    async fn list(
        &self,
        status: Option<SubscriberStatus>,
        page: PageRequest,
    ) -> NewsletterResult<Page<Subscriber>> {
        let mut query = Query::new();
        if let Some(status) = status {
            query = query.eq("status", status.as_str());
        }
        let query = query
            .order("created_at.desc")
            .limit(page.per_page as usize)
            .offset(page.offset())
            .exact_count();

        let (items, total) = self.client.select_counted(SUBSCRIBERS, &query).await?;
        Ok(Page {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    async fn count(&self, status: SubscriberStatus) -> NewsletterResult<u64> {
        Ok(self
            .client
            .count(SUBSCRIBERS, Query::new().eq("status", status.as_str()))
            .await?)
    }
}
