//! Outbound ports for the Notifications subsystem

use crate::domain::EmailMessage;
use crate::error::NotificationResult;
use async_trait::async_trait;
use shared_types::ProductId;

/// Email delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> NotificationResult<()>;
}

/// Resolves product ids to display names for alert emails.
#[async_trait]
pub trait ProductDirectory: Send + Sync {
    async fn product_name(&self, id: ProductId) -> Option<String>;
}
