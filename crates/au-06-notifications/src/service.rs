//! Notification handler
//!
//! Listens on the bus and turns store events into emails. Delivery failures
//! are logged and counted; the loop keeps going.

use crate::domain::{templates, EmailMessage, StoreBranding};
use crate::ports::{Mailer, ProductDirectory};
use serde::{Deserialize, Serialize};
use shared_bus::{StoreEvent, Subscription};
use shared_types::OrderStatus;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Notifications configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Recipients of back-office alerts. Empty disables them.
    pub admin_emails: Vec<String>,
    pub branding: StoreBranding,
}

/// Delivery counters, shared with whoever wants to report them.
#[derive(Debug, Default)]
pub struct NotificationStats {
    sent: AtomicU64,
    failed: AtomicU64,
}

impl NotificationStats {
    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

/// Handler for bus events that produce email.
pub struct NotificationHandler {
    config: NotificationConfig,
    mailer: Arc<dyn Mailer>,
    products: Option<Arc<dyn ProductDirectory>>,
    stats: Arc<NotificationStats>,
}

impl NotificationHandler {
    pub fn new(config: NotificationConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            config,
            mailer,
            products: None,
            stats: Arc::new(NotificationStats::default()),
        }
    }

    /// Use product names instead of ids in stock alerts.
    #[must_use]
    pub fn with_product_directory(mut self, products: Arc<dyn ProductDirectory>) -> Self {
        self.products = Some(products);
        self
    }

    pub fn stats(&self) -> Arc<NotificationStats> {
        Arc::clone(&self.stats)
    }

    fn admins(&self) -> Option<&[String]> {
        if self.config.admin_emails.is_empty() {
            None
        } else {
            Some(&self.config.admin_emails)
        }
    }

    /// Emails an event should produce. Empty for events nobody is told about.
    pub async fn messages_for(&self, event: &StoreEvent) -> Vec<EmailMessage> {
        let branding = &self.config.branding;
        let mut messages = Vec::new();
        match event {
            StoreEvent::OrderPaid(summary) => {
                messages.push(templates::order_confirmation(branding, summary));
                if let Some(admins) = self.admins() {
                    messages.push(templates::admin_new_order(branding, summary, admins));
                }
            }
            StoreEvent::OrderPaymentFailed {
                order_number,
                customer_email,
                reason,
                ..
            } => messages.push(templates::payment_failed(
                branding,
                order_number,
                customer_email,
                reason,
            )),
            StoreEvent::OrderStatusChanged {
                order_number,
                customer_email,
                to,
                tracking_number,
                ..
            } => match to {
                OrderStatus::Shipped => messages.push(templates::order_shipped(
                    branding,
                    order_number,
                    customer_email,
                    tracking_number.as_deref(),
                )),
                OrderStatus::Delivered => messages.push(templates::order_delivered(
                    branding,
                    order_number,
                    customer_email,
                )),
                _ => {}
            },
            StoreEvent::OrderRefunded(summary) => {
                messages.push(templates::refund_confirmation(branding, summary));
            }
            StoreEvent::LowStock {
                product_id,
                level,
                threshold,
            } => {
                if let Some(admins) = self.admins() {
                    let name = match &self.products {
                        Some(directory) => directory.product_name(*product_id).await,
                        None => None,
                    };
                    let label = name.unwrap_or_else(|| format!("Product {product_id}"));
                    messages.push(templates::low_stock_alert(
                        branding, admins, &label, *level, *threshold,
                    ));
                }
            }
            StoreEvent::PaymentAmountMismatch {
                order_number,
                expected,
                received,
                ..
            } => {
                if let Some(admins) = self.admins() {
                    messages.push(templates::amount_mismatch_alert(
                        branding,
                        admins,
                        order_number,
                        expected,
                        received,
                    ));
                }
            }
            StoreEvent::NewsletterSubscribed {
                email,
                unsubscribe_token,
            } => messages.push(templates::newsletter_welcome(
                branding,
                email,
                unsubscribe_token,
            )),
            _ => {}
        }
        messages
    }

    /// Send everything `event` calls for. Returns how many were delivered.
    pub async fn handle(&self, event: &StoreEvent) -> usize {
        let mut delivered = 0;
        for message in self.messages_for(event).await {
            let subject = message.subject.clone();
            match self.mailer.send(message).await {
                Ok(()) => {
                    delivered += 1;
                    self.stats.sent.fetch_add(1, Ordering::Relaxed);
                    debug!(event = event.kind(), subject = %subject, "[au-06] Email sent");
                }
                Err(e) => {
                    self.stats.failed.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        event = event.kind(),
                        subject = %subject,
                        error = %e,
                        "[au-06] Email delivery failed"
                    );
                }
            }
        }
        delivered
    }

    /// Run until the bus closes or `shutdown` flips to true.
    pub async fn run(self, mut subscription: Subscription, mut shutdown: watch::Receiver<bool>) {
        info!("[au-06] Notification handler started");
        loop {
            tokio::select! {
                event = subscription.recv() => match event {
                    Some(event) => {
                        self.handle(&event).await;
                    }
                    None => {
                        info!("[au-06] Event bus closed, exiting");
                        break;
                    }
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!(
                            sent = self.stats.sent(),
                            failed = self.stats.failed(),
                            "[au-06] Notification handler stopped"
                        );
                        break;
                    }
                }
            }
        }
    }
}
