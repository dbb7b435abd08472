//! Handler startup.
//!
//! Subscriptions are taken before any task is spawned, so an event published
//! right after `start_handlers` returns is never missed.

use crate::adapters::CatalogDirectory;
use crate::container::SubsystemContainer;
use crate::handlers::{CatalogProjectionHandler, InventoryHandler};
use au_06_notifications::{NotificationHandler, NotificationStats};
use shared_bus::{EventFilter, EventTopic, StoreEvent, Subscription};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Spawned handler tasks.
pub struct RunningHandlers {
    tasks: Vec<(&'static str, JoinHandle<()>)>,
    notification_stats: Arc<NotificationStats>,
}

impl RunningHandlers {
    pub fn notification_stats(&self) -> Arc<NotificationStats> {
        Arc::clone(&self.notification_stats)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every task to finish after shutdown was signalled. Tasks
    /// still running after `timeout` are aborted.
    pub async fn join(self, timeout: Duration) {
        let deadline = tokio::time::Instant::now() + timeout;
        for (name, mut task) in self.tasks {
            match tokio::time::timeout_at(deadline, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(handler = name, error = %e, "[store] Handler task failed"),
                Err(_) => {
                    warn!(handler = name, "[store] Handler did not stop in time, aborting");
                    task.abort();
                }
            }
        }
    }
}

/// Subscribe and spawn every choreography handler.
pub fn start_handlers(
    container: &SubsystemContainer,
    shutdown: watch::Receiver<bool>,
) -> RunningHandlers {
    let bus = &container.event_bus;
    let mut tasks = Vec::new();

    // Inventory: paid and refunded orders move stock
    let inventory_handler = InventoryHandler::new(
        bus.subscribe(EventFilter::topics(vec![EventTopic::Orders])),
        Arc::clone(&container.inventory),
        bus.clone(),
    );
    let mut inventory_shutdown = shutdown.clone();
    tasks.push((
        "inventory",
        tokio::spawn(async move {
            tokio::select! {
                _ = inventory_handler.run() => {}
                _ = inventory_shutdown.changed() => {
                    info!("[au-02] Shutdown signal received");
                }
            }
        }),
    ));

    // Catalog: stock projection
    let projection_handler = CatalogProjectionHandler::new(
        bus.subscribe(EventFilter::topics(vec![EventTopic::Inventory])),
        Arc::clone(&container.catalog),
    );
    let mut projection_shutdown = shutdown.clone();
    tasks.push((
        "catalog_projection",
        tokio::spawn(async move {
            tokio::select! {
                _ = projection_handler.run() => {}
                _ = projection_shutdown.changed() => {
                    info!("[au-01] Shutdown signal received");
                }
            }
        }),
    ));

    // Notifications: customer and back-office emails
    let notification_handler =
        NotificationHandler::new(container.notification_config(), Arc::clone(&container.mailer))
            .with_product_directory(Arc::new(CatalogDirectory::new(Arc::clone(
                &container.catalog,
            ))));
    let notification_stats = notification_handler.stats();
    let notification_subscription = bus.subscribe(EventFilter::topics(vec![
        EventTopic::Orders,
        EventTopic::Payments,
        EventTopic::Inventory,
        EventTopic::Newsletter,
    ]));
    tasks.push((
        "notifications",
        tokio::spawn(notification_handler.run(notification_subscription, shutdown.clone())),
    ));

    // Dead letters: surface critical errors in the operator log
    let dead_letters = bus.subscribe(EventFilter::topics(vec![EventTopic::DeadLetterQueue]));
    let mut dlq_shutdown = shutdown;
    tasks.push((
        "dead_letters",
        tokio::spawn(async move {
            tokio::select! {
                _ = log_dead_letters(dead_letters) => {}
                _ = dlq_shutdown.changed() => {
                    info!("[store] Shutdown signal received");
                }
            }
        }),
    ));

    info!(handlers = tasks.len(), "[store] Choreography handlers started");
    RunningHandlers {
        tasks,
        notification_stats,
    }
}

async fn log_dead_letters(mut subscription: Subscription) {
    while let Some(event) = subscription.recv().await {
        if let StoreEvent::CriticalError {
            subsystem_id,
            error,
        } = event
        {
            error!(subsystem = ?subsystem_id, error = %error, "[store] Critical error reported");
        }
    }
}
