//! # Subsystem Container
//!
//! Holds every subsystem service and the shared infrastructure they talk
//! through.
//!
//! ## Initialization Order
//!
//! ```text
//! Level 0: Event bus, repositories (memory or BaaS), payment processor, mailer
//! Level 1: Catalog, Orders, Newsletter, Reviews (repository + bus only)
//! Level 2: Inventory (thresholds read from Catalog)
//! Level 3: Payments (reads Catalog, Inventory, drives Orders)
//! ```
//!
//! Notification emails and the stock projection are not services: they are
//! event handlers started by `wiring`.

use crate::adapters::baas::{
    BaasCatalogRepository, BaasClient, BaasClientConfig, BaasError, BaasLedgerRepository,
    BaasOrderRepository, BaasReviewRepository, BaasSubscriberRepository,
};
use crate::adapters::{CatalogReaderBridge, CatalogThresholds, StockReaderBridge};
use crate::container::config::{BackendKind, ConfigError, EmailProvider, ProcessorKind, StoreConfig};
use au_01_catalog::{CatalogApi, CatalogRepository, CatalogService, InMemoryCatalogRepository};
use au_02_inventory::{
    InMemoryLedgerRepository, InventoryApi, InventoryConfig, InventoryService, LedgerRepository,
};
use au_04_orders::{InMemoryOrderRepository, OrderApi, OrderRepository, OrderService};
use au_05_payments::{
    CheckoutApi, CheckoutConfig, CheckoutService, FakePaymentProcessor, PaymentProcessor,
    ProcessorError, ReconciliationConfig, ReconciliationService, RefundApi, RefundService,
    StripeCheckoutClient, StripeConfig, WebhookApi,
};
use au_06_notifications::{
    HttpMailer, HttpMailerConfig, Mailer, NotificationConfig, NotificationError, OutboxMailer,
    StoreBranding,
};
use au_07_newsletter::{
    InMemorySubscriberRepository, NewsletterApi, NewsletterService, SubscriberRepository,
};
use au_08_reviews::{InMemoryReviewRepository, ReviewApi, ReviewRepository, ReviewService};
use au_09_api_gateway::{AppState, GatewayMetrics};
use shared_bus::InMemoryEventBus;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Webhook secret used with the fake processor when none is configured.
/// Only reachable in development setups; `validate` demands a real one for
/// Stripe.
pub const DEV_WEBHOOK_SECRET: &str = "whsec_aurelia_development";

/// Failures while building the container.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("BaaS client: {0}")]
    Baas(#[from] BaasError),

    #[error("payment processor: {0}")]
    Processor(#[from] ProcessorError),

    #[error("mailer: {0}")]
    Mailer(#[from] NotificationError),
}

/// One repository per stateful subsystem.
#[derive(Clone)]
pub struct Repositories {
    pub catalog: Arc<dyn CatalogRepository>,
    pub ledger: Arc<dyn LedgerRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub subscribers: Arc<dyn SubscriberRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
}

impl Repositories {
    /// Process-local maps. State is lost on restart.
    pub fn in_memory() -> Self {
        Self {
            catalog: Arc::new(InMemoryCatalogRepository::new()),
            ledger: Arc::new(InMemoryLedgerRepository::new()),
            orders: Arc::new(InMemoryOrderRepository::new()),
            subscribers: Arc::new(InMemorySubscriberRepository::new()),
            reviews: Arc::new(InMemoryReviewRepository::new()),
        }
    }

    /// Every table behind one hosted-database client.
    pub fn baas(client: Arc<BaasClient>) -> Self {
        Self {
            catalog: Arc::new(BaasCatalogRepository::new(client.clone())),
            ledger: Arc::new(BaasLedgerRepository::new(client.clone())),
            orders: Arc::new(BaasOrderRepository::new(client.clone())),
            subscribers: Arc::new(BaasSubscriberRepository::new(client.clone())),
            reviews: Arc::new(BaasReviewRepository::new(client)),
        }
    }

    fn from_config(config: &StoreConfig) -> Result<Self, ContainerError> {
        match config.backend {
            BackendKind::Memory => {
                warn!("[store] In-memory backend, all data is lost on restart");
                Ok(Self::in_memory())
            }
            BackendKind::Baas => {
                let service_key = config
                    .baas
                    .service_key
                    .clone()
                    .ok_or(ConfigError::MissingServiceKey)?;
                let client = BaasClient::new(BaasClientConfig {
                    url: config.baas.url.clone(),
                    service_key,
                    timeout: config.baas.timeout,
                })?;
                info!(url = %config.baas.url, "[store] BaaS backend configured");
                Ok(Self::baas(Arc::new(client)))
            }
        }
    }
}

/// Central container holding all subsystem instances.
pub struct SubsystemContainer {
    // =========================================================================
    // LEVEL 1
    // =========================================================================
    pub catalog: Arc<dyn CatalogApi>,
    pub orders: Arc<dyn OrderApi>,
    pub newsletter: Arc<dyn NewsletterApi>,
    pub reviews: Arc<dyn ReviewApi>,

    // =========================================================================
    // LEVEL 2
    // =========================================================================
    pub inventory: Arc<dyn InventoryApi>,

    // =========================================================================
    // LEVEL 3
    // =========================================================================
    pub checkout: Arc<dyn CheckoutApi>,
    pub webhooks: Arc<dyn WebhookApi>,
    pub refunds: Arc<dyn RefundApi>,

    // =========================================================================
    // SHARED INFRASTRUCTURE
    // =========================================================================
    /// All choreography events flow through this bus.
    pub event_bus: Arc<InMemoryEventBus>,
    pub processor: Arc<dyn PaymentProcessor>,
    pub mailer: Arc<dyn Mailer>,
    pub metrics: Arc<GatewayMetrics>,

    /// Immutable after initialization.
    pub config: StoreConfig,
}

impl SubsystemContainer {
    /// Build every subsystem from configuration.
    #[instrument(name = "subsystem_init", skip(config))]
    pub fn new(config: StoreConfig) -> Result<Self, ContainerError> {
        config.validate()?;
        info!(store = %config.store.name, "[store] Initializing subsystem container");

        let repositories = Repositories::from_config(&config)?;
        let processor = processor(&config)?;
        let mailer = mailer(&config)?;
        Ok(Self::with_parts(config, repositories, processor, mailer))
    }

    /// Build around caller-supplied adapters. Configuration is trusted.
    pub fn with_parts(
        config: StoreConfig,
        repositories: Repositories,
        processor: Arc<dyn PaymentProcessor>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        // =====================================================================
        // PHASE 1: Shared Infrastructure
        // =====================================================================
        let event_bus = Arc::new(InMemoryEventBus::with_capacity(config.bus.capacity));
        let metrics = Arc::new(GatewayMetrics::new());

        // =====================================================================
        // PHASE 2: Level 1
        // =====================================================================
        let catalog: Arc<dyn CatalogApi> = Arc::new(CatalogService::new(repositories.catalog));
        let orders: Arc<dyn OrderApi> =
            Arc::new(OrderService::new(repositories.orders, event_bus.clone()));
        let newsletter: Arc<dyn NewsletterApi> = Arc::new(NewsletterService::new(
            repositories.subscribers,
            event_bus.clone(),
        ));
        let reviews: Arc<dyn ReviewApi> =
            Arc::new(ReviewService::new(repositories.reviews, event_bus.clone()));
        info!("[store] Level 1 ready: catalog, orders, newsletter, reviews");

        // =====================================================================
        // PHASE 3: Level 2
        // =====================================================================
        let inventory: Arc<dyn InventoryApi> = Arc::new(InventoryService::new(
            InventoryConfig {
                default_low_stock_threshold: config.inventory.default_low_stock_threshold,
            },
            repositories.ledger,
            Arc::new(CatalogThresholds::new(catalog.clone())),
            event_bus.clone(),
        ));
        info!("[store] Level 2 ready: inventory");

        // =====================================================================
        // PHASE 4: Level 3
        // =====================================================================
        let shipping = match config.shipping.policy() {
            Ok(policy) => policy,
            Err(e) => {
                warn!(error = %e, "[store] Invalid shipping settings, using defaults");
                CheckoutConfig::default().shipping
            }
        };
        let checkout: Arc<dyn CheckoutApi> = Arc::new(CheckoutService::new(
            CheckoutConfig {
                success_url: config.site_url(&config.checkout.success_path),
                cancel_url: config.site_url(&config.checkout.cancel_path),
                shipping,
                max_quantity_per_line: config.checkout.max_quantity_per_line,
            },
            Arc::new(CatalogReaderBridge::new(catalog.clone())),
            Arc::new(StockReaderBridge::new(inventory.clone())),
            orders.clone(),
            processor.clone(),
        ));
        let webhooks: Arc<dyn WebhookApi> = Arc::new(ReconciliationService::new(
            ReconciliationConfig {
                webhook_secret: config
                    .payments
                    .webhook_secret
                    .clone()
                    .unwrap_or_else(|| DEV_WEBHOOK_SECRET.to_string()),
                tolerance_secs: i64::try_from(config.payments.webhook_tolerance.as_secs())
                    .unwrap_or(i64::MAX),
            },
            orders.clone(),
            event_bus.clone(),
        ));
        let refunds: Arc<dyn RefundApi> =
            Arc::new(RefundService::new(orders.clone(), processor.clone()));
        info!("[store] Level 3 ready: checkout, webhooks, refunds");

        Self {
            catalog,
            orders,
            newsletter,
            reviews,
            inventory,
            checkout,
            webhooks,
            refunds,
            event_bus,
            processor,
            mailer,
            metrics,
            config,
        }
    }

    /// Handles the HTTP gateway serves from.
    pub fn app_state(&self) -> AppState {
        AppState {
            catalog: self.catalog.clone(),
            inventory: self.inventory.clone(),
            orders: self.orders.clone(),
            checkout: self.checkout.clone(),
            webhooks: self.webhooks.clone(),
            refunds: self.refunds.clone(),
            newsletter: self.newsletter.clone(),
            reviews: self.reviews.clone(),
            metrics: self.metrics.clone(),
        }
    }

    /// Settings for the notification handler.
    pub fn notification_config(&self) -> NotificationConfig {
        NotificationConfig {
            admin_emails: self.config.email.admin_emails.clone(),
            branding: StoreBranding {
                store_name: self.config.store.name.clone(),
                site_url: self.config.store.site_url.trim_end_matches('/').to_string(),
                support_email: self.config.store.support_email.clone(),
            },
        }
    }
}

fn processor(config: &StoreConfig) -> Result<Arc<dyn PaymentProcessor>, ContainerError> {
    match config.payments.processor {
        ProcessorKind::Fake => {
            warn!("[store] Fake payment processor, no money will move");
            Ok(Arc::new(FakePaymentProcessor::new()))
        }
        ProcessorKind::Stripe => {
            let secret_key = config
                .payments
                .secret_key
                .clone()
                .ok_or(ConfigError::MissingProcessorKey)?;
            let client = StripeCheckoutClient::new(StripeConfig {
                api_base: config.payments.api_base.clone(),
                secret_key,
                timeout: config.payments.timeout,
            })?;
            Ok(Arc::new(client))
        }
    }
}

fn mailer(config: &StoreConfig) -> Result<Arc<dyn Mailer>, ContainerError> {
    match config.email.provider {
        EmailProvider::Outbox => {
            warn!("[store] Outbox mailer, emails are kept in memory and not delivered");
            Ok(Arc::new(OutboxMailer::new()))
        }
        EmailProvider::Http => {
            let api_key = config
                .email
                .api_key
                .clone()
                .ok_or(ConfigError::MissingEmailKey)?;
            let mailer = HttpMailer::new(HttpMailerConfig {
                api_base: config.email.api_base.clone(),
                api_key,
                from: config.email.from.clone(),
                timeout: config.email.timeout,
            })?;
            Ok(Arc::new(mailer))
        }
    }
}
