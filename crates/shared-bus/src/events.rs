//! # Store Events
//!
//! Every event that flows through the shared bus. Producers publish after
//! their own state change is durable; consumers react without calling the
//! producer back.

use serde::{Deserialize, Serialize};
use shared_types::{Money, OrderId, OrderStatus, OrderSummary, ProductId, ReviewId, SubsystemId};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StoreEvent {
    // =========================================================================
    // SUBSYSTEM 4: ORDERS
    // =========================================================================
    /// A pending order was created at checkout.
    OrderCreated {
        order_id: OrderId,
        order_number: String,
        total: Money,
    },

    /// An order moved from pending (or failed) to paid.
    /// Triggers stock decrement (2) and confirmation emails (6).
    OrderPaid(OrderSummary),

    /// A payment attempt failed.
    OrderPaymentFailed {
        order_id: OrderId,
        order_number: String,
        customer_email: String,
        reason: String,
    },

    /// An order was cancelled before fulfilment.
    OrderCancelled { order_id: OrderId, reason: String },

    /// The full order amount has been refunded.
    /// Triggers restock (2) and a refund email (6).
    OrderRefunded(OrderSummary),

    /// Any admin or reconciliation status change.
    OrderStatusChanged {
        order_id: OrderId,
        order_number: String,
        customer_email: String,
        from: OrderStatus,
        to: OrderStatus,
        tracking_number: Option<String>,
    },

    // =========================================================================
    // SUBSYSTEM 5: PAYMENTS
    // =========================================================================
    /// The processor captured a different amount than the order total.
    PaymentAmountMismatch {
        order_id: OrderId,
        order_number: String,
        expected: Money,
        received: Money,
    },

    // =========================================================================
    // SUBSYSTEM 2: INVENTORY
    // =========================================================================
    /// A movement changed the stock level of a product.
    StockChanged { product_id: ProductId, level: i64 },

    /// Stock is at or below the product's alert threshold.
    LowStock {
        product_id: ProductId,
        level: i64,
        threshold: i64,
    },

    // =========================================================================
    // SUBSYSTEM 7: NEWSLETTER
    // =========================================================================
    /// A subscriber was created or reactivated.
    NewsletterSubscribed {
        email: String,
        unsubscribe_token: String,
    },

    // =========================================================================
    // SUBSYSTEM 8: REVIEWS
    // =========================================================================
    /// A review is waiting for moderation.
    ReviewSubmitted {
        review_id: ReviewId,
        product_id: ProductId,
        rating: u8,
    },

    // =========================================================================
    // CRITICAL EVENTS (DLQ)
    // =========================================================================
    /// Critical error requiring operator attention.
    CriticalError {
        subsystem_id: SubsystemId,
        error: String,
    },
}

impl StoreEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::OrderCreated { .. }
            | Self::OrderPaid(_)
            | Self::OrderPaymentFailed { .. }
            | Self::OrderCancelled { .. }
            | Self::OrderRefunded(_)
            | Self::OrderStatusChanged { .. } => EventTopic::Orders,
            Self::PaymentAmountMismatch { .. } => EventTopic::Payments,
            Self::StockChanged { .. } | Self::LowStock { .. } => EventTopic::Inventory,
            Self::NewsletterSubscribed { .. } => EventTopic::Newsletter,
            Self::ReviewSubmitted { .. } => EventTopic::Reviews,
            Self::CriticalError { .. } => EventTopic::DeadLetterQueue,
        }
    }

    /// Get the originating subsystem.
    #[must_use]
    pub fn source_subsystem(&self) -> SubsystemId {
        match self {
            Self::OrderCreated { .. }
            | Self::OrderPaid(_)
            | Self::OrderPaymentFailed { .. }
            | Self::OrderCancelled { .. }
            | Self::OrderRefunded(_)
            | Self::OrderStatusChanged { .. } => SubsystemId::Orders,
            Self::PaymentAmountMismatch { .. } => SubsystemId::Payments,
            Self::StockChanged { .. } | Self::LowStock { .. } => SubsystemId::Inventory,
            Self::NewsletterSubscribed { .. } => SubsystemId::Newsletter,
            Self::ReviewSubmitted { .. } => SubsystemId::Reviews,
            Self::CriticalError { subsystem_id, .. } => *subsystem_id,
        }
    }

    /// Short variant name for log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OrderCreated { .. } => "order_created",
            Self::OrderPaid(_) => "order_paid",
            Self::OrderPaymentFailed { .. } => "order_payment_failed",
            Self::OrderCancelled { .. } => "order_cancelled",
            Self::OrderRefunded(_) => "order_refunded",
            Self::OrderStatusChanged { .. } => "order_status_changed",
            Self::PaymentAmountMismatch { .. } => "payment_amount_mismatch",
            Self::StockChanged { .. } => "stock_changed",
            Self::LowStock { .. } => "low_stock",
            Self::NewsletterSubscribed { .. } => "newsletter_subscribed",
            Self::ReviewSubmitted { .. } => "review_submitted",
            Self::CriticalError { .. } => "critical_error",
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Subsystem 4 events.
    Orders,
    /// Subsystem 5 events.
    Payments,
    /// Subsystem 2 events.
    Inventory,
    /// Subsystem 7 events.
    Newsletter,
    /// Subsystem 8 events.
    Reviews,
    /// Dead Letter Queue for critical errors.
    DeadLetterQueue,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source subsystems to include. Empty means all sources.
    pub source_subsystems: Vec<SubsystemId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            source_subsystems: Vec::new(),
        }
    }

    /// Create a filter for events from specific subsystems.
    #[must_use]
    pub fn from_subsystems(subsystems: Vec<SubsystemId>) -> Self {
        Self {
            topics: Vec::new(),
            source_subsystems: subsystems,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &StoreEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let source_match = self.source_subsystems.is_empty()
            || self.source_subsystems.contains(&event.source_subsystem());

        topic_match && source_match
    }
}
