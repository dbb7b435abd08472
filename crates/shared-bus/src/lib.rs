//! # Shared Bus - Event Bus for Inter-Subsystem Communication
//!
//! Subsystems never call each other directly. A subsystem that changes state
//! publishes a [`StoreEvent`]; interested subsystems subscribe and react.
//!
//! ## Choreography
//!
//! ```text
//! ┌──────────────┐   OrderPaid    ┌──────────────┐   StockChanged  ┌──────────────┐
//! │ Orders (4)   │ ─────────────▶ │ Inventory(2) │ ──────────────▶ │ Catalog (1)  │
//! └──────────────┘       │        └──────────────┘                 └──────────────┘
//!                        │
//!                        ▼
//!                 ┌──────────────┐
//!                 │ Notify (6)   │  confirmation + admin alert
//!                 └──────────────┘
//! ```
//!
//! ## Webhook De-duplication
//!
//! [`ProcessedEventCache`] remembers processor event ids for the retry
//! horizon so an at-least-once webhook is applied at most once.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod processed_events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, StoreEvent};
pub use processed_events::{ProcessedEventCache, ProcessedEventError};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 1000);
    }
}
