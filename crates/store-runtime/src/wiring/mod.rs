//! # Subsystem Wiring
//!
//! Connects subsystems through bus subscriptions.
//!
//! ```text
//!   Orders(4) ──OrderPaid / OrderRefunded──┬──→ Inventory(2) ──StockChanged──→ Catalog(1)
//!                                          │          │
//!   Payments(5) ──PaymentAmountMismatch──┐ │          └──LowStock──┐
//!   Newsletter(7) ──NewsletterSubscribed─┴─┴──────────────────────┴──→ Notifications(6)
//!
//!   any ──CriticalError──→ operator log
//! ```

pub mod event_routing;

pub use event_routing::{start_handlers, RunningHandlers};
