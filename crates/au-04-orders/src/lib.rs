//! # au-04-orders
//!
//! The order aggregate and its status machine.
//!
//! | From         | To                                    |
//! |--------------|---------------------------------------|
//! | `Pending`    | `Paid`, `Failed`, `Cancelled`          |
//! | `Failed`     | `Paid`, `Cancelled`                    |
//! | `Paid`       | `Processing`, `Shipped`, `Cancelled`, `Refunded` |
//! | `Processing` | `Shipped`, `Cancelled`, `Refunded`     |
//! | `Shipped`    | `Delivered`, `Refunded`                |
//! | `Delivered`  | `Refunded`                            |
//!
//! `Cancelled` and `Refunded` are terminal.
//!
//! Admin changes go through [`OrderApi::transition`] and are checked against
//! the table. Payment webhooks use the `mark_*` and `record_refund` helpers,
//! which answer [`StatusUpdate::Unchanged`] instead of failing when the
//! order is already where the event would put it.
//!
//! Every status change publishes `OrderStatusChanged`; creation publishes
//! `OrderCreated`.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::InMemoryOrderRepository;
pub use domain::{
    allowed_targets, can_transition, generate_order_number, is_valid_order_number, NewOrder,
    Order, OrderQuery, PaymentDetails, StatusUpdate, TransitionContext,
};
pub use error::{OrderError, OrderResult};
pub use ports::{OrderApi, OrderRepository};
pub use service::OrderService;
