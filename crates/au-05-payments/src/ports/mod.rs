//! Ports module for the Payments subsystem

pub mod inbound;
pub mod outbound;

pub use inbound::{CheckoutApi, RefundApi, WebhookApi};
pub use outbound::{CatalogReader, PaymentProcessor, StockReader};
