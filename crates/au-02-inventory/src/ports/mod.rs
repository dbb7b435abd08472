//! Ports module for the Inventory subsystem

pub mod inbound;
pub mod outbound;

pub use inbound::InventoryApi;
pub use outbound::{LedgerRepository, StockThresholds};
