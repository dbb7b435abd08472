//! # Event Handlers
//!
//! Choreography handlers owned by the runtime. Each one holds its own
//! subscription and reacts to events without calling the producer back.
//!
//! Notification emails are handled by `au_06_notifications::NotificationHandler`.

pub mod catalog_projection;
pub mod inventory;

pub use catalog_projection::CatalogProjectionHandler;
pub use inventory::{InventoryHandler, LedgerAction};
