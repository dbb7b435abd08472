//! # au-02-inventory
//!
//! Append-only stock-movement ledger for the Aurelia storefront.
//!
//! ## Invariants
//!
//! - The stored level of a product always equals the signed sum of its
//!   movements; `recompute` replays the ledger and repairs drift.
//! - Manual decrements never take a level below zero.
//! - Order-driven sales are recorded even when they oversell; the level goes
//!   negative, a warning is logged and `LowStock` is announced.
//! - At most one sale and one return movement exist per (order, product).
//!
//! ## Events
//!
//! | Event          | When                                   |
//! |----------------|----------------------------------------|
//! | `StockChanged` | after every appended movement          |
//! | `LowStock`     | level at or below the product threshold |

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::{FixedThreshold, InMemoryLedgerRepository};
pub use domain::{
    replay, signed_delta, LedgerOutcome, MovementKind, MovementReason, NewMovement,
    RecomputeReport, StockLevel, StockMovement, MAX_MOVEMENT_QUANTITY, MAX_NOTE_LEN,
};
pub use error::{InventoryError, InventoryResult};
pub use ports::{InventoryApi, LedgerRepository, StockThresholds};
pub use service::{InventoryConfig, InventoryService, SYSTEM_ACTOR};
