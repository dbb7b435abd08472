//! Adapters for the Inventory subsystem

pub mod memory;

pub use memory::{FixedThreshold, InMemoryLedgerRepository};
