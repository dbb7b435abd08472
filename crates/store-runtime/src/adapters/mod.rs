//! # Runtime Adapters
//!
//! - `bridges`: outbound ports of one subsystem backed by another's API
//! - `baas`: repository ports over the hosted database

pub mod baas;
pub mod bridges;

pub use bridges::{CatalogDirectory, CatalogReaderBridge, CatalogThresholds, StockReaderBridge};
