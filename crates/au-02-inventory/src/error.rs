//! Error types for the Inventory subsystem

use shared_types::{ProductId, ValidationError};
use thiserror::Error;

/// Inventory subsystem errors
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A manual decrement would take stock below zero
    #[error("Insufficient stock for {product_id}: {available} available, {requested} requested")]
    InsufficientStock {
        product_id: ProductId,
        available: i64,
        requested: i64,
    },

    /// Applying a movement would take the level outside `i64`
    #[error("Stock level for {product_id} would overflow")]
    LevelOverflow { product_id: ProductId },

    /// Backend failure
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for inventory operations
pub type InventoryResult<T> = Result<T, InventoryError>;
