//! Error types for the Orders subsystem

use shared_types::{OrderStatus, ValidationError};
use thiserror::Error;

/// Orders subsystem errors
#[derive(Debug, Error)]
pub enum OrderError {
    /// No order matches the id, number or lookup credentials
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The requested status change is not in the transition table
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Generated order number collided with an existing one
    #[error("Order number already exists: {0}")]
    DuplicateOrderNumber(String),

    /// Backend failure
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for order operations
pub type OrderResult<T> = Result<T, OrderError>;
