//! Cart error types

use shared_types::{MoneyError, ProductId};
use thiserror::Error;

/// Result type for cart operations
pub type CartResult<T> = Result<T, CartError>;

/// Reasons a cart cannot be modified or priced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Unknown product: {0}")]
    UnknownProduct(ProductId),

    #[error("Product is not available: {0}")]
    ProductUnavailable(ProductId),

    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: i64,
    },

    #[error("Quantity {quantity} for {product_id} must be between 1 and {max}")]
    QuantityOutOfRange {
        product_id: ProductId,
        quantity: u32,
        max: u32,
    },

    #[error("Cart mixes currencies: {0}")]
    CurrencyMismatch(String),

    #[error("Amount overflow")]
    Overflow,
}

impl From<MoneyError> for CartError {
    fn from(err: MoneyError) -> Self {
        match err {
            MoneyError::Overflow => CartError::Overflow,
            other => CartError::CurrencyMismatch(other.to_string()),
        }
    }
}
