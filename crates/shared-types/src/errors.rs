//! # Error Types
//!
//! Errors shared by every subsystem: input validation and money arithmetic.

use thiserror::Error;

/// Input validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was empty.
    #[error("{0} is required")]
    Required(&'static str),

    /// An email address failed validation.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// A field exceeded its maximum length.
    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// A numeric field was outside its allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    /// Catch-all with a message.
    #[error("{0}")]
    Invalid(String),
}

/// Money arithmetic failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Two amounts with different currencies were combined.
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    /// The amount overflowed an i64.
    #[error("amount overflow")]
    Overflow,

    /// The currency code is not a 3-letter ISO code.
    #[error("invalid currency code: {0}")]
    InvalidCurrency(String),
}
