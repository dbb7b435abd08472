//! Error types for the Payments subsystem

use au_03_cart::CartError;
use au_04_orders::OrderError;
use shared_types::{OrderStatus, ValidationError};
use thiserror::Error;

/// Webhook signature verification failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("Signature header has no timestamp")]
    MissingTimestamp,

    #[error("Signature header has no v1 signature")]
    MissingSignature,

    #[error("Signature timestamp {timestamp} is outside the {tolerance_secs}s tolerance")]
    TimestampOutsideTolerance { timestamp: i64, tolerance_secs: i64 },

    #[error("No signature matches the payload")]
    SignatureMismatch,
}

/// Failures talking to the payment processor.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// Network failure or 5xx.
    #[error("Payment processor unavailable: {0}")]
    Unavailable(String),

    /// The processor refused the request.
    #[error("Payment processor rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected processor response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ProcessorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProcessorError::InvalidResponse(err.to_string())
        } else {
            ProcessorError::Unavailable(err.to_string())
        }
    }
}

/// Payments subsystem errors
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("Invalid webhook signature: {0}")]
    Signature(#[from] SignatureError),

    /// Webhook body is not a processor event
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    /// Carries the processor failure message
    #[error("{0}")]
    PaymentProcessorUnavailable(String),

    #[error("Order {order_number} has no captured payment to refund")]
    MissingPaymentIntent { order_number: String },

    #[error("Order in status {status} cannot be refunded")]
    NotRefundable { status: OrderStatus },

    /// Catalog or stock lookup failed
    #[error("Lookup failed: {0}")]
    Lookup(String),
}

impl From<ProcessorError> for PaymentError {
    fn from(err: ProcessorError) -> Self {
        PaymentError::PaymentProcessorUnavailable(err.to_string())
    }
}

/// Result type for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
