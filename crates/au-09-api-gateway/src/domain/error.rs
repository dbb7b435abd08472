//! Gateway errors and the JSON error envelope.
//!
//! Every failure leaves the gateway as
//! `{ "error": { "code": "...", "message": "..." } }` with a status taken
//! from the table below.
//!
//! | Status | Code                    | Condition                                   |
//! |--------|-------------------------|---------------------------------------------|
//! | 400    | `validation_error`      | bad input, bad webhook signature or payload |
//! | 401    | `unauthorized`          | missing or wrong admin key                  |
//! | 404    | `not_found`             | unknown product, order, review, ...         |
//! | 409    | `conflict`              | duplicates, invalid transitions, stock      |
//! | 413    | `payload_too_large`     | body over the configured limit              |
//! | 429    | `rate_limited`          | token bucket empty                          |
//! | 502    | `upstream_unavailable`  | payment processor down                      |
//! | 504    | `timeout`               | handler exceeded its deadline               |
//! | 500    | `internal_error`        | anything else                               |

use crate::domain::config::ConfigError;
use au_01_catalog::CatalogError;
use au_02_inventory::InventoryError;
use au_03_cart::CartError;
use au_04_orders::OrderError;
use au_05_payments::PaymentError;
use au_07_newsletter::NewsletterError;
use au_08_reviews::ReviewError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use shared_types::ValidationError;
use std::fmt;
use tracing::error;

/// Machine-readable error codes
pub mod codes {
    pub const VALIDATION: &str = "validation_error";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const NOT_FOUND: &str = "not_found";
    pub const CONFLICT: &str = "conflict";
    pub const PAYLOAD_TOO_LARGE: &str = "payload_too_large";
    pub const RATE_LIMITED: &str = "rate_limited";
    pub const UPSTREAM_UNAVAILABLE: &str = "upstream_unavailable";
    pub const TIMEOUT: &str = "timeout";
    pub const INTERNAL: &str = "internal_error";
}

/// An HTTP error answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    /// Seconds, sent as `Retry-After` on 429.
    pub retry_after: Option<u64>,
}

#[derive(Serialize)]
struct Envelope<'a> {
    error: Body<'a>,
}

#[derive(Serialize)]
struct Body<'a> {
    code: &'a str,
    message: &'a str,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::VALIDATION, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, codes::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, codes::CONFLICT, message)
    }

    pub fn payload_too_large(limit: usize) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            codes::PAYLOAD_TOO_LARGE,
            format!("Request body exceeds {limit} bytes"),
        )
    }

    pub fn rate_limited(retry_after_ms: u64) -> Self {
        let secs = retry_after_ms.div_ceil(1000).max(1);
        Self {
            retry_after: Some(secs),
            ..Self::new(
                StatusCode::TOO_MANY_REQUESTS,
                codes::RATE_LIMITED,
                format!("Too many requests, retry in {secs}s"),
            )
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_GATEWAY,
            codes::UPSTREAM_UNAVAILABLE,
            message,
        )
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, codes::TIMEOUT, message)
    }

    /// Logs `detail` and answers with a generic message.
    pub fn internal(detail: impl fmt::Display) -> Self {
        error!(error = %detail, "[au-09] Internal error");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::INTERNAL,
            "Internal server error",
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.status.as_u16(), self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let envelope = Envelope {
            error: Body {
                code: self.code,
                message: &self.message,
            },
        };
        let mut response = (self.status, Json(envelope)).into_response();
        if let Some(secs) = self.retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        if self.status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

// =============================================================================
// Domain error mapping
// =============================================================================

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::validation(e.to_string())
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::ProductNotFound(_)
            | CatalogError::ProductSlugNotFound(_)
            | CatalogError::CategoryNotFound(_)
            | CatalogError::CollectionNotFound(_) => Self::not_found(e.to_string()),
            CatalogError::Validation(_) => Self::validation(e.to_string()),
            CatalogError::DuplicateSku(_)
            | CatalogError::DuplicateSlug(_)
            | CatalogError::CategoryInUse { .. } => Self::conflict(e.to_string()),
            CatalogError::Storage(_) => Self::internal(e),
        }
    }
}

impl From<InventoryError> for ApiError {
    fn from(e: InventoryError) -> Self {
        match e {
            InventoryError::Validation(_) => Self::validation(e.to_string()),
            InventoryError::InsufficientStock { .. } | InventoryError::LevelOverflow { .. } => {
                Self::conflict(e.to_string())
            }
            InventoryError::Storage(_) => Self::internal(e),
        }
    }
}

impl From<CartError> for ApiError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::UnknownProduct(_) => Self::not_found(e.to_string()),
            CartError::ProductUnavailable(_) | CartError::InsufficientStock { .. } => {
                Self::conflict(e.to_string())
            }
            CartError::EmptyCart
            | CartError::QuantityOutOfRange { .. }
            | CartError::CurrencyMismatch(_)
            | CartError::Overflow => Self::validation(e.to_string()),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NotFound(_) => Self::not_found(e.to_string()),
            OrderError::Validation(_) => Self::validation(e.to_string()),
            OrderError::InvalidTransition { .. } => Self::conflict(e.to_string()),
            OrderError::DuplicateOrderNumber(_) | OrderError::Storage(_) => Self::internal(e),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(e: PaymentError) -> Self {
        match e {
            PaymentError::Validation(inner) => inner.into(),
            PaymentError::Cart(inner) => inner.into(),
            PaymentError::Order(inner) => inner.into(),
            PaymentError::Signature(_) | PaymentError::InvalidPayload(_) => {
                Self::validation(e.to_string())
            }
            PaymentError::PaymentProcessorUnavailable(_) => Self::upstream(e.to_string()),
            PaymentError::MissingPaymentIntent { .. } | PaymentError::NotRefundable { .. } => {
                Self::conflict(e.to_string())
            }
            PaymentError::Lookup(_) => Self::internal(e),
        }
    }
}

impl From<NewsletterError> for ApiError {
    fn from(e: NewsletterError) -> Self {
        match e {
            NewsletterError::NotFound => Self::not_found(e.to_string()),
            NewsletterError::Validation(_) => Self::validation(e.to_string()),
            NewsletterError::DuplicateEmail(_) => Self::conflict(e.to_string()),
            NewsletterError::Storage(_) => Self::internal(e),
        }
    }
}

impl From<ReviewError> for ApiError {
    fn from(e: ReviewError) -> Self {
        match e {
            ReviewError::NotFound(_) => Self::not_found(e.to_string()),
            ReviewError::Validation(_) => Self::validation(e.to_string()),
            ReviewError::AlreadyReviewed { .. } => Self::conflict(e.to_string()),
            ReviewError::Storage(_) => Self::internal(e),
        }
    }
}

// =============================================================================
// Extractor rejections
// =============================================================================

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                codes::PAYLOAD_TOO_LARGE,
                rejection.body_text(),
            );
        }
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

/// Server lifecycle errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}
