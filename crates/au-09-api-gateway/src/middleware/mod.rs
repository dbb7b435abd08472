//! Middleware stack for the API Gateway.
//!
//! Outermost first: CORS → Tracing → Metrics → Timeout → BodyLimit →
//! RateLimit → handler. The admin router adds Auth inside that stack.

pub mod auth;
pub mod body_limit;
pub mod cors;
pub mod metrics;
pub mod rate_limit;
pub mod timeout;
pub mod tracing;

pub use auth::{constant_time_compare, AuthConfig, AuthLayer};
pub use body_limit::BodyLimitLayer;
pub use cors::create_cors_layer;
pub use metrics::{GatewayMetrics, MetricsLayer, RequestTimer};
pub use rate_limit::{cleanup_task, RateLimitLayer, RateLimitState};
pub use timeout::TimeoutLayer;
pub use self::tracing::TracingLayer;
