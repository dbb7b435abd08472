//! Gateway configuration and error types.

pub mod config;
pub mod error;

pub use config::{
    AdminConfig, ConfigError, CorsConfig, GatewayConfig, HttpConfig, LimitsConfig,
    RateLimitConfig, TimeoutConfig, MIN_ADMIN_KEY_LEN,
};
pub use error::{codes, ApiError, ApiResult, GatewayError};
