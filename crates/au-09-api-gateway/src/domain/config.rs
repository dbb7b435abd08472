//! Gateway configuration with validation.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Shortest admin key accepted by [`GatewayConfig::validate`].
pub const MIN_ADMIN_KEY_LEN: usize = 24;

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP server configuration
    pub http: HttpConfig,
    /// Back-office access
    pub admin: AdminConfig,
    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,
    /// Request size limits
    pub limits: LimitsConfig,
    /// Timeout configuration
    pub timeouts: TimeoutConfig,
    /// CORS configuration
    pub cors: CorsConfig,
}

impl GatewayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit.requests_per_second == 0 {
            return Err(ConfigError::InvalidRateLimit(
                "requests_per_second cannot be 0".into(),
            ));
        }
        if self.rate_limit.writes_per_second == 0 {
            return Err(ConfigError::InvalidRateLimit(
                "writes_per_second cannot be 0".into(),
            ));
        }

        if self.limits.max_request_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_request_size cannot be 0".into(),
            ));
        }

        if self.timeouts.default.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "default timeout cannot be 0".into(),
            ));
        }

        if let Some(key) = &self.admin.api_key {
            if key.len() < MIN_ADMIN_KEY_LEN {
                return Err(ConfigError::WeakAdminKey {
                    min: MIN_ADMIN_KEY_LEN,
                });
            }
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 8080)
    pub port: u16,
    /// Grace period for in-flight requests on shutdown
    #[serde(with = "humantime_serde")]
    pub shutdown_grace: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
            shutdown_grace: Duration::from_secs(10),
        }
    }
}

/// Back-office access configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Key required on every `/api/admin` request.
    ///
    /// `None` locks the back-office entirely.
    pub api_key: Option<String>,
}

/// Per-IP token bucket configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Safe (GET/HEAD/OPTIONS) requests per second per IP
    pub requests_per_second: u32,
    /// Mutating requests per second per IP (checkout, subscribe, reviews)
    pub writes_per_second: u32,
    /// Burst allowance for reads; writes get a tenth of it
    pub burst_size: u32,
    /// Enable rate limiting
    pub enabled: bool,
    /// IPs exempt from rate limiting
    pub whitelist: Vec<IpAddr>,
    /// Buckets idle for longer than this are dropped
    #[serde(with = "humantime_serde")]
    pub idle_bucket_ttl: Duration,
    /// How often idle buckets are collected
    #[serde(with = "humantime_serde")]
    pub cleanup_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 50,
            writes_per_second: 5,
            burst_size: 100,
            enabled: true,
            whitelist: vec![IpAddr::V4(Ipv4Addr::LOCALHOST)],
            idle_bucket_ttl: Duration::from_secs(600),
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

/// Request limits configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Max request body size in bytes (default: 256KB)
    pub max_request_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_size: 256 * 1024,
        }
    }
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Default timeout for most requests
    #[serde(with = "humantime_serde")]
    pub default: Duration,
    /// Checkout and refunds wait on the payment processor
    #[serde(with = "humantime_serde")]
    pub payment: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            default: Duration::from_secs(10),
            payment: Duration::from_secs(30),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Enable CORS
    pub enabled: bool,
    /// Allowed origins ("*" for all)
    pub allowed_origins: Vec<String>,
    /// Allowed methods
    pub allowed_methods: Vec<String>,
    /// Allowed headers
    pub allowed_headers: Vec<String>,
    /// Expose headers
    pub expose_headers: Vec<String>,
    /// Max age for preflight cache, in seconds
    pub max_age: u64,
    /// Allow credentials
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            allowed_methods: ["GET", "POST", "PATCH", "DELETE", "OPTIONS"]
                .into_iter()
                .map(String::from)
                .collect(),
            allowed_headers: ["Content-Type", "Authorization", "X-API-Key"]
                .into_iter()
                .map(String::from)
                .collect(),
            expose_headers: vec!["Retry-After".to_string()],
            max_age: 86400,
            allow_credentials: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Invalid rate limiting configuration
    #[error("invalid rate limit: {0}")]
    InvalidRateLimit(String),
    /// Invalid size limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// Admin key too short to resist guessing
    #[error("admin api key must be at least {min} characters")]
    WeakAdminKey { min: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.http.port, 8080);
        assert!(config.admin.api_key.is_none());
    }

    #[test]
    fn test_config_addresses() {
        let config = GatewayConfig::default();
        assert_eq!(config.http_addr().port(), 8080);
    }

    #[test]
    fn test_rate_limit_validation() {
        let mut config = GatewayConfig::default();
        config.rate_limit.requests_per_second = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRateLimit(_))
        ));
    }

    #[test]
    fn test_short_admin_key_rejected() {
        let mut config = GatewayConfig::default();
        config.admin.api_key = Some("too-short".into());
        assert_eq!(
            config.validate(),
            Err(ConfigError::WeakAdminKey {
                min: MIN_ADMIN_KEY_LEN
            })
        );

        config.admin.api_key = Some("k".repeat(MIN_ADMIN_KEY_LEN));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_durations_parse_from_toml_style_json() {
        let config: GatewayConfig = serde_json::from_value(serde_json::json!({
            "timeouts": { "default": "5s", "payment": "1m" },
            "rate_limit": { "idle_bucket_ttl": "15m" }
        }))
        .unwrap();
        assert_eq!(config.timeouts.default, Duration::from_secs(5));
        assert_eq!(config.timeouts.payment, Duration::from_secs(60));
        assert_eq!(config.rate_limit.idle_bucket_ttl, Duration::from_secs(900));
        assert_eq!(config.rate_limit.cleanup_interval, Duration::from_secs(60));
    }
}
