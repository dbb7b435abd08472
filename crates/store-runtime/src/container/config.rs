//! # Store Configuration
//!
//! One struct for every subsystem plus the runtime itself.
//!
//! ## Layering
//!
//! 1. Built-in defaults (a working in-memory store on port 8080)
//! 2. Optional TOML file (`--config`)
//! 3. `AURELIA_*` environment variables
//! 4. `.env` in the working directory, loaded into the environment without
//!    overriding variables that are already set
//!
//! ## Security Requirements
//!
//! - The webhook secret MUST be set when the processor is `stripe`
//! - The service key MUST be set when the backend is `baas`
//! - The admin API key, when set, must be at least 24 characters

use au_03_cart::ShippingPolicy;
use au_09_api_gateway::domain::config::{ConfigError as GatewayConfigError, MIN_ADMIN_KEY_LEN};
use au_09_api_gateway::{
    AdminConfig, CorsConfig, GatewayConfig, HttpConfig, LimitsConfig, RateLimitConfig,
    TimeoutConfig,
};
use serde::{Deserialize, Serialize};
use shared_types::{Currency, Money};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "AURELIA_";

/// Complete store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Storefront identity used in emails and redirects.
    pub store: StoreSettings,
    /// Where data lives.
    pub backend: BackendKind,
    pub baas: BaasSettings,
    pub payments: PaymentSettings,
    pub checkout: CheckoutSettings,
    pub shipping: ShippingSettings,
    pub email: EmailSettings,
    pub inventory: InventorySettings,
    pub bus: BusSettings,

    // Gateway sections, kept top-level so `[http]` and `AURELIA_HTTP_PORT`
    // read naturally.
    pub http: HttpConfig,
    pub admin: AdminConfig,
    pub rate_limit: RateLimitConfig,
    pub limits: LimitsConfig,
    pub timeouts: TimeoutConfig,
    pub cors: CorsConfig,
}

/// Persistence backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Process-local maps. Everything is lost on restart.
    #[default]
    Memory,
    /// Hosted Postgres reached over its PostgREST API.
    Baas,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub name: String,
    /// Public storefront URL, no trailing slash.
    pub site_url: String,
    pub support_email: Option<String>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            name: "Aurelia".to_string(),
            site_url: "http://localhost:3000".to_string(),
            support_email: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BaasSettings {
    /// Project URL, e.g. `https://xyz.supabase.co`. `/rest/v1` is appended.
    pub url: String,
    /// Service-role key. Bypasses row-level security; never ship it to a browser.
    pub service_key: Option<String>,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for BaasSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            service_key: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Payment processor selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorKind {
    /// In-process fake, for development.
    #[default]
    Fake,
    Stripe,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentSettings {
    pub processor: ProcessorKind,
    pub api_base: String,
    pub secret_key: Option<String>,
    pub webhook_secret: Option<String>,
    /// Allowed clock skew on webhook signatures.
    #[serde(with = "humantime_serde")]
    pub webhook_tolerance: Duration,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            processor: ProcessorKind::Fake,
            api_base: au_05_payments::StripeConfig::default().api_base,
            secret_key: None,
            webhook_secret: None,
            webhook_tolerance: Duration::from_secs(300),
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutSettings {
    /// Path appended to the site URL after a successful payment.
    pub success_path: String,
    /// Path appended to the site URL when checkout is abandoned.
    pub cancel_path: String,
    pub max_quantity_per_line: u32,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            success_path: "/checkout/success".to_string(),
            cancel_path: "/cart".to_string(),
            max_quantity_per_line: au_03_cart::DEFAULT_MAX_QUANTITY_PER_LINE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingSettings {
    pub currency: String,
    pub flat_rate_cents: i64,
    /// Subtotals at or above this ship free. `None` always charges.
    pub free_over_cents: Option<i64>,
}

impl Default for ShippingSettings {
    fn default() -> Self {
        let policy = ShippingPolicy::default();
        Self {
            currency: policy.flat_rate.currency.code().to_string(),
            flat_rate_cents: policy.flat_rate.amount_cents,
            free_over_cents: policy.free_over.map(|m| m.amount_cents),
        }
    }
}

impl ShippingSettings {
    pub fn policy(&self) -> Result<ShippingPolicy, ConfigError> {
        let currency = Currency::new(&self.currency)
            .map_err(|e| ConfigError::Invalid(format!("shipping.currency: {e}")))?;
        Ok(ShippingPolicy {
            flat_rate: Money::new(self.flat_rate_cents, currency.clone()),
            free_over: self.free_over_cents.map(|c| Money::new(c, currency)),
        })
    }
}

/// Email provider selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailProvider {
    /// Keep messages in memory and log them.
    #[default]
    Outbox,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    pub provider: EmailProvider,
    pub api_base: String,
    pub api_key: Option<String>,
    pub from: String,
    /// Recipients of new-order, low-stock and mismatch alerts.
    pub admin_emails: Vec<String>,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for EmailSettings {
    fn default() -> Self {
        let http = au_06_notifications::HttpMailerConfig::default();
        Self {
            provider: EmailProvider::Outbox,
            api_base: http.api_base,
            api_key: None,
            from: http.from,
            admin_emails: Vec::new(),
            timeout: http.timeout,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InventorySettings {
    /// Used for products the catalog does not know.
    pub default_low_stock_threshold: i64,
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            default_low_stock_threshold: au_02_inventory::InventoryConfig::default()
                .default_low_stock_threshold,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BusSettings {
    /// Broadcast buffer per subscriber before the slowest one starts lagging.
    pub capacity: usize,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {reason}")]
    InvalidEnv { key: String, reason: String },

    #[error("payments.webhook_secret is required when the processor is stripe")]
    MissingWebhookSecret,

    #[error("payments.secret_key is required when the processor is stripe")]
    MissingProcessorKey,

    #[error("baas.url is required when the backend is baas")]
    MissingBaasUrl,

    #[error("baas.service_key is required when the backend is baas")]
    MissingServiceKey,

    #[error("email.api_key is required when the email provider is http")]
    MissingEmailKey,

    #[error("admin.api_key must be at least {min} characters")]
    WeakAdminKey { min: usize },

    #[error("shipping.{field} cannot be negative")]
    NegativeShipping { field: &'static str },

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Gateway(#[from] GatewayConfigError),
}

impl StoreConfig {
    /// Defaults, then `path`, then `.env` and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        // A missing .env is the normal case in production.
        let _ = dotenvy::dotenv();
        config.apply_env(std::env::vars())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Apply every `AURELIA_*` pair in `vars`. Unknown keys are ignored.
    pub fn apply_env<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            self.apply_env_var(name, &value)
                .map_err(|reason| ConfigError::InvalidEnv {
                    key: key.clone(),
                    reason,
                })?;
        }
        Ok(())
    }

    fn apply_env_var(&mut self, name: &str, value: &str) -> Result<(), String> {
        match name {
            "STORE_NAME" => self.store.name = value.to_string(),
            "STORE_SITE_URL" => self.store.site_url = value.to_string(),
            "STORE_SUPPORT_EMAIL" => self.store.support_email = non_empty(value),

            "BACKEND" => self.backend = parse_enum(value)?,
            "BAAS_URL" => self.baas.url = value.to_string(),
            "BAAS_SERVICE_KEY" => self.baas.service_key = non_empty(value),
            "BAAS_TIMEOUT" => self.baas.timeout = parse_duration(value)?,

            "PAYMENTS_PROCESSOR" => self.payments.processor = parse_enum(value)?,
            "PAYMENTS_API_BASE" => self.payments.api_base = value.to_string(),
            "PAYMENTS_SECRET_KEY" => self.payments.secret_key = non_empty(value),
            "PAYMENTS_WEBHOOK_SECRET" => self.payments.webhook_secret = non_empty(value),
            "PAYMENTS_WEBHOOK_TOLERANCE" => {
                self.payments.webhook_tolerance = parse_duration(value)?;
            }

            "SHIPPING_CURRENCY" => self.shipping.currency = value.to_string(),
            "SHIPPING_FLAT_RATE_CENTS" => self.shipping.flat_rate_cents = parse(value)?,
            "SHIPPING_FREE_OVER_CENTS" => {
                self.shipping.free_over_cents = match value.trim() {
                    "" | "none" => None,
                    v => Some(parse(v)?),
                };
            }

            "EMAIL_PROVIDER" => self.email.provider = parse_enum(value)?,
            "EMAIL_API_BASE" => self.email.api_base = value.to_string(),
            "EMAIL_API_KEY" => self.email.api_key = non_empty(value),
            "EMAIL_FROM" => self.email.from = value.to_string(),
            "EMAIL_ADMIN_EMAILS" => {
                self.email.admin_emails = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
            }

            "INVENTORY_DEFAULT_LOW_STOCK_THRESHOLD" => {
                self.inventory.default_low_stock_threshold = parse(value)?;
            }

            "HTTP_HOST" => self.http.host = parse(value)?,
            "HTTP_PORT" => self.http.port = parse(value)?,
            "HTTP_SHUTDOWN_GRACE" => self.http.shutdown_grace = parse_duration(value)?,
            "ADMIN_API_KEY" => self.admin.api_key = non_empty(value),
            "RATE_LIMIT_ENABLED" => self.rate_limit.enabled = parse(value)?,
            "RATE_LIMIT_REQUESTS_PER_SECOND" => {
                self.rate_limit.requests_per_second = parse(value)?;
            }
            "CORS_ALLOWED_ORIGINS" => {
                self.cors.allowed_origins = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
            }
            _ => {}
        }
        Ok(())
    }

    /// Reject configurations the store cannot run safely with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.payments.processor == ProcessorKind::Stripe {
            if self.payments.webhook_secret.is_none() {
                return Err(ConfigError::MissingWebhookSecret);
            }
            if self.payments.secret_key.is_none() {
                return Err(ConfigError::MissingProcessorKey);
            }
        }

        if self.backend == BackendKind::Baas {
            if self.baas.url.trim().is_empty() {
                return Err(ConfigError::MissingBaasUrl);
            }
            if self.baas.service_key.is_none() {
                return Err(ConfigError::MissingServiceKey);
            }
        }

        if self.email.provider == EmailProvider::Http && self.email.api_key.is_none() {
            return Err(ConfigError::MissingEmailKey);
        }

        if self
            .admin
            .api_key
            .as_ref()
            .is_some_and(|key| key.len() < MIN_ADMIN_KEY_LEN)
        {
            return Err(ConfigError::WeakAdminKey {
                min: MIN_ADMIN_KEY_LEN,
            });
        }

        if self.shipping.flat_rate_cents < 0 {
            return Err(ConfigError::NegativeShipping { field: "flat_rate_cents" });
        }
        if self.shipping.free_over_cents.is_some_and(|c| c < 0) {
            return Err(ConfigError::NegativeShipping { field: "free_over_cents" });
        }
        self.shipping.policy()?;

        self.gateway().validate()?;
        Ok(())
    }

    /// The gateway's slice of the configuration.
    pub fn gateway(&self) -> GatewayConfig {
        GatewayConfig {
            http: self.http.clone(),
            admin: self.admin.clone(),
            rate_limit: self.rate_limit.clone(),
            limits: self.limits.clone(),
            timeouts: self.timeouts.clone(),
            cors: self.cors.clone(),
        }
    }

    /// Absolute URL on the storefront.
    pub fn site_url(&self, path: &str) -> String {
        format!("{}{}", self.store.site_url.trim_end_matches('/'), path)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse<T>(value: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| e.to_string())
}

fn parse_duration(value: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(value.trim()).map_err(|e| e.to_string())
}

/// Enums reuse their serde names (`"memory"`, `"stripe"`, ...).
fn parse_enum<T: serde::de::DeserializeOwned>(value: &str) -> Result<T, String> {
    let value = value.trim().to_ascii_lowercase();
    serde_json::from_value(serde_json::Value::String(value)).map_err(|e| e.to_string())
}
