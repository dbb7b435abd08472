//! Stripe-compatible REST client
//!
//! Requests are form-encoded with bracketed keys (`line_items[0][quantity]`)
//! and authenticated with the secret key as a bearer token.

use crate::domain::{CheckoutSession, CheckoutSessionRequest, Refund, ORDER_ID_METADATA_KEY};
use crate::error::ProcessorError;
use crate::ports::outbound::PaymentProcessor;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Processor client configuration
#[derive(Clone, Debug)]
pub struct StripeConfig {
    pub api_base: String,
    pub secret_key: String,
    pub timeout: Duration,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            secret_key: String::new(),
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Deserialize)]
struct SessionResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Deserialize)]
struct RefundResponse {
    id: String,
    amount: i64,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// `PaymentProcessor` over the processor's REST API.
pub struct StripeCheckoutClient {
    client: Client,
    config: StripeConfig,
}

impl StripeCheckoutClient {
    pub fn new(config: StripeConfig) -> Result<Self, ProcessorError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
        idempotency_key: Option<String>,
    ) -> Result<T, ProcessorError> {
        let mut request = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.config.secret_key)
            .form(form);
        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(path, status = status.as_u16(), "[au-05] Processor response");

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .ok()
            .and_then(|e| e.error.message)
            .unwrap_or(body);
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            Err(ProcessorError::Unavailable(format!("{status}: {message}")))
        } else {
            Err(ProcessorError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Form fields for a hosted checkout session.
pub(crate) fn session_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let order_id = request.order_id.to_string();
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
        ("customer_email".to_string(), request.customer_email.clone()),
        ("client_reference_id".to_string(), order_id.clone()),
        // Failed payment intents carry no session; tag the intent too.
        (
            format!("payment_intent_data[metadata][{ORDER_ID_METADATA_KEY}]"),
            order_id,
        ),
    ];
    for (key, value) in &request.metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
    }
    for (i, item) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
        form.push((
            format!("{prefix}[price_data][currency]"),
            item.currency.clone(),
        ));
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            item.unit_amount_cents.to_string(),
        ));
        form.push((
            format!("{prefix}[price_data][product_data][name]"),
            item.name.clone(),
        ));
        if let Some(image) = &item.image {
            form.push((
                format!("{prefix}[price_data][product_data][images][0]"),
                image.clone(),
            ));
        }
    }
    form
}

#[async_trait]
impl PaymentProcessor for StripeCheckoutClient {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, ProcessorError> {
        let form = session_form(&request);
        let response: SessionResponse = self
            .post_form(
                "/v1/checkout/sessions",
                &form,
                Some(format!("checkout-{}", request.order_id)),
            )
            .await?;
        let url = response.url.ok_or_else(|| {
            ProcessorError::InvalidResponse("checkout session has no url".to_string())
        })?;
        Ok(CheckoutSession {
            id: response.id,
            url,
        })
    }

    async fn expire_checkout_session(&self, session_id: &str) -> Result<(), ProcessorError> {
        let _: SessionResponse = self
            .post_form(
                &format!("/v1/checkout/sessions/{session_id}/expire"),
                &[],
                None,
            )
            .await?;
        Ok(())
    }

    async fn create_refund(
        &self,
        payment_intent: &str,
        amount_cents: Option<i64>,
    ) -> Result<Refund, ProcessorError> {
        let mut form = vec![("payment_intent".to_string(), payment_intent.to_string())];
        if let Some(amount) = amount_cents {
            form.push(("amount".to_string(), amount.to_string()));
        }
        let response: RefundResponse = self.post_form("/v1/refunds", &form, None).await?;
        Ok(Refund {
            id: response.id,
            amount_cents: response.amount,
            status: response.status.unwrap_or_else(|| "pending".to_string()),
        })
    }
}
