//! Payment processor webhook receiver.
//!
//! The raw body is handed to reconciliation untouched: the signature covers
//! the exact bytes, so the body must not pass through a JSON extractor first.
//! Bad signatures and payloads answer 400; every other failure answers 500
//! so the processor retries the delivery.

use crate::domain::error::{ApiError, ApiResult};
use crate::state::AppState;
use au_05_payments::{PaymentError, ReconcileOutcome, SIGNATURE_HEADER};
use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    #[serde(flatten)]
    pub outcome: ReconcileOutcome,
}

pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookAck>> {
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        state.metrics.record_webhook(false);
        warn!("[au-09] Webhook without signature header");
        return Err(ApiError::validation(format!(
            "Missing {SIGNATURE_HEADER} header"
        )));
    };

    match state.webhooks.handle_webhook(&body, signature).await {
        Ok(outcome) => {
            state.metrics.record_webhook(true);
            info!(outcome = outcome.as_str(), "[au-09] Webhook processed");
            Ok(Json(WebhookAck {
                received: true,
                outcome,
            }))
        }
        Err(e) => {
            state.metrics.record_webhook(false);
            match e {
                PaymentError::Signature(_) | PaymentError::InvalidPayload(_) => {
                    warn!(error = %e, "[au-09] Webhook rejected");
                    Err(e.into())
                }
                // Any other failure must be a 5xx so the processor redelivers.
                _ => Err(ApiError::internal(e)),
            }
        }
    }
}
