//! Processor webhook events

use crate::error::{PaymentError, PaymentResult};
use serde::{Deserialize, Serialize};
use shared_types::{CustomerInfo, OrderId};
use std::collections::HashMap;

/// Metadata key carrying our order id on sessions and payment intents.
pub const ORDER_ID_METADATA_KEY: &str = "order_id";

/// Envelope of every processor event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    /// Unix seconds.
    pub created: i64,
    pub data: EventData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

impl WebhookEvent {
    pub fn parse(payload: &[u8]) -> PaymentResult<Self> {
        serde_json::from_slice(payload).map_err(|e| PaymentError::InvalidPayload(e.to_string()))
    }

    fn object<T: serde::de::DeserializeOwned>(&self) -> PaymentResult<T> {
        serde_json::from_value(self.data.object.clone()).map_err(|e| {
            PaymentError::InvalidPayload(format!("{} object: {e}", self.event_type))
        })
    }

    /// Decide what this event means for an order.
    pub fn action(&self) -> PaymentResult<WebhookAction> {
        let action = match self.event_type.as_str() {
            "checkout.session.completed" => {
                let session: SessionObject = self.object()?;
                match session.payment_status.as_str() {
                    "paid" | "no_payment_required" => WebhookAction::MarkPaid(session),
                    _ => WebhookAction::AwaitingPayment(session),
                }
            }
            "checkout.session.async_payment_succeeded" => WebhookAction::MarkPaid(self.object()?),
            "checkout.session.async_payment_failed" => {
                let session: SessionObject = self.object()?;
                WebhookAction::MarkFailed {
                    lookup: session.lookup(),
                    reason: "asynchronous payment failed".to_string(),
                }
            }
            "payment_intent.payment_failed" => {
                let intent: PaymentIntentObject = self.object()?;
                let reason = intent
                    .last_payment_error
                    .as_ref()
                    .and_then(|e| e.message.clone())
                    .unwrap_or_else(|| "payment failed".to_string());
                WebhookAction::MarkFailed {
                    lookup: intent.lookup(),
                    reason,
                }
            }
            "checkout.session.expired" => {
                let session: SessionObject = self.object()?;
                WebhookAction::Cancel {
                    lookup: session.lookup(),
                    reason: "checkout expired".to_string(),
                }
            }
            "charge.refunded" => WebhookAction::Refund(self.object()?),
            _ => WebhookAction::Ignore,
        };
        Ok(action)
    }
}

/// What reconciliation should do with an event.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookAction {
    MarkPaid(SessionObject),
    /// Session completed with an asynchronous payment still in flight.
    AwaitingPayment(SessionObject),
    MarkFailed {
        lookup: OrderLookup,
        reason: String,
    },
    Cancel {
        lookup: OrderLookup,
        reason: String,
    },
    Refund(ChargeObject),
    Ignore,
}

/// Ways an event can point at an order, tried in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderLookup {
    pub metadata_order_id: Option<OrderId>,
    pub client_reference_id: Option<OrderId>,
    pub checkout_session_id: Option<String>,
    pub payment_intent: Option<String>,
}

fn metadata_order_id(metadata: &HashMap<String, String>) -> Option<OrderId> {
    metadata
        .get(ORDER_ID_METADATA_KEY)
        .and_then(|v| v.parse().ok())
}

/// The checkout-session fields reconciliation reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionObject {
    pub id: String,
    #[serde(default)]
    pub client_reference_id: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub payment_status: String,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
}

impl SessionObject {
    pub fn lookup(&self) -> OrderLookup {
        OrderLookup {
            metadata_order_id: metadata_order_id(&self.metadata),
            client_reference_id: self.client_reference_id.as_deref().and_then(|v| v.parse().ok()),
            checkout_session_id: Some(self.id.clone()),
            payment_intent: self.payment_intent.clone(),
        }
    }

    /// Customer details confirmed on the hosted page, when complete enough to use.
    pub fn customer(&self) -> Option<CustomerInfo> {
        let details = self.customer_details.as_ref()?;
        Some(CustomerInfo {
            email: details.email.clone()?,
            name: details.name.clone().unwrap_or_default(),
            phone: details.phone.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntentObject {
    pub id: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub last_payment_error: Option<PaymentErrorDetail>,
}

impl PaymentIntentObject {
    pub fn lookup(&self) -> OrderLookup {
        OrderLookup {
            metadata_order_id: metadata_order_id(&self.metadata),
            payment_intent: Some(self.id.clone()),
            ..OrderLookup::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChargeObject {
    pub id: String,
    #[serde(default)]
    pub payment_intent: Option<String>,
    /// Cumulative refunded amount on the charge, in cents.
    #[serde(default)]
    pub amount_refunded: i64,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ChargeObject {
    pub fn lookup(&self) -> OrderLookup {
        OrderLookup {
            metadata_order_id: metadata_order_id(&self.metadata),
            payment_intent: self.payment_intent.clone(),
            ..OrderLookup::default()
        }
    }
}
