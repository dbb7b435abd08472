//! Checkout and processor request types

use au_03_cart::CartLine;
use serde::{Deserialize, Serialize};
use shared_types::{Address, CustomerInfo, OrderId};
use std::collections::BTreeMap;

/// Placeholder the processor replaces with the session id in the success URL.
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Storefront checkout submission. Carries no prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub customer: CustomerInfo,
    pub shipping_address: Address,
    pub lines: Vec<CartLine>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub order_id: OrderId,
    pub order_number: String,
    pub checkout_url: String,
}

/// One line on the hosted checkout page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLineItem {
    pub name: String,
    /// Lowercase ISO code.
    pub currency: String,
    pub unit_amount_cents: i64,
    pub quantity: u32,
    pub image: Option<String>,
}

/// Everything the processor needs to open a hosted checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionRequest {
    pub order_id: OrderId,
    pub order_number: String,
    pub customer_email: String,
    pub line_items: Vec<SessionLineItem>,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// A refund accepted by the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    pub amount_cents: i64,
    pub status: String,
}

/// Answer to an admin refund request. The order itself changes when the
/// processor's `charge.refunded` webhook arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundReceipt {
    pub order_id: OrderId,
    pub order_number: String,
    pub refund: Refund,
}

/// Success URL with the session placeholder appended.
pub fn success_url_with_session(base: &str) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}session_id={SESSION_ID_PLACEHOLDER}")
}
