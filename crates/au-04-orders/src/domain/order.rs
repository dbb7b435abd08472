//! Order aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{
    normalize_email, Address, Currency, CustomerInfo, Money, OrderId, OrderLine, OrderStatus,
    OrderSummary, ValidationError,
};

/// Longest accepted admin note.
pub const MAX_NOTE_LEN: usize = 1_000;

/// A purchase record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    pub customer: CustomerInfo,
    pub shipping_address: Address,
    pub lines: Vec<OrderLine>,
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
    pub currency: Currency,
    pub checkout_session_id: Option<String>,
    pub payment_intent_id: Option<String>,
    pub amount_refunded_cents: i64,
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub notes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Bus snapshot of this order.
    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            order_id: self.id,
            order_number: self.order_number.clone(),
            customer: self.customer.clone(),
            lines: self.lines.clone(),
            subtotal: self.subtotal.clone(),
            shipping: self.shipping.clone(),
            total: self.total.clone(),
            shipping_address: self.shipping_address.clone(),
        }
    }

    pub fn is_fully_refunded(&self) -> bool {
        self.amount_refunded_cents >= self.total.amount_cents
    }

    /// Remaining refundable amount in cents.
    pub fn refundable_cents(&self) -> i64 {
        (self.total.amount_cents - self.amount_refunded_cents).max(0)
    }

    pub(crate) fn push_note(&mut self, note: Option<String>) {
        if let Some(note) = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
            self.notes.push(note);
        }
    }
}

/// Input for a new pending order, produced by checkout from a priced quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer: CustomerInfo,
    pub shipping_address: Address,
    pub lines: Vec<OrderLine>,
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
    #[serde(default)]
    pub note: Option<String>,
}

impl NewOrder {
    /// Validate and normalize in place.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        self.customer.email = normalize_email(&self.customer.email)?;
        self.customer.name = self.customer.name.trim().to_string();
        if self.customer.name.is_empty() {
            return Err(ValidationError::Required("customer.name"));
        }
        self.shipping_address.validate()?;

        if self.lines.is_empty() {
            return Err(ValidationError::Required("lines"));
        }
        let mut sum: Option<Money> = None;
        for line in &self.lines {
            if line.quantity == 0 {
                return Err(ValidationError::Invalid(format!(
                    "line for {} has zero quantity",
                    line.product_id
                )));
            }
            let line_total = line.line_total().map_err(money_invalid)?;
            sum = Some(match sum {
                Some(s) => s.checked_add(&line_total).map_err(money_invalid)?,
                None => line_total,
            });
        }
        if sum.as_ref() != Some(&self.subtotal) {
            return Err(ValidationError::Invalid(
                "subtotal does not match order lines".into(),
            ));
        }
        if self.shipping.amount_cents < 0 {
            return Err(ValidationError::Invalid("shipping cannot be negative".into()));
        }
        let total = self
            .subtotal
            .checked_add(&self.shipping)
            .map_err(money_invalid)?;
        if total != self.total {
            return Err(ValidationError::Invalid(
                "total does not equal subtotal plus shipping".into(),
            ));
        }
        if let Some(note) = &self.note {
            if note.chars().count() > MAX_NOTE_LEN {
                return Err(ValidationError::TooLong {
                    field: "note",
                    max: MAX_NOTE_LEN,
                });
            }
        }
        Ok(())
    }
}

fn money_invalid(err: shared_types::MoneyError) -> ValidationError {
    ValidationError::Invalid(err.to_string())
}

/// Admin listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQuery {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    /// Exact (normalized) customer email.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// Extra data carried by a status change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionContext {
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
}

/// Details captured from the processor when an order is paid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentDetails {
    pub payment_intent: Option<String>,
    /// Customer details as confirmed on the hosted checkout page.
    pub customer: Option<CustomerInfo>,
}

/// Result of an idempotent reconciliation helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// The status moved from `from` to `order.status`.
    Changed { order: Order, from: OrderStatus },
    /// Already in (or past) the requested state; nothing published.
    Unchanged(Order),
}

impl StatusUpdate {
    pub fn order(&self) -> &Order {
        match self {
            Self::Changed { order, .. } | Self::Unchanged(order) => order,
        }
    }

    pub fn into_order(self) -> Order {
        match self {
            Self::Changed { order, .. } | Self::Unchanged(order) => order,
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}
