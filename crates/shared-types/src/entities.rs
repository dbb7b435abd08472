//! # Core Domain Entities
//!
//! Snapshots that cross subsystem boundaries.
//!
//! ## Clusters
//!
//! - **Customer**: `CustomerInfo`, `Address`
//! - **Order snapshot**: `OrderLine`, `OrderSummary`, `OrderStatus`
//! - **Catalog snapshot**: `ProductSnapshot`
//! - **Routing**: `SubsystemId`

use crate::errors::{MoneyError, ValidationError};
use crate::ids::{OrderId, ProductId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

// =============================================================================
// CLUSTER A: CUSTOMER
// =============================================================================

/// Contact details captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CustomerInfo {
    /// Normalized (lowercase) email.
    pub email: String,
    /// Full name.
    pub name: String,
    /// Optional phone number, free-form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Address {
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub postal_code: String,
    /// ISO-3166 alpha-2 country code.
    pub country: String,
}

impl Address {
    /// Check the fields a carrier needs.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.line1.trim().is_empty() {
            return Err(ValidationError::Required("address.line1"));
        }
        if self.city.trim().is_empty() {
            return Err(ValidationError::Required("address.city"));
        }
        if self.postal_code.trim().is_empty() {
            return Err(ValidationError::Required("address.postal_code"));
        }
        if self.country.trim().is_empty() {
            return Err(ValidationError::Required("address.country"));
        }
        Ok(())
    }

    /// Multi-line rendering used in emails.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut out = vec![self.line1.clone()];
        if let Some(line2) = self.line2.as_deref().filter(|l| !l.is_empty()) {
            out.push(line2.to_string());
        }
        let region = match self.state.as_deref().filter(|s| !s.is_empty()) {
            Some(state) => format!("{}, {} {}", self.city, state, self.postal_code),
            None => format!("{} {}", self.city, self.postal_code),
        };
        out.push(region);
        out.push(self.country.to_uppercase());
        out
    }
}

// =============================================================================
// CLUSTER B: ORDER SNAPSHOT
// =============================================================================

/// One priced line of an order. Prices are captured at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub unit_price: Money,
    pub quantity: u32,
}

impl OrderLine {
    /// `unit_price * quantity`.
    pub fn line_total(&self) -> Result<Money, MoneyError> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// Immutable view of an order carried in bus events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub order_number: String,
    pub customer: CustomerInfo,
    pub lines: Vec<OrderLine>,
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
    pub shipping_address: Address,
}

impl OrderSummary {
    /// Total number of items across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }
}

/// Lifecycle status of an order.
///
/// The allowed transitions are owned by the orders subsystem; the enum lives
/// here because status changes travel on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Failed,
    Refunded,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [OrderStatus; 8] = [
        Self::Pending,
        Self::Paid,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
        Self::Failed,
        Self::Refunded,
    ];

    /// Wire name (`"pending"`, `"paid"`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    /// No transition leaves a terminal status.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Refunded)
    }

    /// True once payment has been captured (paid or any later fulfilment step).
    #[must_use]
    pub fn is_paid_or_later(self) -> bool {
        matches!(
            self,
            Self::Paid | Self::Processing | Self::Shipped | Self::Delivered | Self::Refunded
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| ValidationError::Invalid(format!("unknown order status: {s}")))
    }
}

// =============================================================================
// CLUSTER C: CATALOG SNAPSHOT
// =============================================================================

/// The subset of a product that checkout needs to price a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub unit_price: Money,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

// =============================================================================
// CLUSTER D: ROUTING
// =============================================================================

/// Subsystem identifiers used as event sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SubsystemId {
    Runtime = 0,
    Catalog = 1,
    Inventory = 2,
    Cart = 3,
    Orders = 4,
    Payments = 5,
    Notifications = 6,
    Newsletter = 7,
    Reviews = 8,
    ApiGateway = 9,
}

impl SubsystemId {
    /// Numeric id.
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Short lowercase name, used in log fields.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Runtime => "runtime",
            Self::Catalog => "catalog",
            Self::Inventory => "inventory",
            Self::Cart => "cart",
            Self::Orders => "orders",
            Self::Payments => "payments",
            Self::Notifications => "notifications",
            Self::Newsletter => "newsletter",
            Self::Reviews => "reviews",
            Self::ApiGateway => "api-gateway",
        }
    }
}

impl TryFrom<u8> for SubsystemId {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Runtime,
            1 => Self::Catalog,
            2 => Self::Inventory,
            3 => Self::Cart,
            4 => Self::Orders,
            5 => Self::Payments,
            6 => Self::Notifications,
            7 => Self::Newsletter,
            8 => Self::Reviews,
            9 => Self::ApiGateway,
            other => {
                return Err(ValidationError::Invalid(format!(
                    "unknown subsystem id {other}"
                )))
            }
        })
    }
}

impl std::fmt::Display for SubsystemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
