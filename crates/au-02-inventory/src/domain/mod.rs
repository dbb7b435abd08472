//! Stock-movement ledger domain
//!
//! ## Invariants
//!
//! - The ledger is append-only; movements are never edited or removed.
//! - `level(product) == Σ delta(m)` over the product's movements.
//! - Sale movements are unique per (order reference, product).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{MovementId, OrderId, ProductId, ValidationError};

/// Maximum note length on a movement.
pub const MAX_NOTE_LEN: usize = 500;

/// Largest quantity a single movement may carry, in either direction.
pub const MAX_MOVEMENT_QUANTITY: i64 = 1_000_000;

/// Direction of a movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Stock received. Quantity is positive.
    In,
    /// Stock leaving. Quantity is positive and subtracted.
    Out,
    /// Signed correction, applied as given.
    Adjustment,
}

/// Why stock moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementReason {
    Restock,
    Sale,
    Return,
    Correction,
    Damaged,
}

impl MovementReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Restock => "restock",
            Self::Sale => "sale",
            Self::Return => "return",
            Self::Correction => "correction",
            Self::Damaged => "damaged",
        }
    }
}

/// One ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub kind: MovementKind,
    pub quantity: i64,
    pub reason: MovementReason,
    /// Order that caused the movement, for sales and returns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<OrderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    /// Signed effect on the stock level.
    #[must_use]
    pub fn delta(&self) -> i64 {
        signed_delta(self.kind, self.quantity)
    }
}

#[must_use]
pub fn signed_delta(kind: MovementKind, quantity: i64) -> i64 {
    match kind {
        MovementKind::In => quantity,
        MovementKind::Out => -quantity,
        MovementKind::Adjustment => quantity,
    }
}

/// Rebuild a level from ledger rows. `None` when the sum leaves `i64`.
#[must_use]
pub fn replay<'a>(movements: impl IntoIterator<Item = &'a StockMovement>) -> Option<i64> {
    movements
        .into_iter()
        .try_fold(0i64, |level, m| level.checked_add(m.delta()))
}

/// Input for a manual (admin) movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMovement {
    pub product_id: ProductId,
    pub kind: MovementKind,
    pub quantity: i64,
    pub reason: MovementReason,
    #[serde(default)]
    pub reference: Option<OrderId>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl NewMovement {
    /// Shape checks: sign of the quantity and kind/reason pairing.
    ///
    /// Sales are recorded only from paid orders, never by hand.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.kind {
            MovementKind::In | MovementKind::Out
                if !(1..=MAX_MOVEMENT_QUANTITY).contains(&self.quantity) =>
            {
                return Err(ValidationError::OutOfRange {
                    field: "quantity",
                    min: 1,
                    max: MAX_MOVEMENT_QUANTITY,
                });
            }
            MovementKind::Adjustment if self.quantity == 0 => {
                return Err(ValidationError::Invalid(
                    "adjustment quantity must be non-zero".into(),
                ));
            }
            MovementKind::Adjustment
                if !(-MAX_MOVEMENT_QUANTITY..=MAX_MOVEMENT_QUANTITY).contains(&self.quantity) =>
            {
                return Err(ValidationError::OutOfRange {
                    field: "quantity",
                    min: -MAX_MOVEMENT_QUANTITY,
                    max: MAX_MOVEMENT_QUANTITY,
                });
            }
            _ => {}
        }

        match (self.reason, self.kind) {
            (MovementReason::Sale, _) => {
                return Err(ValidationError::Invalid(
                    "sale movements are recorded from paid orders".into(),
                ))
            }
            (MovementReason::Restock | MovementReason::Return, MovementKind::In) => {}
            (MovementReason::Restock | MovementReason::Return, _) => {
                return Err(ValidationError::Invalid(format!(
                    "{} movements must be of kind 'in'",
                    self.reason.as_str()
                )))
            }
            (MovementReason::Damaged, MovementKind::In) => {
                return Err(ValidationError::Invalid(
                    "damaged movements cannot add stock".into(),
                ))
            }
            _ => {}
        }

        if self
            .note
            .as_deref()
            .is_some_and(|n| n.chars().count() > MAX_NOTE_LEN)
        {
            return Err(ValidationError::TooLong {
                field: "note",
                max: MAX_NOTE_LEN,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn delta(&self) -> i64 {
        signed_delta(self.kind, self.quantity)
    }
}

/// Current level of one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub product_id: ProductId,
    pub level: i64,
}

/// Result of applying an order to the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerOutcome {
    /// Movements appended by this call.
    pub recorded: Vec<StockMovement>,
    /// Products skipped because the movement already exists (or, for
    /// returns, because nothing was sold).
    pub skipped: usize,
}

/// Outcome of a ledger replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecomputeReport {
    pub product_id: ProductId,
    pub previous: i64,
    pub recomputed: i64,
    pub movements: usize,
}

impl RecomputeReport {
    #[must_use]
    pub fn drifted(&self) -> bool {
        self.previous != self.recomputed
    }
}
