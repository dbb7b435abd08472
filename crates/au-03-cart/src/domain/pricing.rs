//! Server-side cart pricing

use super::cart::Cart;
use crate::error::{CartError, CartResult};
use serde::{Deserialize, Serialize};
use shared_types::{Currency, Money, OrderLine, ProductId, ProductSnapshot};
use std::collections::HashMap;
use tracing::debug;

/// Flat-rate shipping with an optional free-shipping threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingPolicy {
    pub flat_rate: Money,
    /// Subtotals at or above this ship free.
    pub free_over: Option<Money>,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            flat_rate: Money::usd(1_000),
            free_over: Some(Money::usd(15_000)),
        }
    }
}

impl ShippingPolicy {
    pub fn free() -> Self {
        Self {
            flat_rate: Money::usd(0),
            free_over: None,
        }
    }

    /// Shipping charged for `subtotal`.
    pub fn shipping_for(&self, subtotal: &Money) -> CartResult<Money> {
        ensure_currency(&self.flat_rate.currency, &subtotal.currency)?;
        if let Some(threshold) = &self.free_over {
            ensure_currency(&threshold.currency, &subtotal.currency)?;
            if subtotal.amount_cents >= threshold.amount_cents {
                return Ok(Money::zero(subtotal.currency.clone()));
            }
        }
        Ok(self.flat_rate.clone())
    }
}

fn ensure_currency(expected: &Currency, actual: &Currency) -> CartResult<()> {
    if expected != actual {
        return Err(CartError::CurrencyMismatch(format!(
            "{expected} vs {actual}"
        )));
    }
    Ok(())
}

/// A priced cart. Every amount comes from catalog snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub lines: Vec<OrderLine>,
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
}

impl Quote {
    pub fn currency(&self) -> &Currency {
        &self.total.currency
    }

    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }
}

/// Price `cart` against server-side product snapshots and stock levels.
///
/// Products missing from `levels` count as out of stock. Duplicate cart
/// lines are merged before limits and stock are checked.
pub fn price_cart(
    cart: &Cart,
    products: &[ProductSnapshot],
    levels: &HashMap<ProductId, i64>,
    policy: &ShippingPolicy,
) -> CartResult<Quote> {
    if cart.is_empty() {
        return Err(CartError::EmptyCart);
    }

    let by_id: HashMap<ProductId, &ProductSnapshot> =
        products.iter().map(|p| (p.id, p)).collect();
    let max = cart.max_quantity_per_line();

    let mut lines = Vec::with_capacity(cart.lines.len());
    let mut subtotal: Option<Money> = None;

    for line in cart.merged_lines() {
        if line.quantity == 0 || line.quantity > max {
            return Err(CartError::QuantityOutOfRange {
                product_id: line.product_id,
                quantity: line.quantity,
                max,
            });
        }

        let product = by_id
            .get(&line.product_id)
            .ok_or(CartError::UnknownProduct(line.product_id))?;
        if !product.is_active {
            return Err(CartError::ProductUnavailable(line.product_id));
        }

        let available = levels.get(&line.product_id).copied().unwrap_or(0);
        if i64::from(line.quantity) > available {
            return Err(CartError::InsufficientStock {
                product_id: line.product_id,
                requested: line.quantity,
                available: available.max(0),
            });
        }

        let order_line = OrderLine {
            product_id: product.id,
            name: product.name.clone(),
            sku: product.sku.clone(),
            unit_price: product.unit_price.clone(),
            quantity: line.quantity,
        };
        let line_total = order_line.line_total()?;
        subtotal = Some(match subtotal {
            Some(sum) => sum.checked_add(&line_total)?,
            None => line_total,
        });
        lines.push(order_line);
    }

    let subtotal = subtotal.ok_or(CartError::EmptyCart)?;
    let shipping = policy.shipping_for(&subtotal)?;
    let total = subtotal.checked_add(&shipping)?;

    debug!(
        lines = lines.len(),
        subtotal = subtotal.amount_cents,
        shipping = shipping.amount_cents,
        "[au-03] Cart priced"
    );

    Ok(Quote {
        lines,
        subtotal,
        shipping,
        total,
    })
}
