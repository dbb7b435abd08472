//! Cart lines

use crate::error::{CartError, CartResult};
use serde::{Deserialize, Serialize};
use shared_types::ProductId;

/// Upper bound on a single line's quantity unless configured otherwise.
pub const DEFAULT_MAX_QUANTITY_PER_LINE: u32 = 10;

fn default_max_quantity() -> u32 {
    DEFAULT_MAX_QUANTITY_PER_LINE
}

/// One product and quantity. Carts carry no prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A shopping cart as sent by the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub lines: Vec<CartLine>,
    #[serde(skip, default = "default_max_quantity")]
    max_quantity_per_line: u32,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            max_quantity_per_line: DEFAULT_MAX_QUANTITY_PER_LINE,
        }
    }

    /// Build a cart from raw lines. Lines are validated when priced.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        Self {
            lines,
            ..Self::new()
        }
    }

    #[must_use]
    pub fn with_max_quantity_per_line(mut self, max: u32) -> Self {
        self.max_quantity_per_line = max.max(1);
        self
    }

    pub fn max_quantity_per_line(&self) -> u32 {
        self.max_quantity_per_line
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of items across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.lines
            .iter()
            .filter(|l| l.product_id == product_id)
            .map(|l| l.quantity)
            .sum()
    }

    fn check_quantity(&self, product_id: ProductId, quantity: u32) -> CartResult<()> {
        if quantity == 0 || quantity > self.max_quantity_per_line {
            return Err(CartError::QuantityOutOfRange {
                product_id,
                quantity,
                max: self.max_quantity_per_line,
            });
        }
        Ok(())
    }

    /// Add `quantity` of a product, merging with an existing line.
    pub fn add(&mut self, product_id: ProductId, quantity: u32) -> CartResult<()> {
        self.check_quantity(product_id, quantity)?;
        let merged = self.quantity_of(product_id).saturating_add(quantity);
        self.check_quantity(product_id, merged)?;

        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => line.quantity = merged,
            None => self.lines.push(CartLine {
                product_id,
                quantity,
            }),
        }
        Ok(())
    }

    /// Replace a line's quantity; zero removes the line.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> CartResult<()> {
        if quantity == 0 {
            self.remove(product_id);
            return Ok(());
        }
        self.check_quantity(product_id, quantity)?;

        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => line.quantity = quantity,
            None => self.lines.push(CartLine {
                product_id,
                quantity,
            }),
        }
        Ok(())
    }

    /// Remove a product. Returns whether a line existed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines with duplicates merged, in first-seen order.
    pub fn merged_lines(&self) -> Vec<CartLine> {
        let mut merged: Vec<CartLine> = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            match merged.iter_mut().find(|m| m.product_id == line.product_id) {
                Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
                None => merged.push(*line),
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_merges_lines() {
        let mut cart = Cart::new();
        let ring = ProductId::new();
        cart.add(ring, 2).unwrap();
        cart.add(ring, 3).unwrap();

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.quantity_of(ring), 5);
    }

    #[test]
    fn test_add_beyond_limit_rejected() {
        let mut cart = Cart::new();
        let ring = ProductId::new();
        cart.add(ring, 8).unwrap();

        let err = cart.add(ring, 3).unwrap_err();
        assert_eq!(
            err,
            CartError::QuantityOutOfRange {
                product_id: ring,
                quantity: 11,
                max: DEFAULT_MAX_QUANTITY_PER_LINE,
            }
        );
        assert_eq!(cart.quantity_of(ring), 8);
    }

    #[test]
    fn test_add_zero_rejected() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.add(ProductId::new(), 0),
            Err(CartError::QuantityOutOfRange { quantity: 0, .. })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = Cart::new();
        let ring = ProductId::new();
        cart.add(ring, 1).unwrap();
        cart.set_quantity(ring, 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_custom_limit() {
        let mut cart = Cart::new().with_max_quantity_per_line(2);
        let ring = ProductId::new();
        assert!(cart.set_quantity(ring, 3).is_err());
        cart.set_quantity(ring, 2).unwrap();
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_merged_lines_keep_first_seen_order() {
        let a = ProductId::new();
        let b = ProductId::new();
        let cart = Cart::from_lines(vec![
            CartLine { product_id: a, quantity: 1 },
            CartLine { product_id: b, quantity: 1 },
            CartLine { product_id: a, quantity: 2 },
        ]);

        let merged = cart.merged_lines();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], CartLine { product_id: a, quantity: 3 });
        assert_eq!(merged[1].product_id, b);
    }

    #[test]
    fn test_deserialize_applies_default_limit() {
        let id = ProductId::new();
        let json = format!(r#"{{"lines":[{{"product_id":"{id}","quantity":2}}]}}"#);
        let cart: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(cart.max_quantity_per_line(), DEFAULT_MAX_QUANTITY_PER_LINE);
        assert_eq!(cart.quantity_of(id), 2);
    }
}
