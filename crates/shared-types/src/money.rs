//! # Money
//!
//! Amounts are kept in minor units (cents) with an explicit currency.
//! Arithmetic is checked: overflow and currency mixing are errors, never
//! silent wrap-arounds.

use crate::errors::MoneyError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO-4217 currency code, normalized to lowercase (`"usd"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    /// Parse and normalize a currency code.
    pub fn new(code: &str) -> Result<Self, MoneyError> {
        let code = code.trim().to_ascii_lowercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(MoneyError::InvalidCurrency(code));
        }
        Ok(Self(code))
    }

    /// US dollars.
    #[must_use]
    pub fn usd() -> Self {
        Self("usd".to_string())
    }

    /// The lowercase code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.0
    }

    fn symbol(&self) -> Option<&'static str> {
        match self.0.as_str() {
            "usd" | "cad" | "aud" => Some("$"),
            "eur" => Some("€"),
            "gbp" => Some("£"),
            _ => None,
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::usd()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_ascii_uppercase())
    }
}

/// An amount of money in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in minor units (cents).
    pub amount_cents: i64,
    /// Currency of the amount.
    pub currency: Currency,
}

impl Money {
    /// Create an amount.
    #[must_use]
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
        }
    }

    /// Zero in the given currency.
    #[must_use]
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Shorthand for a USD amount.
    #[must_use]
    pub fn usd(amount_cents: i64) -> Self {
        Self::new(amount_cents, Currency::usd())
    }

    /// True when the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Add two amounts of the same currency.
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency.code().to_string(),
                right: other.currency.code().to_string(),
            });
        }
        let amount_cents = self
            .amount_cents
            .checked_add(other.amount_cents)
            .ok_or(MoneyError::Overflow)?;
        Ok(Money::new(amount_cents, self.currency.clone()))
    }

    /// Multiply by a quantity.
    pub fn checked_mul(&self, quantity: u32) -> Result<Money, MoneyError> {
        let amount_cents = self
            .amount_cents
            .checked_mul(i64::from(quantity))
            .ok_or(MoneyError::Overflow)?;
        Ok(Money::new(amount_cents, self.currency.clone()))
    }

    /// Human-readable rendering for emails and logs, e.g. `$1,234.50`.
    #[must_use]
    pub fn format(&self) -> String {
        let negative = self.amount_cents < 0;
        let abs = self.amount_cents.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;

        let digits = units.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if negative { "-" } else { "" };
        match self.currency.symbol() {
            Some(symbol) => format!("{sign}{symbol}{grouped}.{cents:02}"),
            None => format!("{sign}{grouped}.{cents:02} {}", self.currency),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}
