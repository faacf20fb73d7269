//! Value objects shared across the marketplace domain.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// SKU (Stock Keeping Unit). Normalized to uppercase, at most 50 characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct Sku(String);

impl Sku {
    pub fn new(value: impl Into<String>) -> Result<Self, SkuError> {
        let value = value.into().trim().to_uppercase();
        if value.is_empty() {
            return Err(SkuError::Empty);
        }
        if value.len() > 50 {
            return Err(SkuError::TooLong);
        }
        Ok(Self(value))
    }

    /// Random marketplace SKU for products created without one.
    pub fn generate() -> Self {
        Self(format!("SKU-{:08}", rand::random::<u32>() % 100_000_000))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Error)]
pub enum SkuError {
    #[error("SKU must not be empty")]
    Empty,
    #[error("SKU must be at most 50 characters")]
    TooLong,
}

/// Monetary amount. A thin wrapper over `Decimal` so totals, line sums and
/// commission math stay in one place; maps to NUMERIC columns unchanged.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn plus(&self, other: Money) -> Money {
        Money(self.0 + other.0)
    }

    pub fn times(&self, qty: u32) -> Money {
        Money(self.0 * Decimal::from(qty))
    }

    /// Amount kept by the vendor after the marketplace commission
    /// (`rate` is a fraction, e.g. 0.10 for 10%). Rounded to cents.
    pub fn net_of_commission(&self, rate: Decimal) -> Money {
        Money((self.0 * (Decimal::ONE - rate)).round_dp(2))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-negative item quantity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn add(&self, other: u32) -> Self {
        Self(self.0.saturating_add(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sku_is_normalized() {
        let sku = Sku::new("  prod-001 ").unwrap();
        assert_eq!(sku.as_str(), "PROD-001");
    }

    #[test]
    fn sku_rejects_empty() {
        assert!(Sku::new("   ").is_err());
    }

    #[test]
    fn generated_sku_is_valid() {
        let sku = Sku::generate();
        assert!(sku.as_str().starts_with("SKU-"));
        assert!(sku.as_str().len() <= 50);
    }

    #[test]
    fn money_line_math() {
        let price = Money::new(Decimal::new(1999, 2));
        assert_eq!(price.times(3).amount(), Decimal::new(5997, 2));
        assert_eq!(
            price.plus(Money::new(Decimal::new(1, 2))).amount(),
            Decimal::new(2000, 2)
        );
    }

    #[test]
    fn commission_is_deducted_and_rounded() {
        let gross = Money::new(Decimal::new(10000, 2)); // 100.00
        let net = gross.net_of_commission(Decimal::new(10, 2)); // 10%
        assert_eq!(net.amount(), Decimal::new(9000, 2));
    }

    #[test]
    fn quantity_saturates() {
        let q = Quantity::new(u32::MAX);
        assert_eq!(q.add(1).value(), u32::MAX);
    }
}
