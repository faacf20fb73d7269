//! Cart aggregate: one row per user.
//!
//! Each line snapshots the product fields it needs (`product_data`), so a
//! cart stays renderable after the product is deleted. Totals are never
//! maintained incrementally; every save folds the full item array.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::value_objects::{Money, Quantity, Sku};

/// Carts untouched for this long are treated as expired and reset.
pub const CART_TTL_DAYS: i64 = 30;

/// Denormalized copy of the product fields a cart line needs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub product_id: Uuid,
    pub title: String,
    pub sku: Sku,
    pub price: Money,
    pub vendor_id: Option<Uuid>,
    pub handling_days: Option<i32>,
    pub shipping_cost: Option<Money>,
    pub slug: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: Uuid,
    pub quantity: Quantity,
    pub price: Money,
    pub product_data: ProductSnapshot,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity.value())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Json<Vec<CartItem>>,
    pub total_items: i32,
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Error)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error("requested {requested} but only {available} in stock")]
    InsufficientStock { requested: u32, available: u32 },
    #[error("item not in cart")]
    ItemNotFound,
}

impl Cart {
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            items: Json(vec![]),
            total_items: 0,
            total_amount: Money::ZERO,
            created_at: now,
            updated_at: now,
            expires_at: now + Duration::days(CART_TTL_DAYS),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds a line (or merges into an existing one for the same product).
    /// The merged quantity is validated against the live product stock.
    pub fn add_item(
        &mut self,
        snapshot: ProductSnapshot,
        quantity: u32,
        available_stock: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        let merged = self
            .items
            .iter()
            .find(|i| i.product_id == snapshot.product_id)
            .map_or(quantity, |i| i.quantity.add(quantity).value());
        if merged > available_stock {
            return Err(CartError::InsufficientStock {
                requested: merged,
                available: available_stock,
            });
        }
        match self
            .items
            .iter_mut()
            .find(|i| i.product_id == snapshot.product_id)
        {
            Some(existing) => {
                existing.quantity = Quantity::new(merged);
                existing.price = snapshot.price;
                existing.product_data = snapshot;
            }
            None => self.items.push(CartItem {
                product_id: snapshot.product_id,
                quantity: Quantity::new(quantity),
                price: snapshot.price,
                product_data: snapshot,
                added_at: Utc::now(),
            }),
        }
        self.recalculate();
        Ok(())
    }

    /// Sets the quantity of an existing line; zero removes it.
    pub fn set_quantity(
        &mut self,
        product_id: Uuid,
        quantity: u32,
        available_stock: u32,
    ) -> Result<(), CartError> {
        if !self.items.iter().any(|i| i.product_id == product_id) {
            return Err(CartError::ItemNotFound);
        }
        if quantity == 0 {
            self.items.retain(|i| i.product_id != product_id);
        } else {
            if quantity > available_stock {
                return Err(CartError::InsufficientStock {
                    requested: quantity,
                    available: available_stock,
                });
            }
            if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
                item.quantity = Quantity::new(quantity);
            }
        }
        self.recalculate();
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: Uuid) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        if self.items.len() == before {
            return Err(CartError::ItemNotFound);
        }
        self.recalculate();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.recalculate();
    }

    /// Full-array reduction; also pushes the expiry window out.
    fn recalculate(&mut self) {
        self.total_items = self
            .items
            .iter()
            .map(|i| i.quantity.value() as i32)
            .sum();
        self.total_amount = self
            .items
            .iter()
            .fold(Money::ZERO, |acc, i| acc.plus(i.line_total()));
        let now = Utc::now();
        self.updated_at = now;
        self.expires_at = now + Duration::days(CART_TTL_DAYS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn snapshot(product_id: Uuid, price: i64) -> ProductSnapshot {
        ProductSnapshot {
            product_id,
            title: "Widget".into(),
            sku: Sku::new("W-001").unwrap(),
            price: Money::new(Decimal::new(price, 2)),
            vendor_id: Some(Uuid::new_v4()),
            handling_days: Some(2),
            shipping_cost: None,
            slug: "widget".into(),
        }
    }

    #[test]
    fn totals_are_recomputed_from_all_items() {
        let mut cart = Cart::new(Uuid::new_v4());
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        cart.add_item(snapshot(a, 1000), 2, 10).unwrap(); // 2 × 10.00
        cart.add_item(snapshot(b, 550), 3, 10).unwrap(); // 3 × 5.50
        assert_eq!(cart.total_items, 5);
        assert_eq!(cart.total_amount.amount(), Decimal::new(3650, 2));
    }

    #[test]
    fn adding_same_product_merges_and_revalidates() {
        let mut cart = Cart::new(Uuid::new_v4());
        let p = Uuid::new_v4();
        cart.add_item(snapshot(p, 1000), 3, 5).unwrap();
        let err = cart.add_item(snapshot(p, 1000), 3, 5).unwrap_err();
        assert!(matches!(
            err,
            CartError::InsufficientStock {
                requested: 6,
                available: 5
            }
        ));
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total_items, 3);
    }

    #[test]
    fn zero_quantity_removes_line() {
        let mut cart = Cart::new(Uuid::new_v4());
        let p = Uuid::new_v4();
        cart.add_item(snapshot(p, 1000), 2, 10).unwrap();
        cart.set_quantity(p, 0, 10).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total_amount, Money::ZERO);
    }

    #[test]
    fn remove_missing_item_errors() {
        let mut cart = Cart::new(Uuid::new_v4());
        assert!(matches!(
            cart.remove_item(Uuid::new_v4()),
            Err(CartError::ItemNotFound)
        ));
    }

    #[test]
    fn snapshot_survives_independent_of_product() {
        let mut cart = Cart::new(Uuid::new_v4());
        let p = Uuid::new_v4();
        cart.add_item(snapshot(p, 1000), 1, 10).unwrap();
        // The line keeps its own copy of the product fields.
        assert_eq!(cart.items[0].product_data.title, "Widget");
        assert_eq!(cart.items[0].product_data.product_id, p);
    }

    #[test]
    fn save_extends_expiry() {
        let mut cart = Cart::new(Uuid::new_v4());
        let first = cart.expires_at;
        cart.add_item(snapshot(Uuid::new_v4(), 100), 1, 10).unwrap();
        assert!(cart.expires_at >= first);
        assert!(!cart.is_expired(Utc::now()));
    }
}
