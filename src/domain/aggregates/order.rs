//! Order rows: the legacy monolithic `Order` (multi-vendor cart embedded in
//! one document) and the newer per-vendor `VendorOrder`.
//!
//! The two shapes coexist; vendor attribution lives in different places in
//! each (`vendor`/`assigned_vendor` on legacy lines, `vendor_id`/legacy
//! `vendor` column on vendor orders). Reconciliation happens in
//! [`crate::analytics`], nowhere else.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::value_objects::Money;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }
}

/// Line inside a legacy order. Older rows attribute the line to `vendor`,
/// newer ones to `assigned_vendor`; either may be present.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub title: String,
    pub quantity: i32,
    pub price: Money,
    pub vendor: Option<Uuid>,
    pub assigned_vendor: Option<Uuid>,
}

impl OrderLine {
    pub fn belongs_to(&self, vendor: Uuid) -> bool {
        self.vendor == Some(vendor) || self.assigned_vendor == Some(vendor)
    }
}

/// Legacy monolithic order with the whole multi-vendor cart embedded.
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub items: Json<Vec<OrderLine>>,
    pub total: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Lines attributed to the given vendor by either vendor field.
    pub fn vendor_lines(&self, vendor: Uuid) -> impl Iterator<Item = &OrderLine> {
        self.items.iter().filter(move |l| l.belongs_to(vendor))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VendorOrderLine {
    pub product_id: Uuid,
    pub title: String,
    pub quantity: i32,
    pub price: Money,
}

/// Per-vendor order row. `vendor_id` is the current column; `vendor` is the
/// legacy one still populated on older rows, so lookups match either.
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct VendorOrder {
    pub id: Uuid,
    pub order_number: String,
    pub vendor_id: Option<Uuid>,
    pub vendor: Option<Uuid>,
    pub status: OrderStatus,
    pub items: Json<Vec<VendorOrderLine>>,
    pub total: Money,
    pub commission_rate: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VendorOrder {
    pub fn belongs_to(&self, vendor: Uuid) -> bool {
        self.vendor_id == Some(vendor) || self.vendor == Some(vendor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_matches_either_vendor_field() {
        let v = Uuid::new_v4();
        let legacy = OrderLine {
            product_id: Uuid::new_v4(),
            title: "Mug".into(),
            quantity: 1,
            price: Money::ZERO,
            vendor: Some(v),
            assigned_vendor: None,
        };
        let reassigned = OrderLine {
            assigned_vendor: Some(v),
            vendor: None,
            ..legacy.clone()
        };
        assert!(legacy.belongs_to(v));
        assert!(reassigned.belongs_to(v));
        assert!(!legacy.belongs_to(Uuid::new_v4()));
    }

    #[test]
    fn vendor_order_matches_either_column() {
        let v = Uuid::new_v4();
        let now = Utc::now();
        let mut order = VendorOrder {
            id: Uuid::new_v4(),
            order_number: "VO-00000001".into(),
            vendor_id: Some(v),
            vendor: None,
            status: OrderStatus::Pending,
            items: Json(vec![]),
            total: Money::ZERO,
            commission_rate: Decimal::new(10, 2),
            created_at: now,
            updated_at: now,
        };
        assert!(order.belongs_to(v));
        order.vendor_id = None;
        order.vendor = Some(v);
        assert!(order.belongs_to(v));
    }

}
