//! Inventory aggregate: the per-(product, vendor) stock ledger.
//!
//! One row per product–vendor pair. Mutations go through the methods here,
//! which keep three derived facts consistent before anything is persisted:
//! `available_stock` (= current − reserved, floored at 0), `stock_status`
//! (threshold-driven unless pinned to discontinued), and the alert list.
//! The movement log is append-only; no method removes entries.
//!
//! Writes follow read-row, mutate-aggregate, write-row. There is no
//! optimistic locking, so concurrent reservations against one row can race.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::events::{DomainEvent, InventoryEvent};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "stock_status", rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
    Discontinued,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Purchase,
    Sale,
    Return,
    Adjustment,
    Transfer,
    Damage,
    Expiry,
}

/// Append-only ledger entry. `quantity` is signed and explains the change.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StockMovement {
    pub movement_type: MovementType,
    pub quantity: i64,
    pub reason: String,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    LowStock,
    OutOfStock,
    ReorderNeeded,
    BatchExpired,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StockAlert {
    pub id: Uuid,
    pub alert_type: AlertType,
    pub message: String,
    pub severity: AlertSeverity,
    pub acknowledged: bool,
    pub acknowledged_by: Option<String>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Active,
    Depleted,
    Expired,
}

/// Lot record. An active batch past its expiry raises a critical alert.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Batch {
    pub lot_number: String,
    pub quantity: i32,
    pub expires_at: Option<DateTime<Utc>>,
    pub status: BatchStatus,
}

impl Batch {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == BatchStatus::Active
            && self.expires_at.is_some_and(|exp| exp <= now)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Inventory {
    pub id: Uuid,
    pub product_id: Uuid,
    pub vendor_id: Uuid,
    pub current_stock: i32,
    pub reserved_stock: i32,
    pub available_stock: i32,
    pub stock_status: StockStatus,
    pub low_stock_threshold: i32,
    pub out_of_stock_threshold: i32,
    pub reorder_point: i32,
    pub reorder_quantity: i32,
    pub auto_reorder_enabled: bool,
    pub batches: Json<Vec<Batch>>,
    pub movements: Json<Vec<StockMovement>>,
    pub alerts: Json<Vec<StockAlert>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    #[sqlx(skip)]
    events: Vec<DomainEvent>,
}

#[derive(Debug, Clone, Error)]
pub enum InventoryError {
    #[error("quantity must be positive")]
    InvalidQuantity,
    #[error("adjustment of {quantity} would drive stock below zero (current {current})")]
    NegativeStock { quantity: i64, current: i32 },
    #[error("adjustment of {quantity} exceeds the stock counter range")]
    StockOverflow { quantity: i64 },
    #[error("cannot reserve {requested}: only {available} available")]
    InsufficientAvailable { requested: i32, available: i32 },
    #[error("cannot confirm sale of {requested}: only {reserved} reserved")]
    InsufficientReserved { requested: i32, reserved: i32 },
    #[error("alert not found")]
    AlertNotFound,
}

impl Inventory {
    pub fn new(product_id: Uuid, vendor_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            product_id,
            vendor_id,
            current_stock: 0,
            reserved_stock: 0,
            available_stock: 0,
            stock_status: StockStatus::OutOfStock,
            low_stock_threshold: 10,
            out_of_stock_threshold: 0,
            reorder_point: 10,
            reorder_quantity: 50,
            auto_reorder_enabled: false,
            batches: Json(vec![]),
            movements: Json(vec![]),
            alerts: Json(vec![]),
            created_at: now,
            updated_at: now,
            events: vec![],
        }
    }

    /// Signed stock adjustment. Positive quantities receive stock, negative
    /// ones remove it; an adjustment may never push `current_stock` below
    /// zero.
    pub fn add_stock(
        &mut self,
        quantity: i64,
        movement_type: MovementType,
        reason: impl Into<String>,
        reference: Option<String>,
    ) -> Result<(), InventoryError> {
        if quantity == 0 {
            return Err(InventoryError::InvalidQuantity);
        }
        let next = i64::from(self.current_stock)
            .checked_add(quantity)
            .ok_or(InventoryError::StockOverflow { quantity })?;
        if next < 0 {
            return Err(InventoryError::NegativeStock {
                quantity,
                current: self.current_stock,
            });
        }
        self.current_stock =
            i32::try_from(next).map_err(|_| InventoryError::StockOverflow { quantity })?;
        self.log_movement(movement_type, quantity, reason, reference);
        self.raise(InventoryEvent::StockAdjusted {
            inventory_id: self.id,
            movement_type,
            quantity,
        });
        self.recalculate();
        self.check_and_create_alerts();
        Ok(())
    }

    /// Holds stock against an open order. Fails when the request exceeds
    /// what is available (current minus already-reserved).
    pub fn reserve_stock(&mut self, quantity: i32, order_ref: &str) -> Result<(), InventoryError> {
        if quantity <= 0 {
            return Err(InventoryError::InvalidQuantity);
        }
        if quantity > self.available_stock {
            return Err(InventoryError::InsufficientAvailable {
                requested: quantity,
                available: self.available_stock,
            });
        }
        self.reserved_stock += quantity;
        self.log_movement(
            MovementType::Sale,
            -i64::from(quantity),
            format!("Stock reserved for order {order_ref}"),
            Some(order_ref.to_string()),
        );
        self.raise(InventoryEvent::StockReserved {
            inventory_id: self.id,
            order_ref: order_ref.to_string(),
            quantity,
        });
        self.recalculate();
        self.check_and_create_alerts();
        Ok(())
    }

    /// Returns held stock to the available pool, capped at what is actually
    /// reserved (releasing more than was held is a no-op on the excess).
    pub fn release_reserved_stock(&mut self, quantity: i32) -> Result<(), InventoryError> {
        if quantity <= 0 {
            return Err(InventoryError::InvalidQuantity);
        }
        let released = quantity.min(self.reserved_stock);
        self.reserved_stock -= released;
        self.log_movement(
            MovementType::Return,
            i64::from(released),
            "Reserved stock released",
            None,
        );
        self.raise(InventoryEvent::ReservationReleased {
            inventory_id: self.id,
            quantity: released,
        });
        self.recalculate();
        self.check_and_create_alerts();
        Ok(())
    }

    /// Converts a reservation into a completed sale: both `current_stock`
    /// and `reserved_stock` drop by `quantity`.
    pub fn confirm_sale(&mut self, quantity: i32, order_ref: &str) -> Result<(), InventoryError> {
        if quantity <= 0 {
            return Err(InventoryError::InvalidQuantity);
        }
        if quantity > self.reserved_stock {
            return Err(InventoryError::InsufficientReserved {
                requested: quantity,
                reserved: self.reserved_stock,
            });
        }
        self.current_stock = (self.current_stock - quantity).max(0);
        self.reserved_stock -= quantity;
        self.log_movement(
            MovementType::Sale,
            -i64::from(quantity),
            format!("Sale confirmed for order {order_ref}"),
            Some(order_ref.to_string()),
        );
        self.raise(InventoryEvent::SaleConfirmed {
            inventory_id: self.id,
            order_ref: order_ref.to_string(),
            quantity,
        });
        self.recalculate();
        self.check_and_create_alerts();
        Ok(())
    }

    /// Idempotent per unacknowledged type: a second alert of the same type is
    /// not added while one is still open.
    pub fn create_alert(
        &mut self,
        alert_type: AlertType,
        message: impl Into<String>,
        severity: AlertSeverity,
    ) {
        let open = self
            .alerts
            .iter()
            .any(|a| a.alert_type == alert_type && !a.acknowledged);
        if open {
            return;
        }
        self.alerts.push(StockAlert {
            id: Uuid::new_v4(),
            alert_type,
            message: message.into(),
            severity,
            acknowledged: false,
            acknowledged_by: None,
            acknowledged_at: None,
            created_at: Utc::now(),
        });
        self.raise(InventoryEvent::AlertRaised {
            inventory_id: self.id,
            alert_type,
        });
    }

    /// Runs after every stock-affecting write. Conditions are evaluated
    /// independently, so one mutation can raise several alert types.
    pub fn check_and_create_alerts(&mut self) {
        if self.stock_status == StockStatus::OutOfStock {
            self.create_alert(
                AlertType::OutOfStock,
                format!("Product {} is out of stock", self.product_id),
                AlertSeverity::Critical,
            );
        }
        if self.stock_status == StockStatus::LowStock {
            self.create_alert(
                AlertType::LowStock,
                format!(
                    "Stock for product {} is low ({} remaining)",
                    self.product_id, self.current_stock
                ),
                AlertSeverity::Warning,
            );
        }
        if self.available_stock <= self.reorder_point
            && self.stock_status != StockStatus::Discontinued
        {
            self.create_alert(
                AlertType::ReorderNeeded,
                format!(
                    "Available stock ({}) is at or below the reorder point ({})",
                    self.available_stock, self.reorder_point
                ),
                AlertSeverity::Warning,
            );
            if self.auto_reorder_enabled {
                let quantity = self.reorder_quantity;
                self.raise(InventoryEvent::ReorderRequested {
                    inventory_id: self.id,
                    quantity,
                });
            }
        }
        let now = Utc::now();
        if self.batches.iter().any(|b| b.is_expired(now)) {
            self.create_alert(
                AlertType::BatchExpired,
                "One or more active batches have passed their expiry date",
                AlertSeverity::Critical,
            );
        }
    }

    pub fn acknowledge_alert(
        &mut self,
        alert_id: Uuid,
        actor: impl Into<String>,
    ) -> Result<(), InventoryError> {
        let alert = self
            .alerts
            .iter_mut()
            .find(|a| a.id == alert_id)
            .ok_or(InventoryError::AlertNotFound)?;
        alert.acknowledged = true;
        alert.acknowledged_by = Some(actor.into());
        alert.acknowledged_at = Some(Utc::now());
        self.touch();
        Ok(())
    }

    pub fn record_batch(&mut self, batch: Batch) {
        self.batches.push(batch);
        self.touch();
        self.check_and_create_alerts();
    }

    pub fn unacknowledged_alerts(&self) -> impl Iterator<Item = &StockAlert> {
        self.alerts.iter().filter(|a| !a.acknowledged)
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn log_movement(
        &mut self,
        movement_type: MovementType,
        quantity: i64,
        reason: impl Into<String>,
        reference: Option<String>,
    ) {
        self.movements.push(StockMovement {
            movement_type,
            quantity,
            reason: reason.into(),
            reference,
            created_at: Utc::now(),
        });
    }

    /// Re-derives `available_stock` and `stock_status`. A manual
    /// `discontinued` pin survives stock changes.
    fn recalculate(&mut self) {
        self.available_stock = (self.current_stock - self.reserved_stock).max(0);
        if self.stock_status != StockStatus::Discontinued {
            self.stock_status = if self.current_stock <= self.out_of_stock_threshold {
                StockStatus::OutOfStock
            } else if self.current_stock <= self.low_stock_threshold {
                StockStatus::LowStock
            } else {
                StockStatus::InStock
            };
        }
        self.touch();
    }

    fn raise(&mut self, event: InventoryEvent) {
        self.events.push(DomainEvent::Inventory(event));
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
