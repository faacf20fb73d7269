//! Domain events raised by aggregate mutations.
//!
//! Events are collected on the aggregate and drained by the handler that
//! persisted the change, which currently logs them. There is no message bus.

use uuid::Uuid;

use crate::domain::aggregates::inventory::{AlertType, MovementType};

#[derive(Clone, Debug)]
pub enum DomainEvent {
    Inventory(InventoryEvent),
}

#[derive(Clone, Debug)]
pub enum InventoryEvent {
    StockAdjusted {
        inventory_id: Uuid,
        movement_type: MovementType,
        quantity: i64,
    },
    StockReserved {
        inventory_id: Uuid,
        order_ref: String,
        quantity: i32,
    },
    ReservationReleased {
        inventory_id: Uuid,
        quantity: i32,
    },
    SaleConfirmed {
        inventory_id: Uuid,
        order_ref: String,
        quantity: i32,
    },
    AlertRaised {
        inventory_id: Uuid,
        alert_type: AlertType,
    },
    ReorderRequested {
        inventory_id: Uuid,
        quantity: i32,
    },
}
