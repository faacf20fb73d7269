//! Aggregates module

pub mod cart;
pub mod inventory;
pub mod order;
pub mod product;

pub use cart::{Cart, CartError, CartItem, ProductSnapshot};
pub use inventory::{
    AlertSeverity, AlertType, Batch, Inventory, InventoryError, MovementType, StockAlert,
    StockMovement, StockStatus,
};
pub use order::{Order, OrderLine, OrderStatus, VendorOrder, VendorOrderLine};
pub use product::{CreatorRole, NewProduct, Product, ProductStatus};
