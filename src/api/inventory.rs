//! Inventory endpoints: the stock ledger operations plus alert handling.
//!
//! Every mutation loads the row, runs the aggregate method, and writes the
//! whole row back. Domain events raised along the way are logged after the
//! write succeeds.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::api::{ok, Page};
use crate::domain::aggregates::inventory::{
    Batch, BatchStatus, Inventory, MovementType, StockStatus,
};
use crate::domain::events::{DomainEvent, InventoryEvent};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inventory))
        .route("/low-stock", get(low_stock))
        .route("/:id", get(get_inventory))
        .route("/:id/stock", post(adjust_stock))
        .route("/:id/batches", post(add_batch))
        .route("/:id/reserve", post(reserve))
        .route("/:id/release", post(release))
        .route("/:id/confirm-sale", post(confirm_sale))
        .route("/:id/alerts/:alert_id/acknowledge", post(acknowledge_alert))
}

pub(crate) async fn insert_inventory(db: &PgPool, inv: &Inventory) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO inventories (id, product_id, vendor_id, current_stock, reserved_stock, \
         available_stock, stock_status, low_stock_threshold, out_of_stock_threshold, \
         reorder_point, reorder_quantity, auto_reorder_enabled, batches, movements, alerts, \
         created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
    )
    .bind(inv.id)
    .bind(inv.product_id)
    .bind(inv.vendor_id)
    .bind(inv.current_stock)
    .bind(inv.reserved_stock)
    .bind(inv.available_stock)
    .bind(inv.stock_status)
    .bind(inv.low_stock_threshold)
    .bind(inv.out_of_stock_threshold)
    .bind(inv.reorder_point)
    .bind(inv.reorder_quantity)
    .bind(inv.auto_reorder_enabled)
    .bind(&inv.batches)
    .bind(&inv.movements)
    .bind(&inv.alerts)
    .bind(inv.created_at)
    .bind(inv.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

async fn persist(db: &PgPool, inv: &Inventory) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE inventories SET current_stock = $2, reserved_stock = $3, available_stock = $4, \
         stock_status = $5, batches = $6, movements = $7, alerts = $8, updated_at = $9 \
         WHERE id = $1",
    )
    .bind(inv.id)
    .bind(inv.current_stock)
    .bind(inv.reserved_stock)
    .bind(inv.available_stock)
    .bind(inv.stock_status)
    .bind(&inv.batches)
    .bind(&inv.movements)
    .bind(&inv.alerts)
    .bind(inv.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

async fn load(db: &PgPool, id: Uuid) -> ApiResult<Inventory> {
    sqlx::query_as("SELECT * FROM inventories WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or(ApiError::NotFound("inventory"))
}

pub(crate) fn log_domain_events(events: Vec<DomainEvent>) {
    for event in events {
        match &event {
            DomainEvent::Inventory(InventoryEvent::ReorderRequested {
                inventory_id,
                quantity,
            }) => {
                tracing::info!(%inventory_id, quantity, "auto-reorder requested");
            }
            other => tracing::debug!(event = ?other, "domain event"),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InventoryListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub vendor: Option<Uuid>,
    pub status: Option<StockStatus>,
}

async fn list_inventory(
    State(state): State<AppState>,
    Query(params): Query<InventoryListParams>,
) -> ApiResult<Json<Value>> {
    let page = Page::clamp(params.page, params.per_page);
    let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM inventories WHERE TRUE");
    if let Some(vendor) = params.vendor {
        qb.push(" AND vendor_id = ").push_bind(vendor);
    }
    if let Some(status) = params.status {
        qb.push(" AND stock_status = ").push_bind(status);
    }
    qb.push(" ORDER BY updated_at DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let rows: Vec<Inventory> = qb.build_query_as().fetch_all(&state.db).await?;
    Ok(ok(json!({ "inventories": rows, "page": page.page })))
}

async fn low_stock(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let rows: Vec<Inventory> = sqlx::query_as(
        "SELECT * FROM inventories WHERE stock_status IN ('low_stock', 'out_of_stock') \
         ORDER BY available_stock ASC",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(ok(rows))
}

async fn get_inventory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    Ok(ok(load(&state.db, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    /// Signed: positive receives stock, negative removes it.
    pub quantity: i64,
    pub movement_type: MovementType,
    pub reason: String,
    pub reference: Option<String>,
}

async fn adjust_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AdjustStockRequest>,
) -> ApiResult<Json<Value>> {
    let mut inv = load(&state.db, id).await?;
    inv.add_stock(req.quantity, req.movement_type, req.reason, req.reference)?;
    persist(&state.db, &inv).await?;
    log_domain_events(inv.take_events());
    Ok(ok(inv))
}

#[derive(Debug, Deserialize)]
pub struct AddBatchRequest {
    pub lot_number: String,
    pub quantity: i32,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

async fn add_batch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddBatchRequest>,
) -> ApiResult<Json<Value>> {
    if req.quantity < 0 {
        return Err(ApiError::Validation("batch quantity must not be negative".into()));
    }
    let mut inv = load(&state.db, id).await?;
    inv.record_batch(Batch {
        lot_number: req.lot_number,
        quantity: req.quantity,
        expires_at: req.expires_at,
        status: BatchStatus::Active,
    });
    persist(&state.db, &inv).await?;
    log_domain_events(inv.take_events());
    Ok(ok(inv))
}

#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    pub quantity: i32,
    pub order_ref: String,
}

async fn reserve(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReserveRequest>,
) -> ApiResult<Json<Value>> {
    let mut inv = load(&state.db, id).await?;
    inv.reserve_stock(req.quantity, &req.order_ref)?;
    persist(&state.db, &inv).await?;
    log_domain_events(inv.take_events());
    Ok(ok(inv))
}

#[derive(Debug, Deserialize)]
pub struct ReleaseRequest {
    pub quantity: i32,
}

async fn release(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReleaseRequest>,
) -> ApiResult<Json<Value>> {
    let mut inv = load(&state.db, id).await?;
    inv.release_reserved_stock(req.quantity)?;
    persist(&state.db, &inv).await?;
    log_domain_events(inv.take_events());
    Ok(ok(inv))
}

#[derive(Debug, Deserialize)]
pub struct ConfirmSaleRequest {
    pub quantity: i32,
    pub order_ref: String,
}

async fn confirm_sale(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ConfirmSaleRequest>,
) -> ApiResult<Json<Value>> {
    let mut inv = load(&state.db, id).await?;
    inv.confirm_sale(req.quantity, &req.order_ref)?;
    persist(&state.db, &inv).await?;
    log_domain_events(inv.take_events());
    Ok(ok(inv))
}

#[derive(Debug, Deserialize)]
pub struct AcknowledgeRequest {
    pub acknowledged_by: String,
}

async fn acknowledge_alert(
    State(state): State<AppState>,
    Path((id, alert_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<AcknowledgeRequest>,
) -> ApiResult<Json<Value>> {
    let mut inv = load(&state.db, id).await?;
    inv.acknowledge_alert(alert_id, req.acknowledged_by)?;
    sqlx::query("UPDATE inventories SET alerts = $2, updated_at = $3 WHERE id = $1")
        .bind(inv.id)
        .bind(&inv.alerts)
        .bind(inv.updated_at)
        .execute(&state.db)
        .await?;
    Ok(ok(inv))
}
