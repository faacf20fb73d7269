//! Vendor analytics and dashboard endpoints.
//!
//! Order data is fetched broadly (vendor orders by either vendor column,
//! legacy orders unfiltered) and reduced in [`crate::analytics`]; the date
//! window is applied in memory, not in SQL.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::analytics::{self, AnalyticsWindow, VendorAnalytics};
use crate::api::ok;
use crate::domain::aggregates::order::{Order, VendorOrder};
use crate::error::ApiResult;
use crate::state::AppState;

const DASHBOARD_WINDOW_DAYS: i64 = 30;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/analytics", get(vendor_analytics))
        .route("/:id/dashboard", get(vendor_dashboard))
}

async fn compute_analytics(
    db: &PgPool,
    vendor: Uuid,
    window: AnalyticsWindow,
) -> ApiResult<VendorAnalytics> {
    let vendor_orders: Vec<VendorOrder> =
        sqlx::query_as("SELECT * FROM vendor_orders WHERE vendor_id = $1 OR vendor = $1")
            .bind(vendor)
            .fetch_all(db)
            .await?;
    let orders: Vec<Order> = sqlx::query_as("SELECT * FROM orders")
        .fetch_all(db)
        .await?;
    let normalized = analytics::normalize_orders(
        vendor,
        &vendor_orders,
        &orders,
        analytics::default_commission_rate(),
    );
    Ok(analytics::compute(&window, &normalized))
}

#[derive(Debug, Deserialize)]
pub struct WindowParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

async fn vendor_analytics(
    State(state): State<AppState>,
    Path(vendor): Path<Uuid>,
    Query(params): Query<WindowParams>,
) -> ApiResult<Json<Value>> {
    let to = params.to.unwrap_or_else(Utc::now);
    let from = params
        .from
        .unwrap_or(to - chrono::Duration::days(DASHBOARD_WINDOW_DAYS));
    let report = compute_analytics(&state.db, vendor, AnalyticsWindow::new(from, to)).await?;
    Ok(ok(report))
}

async fn vendor_dashboard(
    State(state): State<AppState>,
    Path(vendor): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let report = compute_analytics(
        &state.db,
        vendor,
        AnalyticsWindow::last_days(DASHBOARD_WINDOW_DAYS),
    )
    .await?;

    let low_stock_items: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM inventories WHERE vendor_id = $1 \
         AND stock_status IN ('low_stock', 'out_of_stock')",
    )
    .bind(vendor)
    .fetch_one(&state.db)
    .await?;
    let active_products: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM products WHERE vendor_id = $1 AND status = 'active'",
    )
    .bind(vendor)
    .fetch_one(&state.db)
    .await?;

    Ok(ok(json!({
        "analytics": report,
        "low_stock_items": low_stock_items,
        "active_products": active_products,
    })))
}
