//! Cart endpoints. One cart per user, fetched or created on first touch.
//!
//! Quantities are validated against the live product's stock on every write;
//! the stored line keeps its own product snapshot afterwards.

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::{message, ok};
use crate::domain::aggregates::cart::Cart;
use crate::domain::aggregates::product::Product;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:user_id", get(get_cart).delete(clear_cart))
        .route("/:user_id/items", post(add_item))
        .route(
            "/:user_id/items/:product_id",
            put(update_item).delete(remove_item),
        )
}

/// Loads the user's cart, creating one when missing and resetting one that
/// has sat past its expiry.
async fn load_or_create(db: &PgPool, user_id: Uuid) -> ApiResult<Cart> {
    let existing: Option<Cart> = sqlx::query_as("SELECT * FROM carts WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await?;
    match existing {
        Some(mut cart) => {
            if cart.is_expired(chrono::Utc::now()) && !cart.is_empty() {
                tracing::info!(cart_id = %cart.id, "resetting expired cart");
                cart.clear();
                save(db, &cart).await?;
            }
            Ok(cart)
        }
        None => {
            let cart = Cart::new(user_id);
            sqlx::query(
                "INSERT INTO carts (id, user_id, items, total_items, total_amount, \
                 created_at, updated_at, expires_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(cart.id)
            .bind(cart.user_id)
            .bind(&cart.items)
            .bind(cart.total_items)
            .bind(cart.total_amount)
            .bind(cart.created_at)
            .bind(cart.updated_at)
            .bind(cart.expires_at)
            .execute(db)
            .await?;
            Ok(cart)
        }
    }
}

async fn save(db: &PgPool, cart: &Cart) -> ApiResult<()> {
    sqlx::query(
        "UPDATE carts SET items = $2, total_items = $3, total_amount = $4, \
         updated_at = $5, expires_at = $6 WHERE id = $1",
    )
    .bind(cart.id)
    .bind(&cart.items)
    .bind(cart.total_items)
    .bind(cart.total_amount)
    .bind(cart.updated_at)
    .bind(cart.expires_at)
    .execute(db)
    .await?;
    Ok(())
}

async fn live_product(db: &PgPool, product_id: Uuid) -> ApiResult<Product> {
    sqlx::query_as("SELECT * FROM products WHERE id = $1 AND status = 'active'")
        .bind(product_id)
        .fetch_optional(db)
        .await?
        .ok_or(ApiError::NotFound("product"))
}

async fn get_cart(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let cart = load_or_create(&state.db, user_id).await?;
    Ok(ok(cart))
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    pub quantity: u32,
}

async fn add_item(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<AddItemRequest>,
) -> ApiResult<Json<Value>> {
    let mut cart = load_or_create(&state.db, user_id).await?;
    let product = live_product(&state.db, req.product_id).await?;
    cart.add_item(product.snapshot(), req.quantity, product.stock.max(0) as u32)?;
    save(&state.db, &cart).await?;
    Ok(ok(cart))
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

async fn update_item(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateItemRequest>,
) -> ApiResult<Json<Value>> {
    let mut cart = load_or_create(&state.db, user_id).await?;
    // Removal needs no stock check; a new quantity is validated against the
    // live product like any other write.
    let available = if req.quantity == 0 {
        0
    } else {
        live_product(&state.db, product_id).await?.stock.max(0) as u32
    };
    cart.set_quantity(product_id, req.quantity, available)?;
    save(&state.db, &cart).await?;
    Ok(ok(cart))
}

async fn remove_item(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Value>> {
    let mut cart = load_or_create(&state.db, user_id).await?;
    cart.remove_item(product_id)?;
    save(&state.db, &cart).await?;
    Ok(ok(cart))
}

async fn clear_cart(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let mut cart = load_or_create(&state.db, user_id).await?;
    cart.clear();
    save(&state.db, &cart).await?;
    Ok(message("cart cleared"))
}
