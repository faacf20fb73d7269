//! Product catalog endpoints: CRUD plus search/filter/sort.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;
use validator::Validate;

use crate::api::{created, message, ok, Page};
use crate::domain::aggregates::inventory::{Inventory, MovementType};
use crate::domain::aggregates::product::{CreatorRole, NewProduct, Product, ProductStatus};
use crate::domain::value_objects::{Money, Sku};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    /// Category NAME; resolved against `categories.name` before filtering.
    pub category: Option<String>,
    pub vendor: Option<Uuid>,
    pub sort: Option<String>,
}

fn apply_filters(qb: &mut QueryBuilder<'_, Postgres>, params: &ListParams, category: Option<Uuid>) {
    if let Some(search) = &params.search {
        let pattern = format!("%{search}%");
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(category_id) = category {
        // categories is a uuid[] column, so membership needs ANY().
        qb.push(" AND ")
            .push_bind(category_id)
            .push(" = ANY(categories)");
    }
    if let Some(vendor) = params.vendor {
        qb.push(" AND vendor_id = ").push_bind(vendor);
    }
}

fn order_clause(sort: Option<&str>) -> &'static str {
    match sort {
        Some("price_asc") => " ORDER BY price ASC",
        Some("price_desc") => " ORDER BY price DESC",
        Some("title") => " ORDER BY title ASC",
        _ => " ORDER BY created_at DESC",
    }
}

async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Value>> {
    let page = Page::clamp(params.page, params.per_page);

    let category_id = match &params.category {
        Some(name) => {
            let row: Option<(Uuid,)> =
                sqlx::query_as("SELECT id FROM categories WHERE name ILIKE $1")
                    .bind(name)
                    .fetch_optional(&state.db)
                    .await?;
            match row {
                Some((id,)) => Some(id),
                // Unknown category name matches nothing.
                None => {
                    return Ok(ok(
                        json!({ "products": [], "total": 0, "page": page.page }),
                    ))
                }
            }
        }
        None => None,
    };

    let mut qb =
        QueryBuilder::<Postgres>::new("SELECT * FROM products WHERE status = 'active'");
    apply_filters(&mut qb, &params, category_id);
    qb.push(order_clause(params.sort.as_deref()));
    qb.push(" LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let products: Vec<Product> = qb.build_query_as().fetch_all(&state.db).await?;

    let mut count_qb =
        QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products WHERE status = 'active'");
    apply_filters(&mut count_qb, &params, category_id);
    let total: i64 = count_qb.build_query_scalar().fetch_one(&state.db).await?;

    Ok(ok(
        json!({ "products": products, "total": total, "page": page.page }),
    ))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let product: Product =
        sqlx::query_as("SELECT * FROM products WHERE id = $1 AND status <> 'deleted'")
            .bind(id)
            .fetch_optional(&state.db)
            .await?
            .ok_or(ApiError::NotFound("product"))?;
    Ok(ok(product))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub categories: Vec<Uuid>,
    pub vendor_id: Option<Uuid>,
    pub created_by_role: Option<CreatorRole>,
    pub sku: Option<String>,
    pub slug: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub image_alt: Option<String>,
    pub handling_days: Option<i32>,
    pub shipping_cost: Option<Decimal>,
}

async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    req.validate()?;
    if req.price < Decimal::ZERO {
        return Err(ApiError::Validation("price must not be negative".into()));
    }
    if req.stock < 0 {
        return Err(ApiError::Validation("stock must not be negative".into()));
    }
    let role = req.created_by_role.unwrap_or(CreatorRole::Admin);
    if role == CreatorRole::Vendor && req.vendor_id.is_none() {
        return Err(ApiError::Validation(
            "vendor_id is required for vendor-created products".into(),
        ));
    }
    let sku = req.sku.map(Sku::new).transpose()?;

    let product = Product::create(
        NewProduct {
            title: req.title,
            description: req.description,
            price: Money::new(req.price),
            stock: req.stock,
            categories: req.categories,
            vendor_id: req.vendor_id,
            handling_days: req.handling_days,
            shipping_cost: req.shipping_cost.map(Money::new),
            sku,
            slug: req.slug,
            meta_title: req.meta_title,
            meta_description: req.meta_description,
            image_alt: req.image_alt,
        },
        role,
    );

    sqlx::query(
        "INSERT INTO products (id, sku, title, description, price, stock, categories, \
         vendor_id, created_by_role, status, slug, meta_title, meta_description, image_alt, \
         handling_days, shipping_cost, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
    )
    .bind(product.id)
    .bind(&product.sku)
    .bind(&product.title)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.stock)
    .bind(&product.categories)
    .bind(product.vendor_id)
    .bind(product.created_by_role)
    .bind(product.status)
    .bind(&product.slug)
    .bind(&product.meta_title)
    .bind(&product.meta_description)
    .bind(&product.image_alt)
    .bind(product.handling_days)
    .bind(product.shipping_cost)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(&state.db)
    .await
    .map_err(|e| ApiError::from_db(e, "a product with this SKU already exists"))?;

    // Stock tracking exists only for vendor-created products.
    if product.tracks_inventory() {
        if let Some(vendor_id) = product.vendor_id {
            let mut inventory = Inventory::new(product.id, vendor_id);
            if product.stock > 0 {
                inventory.add_stock(
                    i64::from(product.stock),
                    MovementType::Purchase,
                    "Initial stock",
                    None,
                )?;
            }
            crate::api::inventory::insert_inventory(&state.db, &inventory).await?;
            crate::api::inventory::log_domain_events(inventory.take_events());
        }
    }

    tracing::info!(product_id = %product.id, slug = %product.slug, "product created");
    Ok(created(product))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub categories: Option<Vec<Uuid>>,
    pub status: Option<ProductStatus>,
    pub handling_days: Option<i32>,
    pub shipping_cost: Option<Decimal>,
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProductRequest>,
) -> ApiResult<Json<Value>> {
    req.validate()?;
    if req.price.is_some_and(|p| p < Decimal::ZERO) {
        return Err(ApiError::Validation("price must not be negative".into()));
    }
    if req.stock.is_some_and(|s| s < 0) {
        return Err(ApiError::Validation("stock must not be negative".into()));
    }
    // The slug is never regenerated on update; published URLs stay stable.
    let product: Product = sqlx::query_as(
        "UPDATE products SET \
         title = COALESCE($2, title), \
         description = COALESCE($3, description), \
         price = COALESCE($4, price), \
         stock = COALESCE($5, stock), \
         categories = COALESCE($6, categories), \
         status = COALESCE($7, status), \
         handling_days = COALESCE($8, handling_days), \
         shipping_cost = COALESCE($9, shipping_cost), \
         updated_at = NOW() \
         WHERE id = $1 AND status <> 'deleted' RETURNING *",
    )
    .bind(id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(req.price.map(Money::new))
    .bind(req.stock)
    .bind(&req.categories)
    .bind(req.status)
    .bind(req.handling_days)
    .bind(req.shipping_cost.map(Money::new))
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound("product"))?;
    Ok(ok(product))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let result = sqlx::query(
        "UPDATE products SET status = 'deleted', updated_at = NOW() \
         WHERE id = $1 AND status <> 'deleted'",
    )
    .bind(id)
    .execute(&state.db)
    .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("product"));
    }
    Ok(message("product deleted"))
}
