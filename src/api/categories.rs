//! Category endpoints. Names are unique; products reference categories by id
//! in their `categories` array.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::api::{created, ok};
use crate::error::{ApiError, ApiResult};
use crate::seo;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/:id", get(get_category))
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let categories: Vec<Category> = sqlx::query_as("SELECT * FROM categories ORDER BY name")
        .fetch_all(&state.db)
        .await?;
    Ok(ok(categories))
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let category: Category = sqlx::query_as("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::NotFound("category"))?;
    Ok(ok(category))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    req.validate()?;
    let category: Category = sqlx::query_as(
        "INSERT INTO categories (id, name, slug, description, parent_id, created_at) \
         VALUES ($1, $2, $3, $4, $5, NOW()) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&req.name)
    .bind(seo::slugify(&req.name))
    .bind(&req.description)
    .bind(req.parent_id)
    .fetch_one(&state.db)
    .await
    .map_err(|e| ApiError::from_db(e, "a category with this name already exists"))?;
    Ok(created(category))
}
