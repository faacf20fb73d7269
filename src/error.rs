//! API error taxonomy and the JSON error envelope.
//!
//! Every handler returns `ApiResult<T>`; failures serialize as
//! `{"success": false, "message": ...}` with a conventional status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::domain::aggregates::cart::CartError;
use crate::domain::aggregates::inventory::InventoryError;
use crate::domain::value_objects::SkuError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    /// Maps a sqlx error, turning unique-constraint violations into a 400
    /// with a caller-supplied message.
    pub fn from_db(err: sqlx::Error, unique_message: &str) -> Self {
        if let Some(db) = err.as_database_error() {
            if db.is_unique_violation() {
                return Self::Validation(unique_message.to_string());
            }
        }
        Self::Database(err)
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Inventory(err) => match err {
                InventoryError::InvalidQuantity | InventoryError::StockOverflow { .. } => {
                    StatusCode::BAD_REQUEST
                }
                InventoryError::AlertNotFound => StatusCode::NOT_FOUND,
                InventoryError::NegativeStock { .. }
                | InventoryError::InsufficientAvailable { .. }
                | InventoryError::InsufficientReserved { .. } => StatusCode::CONFLICT,
            },
            Self::Cart(err) => match err {
                CartError::InvalidQuantity => StatusCode::BAD_REQUEST,
                CartError::ItemNotFound => StatusCode::NOT_FOUND,
                CartError::InsufficientStock { .. } => StatusCode::CONFLICT,
            },
            Self::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SkuError> for ApiError {
    fn from(err: SkuError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Database(sqlx::Error::RowNotFound) => "not found".to_string(),
            Self::Database(err) => {
                tracing::error!(error = %err, "database error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        (
            status,
            Json(json!({ "success": false, "message": message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_rule_violations_are_conflicts() {
        let err = ApiError::from(InventoryError::InsufficientAvailable {
            requested: 5,
            available: 2,
        });
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn missing_rows_are_not_found() {
        assert_eq!(
            ApiError::Database(sqlx::Error::RowNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::NotFound("product").status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_failures_are_bad_requests() {
        assert_eq!(
            ApiError::Validation("title is required".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(CartError::InvalidQuantity).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
