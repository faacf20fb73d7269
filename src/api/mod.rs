//! REST surface under `/api`. One module per resource; every JSON endpoint
//! answers the `{success, data|message}` envelope.

pub mod cart;
pub mod categories;
pub mod inventory;
pub mod products;
pub mod seo;
pub mod vendors;

use axum::http::StatusCode;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/categories", categories::router())
        .nest("/cart", cart::router())
        .nest("/inventory", inventory::router())
        .nest("/vendors", vendors::router())
        .nest("/seo", seo::router())
}

pub(crate) fn ok<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

pub(crate) fn created<T: Serialize>(data: T) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, ok(data))
}

pub(crate) fn message(text: &str) -> Json<Value> {
    Json(json!({ "success": true, "message": text }))
}

/// Clamped pagination window shared by the list endpoints.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Page {
    const DEFAULT_PER_PAGE: u32 = 20;
    const MAX_PER_PAGE: u32 = 100;

    pub fn clamp(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(Self::DEFAULT_PER_PAGE)
                .clamp(1, Self::MAX_PER_PAGE),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_clamps_bounds() {
        let p = Page::clamp(None, None);
        assert_eq!((p.page, p.per_page), (1, 20));
        let p = Page::clamp(Some(0), Some(500));
        assert_eq!((p.page, p.per_page), (1, 100));
        let p = Page::clamp(Some(3), Some(10));
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn offset_survives_extreme_pages() {
        let p = Page::clamp(Some(u32::MAX), Some(100));
        assert_eq!(p.offset(), (i64::from(u32::MAX) - 1) * 100);
    }
}
