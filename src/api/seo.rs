//! Sitemap and robots endpoints. These are the only non-JSON responses.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};

use crate::error::ApiResult;
use crate::seo::{self, SitemapEntry};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sitemap.xml", get(sitemap))
        .route("/robots.txt", get(robots))
}

async fn sitemap(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let products: Vec<(String, DateTime<Utc>)> = sqlx::query_as(
        "SELECT slug, updated_at FROM products WHERE status = 'active' ORDER BY slug",
    )
    .fetch_all(&state.db)
    .await?;
    let categories: Vec<(String, DateTime<Utc>)> =
        sqlx::query_as("SELECT slug, created_at FROM categories ORDER BY slug")
            .fetch_all(&state.db)
            .await?;

    let mut entries = Vec::with_capacity(products.len() + categories.len());
    entries.extend(products.into_iter().map(|(slug, last_modified)| SitemapEntry {
        path: format!("products/{slug}"),
        last_modified,
    }));
    entries.extend(
        categories
            .into_iter()
            .map(|(slug, last_modified)| SitemapEntry {
                path: format!("categories/{slug}"),
                last_modified,
            }),
    );

    let xml = seo::sitemap_xml(&state.site_url, &entries);
    Ok(([(header::CONTENT_TYPE, "application/xml")], xml))
}

async fn robots(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain")],
        seo::robots_txt(&state.site_url),
    )
}
