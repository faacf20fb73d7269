//! Shared application state.

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    /// Public base URL, used for sitemap/robots links.
    pub site_url: String,
}
