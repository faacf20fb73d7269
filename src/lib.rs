//! Vendora - Multi-vendor Marketplace Backend
//!
//! REST backend for a multi-vendor marketplace.
//!
//! ## Features
//! - Product catalog with search, category and vendor filters
//! - Per-user shopping carts with live stock validation
//! - Per-(product, vendor) inventory ledger with reservations and alerts
//! - Vendor analytics reconciling legacy and per-vendor order schemas
//! - SEO tooling: slug/meta generation, sitemap and robots endpoints

pub mod analytics;
pub mod api;
pub mod domain;
pub mod error;
pub mod seo;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;
