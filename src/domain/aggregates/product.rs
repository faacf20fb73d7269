//! Product catalog model.
//!
//! Category membership is an array of category ids on the product row, so
//! every category filter has to be array-aware (`= ANY(categories)`).
//! SEO fields (slug, meta title/description, image alt) are generated on
//! create when the caller leaves them blank, never on update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::aggregates::cart::ProductSnapshot;
use crate::domain::value_objects::{Money, Sku};
use crate::seo;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "product_status", rename_all = "snake_case")]
pub enum ProductStatus {
    Draft,
    Active,
    Deleted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "creator_role", rename_all = "snake_case")]
pub enum CreatorRole {
    Vendor,
    Admin,
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub sku: Sku,
    pub title: String,
    pub description: Option<String>,
    pub price: Money,
    pub stock: i32,
    pub categories: Vec<Uuid>,
    pub vendor_id: Option<Uuid>,
    pub created_by_role: CreatorRole,
    pub status: ProductStatus,
    pub slug: String,
    pub meta_title: String,
    pub meta_description: String,
    pub image_alt: String,
    pub handling_days: Option<i32>,
    pub shipping_cost: Option<Money>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new product. SEO fields left `None` are
/// generated from the title/description.
#[derive(Clone, Debug, Default)]
pub struct NewProduct {
    pub title: String,
    pub description: Option<String>,
    pub price: Money,
    pub stock: i32,
    pub categories: Vec<Uuid>,
    pub vendor_id: Option<Uuid>,
    pub handling_days: Option<i32>,
    pub shipping_cost: Option<Money>,
    pub sku: Option<Sku>,
    pub slug: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub image_alt: Option<String>,
}

impl Product {
    pub fn create(new: NewProduct, created_by_role: CreatorRole) -> Self {
        let now = Utc::now();
        let slug = new.slug.unwrap_or_else(|| seo::slugify(&new.title));
        let meta_title = new.meta_title.unwrap_or_else(|| seo::meta_title(&new.title));
        let meta_description = new.meta_description.unwrap_or_else(|| {
            seo::meta_description(new.description.as_deref().unwrap_or(&new.title))
        });
        let image_alt = new.image_alt.unwrap_or_else(|| seo::image_alt(&new.title));
        Self {
            id: Uuid::new_v4(),
            sku: new.sku.unwrap_or_else(Sku::generate),
            title: new.title,
            description: new.description,
            price: new.price,
            stock: new.stock,
            categories: new.categories,
            vendor_id: new.vendor_id,
            created_by_role,
            status: ProductStatus::Active,
            slug,
            meta_title,
            meta_description,
            image_alt,
            handling_days: new.handling_days,
            shipping_cost: new.shipping_cost,
            created_at: now,
            updated_at: now,
        }
    }

    /// Inventory rows exist only for vendor-created products; admin-created
    /// ones are deliberately untracked.
    pub fn tracks_inventory(&self) -> bool {
        self.created_by_role == CreatorRole::Vendor && self.vendor_id.is_some()
    }

    /// Denormalized copy embedded into cart lines.
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            product_id: self.id,
            title: self.title.clone(),
            sku: self.sku.clone(),
            price: self.price,
            vendor_id: self.vendor_id,
            handling_days: self.handling_days,
            shipping_cost: self.shipping_cost,
            slug: self.slug.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn new_product(title: &str) -> NewProduct {
        NewProduct {
            title: title.into(),
            price: Money::new(Decimal::new(2500, 2)),
            stock: 4,
            ..NewProduct::default()
        }
    }

    #[test]
    fn seo_fields_generated_when_absent() {
        let p = Product::create(new_product("Hand-Thrown Ceramic Mug"), CreatorRole::Admin);
        assert_eq!(p.slug, "hand-thrown-ceramic-mug");
        assert!(p.meta_title.contains("Hand-Thrown Ceramic Mug"));
        assert!(!p.meta_description.is_empty());
        assert!(!p.image_alt.is_empty());
        assert!(p.sku.as_str().starts_with("SKU-"));
    }

    #[test]
    fn supplied_seo_fields_are_kept() {
        let mut new = new_product("Mug");
        new.slug = Some("custom-slug".into());
        new.meta_title = Some("Custom".into());
        let p = Product::create(new, CreatorRole::Admin);
        assert_eq!(p.slug, "custom-slug");
        assert_eq!(p.meta_title, "Custom");
    }

    #[test]
    fn only_vendor_products_track_inventory() {
        let vendor = Uuid::new_v4();
        let mut new = new_product("Mug");
        new.vendor_id = Some(vendor);
        let vendor_product = Product::create(new.clone(), CreatorRole::Vendor);
        assert!(vendor_product.tracks_inventory());

        let admin_product = Product::create(new, CreatorRole::Admin);
        assert!(!admin_product.tracks_inventory());
    }

    #[test]
    fn snapshot_copies_vendor_and_shipping_fields() {
        let mut new = new_product("Mug");
        new.vendor_id = Some(Uuid::new_v4());
        new.handling_days = Some(3);
        new.shipping_cost = Some(Money::new(Decimal::new(499, 2)));
        let p = Product::create(new, CreatorRole::Vendor);
        let snap = p.snapshot();
        assert_eq!(snap.vendor_id, p.vendor_id);
        assert_eq!(snap.handling_days, Some(3));
        assert_eq!(snap.shipping_cost, p.shipping_cost);
    }
}
