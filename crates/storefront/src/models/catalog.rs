//! Catalog rows: categories, brands, products, variants and reviews.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use takviye_core::pricing::PricePair;
use takviye_core::{BrandId, CategoryId, Money, ProductId, ReviewId, UserId, VariantId};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A sellable product. Prices are VAT inclusive.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: Money,
    pub compare_price: Option<Money>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub stock: i32,
    pub category_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
    #[sqlx(json)]
    pub images: Vec<String>,
    #[sqlx(json)]
    pub tags: Vec<String>,
    pub usage_instructions: Option<String>,
    pub ingredients: Option<String>,
    pub is_featured: bool,
    pub is_active: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Price with a compare price that is only kept when above the price.
    #[must_use]
    pub fn price_pair(&self) -> PricePair {
        PricePair::new(self.price, self.compare_price)
    }

    /// First image, used as the primary image in feeds and JSON-LD.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Product joined with its category and brand names, for feeds and listings.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub product: Product,
    pub category_name: Option<String>,
    pub brand_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub name: String,
    pub sku: Option<String>,
    pub price: Option<Money>,
    pub stock: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A review joined with the author's username.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub author: Option<String>,
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Product detail page payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<Category>,
    pub brand: Option<Brand>,
    pub variants: Vec<ProductVariant>,
    pub reviews: Vec<Review>,
    pub average_rating: Option<f64>,
    pub review_count: usize,
    pub discount_percentage: Option<u32>,
}

/// Mean of review ratings rounded to one decimal.
#[must_use]
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let sum: i32 = reviews.iter().map(|r| r.rating).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = f64::from(sum) / reviews.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}
