//! Bundle repository.

use serde::Deserialize;
use sqlx::PgPool;

use takviye_core::pricing::PricePair;
use takviye_core::{BundleId, Money};

use super::catalog::{default_true, slug_or_name};
use super::{RepositoryError, conflict_on_unique, delete_by_id, found};
use crate::models::bundle::{Bundle, BundleItem};

const BUNDLE_COLUMNS: &str = "id, name, slug, description, image_url, items, price, \
     compare_price, tags, is_active, sort_order, created_at";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleInput {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub items: Vec<BundleItem>,
    pub price: Money,
    pub compare_price: Option<Money>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

/// Repository for bundles.
pub struct BundleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BundleRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, active_only: bool) -> Result<Vec<Bundle>, RepositoryError> {
        let rows = sqlx::query_as::<_, Bundle>(&format!(
            "SELECT {BUNDLE_COLUMNS} FROM bundles \
             WHERE ($1 = FALSE OR is_active) ORDER BY sort_order, id"
        ))
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// An active bundle by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Bundle>, RepositoryError> {
        let row = sqlx::query_as::<_, Bundle>(&format!(
            "SELECT {BUNDLE_COLUMNS} FROM bundles WHERE slug = $1 AND is_active"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: BundleId) -> Result<Option<Bundle>, RepositoryError> {
        let row = sqlx::query_as::<_, Bundle>(&format!(
            "SELECT {BUNDLE_COLUMNS} FROM bundles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Insert or update a bundle.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate slug and
    /// `RepositoryError::NotFound` when updating a missing row.
    pub async fn save(&self, id: Option<BundleId>, input: &BundleInput) -> Result<Bundle, RepositoryError> {
        let slug = slug_or_name(input.slug.as_deref(), &input.name);
        let prices = PricePair::new(input.price, input.compare_price);
        let sql = match id {
            None => format!(
                "INSERT INTO bundles (name, slug, description, image_url, items, price, \
                     compare_price, tags, is_active, sort_order) \
                 VALUES ($2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {BUNDLE_COLUMNS}"
            ),
            Some(_) => format!(
                "UPDATE bundles SET name = $2, slug = $3, description = $4, image_url = $5, \
                     items = $6, price = $7, compare_price = $8, tags = $9, is_active = $10, \
                     sort_order = $11 \
                 WHERE id = $1 RETURNING {BUNDLE_COLUMNS}"
            ),
        };
        let row = sqlx::query_as::<_, Bundle>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(&slug)
            .bind(&input.description)
            .bind(&input.image_url)
            .bind(sqlx::types::Json(&input.items))
            .bind(prices.price)
            .bind(prices.compare_at)
            .bind(sqlx::types::Json(&input.tags))
            .bind(input.is_active)
            .bind(input.sort_order)
            .fetch_optional(self.pool)
            .await
            .map_err(conflict_on_unique("Paket adresi"))?;
        found(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the bundle does not exist.
    pub async fn delete(&self, id: BundleId) -> Result<(), RepositoryError> {
        delete_by_id(self.pool, "bundles", id).await
    }
}
