//! Catalog repository: categories, brands, products, variants and reviews.

use serde::Deserialize;
use sqlx::{PgConnection, PgPool};

use takviye_core::pricing::PricePair;
use takviye_core::slug::slugify;
use takviye_core::{BrandId, CategoryId, Money, ProductId, ReviewId, UserId, VariantId};

use super::{RepositoryError, conflict_on_unique, found, like_pattern};
use crate::models::catalog::{Brand, Category, Product, ProductListing, ProductVariant, Review};
use crate::models::{PageRequest, Paginated};

const CATEGORY_COLUMNS: &str =
    "id, name, slug, description, image_url, parent_id, sort_order, is_active, created_at";
const BRAND_COLUMNS: &str = "id, name, slug, description, logo_url, is_active, created_at";
const PRODUCT_COLUMNS: &str = "p.id, p.name, p.slug, p.description, p.short_description, \
     p.price, p.compare_price, p.sku, p.barcode, p.stock, p.category_id, p.brand_id, \
     p.images, p.tags, p.usage_instructions, p.ingredients, p.is_featured, p.is_active, \
     p.meta_title, p.meta_description, p.created_at, p.updated_at";
const VARIANT_COLUMNS: &str = "id, product_id, name, sku, price, stock, is_active, created_at";
const REVIEW_COLUMNS: &str = "r.id, r.product_id, r.user_id, u.username AS author, r.rating, \
     r.title, r.comment, r.is_approved, r.created_at";

/// Products with less stock than this show up on the dashboard.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

// =============================================================================
// Inputs
// =============================================================================

/// Category create/update payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Brand create/update payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandInput {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Product create/update payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: Money,
    pub compare_price: Option<Money>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    #[serde(default)]
    pub stock: i32,
    pub category_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub usage_instructions: Option<String>,
    pub ingredients: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

impl ProductInput {
    /// Selling price and compare price after dropping a compare price at or
    /// below the selling price.
    #[must_use]
    pub fn prices(&self) -> PricePair {
        PricePair::new(self.price, self.compare_price)
    }
}

/// Variant create/update payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantInput {
    pub name: String,
    pub sku: Option<String>,
    pub price: Option<Money>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

pub(crate) const fn default_true() -> bool {
    true
}

/// Use the given slug, or derive one from the name.
pub(crate) fn slug_or_name(slug: Option<&str>, name: &str) -> String {
    match slug.map(str::trim) {
        Some(s) if !s.is_empty() => slugify(s),
        _ => slugify(name),
    }
}

// =============================================================================
// Product listing filters
// =============================================================================

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

impl ProductSort {
    const fn order_by(self) -> &'static str {
        match self {
            Self::Newest => "p.created_at DESC, p.id DESC",
            Self::PriceAsc => "p.price ASC, p.id",
            Self::PriceDesc => "p.price DESC, p.id",
            Self::Name => "p.name ASC, p.id",
        }
    }
}

/// Product listing filter. Category and brand are matched by slug.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub sort: ProductSort,
    pub include_inactive: bool,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog database operations.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    /// List categories ordered for navigation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self, active_only: bool) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories \
             WHERE ($1 = FALSE OR is_active) ORDER BY sort_order, name"
        ))
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Get an active category by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1 AND is_active"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Insert or update a category. `id = None` inserts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate slug and
    /// `RepositoryError::NotFound` when updating a missing row.
    pub async fn save_category(
        &self,
        id: Option<CategoryId>,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        let slug = slug_or_name(input.slug.as_deref(), &input.name);
        let sql = match id {
            None => format!(
                "INSERT INTO categories (name, slug, description, image_url, parent_id, sort_order, is_active) \
                 VALUES ($2, $3, $4, $5, $6, $7, $8) RETURNING {CATEGORY_COLUMNS}"
            ),
            Some(_) => format!(
                "UPDATE categories SET name = $2, slug = $3, description = $4, image_url = $5, \
                 parent_id = $6, sort_order = $7, is_active = $8 \
                 WHERE id = $1 RETURNING {CATEGORY_COLUMNS}"
            ),
        };
        let row = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(input.name.trim())
            .bind(&slug)
            .bind(&input.description)
            .bind(&input.image_url)
            .bind(input.parent_id)
            .bind(input.sort_order)
            .bind(input.is_active)
            .fetch_optional(self.pool)
            .await
            .map_err(conflict_on_unique("Kategori adresi"))?;
        found(row)
    }

    /// Delete a category. Products keep a dangling `category_id` set to NULL.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE products SET category_id = NULL WHERE category_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Brands
    // -------------------------------------------------------------------------

    /// List brands by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_brands(&self, active_only: bool) -> Result<Vec<Brand>, RepositoryError> {
        let rows = sqlx::query_as::<_, Brand>(&format!(
            "SELECT {BRAND_COLUMNS} FROM brands WHERE ($1 = FALSE OR is_active) ORDER BY name"
        ))
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Get a brand by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_brand(&self, id: BrandId) -> Result<Option<Brand>, RepositoryError> {
        let row = sqlx::query_as::<_, Brand>(&format!(
            "SELECT {BRAND_COLUMNS} FROM brands WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Insert or update a brand. `id = None` inserts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate slug and
    /// `RepositoryError::NotFound` when updating a missing row.
    pub async fn save_brand(
        &self,
        id: Option<BrandId>,
        input: &BrandInput,
    ) -> Result<Brand, RepositoryError> {
        let slug = slug_or_name(input.slug.as_deref(), &input.name);
        let sql = match id {
            None => format!(
                "INSERT INTO brands (name, slug, description, logo_url, is_active) \
                 VALUES ($2, $3, $4, $5, $6) RETURNING {BRAND_COLUMNS}"
            ),
            Some(_) => format!(
                "UPDATE brands SET name = $2, slug = $3, description = $4, logo_url = $5, \
                 is_active = $6 WHERE id = $1 RETURNING {BRAND_COLUMNS}"
            ),
        };
        let row = sqlx::query_as::<_, Brand>(&sql)
            .bind(id)
            .bind(input.name.trim())
            .bind(&slug)
            .bind(&input.description)
            .bind(&input.logo_url)
            .bind(input.is_active)
            .fetch_optional(self.pool)
            .await
            .map_err(conflict_on_unique("Marka adresi"))?;
        found(row)
    }

    /// Delete a brand and detach its products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the brand does not exist.
    pub async fn delete_brand(&self, id: BrandId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE products SET brand_id = NULL WHERE brand_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM brands WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// List products with category and brand names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Paginated<ProductListing>, RepositoryError> {
        let search = filter
            .search
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(like_pattern);
        let conditions = "($1 OR p.is_active) \
             AND ($2::TEXT IS NULL OR c.slug = $2) \
             AND ($3::TEXT IS NULL OR b.slug = $3) \
             AND ($4::TEXT IS NULL OR p.name ILIKE $4 OR p.short_description ILIKE $4 \
                  OR p.tags::TEXT ILIKE $4 OR b.name ILIKE $4) \
             AND ($5::BOOLEAN IS NULL OR p.is_featured = $5) \
             AND ($6::NUMERIC IS NULL OR p.price >= $6) \
             AND ($7::NUMERIC IS NULL OR p.price <= $7)";
        let from = "FROM products p \
             LEFT JOIN categories c ON c.id = p.category_id \
             LEFT JOIN brands b ON b.id = p.brand_id";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {from} WHERE {conditions}"))
            .bind(filter.include_inactive)
            .bind(&filter.category)
            .bind(&filter.brand)
            .bind(&search)
            .bind(filter.featured)
            .bind(filter.min_price)
            .bind(filter.max_price)
            .fetch_one(self.pool)
            .await?;

        let rows = sqlx::query_as::<_, ProductListing>(&format!(
            "SELECT {PRODUCT_COLUMNS}, c.name AS category_name, b.name AS brand_name \
             {from} WHERE {conditions} ORDER BY {} LIMIT $8 OFFSET $9",
            filter.sort.order_by()
        ))
        .bind(filter.include_inactive)
        .bind(&filter.category)
        .bind(&filter.brand)
        .bind(&search)
        .bind(filter.featured)
        .bind(filter.min_price)
        .bind(filter.max_price)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(page.wrap(rows, total))
    }

    /// All active products, for feeds and the sitemap.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active_products(&self) -> Result<Vec<ProductListing>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductListing>(&format!(
            "SELECT {PRODUCT_COLUMNS}, c.name AS category_name, b.name AS brand_name \
             FROM products p \
             LEFT JOIN categories c ON c.id = p.category_id \
             LEFT JOIN brands b ON b.id = p.brand_id \
             WHERE p.is_active ORDER BY p.id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Get a product by slug. Inactive products are hidden unless asked for.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product_by_slug(
        &self,
        slug: &str,
        include_inactive: bool,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.slug = $1 AND ($2 OR p.is_active)"
        ))
        .bind(slug)
        .bind(include_inactive)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Get several products by ID, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let raw: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let rows = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = ANY($1)"
        ))
        .bind(raw)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Insert or update a product. `id = None` inserts.
    ///
    /// The compare price is dropped when it does not exceed the selling price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate slug and
    /// `RepositoryError::NotFound` when updating a missing row.
    pub async fn save_product(
        &self,
        id: Option<ProductId>,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let slug = slug_or_name(input.slug.as_deref(), &input.name);
        let prices = input.prices();
        let sql = match id {
            None => format!(
                "WITH p AS (\
                   INSERT INTO products (name, slug, description, short_description, price, \
                       compare_price, sku, barcode, stock, category_id, brand_id, images, tags, \
                       usage_instructions, ingredients, is_featured, is_active, meta_title, \
                       meta_description) \
                   VALUES ($2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                       $17, $18, $19, $20) \
                   RETURNING *) \
                 SELECT {PRODUCT_COLUMNS} FROM p"
            ),
            Some(_) => format!(
                "WITH p AS (\
                   UPDATE products SET name = $2, slug = $3, description = $4, \
                       short_description = $5, price = $6, compare_price = $7, sku = $8, \
                       barcode = $9, stock = $10, category_id = $11, brand_id = $12, \
                       images = $13, tags = $14, usage_instructions = $15, ingredients = $16, \
                       is_featured = $17, is_active = $18, meta_title = $19, \
                       meta_description = $20, updated_at = NOW() \
                   WHERE id = $1 RETURNING *) \
                 SELECT {PRODUCT_COLUMNS} FROM p"
            ),
        };
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(input.name.trim())
            .bind(&slug)
            .bind(&input.description)
            .bind(&input.short_description)
            .bind(prices.price)
            .bind(prices.compare_at)
            .bind(&input.sku)
            .bind(&input.barcode)
            .bind(input.stock)
            .bind(input.category_id)
            .bind(input.brand_id)
            .bind(sqlx::types::Json(&input.images))
            .bind(sqlx::types::Json(&input.tags))
            .bind(&input.usage_instructions)
            .bind(&input.ingredients)
            .bind(input.is_featured)
            .bind(input.is_active)
            .bind(&input.meta_title)
            .bind(&input.meta_description)
            .fetch_optional(self.pool)
            .await
            .map_err(conflict_on_unique("Ürün adresi"))?;
        found(row)
    }

    /// Delete a product with its variants and reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        for sql in [
            "DELETE FROM product_variants WHERE product_id = $1",
            "DELETE FROM reviews WHERE product_id = $1",
            "DELETE FROM favorites WHERE product_id = $1",
            "DELETE FROM cart_items WHERE product_id = $1",
        ] {
            sqlx::query(sql).bind(id).execute(&mut *tx).await?;
        }
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }

    /// Active products below [`LOW_STOCK_THRESHOLD`], lowest stock first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn low_stock(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p \
             WHERE p.is_active AND p.stock < $1 ORDER BY p.stock, p.name LIMIT $2"
        ))
        .bind(LOW_STOCK_THRESHOLD)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Take `quantity` units from a variant, or from the product when there is
    /// no variant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if there is not enough stock.
    pub async fn decrement_stock(
        conn: &mut PgConnection,
        product_id: ProductId,
        variant_id: Option<VariantId>,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = match variant_id {
            Some(variant_id) => {
                sqlx::query(
                    "UPDATE product_variants SET stock = stock - $3 \
                     WHERE id = $1 AND product_id = $2 AND stock >= $3",
                )
                .bind(variant_id)
                .bind(product_id)
                .bind(quantity)
                .execute(&mut *conn)
                .await?
            }
            None => {
                sqlx::query(
                    "UPDATE products SET stock = stock - $2, updated_at = NOW() \
                     WHERE id = $1 AND stock >= $2",
                )
                .bind(product_id)
                .bind(quantity)
                .execute(&mut *conn)
                .await?
            }
        };
        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(format!(
                "{product_id} numaralı ürün için yeterli stok yok"
            )));
        }
        Ok(())
    }

    /// Put `quantity` units back, the inverse of [`Self::decrement_stock`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn restore_stock(
        conn: &mut PgConnection,
        product_id: ProductId,
        variant_id: Option<VariantId>,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        match variant_id {
            Some(variant_id) => {
                sqlx::query("UPDATE product_variants SET stock = stock + $2 WHERE id = $1")
                    .bind(variant_id)
                    .bind(quantity)
                    .execute(&mut *conn)
                    .await?;
            }
            None => {
                sqlx::query(
                    "UPDATE products SET stock = stock + $2, updated_at = NOW() WHERE id = $1",
                )
                .bind(product_id)
                .bind(quantity)
                .execute(&mut *conn)
                .await?;
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Variants
    // -------------------------------------------------------------------------

    /// Variants of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_variants(
        &self,
        product_id: ProductId,
        active_only: bool,
    ) -> Result<Vec<ProductVariant>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductVariant>(&format!(
            "SELECT {VARIANT_COLUMNS} FROM product_variants \
             WHERE product_id = $1 AND ($2 = FALSE OR is_active) ORDER BY id"
        ))
        .bind(product_id)
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Get a variant of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_variant(
        &self,
        product_id: ProductId,
        id: VariantId,
    ) -> Result<Option<ProductVariant>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductVariant>(&format!(
            "SELECT {VARIANT_COLUMNS} FROM product_variants WHERE id = $1 AND product_id = $2"
        ))
        .bind(id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Insert or update a variant. `id = None` inserts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when updating a missing row.
    pub async fn save_variant(
        &self,
        product_id: ProductId,
        id: Option<VariantId>,
        input: &VariantInput,
    ) -> Result<ProductVariant, RepositoryError> {
        let sql = match id {
            None => format!(
                "INSERT INTO product_variants (product_id, name, sku, price, stock, is_active) \
                 VALUES ($2, $3, $4, $5, $6, $7) RETURNING {VARIANT_COLUMNS}"
            ),
            Some(_) => format!(
                "UPDATE product_variants SET name = $3, sku = $4, price = $5, stock = $6, \
                 is_active = $7 WHERE id = $1 AND product_id = $2 RETURNING {VARIANT_COLUMNS}"
            ),
        };
        let row = sqlx::query_as::<_, ProductVariant>(&sql)
            .bind(id)
            .bind(product_id)
            .bind(input.name.trim())
            .bind(&input.sku)
            .bind(input.price)
            .bind(input.stock)
            .bind(input.is_active)
            .fetch_optional(self.pool)
            .await?;
        found(row)
    }

    /// Delete a variant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the variant does not exist.
    pub async fn delete_variant(
        &self,
        product_id: ProductId,
        id: VariantId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM product_variants WHERE id = $1 AND product_id = $2")
            .bind(id)
            .bind(product_id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Reviews
    // -------------------------------------------------------------------------

    /// Approved reviews of a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_approved_reviews(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews r LEFT JOIN users u ON u.id = r.user_id \
             WHERE r.product_id = $1 AND r.is_approved ORDER BY r.created_at DESC"
        ))
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// All reviews for moderation, optionally filtered by approval state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_reviews(
        &self,
        approved: Option<bool>,
        page: PageRequest,
    ) -> Result<Paginated<Review>, RepositoryError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reviews WHERE ($1::BOOLEAN IS NULL OR is_approved = $1)",
        )
        .bind(approved)
        .fetch_one(self.pool)
        .await?;
        let rows = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews r LEFT JOIN users u ON u.id = r.user_id \
             WHERE ($1::BOOLEAN IS NULL OR r.is_approved = $1) \
             ORDER BY r.created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(approved)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;
        Ok(page.wrap(rows, total))
    }

    /// Create a review pending approval.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_review(
        &self,
        product_id: ProductId,
        user_id: UserId,
        rating: i32,
        title: Option<&str>,
        comment: Option<&str>,
    ) -> Result<Review, RepositoryError> {
        let row = sqlx::query_as::<_, Review>(&format!(
            "WITH r AS (\
               INSERT INTO reviews (product_id, user_id, rating, title, comment) \
               VALUES ($1, $2, $3, $4, $5) RETURNING *) \
             SELECT {REVIEW_COLUMNS} FROM r LEFT JOIN users u ON u.id = r.user_id"
        ))
        .bind(product_id)
        .bind(user_id)
        .bind(rating)
        .bind(title)
        .bind(comment)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// Approve or hide a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    pub async fn set_review_approved(
        &self,
        id: ReviewId,
        approved: bool,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE reviews SET is_approved = $2 WHERE id = $1")
            .bind(id)
            .bind(approved)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    pub async fn delete_review(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_or_name() {
        assert_eq!(slug_or_name(None, "Kreatin Monohidrat"), "kreatin-monohidrat");
        assert_eq!(slug_or_name(Some("  "), "Çinko"), "cinko");
        assert_eq!(slug_or_name(Some("Özel Slug"), "Ad"), "ozel-slug");
    }

    #[test]
    fn test_product_input_drops_low_compare_price() {
        let input: ProductInput = serde_json::from_value(serde_json::json!({
            "name": "Whey",
            "price": "899.90",
            "comparePrice": "799.90"
        }))
        .unwrap();
        assert!(input.is_active);
        assert_eq!(input.prices().compare_at, None);
    }

    #[test]
    fn test_sort_deserializes_snake_case() {
        let sort: ProductSort = serde_json::from_str("\"price_desc\"").unwrap();
        assert_eq!(sort, ProductSort::PriceDesc);
        assert_eq!(ProductSort::default(), ProductSort::Newest);
    }
}
