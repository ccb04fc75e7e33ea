//! Database operations for the storefront `PostgreSQL` database.
//!
//! # Tables
//!
//! Accounts (`users`, `loyalty_transactions`), catalog (`categories`,
//! `brands`, `products`, `product_variants`, `reviews`, `bundles`), shopping
//! (`cart_items`, `coupons`, `orders`, `payment_methods`, `favorites`),
//! content (`banners`, `site_settings`, `pages`, `page_layouts`,
//! `navigation_links`, `testimonials`, `campaigns`), blog (`blog_categories`,
//! `blog_posts`, `blog_comments`) and compliance (`newsletters`,
//! `audit_logs`, `consent_records`).
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p takviye-cli -- migrate
//! ```

pub mod blog;
pub mod bundles;
pub mod cart;
pub mod catalog;
pub mod compliance;
pub mod content;
pub mod coupons;
pub mod favorites;
pub mod loyalty;
pub mod orders;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate slug).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-constraint violation to [`RepositoryError::Conflict`].
pub(crate) fn conflict_on_unique(what: &'static str) -> impl Fn(sqlx::Error) -> RepositoryError {
    move |e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return already_taken(what);
        }
        RepositoryError::Database(e)
    }
}

/// Conflict for a unique value that is already in use.
pub(crate) fn already_taken(what: &str) -> RepositoryError {
    RepositoryError::Conflict(format!("{what} zaten kullanılıyor"))
}

/// Turn an empty `fetch_optional` into [`RepositoryError::NotFound`].
pub(crate) fn found<T>(row: Option<T>) -> Result<T, RepositoryError> {
    row.ok_or(RepositoryError::NotFound)
}

/// Run a `DELETE ... WHERE id = $1`, mapping zero rows to `NotFound`.
pub(crate) async fn delete_by_id<I>(pool: &PgPool, table: &str, id: I) -> Result<(), RepositoryError>
where
    I: for<'q> sqlx::Encode<'q, sqlx::Postgres> + sqlx::Type<sqlx::Postgres> + Send + 'static,
{
    let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Run a `SELECT {columns} FROM {table} WHERE id = $1`.
pub(crate) async fn fetch_by_id<T, I>(
    pool: &PgPool,
    table: &str,
    columns: &str,
    id: I,
) -> Result<Option<T>, RepositoryError>
where
    T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    I: for<'q> sqlx::Encode<'q, sqlx::Postgres> + sqlx::Type<sqlx::Postgres> + Send + 'static,
{
    let row = sqlx::query_as::<_, T>(&format!("SELECT {columns} FROM {table} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Escape `%` and `_` and wrap in wildcards for an `ILIKE` search.
#[must_use]
pub fn like_pattern(search: &str) -> String {
    let escaped = search
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" whey "), "%whey%");
        assert_eq!(like_pattern("100%_saf"), "%100\\%\\_saf%");
    }

    #[test]
    fn test_found_maps_none() {
        assert!(matches!(found::<i32>(None), Err(RepositoryError::NotFound)));
        assert!(matches!(found(Some(3)), Ok(3)));
    }

    #[test]
    fn test_unique_conflicts_read_in_turkish() {
        let err = already_taken("Ürün adresi");
        assert!(matches!(&err, RepositoryError::Conflict(msg) if msg == "Ürün adresi zaten kullanılıyor"));

        let passthrough = conflict_on_unique("Kupon kodu")(sqlx::Error::RowNotFound);
        assert!(matches!(passthrough, RepositoryError::Database(_)));
    }
}
