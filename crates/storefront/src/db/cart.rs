//! Cart repository.
//!
//! Lines are keyed by `user_id` for signed-in shoppers and by `session_id`
//! for guests. A `(product, variant)` pair appears at most once per owner;
//! adding it again increases the quantity.

use sqlx::{PgConnection, PgPool};

use takviye_core::{CartItemId, ProductId, UserId, VariantId};

use super::RepositoryError;
use crate::models::cart::{CartLine, CartOwner};

const OWNER_MATCH: &str =
    "(($1::INTEGER IS NOT NULL AND ci.user_id = $1) OR ($1::INTEGER IS NULL AND ci.session_id = $2))";

/// Repository for cart lines.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Cart lines joined with product and variant data, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, owner: &CartOwner) -> Result<Vec<CartLine>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::list_with(&mut conn, owner).await
    }

    /// [`Self::list`] on an existing connection, locking the rows for checkout.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with(
        conn: &mut PgConnection,
        owner: &CartOwner,
    ) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLine>(&format!(
            "SELECT ci.id, ci.product_id, ci.variant_id, ci.quantity, \
                    p.name AS product_name, p.slug AS product_slug, p.price AS product_price, \
                    p.stock AS product_stock, p.is_active AS product_active, \
                    p.images AS product_images, p.sku AS product_sku, \
                    v.name AS variant_name, v.price AS variant_price, v.stock AS variant_stock, \
                    v.sku AS variant_sku \
             FROM cart_items ci \
             JOIN products p ON p.id = ci.product_id \
             LEFT JOIN product_variants v ON v.id = ci.variant_id \
             WHERE {OWNER_MATCH} \
             ORDER BY ci.created_at, ci.id"
        ))
        .bind(owner.user_id())
        .bind(owner.session_id())
        .fetch_all(conn)
        .await?;
        Ok(rows)
    }

    /// Add a product to the cart, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    pub async fn add(
        &self,
        owner: &CartOwner,
        product_id: ProductId,
        variant_id: Option<VariantId>,
        quantity: i32,
    ) -> Result<CartItemId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<CartItemId> = sqlx::query_scalar(&format!(
            "SELECT ci.id FROM cart_items ci \
             WHERE {OWNER_MATCH} AND ci.product_id = $3 \
               AND ci.variant_id IS NOT DISTINCT FROM $4 \
             FOR UPDATE"
        ))
        .bind(owner.user_id())
        .bind(owner.session_id())
        .bind(product_id)
        .bind(variant_id)
        .fetch_optional(&mut *tx)
        .await?;

        let id = if let Some(id) = existing {
            sqlx::query("UPDATE cart_items SET quantity = quantity + $2 WHERE id = $1")
                .bind(id)
                .bind(quantity)
                .execute(&mut *tx)
                .await?;
            id
        } else {
            sqlx::query_scalar(
                "INSERT INTO cart_items (user_id, session_id, product_id, variant_id, quantity) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING id",
            )
            .bind(owner.user_id())
            .bind(owner.session_id())
            .bind(product_id)
            .bind(variant_id)
            .bind(quantity)
            .fetch_one(&mut *tx)
            .await?
        };

        tx.commit().await?;
        Ok(id)
    }

    /// Current quantity of a line, if the owner has it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn quantity_of(
        &self,
        owner: &CartOwner,
        product_id: ProductId,
        variant_id: Option<VariantId>,
    ) -> Result<i32, RepositoryError> {
        let quantity: Option<i32> = sqlx::query_scalar(&format!(
            "SELECT ci.quantity FROM cart_items ci \
             WHERE {OWNER_MATCH} AND ci.product_id = $3 AND ci.variant_id IS NOT DISTINCT FROM $4"
        ))
        .bind(owner.user_id())
        .bind(owner.session_id())
        .bind(product_id)
        .bind(variant_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(quantity.unwrap_or(0))
    }

    /// Set the quantity of one of the owner's lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is not in this cart.
    pub async fn update_quantity(
        &self,
        owner: &CartOwner,
        id: CartItemId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(&format!(
            "UPDATE cart_items ci SET quantity = $4 WHERE {OWNER_MATCH} AND ci.id = $3"
        ))
        .bind(owner.user_id())
        .bind(owner.session_id())
        .bind(id)
        .bind(quantity)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove one of the owner's lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is not in this cart.
    pub async fn remove(&self, owner: &CartOwner, id: CartItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query(&format!(
            "DELETE FROM cart_items ci WHERE {OWNER_MATCH} AND ci.id = $3"
        ))
        .bind(owner.user_id())
        .bind(owner.session_id())
        .bind(id)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self, owner: &CartOwner) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::clear_with(&mut conn, owner).await
    }

    /// [`Self::clear`] on an existing connection or transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear_with(conn: &mut PgConnection, owner: &CartOwner) -> Result<(), RepositoryError> {
        sqlx::query(&format!("DELETE FROM cart_items ci WHERE {OWNER_MATCH}"))
            .bind(owner.user_id())
            .bind(owner.session_id())
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Move a guest cart to a user after sign-in. Lines the user already has
    /// are summed and clamped to the current stock, never below one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the writes fail.
    pub async fn adopt_session(&self, session_id: &str, user_id: UserId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "UPDATE cart_items mine \
             SET quantity = GREATEST(1, LEAST( \
                 mine.quantity::bigint + guest.quantity, COALESCE(v.stock, p.stock)))::int \
             FROM cart_items guest \
             JOIN products p ON p.id = guest.product_id \
             LEFT JOIN product_variants v ON v.id = guest.variant_id \
             WHERE guest.session_id = $1 AND guest.user_id IS NULL \
               AND mine.user_id = $2 AND mine.product_id = guest.product_id \
               AND mine.variant_id IS NOT DISTINCT FROM guest.variant_id",
        )
        .bind(session_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            "DELETE FROM cart_items guest USING cart_items mine \
             WHERE guest.session_id = $1 AND guest.user_id IS NULL \
               AND mine.user_id = $2 AND mine.product_id = guest.product_id \
               AND mine.variant_id IS NOT DISTINCT FROM guest.variant_id",
        )
        .bind(session_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            "UPDATE cart_items SET user_id = $2, session_id = NULL \
             WHERE session_id = $1 AND user_id IS NULL",
        )
        .bind(session_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }
}
