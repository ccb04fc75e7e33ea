//! Loyalty ledger.
//!
//! Every balance change writes a `loyalty_transactions` row and adjusts
//! `users.loyalty_points` in the same statement batch. The column's
//! `CHECK (loyalty_points >= 0)` rejects overdrafts.

use sqlx::{PgConnection, PgPool};

use takviye_core::loyalty::LedgerReason;
use takviye_core::{OrderId, UserId};

use super::RepositoryError;
use crate::models::user::LoyaltyTransaction;

/// Repository for the point ledger.
pub struct LoyaltyRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> LoyaltyRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Ledger entries for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<LoyaltyTransaction>, RepositoryError> {
        let rows = sqlx::query_as::<_, LoyaltyTransaction>(
            "SELECT id, user_id, points, reason, order_id, description, created_at \
             FROM loyalty_transactions WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Total points a user received for a reason.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn total_for_reason(
        &self,
        user_id: UserId,
        reason: LedgerReason,
    ) -> Result<i64, RepositoryError> {
        let total: Option<i64> = sqlx::query_scalar(
            "SELECT SUM(points)::BIGINT FROM loyalty_transactions \
             WHERE user_id = $1 AND reason = $2",
        )
        .bind(user_id)
        .bind(reason)
        .fetch_one(self.pool)
        .await?;
        Ok(total.unwrap_or(0))
    }

    /// Record a signed point change and return the new balance.
    ///
    /// Must run inside the caller's transaction so the ledger and balance
    /// stay consistent with the order being written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist and
    /// `RepositoryError::Conflict` if the balance would go negative.
    pub async fn record(
        conn: &mut PgConnection,
        user_id: UserId,
        points: i32,
        reason: LedgerReason,
        order_id: Option<OrderId>,
        description: Option<&str>,
    ) -> Result<i32, RepositoryError> {
        if points == 0 {
            let balance: Option<i32> =
                sqlx::query_scalar("SELECT loyalty_points FROM users WHERE id = $1")
                    .bind(user_id)
                    .fetch_optional(&mut *conn)
                    .await?;
            return super::found(balance);
        }

        let balance: Option<i32> = sqlx::query_scalar(
            "UPDATE users SET loyalty_points = loyalty_points + $2, updated_at = NOW() \
             WHERE id = $1 RETURNING loyalty_points",
        )
        .bind(user_id)
        .bind(points)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_check_violation()
            {
                return RepositoryError::Conflict("Yetersiz puan bakiyesi".to_owned());
            }
            RepositoryError::Database(e)
        })?;
        let balance = super::found(balance)?;

        sqlx::query(
            "INSERT INTO loyalty_transactions (user_id, points, reason, order_id, description) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user_id)
        .bind(points)
        .bind(reason)
        .bind(order_id)
        .bind(description)
        .execute(&mut *conn)
        .await?;

        Ok(balance)
    }
}
