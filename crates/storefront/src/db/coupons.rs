//! Coupon repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};

use takviye_core::coupon::normalize_code;
use takviye_core::{CouponId, DiscountType, Money};

use super::catalog::default_true;
use super::{RepositoryError, conflict_on_unique, found};
use crate::models::coupon::Coupon;

const COUPON_COLUMNS: &str = "id, code, description, discount_type, discount_value, min_order, \
     max_uses, used_count, starts_at, expires_at, is_active, created_at";

/// Coupon create/update payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponInput {
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_order: Option<Money>,
    pub max_uses: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl CouponInput {
    /// Check the payload before writing it. Returns a message for the client.
    ///
    /// # Errors
    ///
    /// Returns the reason the coupon cannot be saved.
    pub fn validate(&self) -> Result<(), String> {
        if normalize_code(&self.code).is_empty() {
            return Err("Kupon kodu boş olamaz".to_string());
        }
        if self.discount_value <= Decimal::ZERO {
            return Err("İndirim değeri sıfırdan büyük olmalı".to_string());
        }
        if self.discount_type == DiscountType::Percentage && self.discount_value > Decimal::ONE_HUNDRED {
            return Err("Yüzde indirim 100'ü geçemez".to_string());
        }
        if let (Some(starts), Some(expires)) = (self.starts_at, self.expires_at)
            && expires <= starts
        {
            return Err("Bitiş tarihi başlangıçtan sonra olmalı".to_string());
        }
        if self.max_uses.is_some_and(|m| m < 1) {
            return Err("Kullanım limiti en az 1 olmalı".to_string());
        }
        Ok(())
    }
}

/// Repository for coupons.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All coupons, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Coupon>, RepositoryError> {
        let rows = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Get a coupon by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CouponId) -> Result<Option<Coupon>, RepositoryError> {
        let row = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Look a coupon up by code, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Coupon>, RepositoryError> {
        let row = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE code = $1"
        ))
        .bind(normalize_code(code))
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Insert or update a coupon. Codes are stored upper-case.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate code and
    /// `RepositoryError::NotFound` when updating a missing row.
    pub async fn save(
        &self,
        id: Option<CouponId>,
        input: &CouponInput,
    ) -> Result<Coupon, RepositoryError> {
        let sql = match id {
            None => format!(
                "INSERT INTO coupons (code, description, discount_type, discount_value, min_order, \
                     max_uses, starts_at, expires_at, is_active) \
                 VALUES ($2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {COUPON_COLUMNS}"
            ),
            Some(_) => format!(
                "UPDATE coupons SET code = $2, description = $3, discount_type = $4, \
                     discount_value = $5, min_order = $6, max_uses = $7, starts_at = $8, \
                     expires_at = $9, is_active = $10 \
                 WHERE id = $1 RETURNING {COUPON_COLUMNS}"
            ),
        };
        let row = sqlx::query_as::<_, Coupon>(&sql)
            .bind(id)
            .bind(normalize_code(&input.code))
            .bind(&input.description)
            .bind(input.discount_type)
            .bind(input.discount_value)
            .bind(input.min_order)
            .bind(input.max_uses)
            .bind(input.starts_at)
            .bind(input.expires_at)
            .bind(input.is_active)
            .fetch_optional(self.pool)
            .await
            .map_err(conflict_on_unique("Kupon kodu"))?;
        found(row)
    }

    /// Delete a coupon.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the coupon does not exist.
    pub async fn delete(&self, id: CouponId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM coupons WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Count one use of a coupon, refusing once `max_uses` is reached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the coupon is used up.
    pub async fn record_use(conn: &mut PgConnection, code: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE coupons SET used_count = used_count + 1 \
             WHERE code = $1 AND (max_uses IS NULL OR used_count < max_uses)",
        )
        .bind(normalize_code(code))
        .execute(conn)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict("Kupon kullanım limiti dolmuş".to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn input(discount_type: DiscountType, value: i64) -> CouponInput {
        CouponInput {
            code: "yaz25".to_string(),
            description: None,
            discount_type,
            discount_value: Decimal::from(value),
            min_order: None,
            max_uses: None,
            starts_at: None,
            expires_at: None,
            is_active: true,
        }
    }

    #[test]
    fn test_valid_coupons_pass() {
        assert!(input(DiscountType::Percentage, 25).validate().is_ok());
        assert!(input(DiscountType::Fixed, 500).validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_discounts() {
        assert!(input(DiscountType::Percentage, 101).validate().is_err());
        assert!(input(DiscountType::Fixed, 0).validate().is_err());

        let mut blank = input(DiscountType::Fixed, 50);
        blank.code = "   ".to_string();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_window() {
        let mut coupon = input(DiscountType::Percentage, 10);
        coupon.starts_at = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).single();
        coupon.expires_at = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).single();
        assert!(coupon.validate().is_err());
    }
}
