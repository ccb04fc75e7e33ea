//! Coupon rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use takviye_core::coupon::CouponRules;
use takviye_core::{CouponId, DiscountType, Money};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_order: Option<Money>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    #[must_use]
    pub fn rules(&self) -> CouponRules {
        CouponRules {
            discount_type: self.discount_type,
            value: self.discount_value,
            min_order: self.min_order,
            max_uses: self.max_uses,
            used_count: self.used_count,
            starts_at: self.starts_at,
            expires_at: self.expires_at,
            is_active: self.is_active,
        }
    }
}
