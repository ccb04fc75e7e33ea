//! Coupon eligibility and discount calculation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::types::{DiscountType, Money};

/// Why a coupon cannot be applied. Messages are shown to customers.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CouponError {
    #[error("kupon aktif değil")]
    Inactive,
    #[error("kupon henüz geçerli değil")]
    NotStarted,
    #[error("kuponun süresi dolmuş")]
    Expired,
    #[error("kupon kullanım limiti dolmuş")]
    Exhausted,
    #[error("bu kupon için minimum sepet tutarı {minimum}")]
    BelowMinimum { minimum: String },
}

/// The rule-bearing fields of a coupon row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponRules {
    pub discount_type: DiscountType,
    /// Percent for [`DiscountType::Percentage`], lira for [`DiscountType::Fixed`].
    pub value: Decimal,
    pub min_order: Option<Money>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl CouponRules {
    /// Check eligibility at `now` and compute the discount for `subtotal`.
    ///
    /// The returned discount is never more than the subtotal.
    ///
    /// # Errors
    ///
    /// Returns the first [`CouponError`] that makes the coupon unusable.
    pub fn apply(&self, subtotal: Money, now: DateTime<Utc>) -> Result<Money, CouponError> {
        if !self.is_active {
            return Err(CouponError::Inactive);
        }
        if self.starts_at.is_some_and(|start| now < start) {
            return Err(CouponError::NotStarted);
        }
        if self.expires_at.is_some_and(|end| now > end) {
            return Err(CouponError::Expired);
        }
        if self.max_uses.is_some_and(|max| self.used_count >= max) {
            return Err(CouponError::Exhausted);
        }
        if let Some(minimum) = self.min_order
            && subtotal < minimum
        {
            return Err(CouponError::BelowMinimum {
                minimum: minimum.display_tl(),
            });
        }

        let raw = match self.discount_type {
            DiscountType::Percentage => subtotal.percent(self.value.max(Decimal::ZERO)),
            DiscountType::Fixed => Money::new(self.value.max(Decimal::ZERO)),
        };
        Ok(raw.min(subtotal))
    }
}

/// Canonical form of a user typed coupon code.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn rules(discount_type: DiscountType, value: i64) -> CouponRules {
        CouponRules {
            discount_type,
            value: Decimal::from(value),
            min_order: None,
            max_uses: None,
            used_count: 0,
            starts_at: None,
            expires_at: None,
            is_active: true,
        }
    }

    #[test]
    fn test_percentage_discount() {
        let coupon = rules(DiscountType::Percentage, 10);
        let discount = coupon.apply(Money::from_kurus(45_000), Utc::now()).unwrap();
        assert_eq!(discount, Money::from_kurus(4_500));
    }

    #[test]
    fn test_discount_never_exceeds_subtotal() {
        let fixed = rules(DiscountType::Fixed, 200);
        assert_eq!(
            fixed.apply(Money::from_kurus(15_000), Utc::now()).unwrap(),
            Money::from_kurus(15_000)
        );

        let percent = rules(DiscountType::Percentage, 150);
        assert_eq!(
            percent.apply(Money::from_kurus(8_000), Utc::now()).unwrap(),
            Money::from_kurus(8_000)
        );
    }

    #[test]
    fn test_expired_and_not_started() {
        let now = Utc::now();
        let mut coupon = rules(DiscountType::Fixed, 50);
        coupon.expires_at = Some(now - Duration::days(1));
        assert_eq!(
            coupon.apply(Money::from_kurus(10_000), now),
            Err(CouponError::Expired)
        );

        coupon.expires_at = None;
        coupon.starts_at = Some(now + Duration::hours(2));
        assert_eq!(
            coupon.apply(Money::from_kurus(10_000), now),
            Err(CouponError::NotStarted)
        );
    }

    #[test]
    fn test_exhausted_coupon_rejected() {
        let mut coupon = rules(DiscountType::Fixed, 50);
        coupon.max_uses = Some(3);
        coupon.used_count = 3;
        assert_eq!(
            coupon.apply(Money::from_kurus(10_000), Utc::now()),
            Err(CouponError::Exhausted)
        );
    }

    #[test]
    fn test_minimum_order() {
        let mut coupon = rules(DiscountType::Fixed, 50);
        coupon.min_order = Some(Money::from_kurus(30_000));
        let err = coupon
            .apply(Money::from_kurus(29_999), Utc::now())
            .unwrap_err();
        assert_eq!(
            err,
            CouponError::BelowMinimum {
                minimum: "300,00 ₺".to_owned()
            }
        );
        assert!(coupon.apply(Money::from_kurus(30_000), Utc::now()).is_ok());
    }

    #[test]
    fn test_inactive_coupon_rejected() {
        let mut coupon = rules(DiscountType::Percentage, 5);
        coupon.is_active = false;
        assert_eq!(
            coupon.apply(Money::from_kurus(10_000), Utc::now()),
            Err(CouponError::Inactive)
        );
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  hosgeldin10 "), "HOSGELDIN10");
    }
}
