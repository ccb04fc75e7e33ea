//! Loyalty points and referral rewards.
//!
//! Customers earn one point per 10 TRY spent; each point is worth 0.10 TRY
//! when redeemed at checkout.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::impl_text_enum;
use crate::types::Money;

/// Lira spent per point earned.
pub const LIRA_PER_POINT_EARNED: i64 = 10;

/// Redemption value of a single point, in kuruş.
pub const POINT_VALUE_KURUS: i64 = 10;

/// Points credited to the existing customer whose code was used.
pub const REFERRER_REWARD_POINTS: i32 = 100;

/// Points credited to the newly registered customer.
pub const REFEREE_REWARD_POINTS: i32 = 50;

/// Why a ledger entry was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerReason {
    /// Credited when an order is delivered.
    OrderEarned,
    /// Debited when points pay for part of an order.
    OrderRedeemed,
    /// Redeemed points returned after a cancellation.
    OrderRefund,
    ReferralBonus,
    SignupBonus,
    /// Manual correction from the back-office.
    Adjustment,
}

impl LedgerReason {
    pub const ALL: [Self; 6] = [
        Self::OrderEarned,
        Self::OrderRedeemed,
        Self::OrderRefund,
        Self::ReferralBonus,
        Self::SignupBonus,
        Self::Adjustment,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrderEarned => "order_earned",
            Self::OrderRedeemed => "order_redeemed",
            Self::OrderRefund => "order_refund",
            Self::ReferralBonus => "referral_bonus",
            Self::SignupBonus => "signup_bonus",
            Self::Adjustment => "adjustment",
        }
    }
}

impl_text_enum!(LedgerReason, "ledger reason");

/// Points earned for an order total.
#[must_use]
pub fn points_earned(total: Money) -> i32 {
    (total.amount() / Decimal::from(LIRA_PER_POINT_EARNED))
        .floor()
        .to_i32()
        .unwrap_or(0)
        .max(0)
}

/// Lira value of a number of points.
#[must_use]
pub fn points_value(points: i32) -> Money {
    Money::from_kurus(i64::from(points.max(0)) * POINT_VALUE_KURUS)
}

/// Points applied to an order and the lira they cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub points: i32,
    pub value: Money,
}

/// Work out how many points to redeem.
///
/// Redeems the smaller of `requested`, the available `balance`, and the number
/// of points whose value fits in `cap` (so points never push a total below
/// zero).
#[must_use]
pub fn redeem(balance: i32, requested: i32, cap: Money) -> Redemption {
    let fit = (cap.amount() * Decimal::ONE_HUNDRED / Decimal::from(POINT_VALUE_KURUS))
        .floor()
        .to_i32()
        .unwrap_or(i32::MAX);
    let points = requested.min(balance).min(fit).max(0);
    Redemption {
        points,
        value: points_value(points),
    }
}

/// Canonical form of a typed referral code.
#[must_use]
pub fn normalize_referral_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_earned_floor() {
        assert_eq!(points_earned(Money::from_kurus(9_999)), 9);
        assert_eq!(points_earned(Money::from_kurus(10_000)), 10);
        assert_eq!(points_earned(Money::from_kurus(999)), 0);
    }

    #[test]
    fn test_points_value() {
        assert_eq!(points_value(250), Money::from_kurus(2_500));
        assert_eq!(points_value(-5), Money::ZERO);
    }

    #[test]
    fn test_redeem_limited_by_balance() {
        let r = redeem(120, 500, Money::from_kurus(100_000));
        assert_eq!(r.points, 120);
        assert_eq!(r.value, Money::from_kurus(1_200));
    }

    #[test]
    fn test_redeem_limited_by_cap() {
        let r = redeem(10_000, 10_000, Money::from_kurus(3_055));
        assert_eq!(r.points, 305);
        assert_eq!(r.value, Money::from_kurus(3_050));
    }

    #[test]
    fn test_redeem_negative_request_is_zero() {
        assert_eq!(redeem(100, -3, Money::from_kurus(5_000)), Redemption::default());
    }

    #[test]
    fn test_ledger_reason_text() {
        assert_eq!(
            "order_refund".parse::<LedgerReason>().ok(),
            Some(LedgerReason::OrderRefund)
        );
    }
}
