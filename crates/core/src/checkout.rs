//! Order quote assembly.
//!
//! A quote is computed twice per checkout: once for the cart preview and
//! again inside the checkout handler right before the order is written.

use serde::Serialize;

use crate::loyalty::{self, Redemption};
use crate::shipping::ShippingPolicy;
use crate::types::Money;

/// One priced cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteLine {
    pub unit_price: Money,
    pub quantity: u32,
}

impl QuoteLine {
    #[must_use]
    pub fn total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// Points a signed-in customer has and wants to spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointsRequest {
    pub balance: i32,
    pub requested: i32,
}

/// Priced breakdown of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub subtotal: Money,
    pub coupon_discount: Money,
    pub points_redeemed: i32,
    pub points_discount: Money,
    pub shipping: Money,
    pub free_shipping: bool,
    pub remaining_for_free_shipping: Money,
    pub total: Money,
    pub points_earned: i32,
}

impl Quote {
    /// Build a quote.
    ///
    /// `coupon_discount` comes from [`crate::coupon::CouponRules::apply`] and is
    /// clamped again to the subtotal. Points only apply when `points` is given
    /// (guests never redeem) and are capped to the discounted subtotal.
    /// Shipping is judged on the pre-discount subtotal.
    #[must_use]
    pub fn build(
        lines: &[QuoteLine],
        coupon_discount: Money,
        points: Option<PointsRequest>,
        shipping: &ShippingPolicy,
    ) -> Self {
        let subtotal: Money = lines.iter().map(QuoteLine::total).sum();
        let coupon_discount = coupon_discount.min(subtotal);
        let after_coupon = subtotal.saturating_sub(coupon_discount);

        let Redemption {
            points: points_redeemed,
            value: points_discount,
        } = points.map_or_else(Redemption::default, |p| {
            loyalty::redeem(p.balance, p.requested, after_coupon)
        });

        let shipping_quote = shipping.quote(subtotal);
        let total = after_coupon.saturating_sub(points_discount) + shipping_quote.fee;

        Self {
            subtotal,
            coupon_discount,
            points_redeemed,
            points_discount,
            shipping: shipping_quote.fee,
            free_shipping: shipping_quote.is_free,
            remaining_for_free_shipping: shipping_quote.remaining_for_free,
            total,
            points_earned: loyalty::points_earned(total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(kurus: i64, quantity: u32) -> QuoteLine {
        QuoteLine {
            unit_price: Money::from_kurus(kurus),
            quantity,
        }
    }

    #[test]
    fn test_small_cart_pays_shipping() {
        let quote = Quote::build(
            &[line(19_990, 1)],
            Money::ZERO,
            None,
            &ShippingPolicy::default(),
        );
        assert_eq!(quote.subtotal, Money::from_kurus(19_990));
        assert_eq!(quote.shipping, Money::from_kurus(4_990));
        assert_eq!(quote.total, Money::from_kurus(24_980));
        assert_eq!(quote.points_earned, 24);
        assert!(!quote.free_shipping);
    }

    #[test]
    fn test_free_shipping_uses_pre_discount_subtotal() {
        let quote = Quote::build(
            &[line(25_000, 2)],
            Money::from_kurus(5_000),
            None,
            &ShippingPolicy::default(),
        );
        assert!(quote.free_shipping);
        assert_eq!(quote.total, Money::from_kurus(45_000));
    }

    #[test]
    fn test_points_capped_after_coupon() {
        let quote = Quote::build(
            &[line(10_000, 1)],
            Money::from_kurus(9_000),
            Some(PointsRequest {
                balance: 5_000,
                requested: 5_000,
            }),
            &ShippingPolicy::default(),
        );
        assert_eq!(quote.points_redeemed, 100);
        assert_eq!(quote.points_discount, Money::from_kurus(1_000));
        assert_eq!(quote.total, Money::from_kurus(4_990));
    }

    #[test]
    fn test_oversized_coupon_is_clamped() {
        let quote = Quote::build(
            &[line(1_000, 1)],
            Money::from_kurus(99_999),
            None,
            &ShippingPolicy::default(),
        );
        assert_eq!(quote.coupon_discount, Money::from_kurus(1_000));
        assert_eq!(quote.total, Money::from_kurus(4_990));
    }
}
