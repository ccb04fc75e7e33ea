//! Product pricing rules.
//!
//! Catalog prices are VAT (KDV) inclusive. A product may carry a "compare"
//! price shown struck through next to the selling price.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::types::Money;

/// KDV rate applied to supplements, in percent.
pub const VAT_RATE_PERCENT: u32 = 20;

/// Selling price paired with an optional compare price.
///
/// Construction guarantees that when `compare_at` is present it is strictly
/// greater than `price`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePair {
    pub price: Money,
    pub compare_at: Option<Money>,
}

impl PricePair {
    /// Pair a price with a compare price, dropping a compare price that is
    /// not above the selling price.
    #[must_use]
    pub fn new(price: Money, compare_at: Option<Money>) -> Self {
        Self {
            price,
            compare_at: compare_at.filter(|compare| *compare > price),
        }
    }

    /// Whole-number discount percentage, if the product is discounted.
    #[must_use]
    pub fn discount_percentage(&self) -> Option<u32> {
        let compare = self.compare_at?;
        let saved = compare.amount() - self.price.amount();
        (saved * Decimal::ONE_HUNDRED / compare.amount())
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
    }

    /// Amount saved against the compare price.
    #[must_use]
    pub fn savings(&self) -> Money {
        self.compare_at
            .map_or(Money::ZERO, |compare| compare.saturating_sub(self.price))
    }
}

/// Variant price resolution: a variant price overrides the product price.
#[must_use]
pub fn unit_price(product_price: Money, variant_price: Option<Money>) -> Money {
    variant_price.unwrap_or(product_price)
}

/// Net/VAT split of a VAT-inclusive amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VatBreakdown {
    pub net: Money,
    pub vat: Money,
    pub gross: Money,
    pub rate_percent: u32,
}

/// Split a gross (VAT-inclusive) amount into net and VAT parts.
///
/// `net + vat == gross` always holds; rounding lands on the VAT part.
#[must_use]
pub fn vat_included(gross: Money) -> VatBreakdown {
    let divisor = Decimal::ONE + Decimal::from(VAT_RATE_PERCENT) / Decimal::ONE_HUNDRED;
    let net = Money::new(gross.amount() / divisor);
    VatBreakdown {
        net,
        vat: gross - net,
        gross,
        rate_percent: VAT_RATE_PERCENT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tl(kurus: i64) -> Money {
        Money::from_kurus(kurus)
    }

    #[test]
    fn test_compare_price_at_or_below_price_is_dropped() {
        assert_eq!(PricePair::new(tl(10_000), Some(tl(10_000))).compare_at, None);
        assert_eq!(PricePair::new(tl(10_000), Some(tl(9_000))).compare_at, None);
        assert_eq!(
            PricePair::new(tl(10_000), Some(tl(12_500))).compare_at,
            Some(tl(12_500))
        );
    }

    #[test]
    fn test_selling_price_never_exceeds_compare_price() {
        for (price, compare) in [(100, 90), (100, 100), (100, 150), (0, 0), (5_000, 4_999)] {
            let pair = PricePair::new(tl(price), Some(tl(compare)));
            if let Some(compare_at) = pair.compare_at {
                assert!(pair.price < compare_at);
            }
        }
    }

    #[test]
    fn test_discount_percentage() {
        let pair = PricePair::new(tl(74_900), Some(tl(99_900)));
        assert_eq!(pair.discount_percentage(), Some(25));
        assert_eq!(pair.savings(), tl(25_000));
        assert_eq!(PricePair::new(tl(100), None).discount_percentage(), None);
    }

    #[test]
    fn test_variant_price_overrides_product_price() {
        assert_eq!(unit_price(tl(500), Some(tl(650))), tl(650));
        assert_eq!(unit_price(tl(500), None), tl(500));
    }

    #[test]
    fn test_vat_breakdown_sums_to_gross() {
        let split = vat_included(tl(120_000));
        assert_eq!(split.net, tl(100_000));
        assert_eq!(split.vat, tl(20_000));

        let odd = vat_included(tl(4_990));
        assert_eq!(odd.net + odd.vat, odd.gross);
        assert_eq!(odd.net, tl(4_158));
    }
}
