//! Shipping fee policy.

use serde::Serialize;

use crate::types::Money;

/// Flat-fee shipping with a free-shipping threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingPolicy {
    /// Orders at or above this subtotal ship free.
    pub free_threshold: Money,
    /// Fee charged below the threshold.
    pub flat_fee: Money,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            free_threshold: Money::from_kurus(50_000),
            flat_fee: Money::from_kurus(4_990),
        }
    }
}

/// Outcome of applying the policy to a subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingQuote {
    pub fee: Money,
    pub is_free: bool,
    /// How much more the customer must add to qualify for free shipping.
    pub remaining_for_free: Money,
}

impl ShippingPolicy {
    /// Quote shipping for a pre-discount subtotal.
    #[must_use]
    pub fn quote(&self, subtotal: Money) -> ShippingQuote {
        if subtotal >= self.free_threshold {
            ShippingQuote {
                fee: Money::ZERO,
                is_free: true,
                remaining_for_free: Money::ZERO,
            }
        } else {
            ShippingQuote {
                fee: self.flat_fee,
                is_free: false,
                remaining_for_free: self.free_threshold.saturating_sub(subtotal),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_iff_subtotal_reaches_threshold() {
        let policy = ShippingPolicy::default();

        let below = policy.quote(Money::from_kurus(49_999));
        assert!(!below.is_free);
        assert_eq!(below.fee, Money::from_kurus(4_990));
        assert_eq!(below.remaining_for_free, Money::from_kurus(1));

        let at = policy.quote(Money::from_kurus(50_000));
        assert!(at.is_free);
        assert_eq!(at.fee, Money::ZERO);

        assert!(policy.quote(Money::from_kurus(120_000)).is_free);
    }

    #[test]
    fn test_empty_subtotal_pays_fee() {
        let quote = ShippingPolicy::default().quote(Money::ZERO);
        assert_eq!(quote.fee, Money::from_kurus(4_990));
        assert_eq!(quote.remaining_for_free, Money::from_kurus(50_000));
    }
}
