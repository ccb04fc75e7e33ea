//! Turkish lira amounts using decimal arithmetic.
//!
//! The store sells in a single currency (TRY), so `Money` carries no currency
//! code. Amounts are kept at two decimal places (kuruş precision).

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Mul, Sub};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// ISO 4217 code of the store currency.
pub const CURRENCY_CODE: &str = "TRY";

/// Errors raised when constructing [`Money`] from untrusted input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("tutar negatif olamaz")]
    Negative,
    #[error("geçersiz tutar: {0}")]
    Invalid(String),
}

/// A non-negative-by-convention lira amount.
///
/// Arithmetic never panics; subtraction may go negative and callers clamp
/// with [`Money::saturating_sub`] where a floor of zero is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero lira.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal, rounding to kuruş.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Build from an integer number of kuruş (1/100 lira).
    #[must_use]
    pub fn from_kurus(kurus: i64) -> Self {
        Self(Decimal::new(kurus, 2))
    }

    /// Parse a user supplied amount such as `"149.90"`.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Invalid`] for unparseable input and
    /// [`MoneyError::Negative`] for amounts below zero.
    pub fn parse(s: &str) -> Result<Self, MoneyError> {
        let amount: Decimal = s
            .trim()
            .replace(',', ".")
            .parse()
            .map_err(|_| MoneyError::Invalid(s.to_owned()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }
        Ok(Self::new(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Subtract, flooring the result at zero.
    #[must_use]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        if rhs.0 >= self.0 {
            Self::ZERO
        } else {
            Self(self.0 - rhs.0)
        }
    }

    /// Multiply by a percentage (e.g. `20` for 20 %), rounded to kuruş.
    #[must_use]
    pub fn percent(self, percent: Decimal) -> Self {
        Self::new(self.0 * percent / Decimal::ONE_HUNDRED)
    }

    /// Format for Turkish display, e.g. `1.249,90 ₺`.
    #[must_use]
    pub fn display_tl(self) -> String {
        let fixed = format!("{:.2}", self.0.abs());
        let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        let sign = if self.is_negative() { "-" } else { "" };
        format!("{sign}{grouped},{fraction} ₺")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_kurus() {
        assert_eq!(Money::from_kurus(4990).to_string(), "49.90");
        assert_eq!(Money::from_kurus(50_000).to_string(), "500.00");
    }

    #[test]
    fn test_parse_accepts_turkish_decimal_comma() {
        assert_eq!(Money::parse("149,9").unwrap(), Money::from_kurus(14_990));
        assert_eq!(Money::parse(" 12.345 ").unwrap(), Money::from_kurus(1235));
        assert_eq!(Money::parse("-1"), Err(MoneyError::Negative));
        assert!(matches!(Money::parse("abc"), Err(MoneyError::Invalid(_))));
    }

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        let a = Money::from_kurus(1000);
        let b = Money::from_kurus(2500);
        assert_eq!(a.saturating_sub(b), Money::ZERO);
        assert_eq!(b.saturating_sub(a), Money::from_kurus(1500));
    }

    #[test]
    fn test_display_tl_groups_thousands() {
        assert_eq!(Money::from_kurus(124_990).display_tl(), "1.249,90 ₺");
        assert_eq!(Money::from_kurus(99).display_tl(), "0,99 ₺");
        assert_eq!(Money::from_kurus(123_456_789).display_tl(), "1.234.567,89 ₺");
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Money::from_kurus(4990)).unwrap();
        assert_eq!(json, "\"49.90\"");
    }

    #[test]
    fn test_sum_and_multiply() {
        let lines = [Money::from_kurus(1000) * 3, Money::from_kurus(250)];
        assert_eq!(lines.into_iter().sum::<Money>(), Money::from_kurus(3250));
    }
}
