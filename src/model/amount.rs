//! Amount type for handling monetary values with optional dollar signs.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that
//! may or may not include a dollar sign and commas. Amounts that were stored by older clients as
//! plain JSON numbers are accepted as well.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Represents a dollar amount.
///
/// Arithmetic is exact. Totals over any number of cents never drift, which is what lets the
/// ledger promise that `balance == income - expenses` to the cent.
///
/// # Examples
///
/// Parsing with or without a dollar sign and thousands separators:
/// ```
/// # use budget_pet::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("$1,250.00").unwrap();
/// let b = Amount::from_str("1250").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "$1,250.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Creates an amount from a whole number of cents, e.g. `Amount::from_cents(1999)` is $19.99.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Returns true if the amount is strictly less than zero.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// The amount without a dollar sign or separators, always with two decimal places.
    pub fn plain(&self) -> String {
        format!("{:.2}", self.0)
    }

    /// `None` when the sum does not fit in a `Decimal`.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// Sums `amounts`, or `None` if any partial sum overflows.
    pub fn checked_sum<'a>(amounts: impl IntoIterator<Item = &'a Amount>) -> Option<Amount> {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |acc, a| acc.checked_add(*a))
    }

    /// Lossy conversion for display ratios such as progress percentages.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
#[derive(Debug, Error)]
pub enum AmountError {
    #[error("an amount is required")]
    Empty,

    #[error("'{input}' is not a valid amount: {source}")]
    Invalid {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        // "-$50.00", "$50.00", "-50.00" and "50.00" are all accepted
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let unsigned = unsigned.strip_prefix('$').unwrap_or(unsigned);
        let digits = unsigned.replace(',', "");

        let value = Decimal::from_str(&digits).map_err(|source| AmountError::Invalid {
            input: s.to_string(),
            source,
        })?;
        Ok(Amount(if negative { -value } else { value }))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.0.abs().round_dp(2);
        write!(
            f,
            "{sign}${}",
            format_num::format_num!(",.2", abs.to_f64().unwrap_or_default())
        )
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.normalize().to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a string holding a dollar amount")
    }

    fn visit_str<E>(self, v: &str) -> Result<Amount, E>
    where
        E: de::Error,
    {
        Amount::from_str(v).map_err(E::custom)
    }

    fn visit_i64<E>(self, v: i64) -> Result<Amount, E>
    where
        E: de::Error,
    {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Amount, E>
    where
        E: de::Error,
    {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Amount, E>
    where
        E: de::Error,
    {
        if !v.is_finite() {
            return Err(E::custom(format!("{v} is not a finite amount")));
        }
        // The shortest round-trip representation of the float, e.g. 0.1 rather than
        // 0.1000000000000000055511151231257827
        Amount::from_str(&v.to_string()).map_err(E::custom)
    }
}

// The operators saturate at the bounds of `Decimal` rather than panic. The ledger refuses
// entries whose running totals would not fit, see `checked_add`.
impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        *self = *self + rhs;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_sub(rhs.0))
    }
}

impl Mul<Decimal> for Amount {
    type Output = Amount;

    fn mul(self, rhs: Decimal) -> Amount {
        Amount(self.0.saturating_mul(rhs))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.copied().sum()
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_with_dollar_sign() {
        assert_eq!(amt("$50.00").value(), Decimal::from_str("50.00").unwrap());
    }

    #[test]
    fn test_parse_negative_with_dollar_sign() {
        assert_eq!(amt("-$50.00").value(), Decimal::from_str("-50").unwrap());
    }

    #[test]
    fn test_parse_with_commas() {
        assert_eq!(amt("$1,234,567.89"), Amount::from_cents(123456789));
    }

    #[test]
    fn test_parse_whitespace() {
        assert_eq!(amt("  $50.00  "), Amount::from_cents(5000));
    }

    #[test]
    fn test_parse_empty_string_is_an_error() {
        assert!(matches!(Amount::from_str("  "), Err(AmountError::Empty)));
    }

    #[test]
    fn test_parse_garbage_is_an_error() {
        let err = Amount::from_str("twelve").unwrap_err();
        assert!(err.to_string().contains("twelve"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::from_cents(5000).to_string(), "$50.00");
        assert_eq!(Amount::from_cents(-5000).to_string(), "-$50.00");
        assert_eq!(Amount::ZERO.to_string(), "$0.00");
        assert_eq!(Amount::from_cents(6000000).to_string(), "$60,000.00");
    }

    #[test]
    fn test_plain() {
        assert_eq!(amt("$1,000").plain(), "1000.00");
        assert_eq!(amt("12.5").plain(), "12.50");
    }

    #[test]
    fn test_serialize_as_string() {
        let json = serde_json::to_string(&amt("50.50")).unwrap();
        assert_eq!(json, "\"50.5\"");
    }

    #[test]
    fn test_deserialize_string_and_number() {
        let a: Amount = serde_json::from_str("\"$50.00\"").unwrap();
        let b: Amount = serde_json::from_str("50").unwrap();
        let c: Amount = serde_json::from_str("50.0").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_deserialize_float_keeps_cents() {
        let a: Amount = serde_json::from_str("0.1").unwrap();
        assert_eq!(a, Amount::from_cents(10));
    }

    #[test]
    fn test_zero_is_not_positive_or_negative() {
        assert!(!Amount::ZERO.is_positive());
        assert!(!Amount::ZERO.is_negative());
        assert!(amt("-0").is_zero());
    }

    #[test]
    fn test_sum_is_exact() {
        let total: Amount = std::iter::repeat(amt("0.10")).take(10).sum();
        assert_eq!(total, amt("1"));
    }

    #[test]
    fn test_ordering() {
        assert!(amt("$30.00") < amt("$50.00"));
        assert!(amt("-1") < Amount::ZERO);
    }

    #[test]
    fn test_overflow_does_not_panic() {
        let max = Amount::new(Decimal::MAX);
        assert_eq!(max.checked_add(amt("0.01")), None);
        assert_eq!(Amount::checked_sum(&[max, max]), None);
        assert_eq!(Amount::checked_sum(&[amt("1"), amt("2")]), Some(amt("3")));
        assert_eq!(max + max, max);
        assert_eq!(Amount::new(Decimal::MIN) - max, Amount::new(Decimal::MIN));
        let total: Amount = [max, max].iter().sum();
        assert_eq!(total, max);
    }
}
