//! Monetary amount type for transaction values.
//!
//! This module provides the `Amount` type which wraps `Decimal`. The remote store sends and
//! expects amounts as plain JSON numbers, while humans type things like `$1,250.00` on the
//! command line, so `Amount` carries custom serde and parsing for both shapes.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The smallest amount the remote store accepts: `0.01`.
pub const MIN_AMOUNT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// The largest amount the remote store accepts: `999999.99`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 2);

/// A monetary value. Amounts are stored unsigned; the direction of money movement is carried
/// by the transaction's `kind`, never by the sign of the amount.
///
/// Equality and ordering are numeric. Values are normalized to two decimal places when they
/// come from lossy sources (floating point JSON numbers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// Creates a new `Amount` from a `Decimal` value. Bounds are not enforced here; they are
    /// checked by draft validation before anything is sent to the remote store.
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying `Decimal` value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// True when the value lies within the bounds the remote store accepts.
    pub fn in_bounds(&self) -> bool {
        self.0 >= MIN_AMOUNT && self.0 <= MAX_AMOUNT
    }

    /// Checked addition for aggregation.
    pub fn plus(&self, other: Amount) -> Amount {
        Amount(self.0 + other.0)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Amount {
    type Err = rust_decimal::Error;

    /// Parses an amount from user input. A leading dollar sign and thousands separators are
    /// tolerated: `$1,250.00`, `1,250.00` and `1250` all parse to the same value.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let cleaned: String = s
            .trim()
            .chars()
            .filter(|c| *c != '$' && *c != ',')
            .collect();
        Decimal::from_str(&cleaned).map(Amount)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0.to_f64() {
            Some(f) => serializer.serialize_f64(f),
            None => Err(serde::ser::Error::custom(format!(
                "amount {} cannot be represented as a JSON number",
                self.0
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_f64<E>(self, v: f64) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        let value = Decimal::try_from(v)
            .map_err(|e| E::custom(format!("invalid amount {v}: {e}")))?
            .round_dp(2);
        Ok(Amount(value))
    }

    fn visit_u64<E>(self, v: u64) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_i64<E>(self, v: i64) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        Amount::from_str(v).map_err(|e| E::custom(format!("invalid amount '{v}': {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let a = Amount::from_str("50.00").unwrap();
        assert_eq!(a.to_string(), "50.00");
    }

    #[test]
    fn test_parse_dollar_and_commas() {
        let a = Amount::from_str("$1,250.5").unwrap();
        assert_eq!(a.to_string(), "1250.50");
        assert_eq!(a, Amount::from_str("1250.50").unwrap());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Amount::from_str("twelve").is_err());
        assert!(Amount::from_str("").is_err());
    }

    #[test]
    fn test_bounds() {
        assert!(Amount::from_str("0.01").unwrap().in_bounds());
        assert!(Amount::from_str("999999.99").unwrap().in_bounds());
        assert!(!Amount::from_str("0.00").unwrap().in_bounds());
        assert!(!Amount::from_str("1000000.00").unwrap().in_bounds());
    }

    #[test]
    fn test_serialize_as_number() {
        let a = Amount::from_str("42.50").unwrap();
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "42.5");
    }

    #[test]
    fn test_deserialize_number() {
        let a: Amount = serde_json::from_str("42.5").unwrap();
        assert_eq!(a, Amount::from_str("42.50").unwrap());
        let b: Amount = serde_json::from_str("7").unwrap();
        assert_eq!(b, Amount::from_str("7").unwrap());
    }

    #[test]
    fn test_deserialize_numeric_string() {
        let a: Amount = serde_json::from_str(r#""19.99""#).unwrap();
        assert_eq!(a, Amount::from_str("19.99").unwrap());
    }

    #[test]
    fn test_deserialize_rejects_non_numeric() {
        let result: std::result::Result<Amount, _> = serde_json::from_str(r#""abc""#);
        assert!(result.is_err());
    }
}
