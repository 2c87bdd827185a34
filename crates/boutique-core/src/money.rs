//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Catalog documents store prices as doubles:                             │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    "49.99" is parsed digit by digit into 4999 cents.                    │
//! │    Bag subtotals, delivery fees and order totals never touch f64.       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use boutique_core::money::Money;
//!
//! let price = Money::parse_decimal("10.99").unwrap();
//! assert_eq!(price.cents(), 1099);
//!
//! let line_total = price.checked_mul_quantity(3).unwrap();
//! assert_eq!(line_total.to_string(), "$32.97");
//! ```
//!
//! ## Overflow
//! Prices come from the remote catalog unbounded and bag quantities go up to
//! `u32::MAX`, so bag arithmetic only goes through the `checked_*` methods.
//! There are no `+`/`*` operators on `Money`.
//!
//! ```rust
//! use boutique_core::money::Money;
//!
//! let huge = Money::parse_decimal("100000000000000").unwrap();
//! assert!(huge.checked_mul_quantity(1000).is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative adjustments
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serialized as cents**: Snapshots store the exact integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use boutique_core::money::Money;
    ///
    /// let fee = Money::from_cents(495);
    /// assert_eq!(fee.cents(), 495);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a bag quantity.
    ///
    /// ## Errors
    /// `AmountOverflow` if the product does not fit in an `i64` of cents.
    #[inline]
    pub fn checked_mul_quantity(&self, quantity: u32) -> CoreResult<Money> {
        self.0
            .checked_mul(i64::from(quantity))
            .map(Money)
            .ok_or(CoreError::AmountOverflow)
    }

    /// Adds two amounts.
    ///
    /// ## Errors
    /// `AmountOverflow` if the sum does not fit in an `i64` of cents.
    #[inline]
    pub fn checked_add(self, other: Money) -> CoreResult<Money> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or(CoreError::AmountOverflow)
    }

    /// Parses a decimal amount such as `"49.99"`, `"12"` or `"-5.5"`.
    ///
    /// ## Rounding
    /// Only two fractional digits are kept. The third digit rounds half away
    /// from zero; anything beyond it is ignored.
    ///
    /// ```rust
    /// use boutique_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("19.995").unwrap().cents(), 2000);
    /// assert_eq!(Money::parse_decimal("-5.5").unwrap().cents(), -550);
    /// assert!(Money::parse_decimal("12,50").is_err());
    /// ```
    pub fn parse_decimal(input: &str) -> CoreResult<Money> {
        let invalid = |reason: &str| CoreError::InvalidAmount {
            value: input.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("no digits"));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid("expected digits with an optional decimal point"));
        }

        let whole_cents = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<i64>()
                .ok()
                .and_then(|w| w.checked_mul(100))
                .ok_or_else(|| invalid("out of range"))?
        };

        let mut digits = fraction.bytes().map(|b| i64::from(b - b'0'));
        let tenths = digits.next().unwrap_or(0);
        let hundredths = digits.next().unwrap_or(0);
        let round_up = digits.next().is_some_and(|d| d >= 5);

        let magnitude = whole_cents
            .checked_add(tenths * 10 + hundredths + i64::from(round_up))
            .ok_or_else(|| invalid("out of range"))?;

        Ok(Money(if negative { -magnitude } else { magnitude }))
    }

    /// Formats the amount as a plain decimal string (`"49.99"`).
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Serde helper for catalog prices
// =============================================================================

/// Serde adapter for `Option<Money>` fields stored as decimal prices.
///
/// Reads JSON integers (`12`), doubles (`49.99`) and strings (`"49.99"`);
/// writes a decimal string so the value survives a snapshot round trip
/// without float conversion.
pub mod decimal {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Money;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPrice {
        Int(i64),
        Float(f64),
        Text(String),
    }

    pub fn serialize<S>(value: &Option<Money>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(money) => serializer.serialize_some(&money.to_decimal_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Money>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<RawPrice>::deserialize(deserializer)?;
        let money = match raw {
            None => return Ok(None),
            Some(RawPrice::Int(whole)) => whole
                .checked_mul(100)
                .map(Money::from_cents)
                .ok_or_else(|| D::Error::custom(format!("price {whole} out of range")))?,
            // f64's Display is the shortest round-trip form, so 49.99 prints as "49.99"
            Some(RawPrice::Float(value)) if value.is_finite() => {
                Money::parse_decimal(&value.to_string()).map_err(D::Error::custom)?
            }
            Some(RawPrice::Float(value)) => {
                return Err(D::Error::custom(format!("price {value} is not finite")))
            }
            Some(RawPrice::Text(text)) if text.trim().is_empty() => return Ok(None),
            Some(RawPrice::Text(text)) => Money::parse_decimal(&text).map_err(D::Error::custom)?,
        };
        Ok(Some(money))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!(a.checked_add(b).unwrap().cents(), 1500);
        assert_eq!(a.checked_mul_quantity(3).unwrap().cents(), 3000);
        assert_eq!(a.checked_mul_quantity(0).unwrap(), Money::zero());
    }

    #[test]
    fn test_checked_arithmetic_overflow() {
        let price = Money::parse_decimal("100000000000000").unwrap();
        assert!(matches!(
            price.checked_mul_quantity(1000),
            Err(CoreError::AmountOverflow)
        ));
        assert!(price.checked_mul_quantity(u32::MAX).is_err());

        let max = Money::from_cents(i64::MAX);
        assert!(matches!(
            max.checked_add(Money::from_cents(1)),
            Err(CoreError::AmountOverflow)
        ));
        assert_eq!(max.checked_add(Money::zero()).unwrap(), max);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Money::parse_decimal("49.99").unwrap().cents(), 4999);
        assert_eq!(Money::parse_decimal("12").unwrap().cents(), 1200);
        assert_eq!(Money::parse_decimal("0.5").unwrap().cents(), 50);
        assert_eq!(Money::parse_decimal(".75").unwrap().cents(), 75);
        assert_eq!(Money::parse_decimal(" +3.10 ").unwrap().cents(), 310);
        assert_eq!(Money::parse_decimal("-5.5").unwrap().cents(), -550);
    }

    #[test]
    fn test_parse_decimal_rounding() {
        assert_eq!(Money::parse_decimal("1.234").unwrap().cents(), 123);
        assert_eq!(Money::parse_decimal("1.235").unwrap().cents(), 124);
        assert_eq!(Money::parse_decimal("-1.235").unwrap().cents(), -124);
        assert_eq!(Money::parse_decimal("19.9999999").unwrap().cents(), 2000);
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        assert!(Money::parse_decimal("").is_err());
        assert!(Money::parse_decimal(".").is_err());
        assert!(Money::parse_decimal("12,50").is_err());
        assert!(Money::parse_decimal("1e3").is_err());
        assert!(Money::parse_decimal("99999999999999999999").is_err());
    }

    #[test]
    fn test_decimal_string() {
        assert_eq!(Money::from_cents(4999).to_decimal_string(), "49.99");
        assert_eq!(Money::from_cents(-550).to_decimal_string(), "-5.50");
        assert_eq!(Money::from_cents(7).to_decimal_string(), "0.07");
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Priced {
        #[serde(default, with = "decimal")]
        price: Option<Money>,
    }

    #[test]
    fn test_decimal_serde_accepts_numbers_and_strings() {
        let from_float: Priced = serde_json::from_str(r#"{"price": 49.99}"#).unwrap();
        assert_eq!(from_float.price, Some(Money::from_cents(4999)));

        let from_int: Priced = serde_json::from_str(r#"{"price": 12}"#).unwrap();
        assert_eq!(from_int.price, Some(Money::from_cents(1200)));

        let from_text: Priced = serde_json::from_str(r#"{"price": "0.10"}"#).unwrap();
        assert_eq!(from_text.price, Some(Money::from_cents(10)));

        let missing: Priced = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.price, None);

        let null: Priced = serde_json::from_str(r#"{"price": null}"#).unwrap();
        assert_eq!(null.price, None);
    }

    #[test]
    fn test_decimal_serde_writes_strings() {
        let priced = Priced {
            price: Some(Money::from_cents(1999)),
        };
        let json = serde_json::to_string(&priced).unwrap();
        assert_eq!(json, r#"{"price":"19.99"}"#);

        let back: Priced = serde_json::from_str(&json).unwrap();
        assert_eq!(back, priced);
    }
}
