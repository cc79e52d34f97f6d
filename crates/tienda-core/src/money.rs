//! # Money Module
//!
//! Provides the `Money` type for handling monetary values exactly.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    12.90 × 0.95 → 12.25499999...  ❌ WRONG! (rounds to 12.25)          │
//! │                                                                         │
//! │  The wholesale discount multiplies by 0.95, which integer cents         │
//! │  cannot hold either (12.90 × 0.95 = 12.255, a fraction of a cent).      │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 Decimal (rust_decimal)                           │
//! │    12.90 × 0.9500 = 12.255 exactly, no rounding until display          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire and Storage Format
//! - JSON: serialized as a string (`"12.50"`), accepted as string or number
//! - SQLite: stored as TEXT holding the same string
//! - Display: `S/ 12.50` (rounded to cents for humans only)
//!
//! ## Usage
//! ```rust
//! use tienda_core::money::Money;
//!
//! let price = Money::parse("2.99").unwrap();
//! let line_total = price.checked_multiply_quantity(3).unwrap();
//! assert_eq!(line_total, Money::parse("8.97").unwrap());
//! assert_eq!(line_total.to_string(), "S/ 8.97");
//! ```

use rust_decimal::prelude::*;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Sub};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in soles, held as an exact decimal.
///
/// ## User Workflow Context
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  Product.sale_price ──► pricing (×0.95 if MAYOR) ──► SaleLine.unit_price│
/// │                                                         │               │
/// │                                     × quantity ◄────────┘               │
/// │                                         │                               │
/// │                                         ▼                               │
/// │  SaleLine.subtotal ══ Sale.total ──► Dashboard ventas_hoy ──► RUS fee   │
/// │                                                                         │
/// │  Product.unit_cost ──► Sale.profit ──► Dashboard ganancia_hoy           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// Zero soles.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Wraps a decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates an amount from an integer number of céntimos.
    ///
    /// ```rust
    /// use tienda_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1250).to_string(), "S/ 12.50");
    /// ```
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Parses a decimal string such as `"12.50"`.
    pub fn parse(s: &str) -> Result<Self, rust_decimal::Error> {
        Decimal::from_str_exact(s.trim()).map(Money)
    }

    /// Returns the underlying decimal.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Multiplies money by a quantity.
    ///
    /// Returns `None` when the product does not fit in a decimal
    /// (about 7.9 × 10^28).
    ///
    /// ## Example
    /// ```rust
    /// use tienda_core::money::Money;
    ///
    /// let unit_price = Money::parse("12.255").unwrap();
    /// assert_eq!(unit_price.checked_multiply_quantity(2), Some(Money::parse("24.51").unwrap()));
    /// ```
    #[inline]
    pub fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(Decimal::from(qty)).map(Money)
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtracts two amounts, `None` on overflow.
    #[inline]
    pub fn checked_sub(&self, other: Money) -> Option<Self> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Sums amounts, `None` as soon as the running total overflows.
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |acc, m| acc.checked_add(m))
    }

    /// Applies a percentage discount given in basis points (500 = 5%).
    ///
    /// The factor is built as an exact decimal (`0.9500` for 500 bps), so the
    /// result carries every digit of the product. No rounding happens here.
    ///
    /// ## Example
    /// ```rust
    /// use tienda_core::money::Money;
    ///
    /// let list = Money::parse("12.90").unwrap();
    /// assert_eq!(list.discounted_by_bps(500), Money::parse("12.255").unwrap());
    /// ```
    pub fn discounted_by_bps(&self, discount_bps: u32) -> Money {
        let keep_bps = 10_000i64 - i64::from(discount_bps.min(10_000));
        Money(self.0 * Decimal::new(keep_bps, 4))
    }

    /// Rounds to céntimos (half away from zero) for display.
    pub fn round_to_cents(&self) -> Money {
        let mut rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(2);
        Money(rounded)
    }

    /// Canonical string used on the wire and in SQLite.
    ///
    /// Trailing zeros past the second decimal are dropped, and at least two
    /// decimals are always shown: `12.5` → `"12.50"`, `12.2550` → `"12.255"`.
    pub fn to_plain_string(&self) -> String {
        let mut canonical = self.0.normalize();
        if canonical.scale() < 2 {
            canonical.rescale(2);
        }
        canonical.to_string()
    }

    /// Lossy conversion for wire protocols that only carry binary floats.
    ///
    /// Never use the result for arithmetic.
    pub fn to_f64_lossy(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount the way a Peruvian receipt does: `S/ 12.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = self.round_to_cents().0;
        if shown.is_sign_negative() && !shown.is_zero() {
            write!(f, "-S/ {}", shown.abs())
        } else {
            write!(f, "S/ {}", shown.abs())
        }
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

/// Panics on overflow like `Decimal`; amounts derived from user input go
/// through the `checked_*` methods instead.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_plain_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal amount as a string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        Money::parse(v).map_err(|e| E::custom(format!("invalid amount '{}': {}", v, e)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Ok(Money(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        Ok(Money(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        // JSON numbers arrive as f64; go through the shortest decimal text
        // so 12.9 stays 12.9 instead of 12.9000000000000003552713678800500929355621337890625
        if !v.is_finite() {
            return Err(E::custom("amount must be a finite number"));
        }
        Money::parse(&v.to_string()).map_err(|e| E::custom(format!("invalid amount {}: {}", v, e)))
    }
}

// =============================================================================
// SQLite Storage
// =============================================================================

#[cfg(feature = "sqlx")]
mod sqlite {
    use super::Money;
    use rust_decimal::Decimal;
    use sqlx::encode::IsNull;
    use sqlx::error::BoxDynError;
    use sqlx::sqlite::{Sqlite, SqliteTypeInfo, SqliteValueRef};
    use sqlx::{Database, Decode, Encode, Type};

    impl Type<Sqlite> for Money {
        fn type_info() -> SqliteTypeInfo {
            <String as Type<Sqlite>>::type_info()
        }

        fn compatible(ty: &SqliteTypeInfo) -> bool {
            <String as Type<Sqlite>>::compatible(ty)
        }
    }

    impl<'q> Encode<'q, Sqlite> for Money {
        fn encode_by_ref(
            &self,
            buf: &mut <Sqlite as Database>::ArgumentBuffer<'q>,
        ) -> Result<IsNull, BoxDynError> {
            <String as Encode<'q, Sqlite>>::encode(self.to_plain_string(), buf)
        }
    }

    impl<'r> Decode<'r, Sqlite> for Money {
        fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
            let text = <&str as Decode<'r, Sqlite>>::decode(value)?;
            Ok(Money(Decimal::from_str_exact(text)?))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn m(s: &str) -> Money {
        Money::parse(s).unwrap()
    }

    #[test]
    fn test_display_rounds_to_cents() {
        assert_eq!(m("12.5").to_string(), "S/ 12.50");
        assert_eq!(m("12.255").to_string(), "S/ 12.26");
        assert_eq!(m("0").to_string(), "S/ 0.00");
        assert_eq!(m("-5.5").to_string(), "-S/ 5.50");
    }

    #[test]
    fn test_plain_string_keeps_exact_digits() {
        assert_eq!(m("12.5").to_plain_string(), "12.50");
        assert_eq!(m("12.2550").to_plain_string(), "12.255");
        assert_eq!(m("20").to_plain_string(), "20.00");
    }

    #[test]
    fn test_wholesale_discount_is_exact() {
        assert_eq!(m("12.90").discounted_by_bps(500), m("12.255"));
        assert_eq!(m("100").discounted_by_bps(500), m("95"));
        assert_eq!(m("3.33").discounted_by_bps(0), m("3.33"));
    }

    #[test]
    fn test_arithmetic() {
        let a = m("10.00");
        let b = m("2.50");
        assert_eq!(a + b, m("12.50"));
        assert_eq!(a - b, m("7.50"));
        assert_eq!(b.checked_multiply_quantity(3), Some(m("7.50")));
        assert_eq!(Money::checked_sum([a, b, b]), Some(m("15")));
        assert_eq!(Money::checked_sum(std::iter::empty()), Some(Money::ZERO));
    }

    #[test]
    fn test_checked_ops_report_overflow() {
        let huge = Money::new(Decimal::MAX);
        let price = Money::new(Decimal::from_i128_with_scale(10i128.pow(20), 0));
        assert_eq!(price.checked_multiply_quantity(1_000_000_000), None);
        assert_eq!(huge.checked_add(m("0.01")), None);
        assert_eq!(Money::new(Decimal::MIN).checked_sub(m("1")), None);
        assert_eq!(Money::checked_sum([huge, m("1")]), None);
        assert_eq!(huge.checked_add(Money::ZERO), Some(huge));
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::ZERO.is_zero());
        assert!(!Money::ZERO.is_negative());
        assert!(m("0.01").is_positive());
        assert!(m("-0.01").is_negative());
    }

    #[test]
    fn test_deserialize_accepts_strings_and_numbers() {
        let from_str: Money = serde_json::from_str("\"12.90\"").unwrap();
        let from_float: Money = serde_json::from_str("12.9").unwrap();
        let from_int: Money = serde_json::from_str("12").unwrap();

        assert_eq!(from_str, m("12.90"));
        assert_eq!(from_float, m("12.9"));
        assert_eq!(from_int, m("12"));
        assert!(serde_json::from_str::<Money>("\"doce\"").is_err());
    }

    #[test]
    fn test_serialize_as_string() {
        assert_eq!(serde_json::to_string(&m("12.5")).unwrap(), "\"12.50\"");
    }
}
