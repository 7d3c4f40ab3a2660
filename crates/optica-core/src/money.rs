//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The REST backend stores prices as decimals: precioBase = 49.99        │
//! │    49.99 * 0.8 = 39.992000000000004  ❌                                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    4999 cents * 8000 bps / 10000 → 3999 cents (half-up) ✅             │
//! │                                                                         │
//! │  Decimals only exist at the wire boundary (serde) and in the UI.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use optica_core::money::{Money, Percentage};
//!
//! let base = Money::from_cents(10000); // $100.00
//! let promo = base.apply_percentage_discount(Percentage::from_percent(20.0));
//! assert_eq!(promo.cents(), 8000);
//! ```

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// Arithmetic saturates at the `i64` bounds rather than overflowing, so a
/// corrupt stock or price figure cannot abort a summary.
///
/// ## Wire Format
/// The backend speaks decimal major units (`"precioBase": 49.99`). `Money`
/// serializes to that form and deserializes leniently: numbers, numeric
/// strings and `null` are all accepted, anything unparseable becomes zero.
/// A single corrupt price must never abort a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a decimal amount in major units.
    ///
    /// Rounds to the nearest cent. Callers normally pass values already
    /// screened by the lenient decoders; should a non-finite value get
    /// through anyway, it yields zero. Finite amounts beyond the `i64` cent
    /// range saturate at `i64::MIN`/`i64::MAX`.
    ///
    /// ## Example
    /// ```rust
    /// use optica_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(49.99).cents(), 4999);
    /// assert_eq!(Money::from_major(f64::NAN).cents(), 0);
    /// assert_eq!(Money::from_major(1e300).cents(), i64::MAX);
    /// ```
    pub fn from_major(amount: f64) -> Self {
        if !amount.is_finite() {
            return Money::zero();
        }
        // float-to-int `as` saturates at the i64 bounds
        Money((amount * 100.0).round() as i64)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value as decimal major units (display and wire only).
    #[inline]
    pub fn to_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative amounts to zero.
    #[inline]
    pub const fn non_negative(self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            self
        }
    }

    /// Multiplies money by a quantity (inventory value = price × stock).
    /// Saturates instead of overflowing.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// ## Rounding
    /// Half-up to the cent, computed on the *result*:
    /// `(cents × (10000 − bps) + 5000) / 10000`. Rounding the result rather
    /// than the discount keeps `round2(base × (1 − p/100))` exact.
    ///
    /// ## Example
    /// ```rust
    /// use optica_core::money::{Money, Percentage};
    ///
    /// let base = Money::from_cents(4999); // $49.99
    /// let off = base.apply_percentage_discount(Percentage::from_percent(15.0));
    /// // 49.99 × 0.85 = 42.4915 → 42.49
    /// assert_eq!(off.cents(), 4249);
    /// ```
    pub fn apply_percentage_discount(&self, discount: Percentage) -> Money {
        let keep_bps = 10_000 - discount.bps() as i128;
        let base = self.non_negative().0 as i128;
        let cents = (base * keep_bps + 5_000) / 10_000;
        Money::from_cents(cents as i64)
    }

    /// Subtracts a fixed discount, never going below zero.
    ///
    /// ## Example
    /// ```rust
    /// use optica_core::money::Money;
    ///
    /// let base = Money::from_cents(3000);
    /// assert_eq!(base.apply_fixed_discount(Money::from_cents(5000)).cents(), 0);
    /// ```
    pub fn apply_fixed_discount(&self, amount: Money) -> Money {
        (*self - amount.non_negative()).non_negative()
    }
}

// =============================================================================
// Percentage
// =============================================================================

/// A percentage in basis points (1 bps = 0.01%), capped to 0..=100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Percentage(u32);

impl Percentage {
    pub const MAX_BPS: u32 = 10_000;

    /// Creates a percentage from basis points, capping at 100%.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        if bps > Self::MAX_BPS {
            Percentage(Self::MAX_BPS)
        } else {
            Percentage(bps)
        }
    }

    /// Creates a percentage from a decimal value (`20.0` = 20%).
    ///
    /// Precision is two decimal places of a percent (one basis point):
    /// `12.345` is stored as `12.35`, rounding half away from zero.
    /// Negative and non-finite input yields 0%; anything above 100 caps.
    pub fn from_percent(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return Percentage(0);
        }
        let bps = (pct * 100.0).round();
        if bps >= Self::MAX_BPS as f64 {
            Percentage(Self::MAX_BPS)
        } else {
            Percentage(bps as u32)
        }
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the percentage as a decimal (display only).
    #[inline]
    pub fn percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

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

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Serde (decimal major units on the wire)
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_major())
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

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount, numeric string or null")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Ok(Money::from_cents(v.saturating_mul(100)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        Ok(Money::from_cents(i64::try_from(v).unwrap_or(i64::MAX / 100).saturating_mul(100)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Ok(Money::from_major(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        Ok(v.trim().parse::<f64>().map(Money::from_major).unwrap_or_default())
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Money, E> {
        Ok(Money::zero())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Money, E> {
        Ok(Money::zero())
    }

    fn visit_none<E: de::Error>(self) -> Result<Money, E> {
        Ok(Money::zero())
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Money, D::Error> {
        Money::deserialize(d)
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Money, A::Error> {
        while seq.next_element::<de::IgnoredAny>()?.is_some() {}
        Ok(Money::zero())
    }

    fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Money, A::Error> {
        while map.next_entry::<de::IgnoredAny, de::IgnoredAny>()?.is_some() {}
        Ok(Money::zero())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major_rounds_to_cent() {
        assert_eq!(Money::from_major(10.99).cents(), 1099);
        assert_eq!(Money::from_major(0.125).cents(), 13);
        assert_eq!(Money::from_major(f64::INFINITY).cents(), 0);
    }

    #[test]
    fn test_from_major_saturates_out_of_range() {
        assert_eq!(Money::from_major(1e300).cents(), i64::MAX);
        assert_eq!(Money::from_major(-1e300).cents(), i64::MIN);
        assert_eq!(Money::from_major(f64::NEG_INFINITY).cents(), 0);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let big = Money::from_cents(i64::MAX - 1);
        assert_eq!((big + Money::from_cents(10)).cents(), i64::MAX);
        assert_eq!(big.multiply_quantity(3).cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MIN) - Money::from_cents(1)).cents(), i64::MIN);

        let mut total = big;
        total += Money::from_cents(5);
        assert_eq!(total.cents(), i64::MAX);
        let summed: Money = vec![big, big, big].into_iter().sum();
        assert_eq!(summed.cents(), i64::MAX);
    }

    #[test]
    fn test_percentage_precision_is_one_bps() {
        assert_eq!(Percentage::from_percent(12.345).bps(), 1235);
        assert_eq!(Percentage::from_percent(12.344).bps(), 1234);
        assert_eq!(Percentage::from_percent(0.004).bps(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(500).to_string(), "$5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_percentage_discount_twenty_percent() {
        let base = Money::from_cents(10000);
        let off = base.apply_percentage_discount(Percentage::from_percent(20.0));
        assert_eq!(off.cents(), 8000);
    }

    #[test]
    fn test_percentage_discount_rounds_half_up() {
        // 0.05 × 50% = 0.025 → 0.03
        let base = Money::from_cents(5);
        let off = base.apply_percentage_discount(Percentage::from_percent(50.0));
        assert_eq!(off.cents(), 3);
    }

    #[test]
    fn test_percentage_caps_at_hundred() {
        assert_eq!(Percentage::from_percent(150.0).bps(), 10_000);
        assert_eq!(Percentage::from_percent(-3.0).bps(), 0);
        let base = Money::from_cents(1234);
        assert!(base
            .apply_percentage_discount(Percentage::from_percent(100.0))
            .is_zero());
    }

    #[test]
    fn test_fixed_discount_clamps_to_zero() {
        let base = Money::from_cents(2000);
        assert_eq!(base.apply_fixed_discount(Money::from_cents(500)).cents(), 1500);
        assert_eq!(base.apply_fixed_discount(Money::from_cents(2500)).cents(), 0);
        // a negative discount is treated as none
        assert_eq!(base.apply_fixed_discount(Money::from_cents(-500)).cents(), 2000);
    }

    #[test]
    fn test_wire_format_is_decimal() {
        let json = serde_json::to_string(&Money::from_cents(4999)).unwrap();
        assert_eq!(json, "49.99");
    }

    #[test]
    fn test_lenient_deserialize() {
        let m: Money = serde_json::from_str("49.99").unwrap();
        assert_eq!(m.cents(), 4999);
        let m: Money = serde_json::from_str("12").unwrap();
        assert_eq!(m.cents(), 1200);
        let m: Money = serde_json::from_str("\" 7.5 \"").unwrap();
        assert_eq!(m.cents(), 750);
        let m: Money = serde_json::from_str("\"abc\"").unwrap();
        assert!(m.is_zero());
        let m: Money = serde_json::from_str("null").unwrap();
        assert!(m.is_zero());
        let m: Money = serde_json::from_str("{\"$numberDecimal\": \"3\"}").unwrap();
        assert!(m.is_zero());
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, 650].iter().map(|c| Money::from_cents(*c)).sum();
        assert_eq!(total.cents(), 1000);
    }
}
