//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Integer cents are not enough for percentage discounts either:         │
//! │    50% of $11.99 = $5.995  → cents would force a rounding here,        │
//! │    and again on every line, drifting the cart total.                   │
//! │                                                                         │
//! │  OUR SOLUTION: Fixed-point decimal (rust_decimal)                      │
//! │    Sums and products are exact. The only rounding happens once,        │
//! │    when a percentage is applied, half-up to MONEY_SCALE digits.        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use circuit_core::money::Money;
//!
//! // Create from cents or from a decimal string
//! let price = Money::from_cents(1199); // $11.99
//! let same: Money = "11.99".parse().unwrap();
//! assert_eq!(price, same);
//!
//! // Arithmetic operations
//! let doubled = price.checked_mul_quantity(2).unwrap();     // $23.98
//! let total = doubled.checked_add(Money::from_cents(2999)); // $53.97
//! assert_eq!(total.map(|t| t.to_string()), Some("$53.97".to_string()));
//!
//! // Amounts past Decimal's range are reported, never wrapped
//! let huge: Money = "79228162514264337593543950335".parse().unwrap();
//! assert_eq!(huge.checked_mul_quantity(2), None);
//! ```

use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize, Serializer};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::Percentage;

/// Fractional digits kept when a percentage is applied.
///
/// Sums and quantity products never round; they carry whatever digits the
/// operands have.
pub const MONEY_SCALE: u32 = 4;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the store currency.
///
/// ## Design Decisions
/// - **Decimal (signed)**: negative values appear transiently in subtraction
/// - **Single field tuple struct**: zero-cost wrapper over `Decimal`
/// - **Serialized as a string**: `"5.995"`, never a JSON float
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price ──► line subtotal (× quantity) ──► cart totalAmount      │
/// │                         │                                               │
/// │  DiscountRule ──► rule discount ──► min(subtotal) ──► discountAmount    │
/// │                                                                         │
/// │  finalAmount = totalAmount - discountAmount                             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "string")] Decimal);

impl Money {
    /// Creates a Money value from cents (two implied fractional digits).
    ///
    /// ## Example
    /// ```rust
    /// use circuit_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.to_string(), "$10.99");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Adds two amounts, or `None` if the sum is out of range.
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtracts `other`, or `None` if the difference is out of range.
    #[inline]
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Multiplies money by a quantity. Exact, no rounding.
    ///
    /// Returns `None` when the product does not fit in a `Decimal`.
    ///
    /// ## Example
    /// ```rust
    /// use circuit_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(1199); // $11.99
    /// let line_total = unit_price.checked_mul_quantity(2);
    /// assert_eq!(line_total, Some(Money::from_cents(2398)));
    /// ```
    #[inline]
    pub fn checked_mul_quantity(&self, qty: u32) -> Option<Money> {
        self.0.checked_mul(Decimal::from(qty)).map(Money)
    }

    /// Returns `pct` percent of this amount, or `None` if it is out of range.
    ///
    /// The product `amount × pct / 100` is computed exactly and then rounded
    /// once, half-up, to [`MONEY_SCALE`] fractional digits. Callers that need
    /// a percentage of a quantity should multiply first and call this last.
    ///
    /// The percentage is scaled to a fraction before multiplying, so any
    /// percentage up to 100 succeeds for every representable amount.
    ///
    /// ## Example
    /// ```rust
    /// use circuit_core::money::Money;
    /// use circuit_core::types::Percentage;
    ///
    /// let price = Money::from_cents(1199);
    /// let half = price.checked_percentage(Percentage::from_whole(50)).unwrap();
    /// assert_eq!(half.to_string(), "$5.995");
    /// ```
    pub fn checked_percentage(&self, pct: Percentage) -> Option<Money> {
        let fraction = pct.value().checked_div(Decimal::ONE_HUNDRED)?;
        let exact = self.0.checked_mul(fraction)?;
        Some(Money(exact.round_dp_with_strategy(
            MONEY_SCALE,
            RoundingStrategy::MidpointAwayFromZero,
        )))
    }

    /// Sums amounts, or `None` as soon as a partial sum is out of range.
    pub fn checked_sum<I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts.into_iter().try_fold(Money::zero(), Money::checked_add)
    }

    /// The amount without trailing zeros, but never fewer than two
    /// fractional digits (`15` → `15.00`, `5.9950` → `5.995`).
    fn canonical(&self) -> Decimal {
        let mut amount = self.0.normalize();
        if amount.scale() < 2 {
            amount.rescale(2);
        }
        amount
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount with a currency sign and at least two fractional digits.
///
/// Sub-cent amounts keep their digits (`$5.995`) so totals can be audited.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(f, "{}${}", sign, self.canonical().abs())
    }
}

/// Serializes as a canonical decimal string, so equal amounts always look
/// the same on the wire regardless of how they were computed.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.canonical())
    }
}

/// Parses a plain decimal string such as `"11.99"`.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .map(Money)
            .map_err(|e| ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: e.to_string(),
            })
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Unchecked addition; panics on overflow like `Decimal`. Pricing code
/// uses [`Money::checked_add`].
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Unchecked subtraction; panics on overflow like `Decimal`.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn test_from_cents_and_parse_agree() {
        assert_eq!(Money::from_cents(1199), money("11.99"));
        assert_eq!(Money::from_cents(1500), money("15"));
        assert_eq!(Money::from_cents(0), Money::zero());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("abc".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(500).to_string(), "$5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
        assert_eq!(money("5.995").to_string(), "$5.995");
        assert_eq!(money("15.0").to_string(), "$15.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!(a + b, Money::from_cents(1500));
        assert_eq!(a - b, Money::from_cents(500));
        assert_eq!(a.checked_add(b), Some(Money::from_cents(1500)));
        assert_eq!(b.checked_sub(a), Some(Money::from_cents(-500)));
        assert_eq!(a.checked_mul_quantity(3), Some(Money::from_cents(3000)));
        assert_eq!(a.checked_mul_quantity(0), Some(Money::zero()));
    }

    #[test]
    fn test_checked_arithmetic_reports_overflow() {
        let max = money("79228162514264337593543950335");

        assert_eq!(max.checked_add(Money::from_cents(100)), None);
        assert_eq!(money("-79228162514264337593543950335").checked_sub(max), None);
        assert_eq!(money("100000000000000000000").checked_mul_quantity(1_000_000_000), None);
        assert_eq!(Money::checked_sum([max, max]), None);

        // Up to 100% never grows the amount, so it cannot overflow
        let half = max.checked_percentage(Percentage::from_whole(50)).unwrap();
        assert!(half.is_positive() && half < max);
        assert_eq!(max.checked_percentage(Percentage::from_whole(200)), None);
    }

    #[test]
    fn test_min_uses_ordering() {
        let discount = money("15.0");
        let subtotal = money("23.98");
        assert_eq!(discount.min(subtotal), discount);
        assert_eq!(money("30").min(subtotal), subtotal);
    }

    #[test]
    fn test_percentage_is_exact_below_scale() {
        let half = Money::from_cents(1199).checked_percentage(Percentage::from_whole(50)).unwrap();
        assert_eq!(half, money("5.995"));
    }

    #[test]
    fn test_percentage_rounds_half_up_once() {
        // 1/3 of a cent repeating: 0.01 × 33.33% = 0.003333 → 0.0033
        let tiny = Money::from_cents(1).checked_percentage(money_pct("33.33")).unwrap();
        assert_eq!(tiny, money("0.0033"));

        // 0.00005 exactly on the midpoint → rounds up to 0.0001
        let midpoint = money("0.0001").checked_percentage(Percentage::from_whole(50)).unwrap();
        assert_eq!(midpoint, money("0.0001"));
    }

    #[test]
    fn test_percentage_after_quantity_rounds_once() {
        // Rounding each unit separately would give 3 × 0.0033 = 0.0099
        let unit = Money::from_cents(1);
        let once = unit
            .checked_mul_quantity(3)
            .unwrap()
            .checked_percentage(money_pct("33.33")).unwrap();
        assert_eq!(once, money("0.0100"));
    }

    #[test]
    fn test_sum_has_no_drift() {
        let parts = vec![money("0.1"); 10];
        assert_eq!(Money::checked_sum(parts), Some(money("1")));
        assert_eq!(Money::checked_sum(Vec::new()), Some(Money::zero()));
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert!(!negative.is_positive());
    }

    #[test]
    fn test_serializes_as_decimal_string() {
        let json = serde_json::to_string(&money("47.975")).unwrap();
        assert_eq!(json, "\"47.975\"");

        // Trailing zeros from subtraction do not leak into the output
        let computed = money("53.97") - money("5.9950");
        assert_eq!(serde_json::to_string(&computed).unwrap(), "\"47.975\"");
        assert_eq!(serde_json::to_string(&money("15")).unwrap(), "\"15.00\"");

        let back: Money = serde_json::from_str("\"38.97\"").unwrap();
        assert_eq!(back, Money::from_cents(3897));
    }

    fn money_pct(s: &str) -> Percentage {
        Percentage::from_decimal(s.parse().unwrap())
    }
}
