//! # Money Module
//!
//! Provides the `Money`, `DiscountRate` and `Currency` types used by every price
//! the configurator shows.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The live price is recomputed on every toggle. With floats:             │
//! │    199.00 × 0.75 × 0.80 = 119.39999999999999  ❌ drifts per render      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Basis Points                             │
//! │    19900 cents, 2500 bps, 2000 bps → exact integers every time          │
//! │    Rounding happens once per discount step, half up                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use configurator_core::money::{DiscountRate, Money};
//!
//! let base = Money::from_cents(26100);
//! let annual = base.percentage(DiscountRate::from_percent(20));
//! assert_eq!(annual.cents(), 5220);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents for EUR/USD).
///
/// ## Where Money is Used
/// ```text
/// Module.base_price ──┐
///                     ├──► PriceBreakdown.base ──► discounts ──► final_price
/// AddOn.price ────────┘                                              │
///                                                                    ▼
///                                              Currency::format → "€208.80"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use configurator_core::money::Money;
    ///
    /// let price = Money::from_cents(19900); // 199.00
    /// assert_eq!(price.cents(), 19900);
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

    /// Returns zero money value.
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

    /// Returns the share of this amount given by `rate`, rounded half up.
    ///
    /// ## Implementation
    /// Integer math in i128: `(amount * bps + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use configurator_core::money::{DiscountRate, Money};
    ///
    /// let amount = Money::from_cents(999);
    /// // 999 × 12.5% = 124.875 → 125
    /// assert_eq!(amount.percentage(DiscountRate::from_bps(1250)).cents(), 125);
    /// ```
    pub fn percentage(&self, rate: DiscountRate) -> Money {
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }

    /// Clamps negative amounts to zero.
    ///
    /// The final price is floored here; discounts themselves are never clamped.
    #[inline]
    pub const fn floor_at_zero(&self) -> Money {
        if self.0 < 0 {
            Money(0)
        } else {
            Money(self.0)
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display without a currency symbol.
///
/// ## Note
/// Use [`Currency::format`] for anything a buyer sees.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a whole number of billing months.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, months: u32) -> Self {
        Money(self.0 * months as i64)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01%. Bundle and billing discounts are product data that
/// marketing changes often, and values like 12.5% must stay integral.
/// 2500 bps = 25%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// 100%.
    pub const FULL: DiscountRate = DiscountRate(10_000);

    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Creates a rate from a whole percentage.
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        DiscountRate(percent * 100)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        DiscountRate::zero()
    }
}

impl fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
        }
    }
}

// =============================================================================
// Currency
// =============================================================================

/// The catalog's single configured currency.
///
/// The engine never converts between currencies; this only turns minor units
/// into a display decimal at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Currency {
    /// ISO 4217 code, e.g. "EUR".
    pub code: String,

    /// Symbol prefixed on display, e.g. "€".
    pub symbol: String,

    /// Number of minor-unit digits.
    pub decimals: u8,
}

impl Currency {
    pub fn new(code: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Currency {
            code: code.into(),
            symbol: symbol.into(),
            decimals,
        }
    }

    /// Formats an amount as a display string.
    ///
    /// ## Example
    /// ```rust
    /// use configurator_core::money::{Currency, Money};
    ///
    /// let eur = Currency::new("EUR", "€", 2);
    /// assert_eq!(eur.format(Money::from_cents(20880)), "€208.80");
    /// ```
    pub fn format(&self, amount: Money) -> String {
        let cents = amount.cents();
        let divisor = 10_i64.pow(self.decimals as u32);
        let whole = cents / divisor;
        let frac = (cents % divisor).abs();

        format!(
            "{}{}{}",
            if cents < 0 { "-" } else { "" },
            self.symbol,
            if self.decimals > 0 {
                format!(
                    "{}.{:0width$}",
                    whole.abs(),
                    frac,
                    width = self.decimals as usize
                )
            } else {
                whole.abs().to_string()
            }
        )
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::new("EUR", "€", 2)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 12u32).cents(), 12000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_percentage_exact() {
        assert_eq!(
            Money::from_cents(34800)
                .percentage(DiscountRate::from_percent(25))
                .cents(),
            8700
        );
        assert_eq!(
            Money::from_cents(26100)
                .percentage(DiscountRate::from_percent(20))
                .cents(),
            5220
        );
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 15 × 10% = 1.5 → 2
        assert_eq!(
            Money::from_cents(15)
                .percentage(DiscountRate::from_percent(10))
                .cents(),
            2
        );
        // 14 × 10% = 1.4 → 1
        assert_eq!(
            Money::from_cents(14)
                .percentage(DiscountRate::from_percent(10))
                .cents(),
            1
        );
    }

    #[test]
    fn test_percentage_full_and_zero() {
        let amount = Money::from_cents(20880);
        assert_eq!(amount.percentage(DiscountRate::FULL), amount);
        assert!(amount.percentage(DiscountRate::zero()).is_zero());
    }

    #[test]
    fn test_floor_at_zero() {
        assert_eq!(Money::from_cents(-1).floor_at_zero(), Money::zero());
        assert_eq!(Money::from_cents(42).floor_at_zero().cents(), 42);
    }

    #[test]
    fn test_discount_rate_display() {
        assert_eq!(DiscountRate::from_percent(20).to_string(), "20%");
        assert_eq!(DiscountRate::from_bps(1250).to_string(), "12.50%");
        assert!((DiscountRate::from_bps(1250).percent() - 12.5).abs() < 0.001);
    }

    #[test]
    fn test_currency_format() {
        let eur = Currency::default();
        assert_eq!(eur.format(Money::from_cents(1234)), "€12.34");
        assert_eq!(eur.format(Money::from_cents(0)), "€0.00");
        assert_eq!(eur.format(Money::from_cents(-1234)), "-€12.34");

        let jpy = Currency::new("JPY", "¥", 0);
        assert_eq!(jpy.format(Money::from_cents(1500)), "¥1500");
    }
}
