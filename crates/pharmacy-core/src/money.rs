//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                            │
//! │                                                                         │
//! │  Prices in this shop are whole đồng (the currency has no minor unit    │
//! │  in practice), so we store a plain i64 count of whole units.           │
//! │                                                                         │
//! │  Legacy files stored prices as JSON floats (e.g. 1000.0). They are     │
//! │  truncated toward zero exactly once, at the file boundary.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pharmacy_core::money::Money;
//!
//! let cost = Money::new(1000);
//! let price = Money::new(1500);
//!
//! let margin = price - cost;                 // 500
//! let line = margin.multiply_quantity(4);    // 2000
//! assert_eq!(line.format_grouped(), "2.000");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Suffix used by [`Money`]'s `Display` implementation.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "đ";

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in whole currency units.
///
/// ## Design Decisions
/// - **i64 (signed)**: Profit can be negative when a batch sells below cost
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serde transparent**: Serialises as a bare JSON integer
/// - **Saturating operators**: Totals over loaded data pin at the `i64`
///   bounds instead of panicking or wrapping
///
/// ## Where Money is Used
/// ```text
/// Batch.cost_price ──┐
///                    ├──► SaleRecord (frozen copy) ──► profit_of ──► total_profit
/// Batch.sell_price ──┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole currency units.
    ///
    /// ## Example
    /// ```rust
    /// use pharmacy_core::money::Money;
    ///
    /// let price = Money::new(2000);
    /// assert_eq!(price.units(), 2000);
    /// ```
    #[inline]
    pub const fn new(units: i64) -> Self {
        Money(units)
    }

    /// Creates a Money value from a legacy floating point amount.
    ///
    /// The fractional part is dropped (truncation toward zero), matching
    /// how legacy files displayed amounts. Non-finite input yields
    /// zero.
    ///
    /// ## Example
    /// ```rust
    /// use pharmacy_core::money::Money;
    ///
    /// assert_eq!(Money::from_f64_truncated(1999.9).units(), 1999);
    /// assert_eq!(Money::from_f64_truncated(-10.5).units(), -10);
    /// assert_eq!(Money::from_f64_truncated(f64::NAN).units(), 0);
    /// ```
    pub fn from_f64_truncated(amount: f64) -> Self {
        if !amount.is_finite() {
            return Money::zero();
        }
        // `as` saturates at the i64 bounds
        Money(amount.trunc() as i64)
    }

    /// Returns the value in whole currency units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (a loss).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.saturating_abs())
    }

    /// Multiplies money by a quantity, saturating at the `i64` bounds.
    ///
    /// ## Example
    /// ```rust
    /// use pharmacy_core::money::Money;
    ///
    /// let unit_price = Money::new(1500);
    /// assert_eq!(unit_price.multiply_quantity(3).units(), 4500);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Formats the amount with `.` as the thousands separator.
    ///
    /// Negative amounts carry a leading `-` before the grouped magnitude,
    /// so `-2000` renders as `-2.000`. Parsing the output back (strip the
    /// dots, keep the sign) yields the original value.
    ///
    /// ## Example
    /// ```rust
    /// use pharmacy_core::money::Money;
    ///
    /// assert_eq!(Money::new(0).format_grouped(), "0");
    /// assert_eq!(Money::new(999).format_grouped(), "999");
    /// assert_eq!(Money::new(1000).format_grouped(), "1.000");
    /// assert_eq!(Money::new(1234567).format_grouped(), "1.234.567");
    /// assert_eq!(Money::new(-2000).format_grouped(), "-2.000");
    /// ```
    pub fn format_grouped(&self) -> String {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

        if self.0 < 0 {
            grouped.push('-');
        }

        for (i, ch) in digits.chars().enumerate() {
            if i != 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        grouped
    }

    /// Formats the amount followed by a currency symbol, e.g. `2.000 đ`.
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        format!("{} {}", self.format_grouped(), symbol)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display renders the grouped amount with the default currency suffix.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.format_grouped(), DEFAULT_CURRENCY_SYMBOL)
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

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
