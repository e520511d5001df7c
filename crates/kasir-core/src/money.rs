//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer amounts in the smallest currency unit            │
//! │    Prices are whole Rupiah, subtotals are price × quantity,             │
//! │    totals are sums. No rounding ever happens.                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kasir_core::money::Money;
//!
//! let price = Money::new(10_000);
//! let subtotal = price.checked_mul(2).unwrap();
//! assert_eq!(subtotal.amount(), 20_000);
//! assert_eq!(subtotal.to_string(), "Rp 20.000");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: matches SQLite INTEGER, leaves room for refunds later
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Checked multiplication**: `price × quantity` is where overflow would
///   come from, so checkout prices lines through [`Money::checked_mul`]
///
/// ## Where Money Is Used
/// ```text
/// Product.price ──► checked_mul(quantity) ──► TransactionDetail.subtotal
///                                                    │
///                                                    ▼
///                          Σ subtotals ──► Transaction.total_amount
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from an amount in the smallest currency unit.
    #[inline]
    pub const fn new(amount: i64) -> Self {
        Money(amount)
    }

    /// Zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Returns the raw amount.
    #[inline]
    pub const fn amount(&self) -> i64 {
        self.0
    }

    /// Multiplies by a quantity, returning `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// assert_eq!(Money::new(20_000).checked_mul(3), Some(Money::new(60_000)));
    /// assert_eq!(Money::new(i64::MAX).checked_mul(2), None);
    /// ```
    #[inline]
    pub fn checked_mul(self, quantity: i64) -> Option<Self> {
        self.0.checked_mul(quantity).map(Money)
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Display
// =============================================================================

/// Formats as Rupiah with `.` as the thousands separator, e.g. `Rp 40.000`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        if self.0 < 0 {
            write!(f, "-Rp {}", grouped)
        } else {
            write!(f, "Rp {}", grouped)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_mul() {
        assert_eq!(Money::new(10_000).checked_mul(2), Some(Money::new(20_000)));
        assert_eq!(Money::new(0).checked_mul(999), Some(Money::zero()));
        assert_eq!(Money::new(i64::MAX / 2 + 1).checked_mul(2), None);
    }

    #[test]
    fn test_checked_add() {
        assert_eq!(
            Money::new(20_000).checked_add(Money::new(20_000)),
            Some(Money::new(40_000))
        );
        assert_eq!(Money::new(i64::MAX).checked_add(Money::new(1)), None);
    }

    #[test]
    fn test_sum() {
        let total: Money = [Money::new(20_000), Money::new(20_000), Money::new(500)]
            .into_iter()
            .sum();
        assert_eq!(total.amount(), 40_500);
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::new(0).to_string(), "Rp 0");
        assert_eq!(Money::new(999).to_string(), "Rp 999");
        assert_eq!(Money::new(40_000).to_string(), "Rp 40.000");
        assert_eq!(Money::new(1_250_000).to_string(), "Rp 1.250.000");
        assert_eq!(Money::new(-5_500).to_string(), "-Rp 5.500");
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let json = serde_json::to_string(&Money::new(40_000)).unwrap();
        assert_eq!(json, "40000");
    }
}
