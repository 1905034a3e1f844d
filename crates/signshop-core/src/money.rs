//! # Money Module
//!
//! Provides the `Money` type for guaraní amounts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    800000 × 10 × 0.95 = 7600000.000000001  ❌                            │
//! │                                                                         │
//! │  The guaraní (PYG) has NO fractional unit, so every amount that is     │
//! │  stored or summed is a whole number of guaraníes.                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Guaraníes                                        │
//! │    Area math may be fractional (0.3025 m²), but the moment a value     │
//! │    becomes money it is rounded once to the nearest guaraní.            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use signshop_core::money::Money;
//!
//! let a = Money::from_guaranies(5_000_000);
//! let b = Money::from_guaranies(7_600_000);
//! let subtotal = a.checked_add(b).unwrap();
//! assert_eq!(subtotal.to_string(), "₲ 12.600.000");
//!
//! // Sums never wrap
//! assert!(Money::from_guaranies(i64::MAX).checked_add(b).is_none());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{ValidationError, ValidationResult};
use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole guaraníes.
///
/// ## Design Decisions
/// - **i64 (signed)**: a document total may go negative when the document
///   discount exceeds subtotal plus IVA, and that value is passed through
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support, serialized as a plain number
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  BudgetLineItem.unit_price ──► pricing::price_line ──► line_total      │
/// │                                                                         │
/// │  Σ line_total ──► subtotal ──► IVA ──► total ──► "₲ 13.860.000"        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole guaraníes.
    ///
    /// ## Example
    /// ```rust
    /// use signshop_core::money::Money;
    ///
    /// let price = Money::from_guaranies(5_000_000);
    /// assert_eq!(price.guaranies(), 5_000_000);
    /// ```
    #[inline]
    pub const fn from_guaranies(guaranies: i64) -> Self {
        Money(guaranies)
    }

    /// Converts a computed amount into Money, rounding half away from zero.
    ///
    /// This is the single point where fractional pricing math becomes money.
    /// NaN, infinities and values beyond the i64 range are rejected so they
    /// can never be stored.
    ///
    /// ## Example
    /// ```rust
    /// use signshop_core::money::Money;
    ///
    /// let total = Money::from_amount(7_600_000.000_000_001, "line_total").unwrap();
    /// assert_eq!(total.guaranies(), 7_600_000);
    ///
    /// assert!(Money::from_amount(f64::NAN, "line_total").is_err());
    /// ```
    pub fn from_amount(amount: f64, field: &str) -> ValidationResult<Money> {
        if !amount.is_finite() {
            return Err(ValidationError::not_finite(field));
        }

        let rounded = amount.round();
        // i64::MAX as f64 rounds up to 2^63, which is already out of range
        if rounded >= i64::MAX as f64 || rounded < i64::MIN as f64 {
            return Err(ValidationError::not_finite(field));
        }

        Ok(Money(rounded as i64))
    }

    /// Returns the value in whole guaraníes.
    #[inline]
    pub const fn guaranies(&self) -> i64 {
        self.0
    }

    /// Returns the value as f64 for area/discount arithmetic.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Money(sum)),
            None => None,
        }
    }

    /// Subtracts `other`, `None` on overflow.
    #[inline]
    pub const fn checked_sub(self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(diff) => Some(Money(diff)),
            None => None,
        }
    }

    /// Sums amounts, `None` as soon as the running total overflows.
    ///
    /// ## Example
    /// ```rust
    /// use signshop_core::money::Money;
    ///
    /// let lines = [Money::from_guaranies(5_000_000), Money::from_guaranies(7_600_000)];
    /// assert_eq!(Money::checked_sum(lines).unwrap().guaranies(), 12_600_000);
    /// assert_eq!(Money::checked_sum([]), Some(Money::zero()));
    /// ```
    pub fn checked_sum<I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
    }

    /// Calculates IVA on this amount, rounded once to the nearest guaraní.
    ///
    /// The rate is the exact fraction the user typed; the product is rounded
    /// half away from zero like every other amount.
    ///
    /// ## Errors
    /// - `NotFinite` if the tax does not fit in `Money`
    ///
    /// ## Example
    /// ```rust
    /// use signshop_core::money::Money;
    /// use signshop_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_guaranies(12_600_000);
    /// let iva = subtotal.calculate_tax(TaxRate::from_fraction(0.1).unwrap()).unwrap();
    /// assert_eq!(iva.guaranies(), 1_260_000);
    /// ```
    ///
    /// ## User Workflow
    /// ```text
    /// Subtotal: ₲ 12.600.000
    ///      │
    ///      ▼
    /// calculate_tax(10%) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// IVA: ₲ 1.260.000
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> ValidationResult<Money> {
        Money::from_amount(self.as_f64() * rate.fraction(), "tax")
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display uses es-PY grouping: `₲ 5.000.000`.
///
/// ## Note
/// For logs, the seed report and tests. The UI keeps its own locale-aware
/// formatter; the core only hands it plain numbers.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.unsigned_abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        write!(f, "{}₲ {}", sign, grouped)
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
