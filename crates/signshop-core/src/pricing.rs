//! # Pricing Module
//!
//! The line pricing calculator: physical dimensions in, billable area and
//! line total out. Every UI surface (budget table, work order lines, seed
//! report) prices lines through this one module.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Line Pricing Pipeline                              │
//! │                                                                         │
//! │  height_cm × width_cm / 10000                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  area_m2                      0.3025                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ceil(area_m2 × 4) / 4                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  area_m2_rounded              0.5      (next quarter m²)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  qty × unit_price × (1 − d) × factor                                    │
//! │       │                                                                 │
//! │       │   factor = rounded / area   (Rescaled)                          │
//! │       │          = rounded          (PerBillableArea)                   │
//! │       │          = 1                (area 0: priced per piece)          │
//! │       ▼                                                                 │
//! │  line_total                   rounded once to the guaraní               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use signshop_core::money::Money;
//! use signshop_core::pricing::{price_line, LineInputs};
//! use signshop_core::types::{AreaPricing, DiscountRate};
//!
//! let inputs = LineInputs {
//!     height_cm: 50.0,
//!     width_cm: 400.0,
//!     quantity: 10.0,
//!     unit_price: Money::from_guaranies(800_000),
//!     discount: DiscountRate::from_fraction(0.05).unwrap(),
//! };
//!
//! let priced = price_line(&inputs, AreaPricing::Rescaled).unwrap();
//! assert_eq!(priced.area_m2, 2.0);
//! assert_eq!(priced.line_total.guaranies(), 7_600_000);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::line::BudgetLineItem;
use crate::money::Money;
use crate::types::{AreaPricing, DiscountRate};
use crate::validation::{validate_dimension_cm, validate_quantity, validate_unit_price};
use crate::{BILLABLE_AREA_STEP_M2, CM2_PER_M2};

// =============================================================================
// Inputs and Outputs
// =============================================================================

/// The user-editable fields that determine a line's price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineInputs {
    pub height_cm: f64,
    pub width_cm: f64,
    pub quantity: f64,
    pub unit_price: Money,
    pub discount: DiscountRate,
}

impl Default for LineInputs {
    /// A freshly added line: one piece, no dimensions, no price.
    fn default() -> Self {
        LineInputs {
            height_cm: 0.0,
            width_cm: 0.0,
            quantity: 1.0,
            unit_price: Money::zero(),
            discount: DiscountRate::NONE,
        }
    }
}

/// Derived values of a line. Never set directly.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LinePricing {
    pub area_m2: f64,
    pub area_m2_rounded: f64,
    pub line_total: Money,
}

// =============================================================================
// Area
// =============================================================================

/// Measured area in m² from centimeters.
#[inline]
pub fn area_m2(height_cm: f64, width_cm: f64) -> f64 {
    height_cm * width_cm / CM2_PER_M2
}

/// Rounds a measured area up to the next quarter m².
///
/// Zero stays zero: there is no minimum charge.
///
/// ## Example
/// ```rust
/// use signshop_core::pricing::billable_area_m2;
///
/// assert_eq!(billable_area_m2(0.3025), 0.5);
/// assert_eq!(billable_area_m2(6.0), 6.0);
/// assert_eq!(billable_area_m2(0.0), 0.0);
/// ```
#[inline]
pub fn billable_area_m2(area_m2: f64) -> f64 {
    // Dividing by a power of two is exact, so the result is never below area_m2
    (area_m2 / BILLABLE_AREA_STEP_M2).ceil() * BILLABLE_AREA_STEP_M2
}

fn area_factor(area: f64, rounded: f64, convention: AreaPricing) -> f64 {
    if area <= 0.0 {
        return 1.0;
    }
    match convention {
        AreaPricing::Rescaled => rounded / area,
        AreaPricing::PerBillableArea => rounded,
    }
}

// =============================================================================
// Line Pricing
// =============================================================================

/// Prices one line.
///
/// Inputs out of range are rejected, never clamped. A successful result
/// always has a finite area and a non-negative total.
///
/// ## Errors
/// - `Negative` / `NotFinite` for a bad dimension, quantity or price
/// - `NotFinite` when the product overflows (absurd dimensions)
pub fn price_line(inputs: &LineInputs, convention: AreaPricing) -> ValidationResult<LinePricing> {
    let height = validate_dimension_cm(inputs.height_cm, "height_cm")?;
    let width = validate_dimension_cm(inputs.width_cm, "width_cm")?;
    let quantity = validate_quantity(inputs.quantity)?;
    let unit_price = validate_unit_price(inputs.unit_price)?;

    let area = area_m2(height, width);
    if !area.is_finite() {
        return Err(ValidationError::not_finite("area_m2"));
    }
    let rounded = billable_area_m2(area);

    let factor = area_factor(area, rounded, convention);
    let amount = quantity * unit_price.as_f64() * inputs.discount.remaining_fraction() * factor;
    let line_total = Money::from_amount(amount, "line_total")?;

    Ok(LinePricing {
        area_m2: area,
        area_m2_rounded: rounded,
        line_total,
    })
}

/// Returns a copy of `line` with every derived field recomputed from its
/// current inputs.
///
/// Idempotent: recomputing an already consistent line yields the same line.
pub fn recompute(line: &BudgetLineItem) -> ValidationResult<BudgetLineItem> {
    let mut next = line.clone();
    next.reprice()?;
    Ok(next)
}

// =============================================================================
// Unit Tests
// =============================================================================
