//! # Summary Module
//!
//! The document aggregator: line totals in, subtotal / discount / IVA /
//! total out. Recomputed on every read, never stored as authoritative.
//!
//! ```text
//! Subtotal   Σ line_total                 ₲ 12.600.000
//! Descuento  discount_doc               − ₲          0
//! IVA        subtotal × iva             + ₲  1.260.000
//! ───────────────────────────────────────────────────
//! Total                                   ₲ 13.860.000
//! ```
//!
//! IVA is charged on the subtotal before the document discount. The
//! discount is subtracted once and the total may go negative; a negative
//! total is reported, not corrected.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{ValidationError, ValidationResult};
use crate::line::BudgetLineItem;
use crate::money::Money;
use crate::types::TaxRate;
use crate::validation::validate_discount_doc;

/// Aggregated money values of a budget document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

impl BudgetSummary {
    /// True when the document discount exceeds subtotal plus IVA.
    pub fn is_negative_total(&self) -> bool {
        self.total.is_negative()
    }
}

/// Summarizes a list of lines.
///
/// ## Errors
/// - `Negative` when `discount_doc` is below zero
/// - `NotFinite` when the subtotal, IVA or total leaves the `i64` range
///
/// ## Example
/// ```rust
/// use signshop_core::money::Money;
/// use signshop_core::summary::summarize;
/// use signshop_core::types::TaxRate;
///
/// let empty = summarize(&[], Money::from_guaranies(50_000), TaxRate::STANDARD).unwrap();
/// assert!(empty.subtotal.is_zero());
/// assert!(empty.tax.is_zero());
/// assert_eq!(empty.total.guaranies(), -50_000);
/// ```
pub fn summarize(
    items: &[BudgetLineItem],
    discount_doc: Money,
    iva: TaxRate,
) -> ValidationResult<BudgetSummary> {
    let discount_doc = validate_discount_doc(discount_doc)?;
    aggregate(items, discount_doc, iva)
}

/// Aggregates without validating the header values; callers that already
/// hold validated values (a `BudgetDocument`) use this directly.
pub(crate) fn aggregate(
    items: &[BudgetLineItem],
    discount_doc: Money,
    iva: TaxRate,
) -> ValidationResult<BudgetSummary> {
    let subtotal = Money::checked_sum(items.iter().map(|line| line.line_total()))
        .ok_or_else(|| ValidationError::not_finite("subtotal"))?;
    let tax = subtotal.calculate_tax(iva)?;
    let total = subtotal
        .checked_sub(discount_doc)
        .and_then(|net| net.checked_add(tax))
        .ok_or_else(|| ValidationError::not_finite("total"))?;

    Ok(BudgetSummary {
        subtotal,
        discount: discount_doc,
        tax,
        total,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
