//! # Domain Types
//!
//! Core value types used throughout Signshop budgets.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │  DiscountRate   │   │  BudgetStatus   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  fraction (f64) │   │  fraction (f64) │   │  Draft          │       │
//! │  │  0.1 = 10% IVA  │   │  0.05 = 5% off  │   │  Approved       │       │
//! │  │  range [0,1]    │   │  range [0,1)    │   │  Rejected       │       │
//! │  └─────────────────┘   └─────────────────┘   │  Revised        │       │
//! │                                              └─────────────────┘       │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │  AreaPricing    │   │   NewBudget     │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  Rescaled       │   │  project_id     │                             │
//! │  │  PerBillableM2  │   │  name, client   │                             │
//! │  └─────────────────┘   │  version        │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Line items live in [`crate::line`], documents in [`crate::document`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{ValidationError, ValidationResult};
use crate::validation;

/// Basis points in one whole (100%).
const BPS_PER_UNIT: u32 = 10_000;

// =============================================================================
// Tax Rate
// =============================================================================

/// IVA rate as an exact fraction in `[0, 1]` (`0.1` = 10%).
///
/// The fraction is kept as typed, never snapped to a grid. Every
/// constructor validates, so a `TaxRate` in hand is always in range.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct TaxRate(f64);

impl TaxRate {
    /// Standard Paraguayan IVA, 10%.
    pub const STANDARD: TaxRate = TaxRate(0.1);

    /// Creates a tax rate from a fraction in `[0, 1]`.
    ///
    /// ## Example
    /// ```rust
    /// use signshop_core::types::TaxRate;
    ///
    /// assert_eq!(TaxRate::from_fraction(0.1).unwrap().fraction(), 0.1);
    /// assert!(TaxRate::from_fraction(1.5).is_err());
    /// assert!(TaxRate::from_fraction(f64::NAN).is_err());
    /// ```
    pub fn from_fraction(fraction: f64) -> ValidationResult<Self> {
        check_fraction(fraction, "iva_pct", true)?;
        // -0.0 → 0.0
        Ok(TaxRate(fraction + 0.0))
    }

    /// Creates a tax rate from basis points (`1000` = 10%), as used by
    /// the settings keys.
    pub fn from_bps(bps: u32) -> ValidationResult<Self> {
        TaxRate::from_fraction(bps as f64 / BPS_PER_UNIT as f64)
    }

    /// Returns the rate as a fraction (`0.1` for 10%).
    #[inline]
    pub const fn fraction(&self) -> f64 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 * 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0.0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

impl TryFrom<f64> for TaxRate {
    type Error = ValidationError;

    fn try_from(fraction: f64) -> Result<Self, Self::Error> {
        TaxRate::from_fraction(fraction)
    }
}

impl From<TaxRate> for f64 {
    fn from(rate: TaxRate) -> f64 {
        rate.0
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// Fractional line discount in `[0, 1)`, kept exactly as typed.
///
/// A 100% discount is not a discount, it's a gift: the upper bound is
/// exclusive, so every constructor is fallible.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct DiscountRate(f64);

impl DiscountRate {
    /// No discount.
    pub const NONE: DiscountRate = DiscountRate(0.0);

    /// Creates a discount from a fraction in `[0, 1)` (`0.05` = 5%).
    ///
    /// ## Example
    /// ```rust
    /// use signshop_core::types::DiscountRate;
    ///
    /// assert_eq!(DiscountRate::from_fraction(0.05).unwrap().fraction(), 0.05);
    /// assert!(DiscountRate::from_fraction(0.99996).is_ok());
    /// assert!(DiscountRate::from_fraction(1.0).is_err());
    /// assert!(DiscountRate::from_fraction(-0.1).is_err());
    /// ```
    pub fn from_fraction(fraction: f64) -> ValidationResult<Self> {
        check_fraction(fraction, "discount_pct", false)?;
        // -0.0 → 0.0
        Ok(DiscountRate(fraction + 0.0))
    }

    /// Returns the discount as a fraction (`0.05` for 5%).
    #[inline]
    pub const fn fraction(&self) -> f64 {
        self.0
    }

    /// Returns the multiplier applied to the gross amount (`0.95` for 5%).
    #[inline]
    pub fn remaining_fraction(&self) -> f64 {
        1.0 - self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl TryFrom<f64> for DiscountRate {
    type Error = ValidationError;

    fn try_from(fraction: f64) -> Result<Self, Self::Error> {
        DiscountRate::from_fraction(fraction)
    }
}

impl From<DiscountRate> for f64 {
    fn from(rate: DiscountRate) -> f64 {
        rate.0
    }
}

/// Rejects NaN, infinities and fractions outside `[0, 1]` / `[0, 1)`.
fn check_fraction(fraction: f64, field: &str, max_inclusive: bool) -> ValidationResult<()> {
    if !fraction.is_finite() {
        return Err(ValidationError::not_finite(field));
    }

    let too_high = if max_inclusive { fraction > 1.0 } else { fraction >= 1.0 };
    if fraction < 0.0 || too_high {
        return Err(ValidationError::FractionOutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: 1.0,
            max_inclusive,
        });
    }

    Ok(())
}

// =============================================================================
// Area Pricing Convention
// =============================================================================

/// How the unit price relates to area.
///
/// ```text
/// Rescaled (default):
///   line_total = qty × unit_price × (1 − d) × billable_m² / measured_m²
///   unit price is quoted per measured m², the ratio bills the rounded area
///
/// PerBillableArea:
///   line_total = qty × unit_price × (1 − d) × billable_m²
///   unit price is quoted per billable m²
/// ```
///
/// Both fall back to a factor of 1 when the measured area is zero, so a
/// piece without dimensions is priced per piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AreaPricing {
    /// Unit price per measured m², rescaled to the billable area.
    #[default]
    Rescaled,
    /// Unit price per billable m².
    PerBillableArea,
}

impl AreaPricing {
    /// Parses the settings spelling (`rescaled` / `billable`).
    pub fn from_setting(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rescaled" => Some(AreaPricing::Rescaled),
            "billable" | "per_billable_area" => Some(AreaPricing::PerBillableArea),
            _ => None,
        }
    }
}

// =============================================================================
// Budget Status
// =============================================================================

/// The status of a budget document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    /// Being priced, lines still change.
    #[default]
    Draft,
    /// Accepted by the client.
    Approved,
    /// Declined by the client.
    Rejected,
    /// Superseded by a newer version.
    Revised,
}

// =============================================================================
// New Budget
// =============================================================================

/// Input for creating a budget document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    /// Owning project (UUID).
    pub project_id: String,

    /// Internal name of the quote.
    pub name: String,

    /// Client the quote is addressed to.
    pub client: String,

    /// Version number, starts at 1.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Issue date; the store fills in today when absent.
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
}

fn default_version() -> u32 {
    1
}

impl NewBudget {
    /// Creates a first-version budget request.
    pub fn new(
        project_id: impl Into<String>,
        name: impl Into<String>,
        client: impl Into<String>,
    ) -> Self {
        NewBudget {
            project_id: project_id.into(),
            name: name.into(),
            client: client.into(),
            version: default_version(),
            issue_date: None,
        }
    }

    /// Validates all fields.
    ///
    /// ## Rules
    /// - `name` and `client` are required
    /// - `project_id` must be a UUID
    /// - `version` must be positive
    pub fn validate(&self) -> ValidationResult<()> {
        validation::validate_budget_name(&self.name)?;
        validation::validate_uuid(&self.project_id, "project_id")?;
        validation::validate_client(&self.client)?;
        validation::validate_version(self.version)?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_fraction() {
        assert_eq!(TaxRate::from_fraction(0.1).unwrap().fraction(), 0.1);
        assert_eq!(TaxRate::from_fraction(1.0).unwrap().fraction(), 1.0);
        assert!(TaxRate::from_fraction(0.0).unwrap().is_zero());
        assert!(TaxRate::from_fraction(1.0001).is_err());
        assert!(TaxRate::from_fraction(-0.01).is_err());
        assert!(TaxRate::from_fraction(f64::INFINITY).is_err());
    }

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(1000).unwrap();
        assert!((rate.fraction() - 0.1).abs() < 1e-12);
        assert!((rate.percentage() - 10.0).abs() < 1e-9);
        assert!(TaxRate::from_bps(10_001).is_err());
        assert!(TaxRate::default().is_zero());
    }

    #[test]
    fn test_discount_rate_keeps_exact_fraction() {
        assert_eq!(DiscountRate::from_fraction(0.12345).unwrap().fraction(), 0.12345);
        assert!(DiscountRate::from_fraction(0.99996).is_ok());
        assert!(DiscountRate::from_fraction(1.0).is_err());
        assert_eq!(
            DiscountRate::from_fraction(f64::NAN),
            Err(ValidationError::not_finite("discount_pct"))
        );
    }

    #[test]
    fn test_discount_remaining_fraction() {
        let rate = DiscountRate::from_fraction(0.05).unwrap();
        assert!((rate.remaining_fraction() - 0.95).abs() < 1e-12);
        assert_eq!(DiscountRate::NONE.remaining_fraction(), 1.0);
        assert!(DiscountRate::NONE.is_zero());
    }

    #[test]
    fn test_rates_deserialize_validated() {
        assert_eq!(serde_json::from_str::<DiscountRate>("0.05").unwrap().fraction(), 0.05);
        assert!(serde_json::from_str::<DiscountRate>("1.0").is_err());
        assert!(serde_json::from_str::<TaxRate>("1.0").is_ok());
        assert!(serde_json::from_str::<TaxRate>("1.5").is_err());
        assert_eq!(serde_json::to_string(&TaxRate::from_fraction(0.1).unwrap()).unwrap(), "0.1");
    }

    #[test]
    fn test_area_pricing_from_setting() {
        assert_eq!(AreaPricing::from_setting("rescaled"), Some(AreaPricing::Rescaled));
        assert_eq!(
            AreaPricing::from_setting(" Billable "),
            Some(AreaPricing::PerBillableArea)
        );
        assert_eq!(AreaPricing::from_setting("per-piece"), None);
        assert_eq!(AreaPricing::default(), AreaPricing::Rescaled);
    }

    #[test]
    fn test_budget_status_default() {
        assert_eq!(BudgetStatus::default(), BudgetStatus::Draft);
        assert_eq!(serde_json::to_string(&BudgetStatus::Revised).unwrap(), "\"revised\"");
    }

    #[test]
    fn test_new_budget_validation() {
        let ok = NewBudget::new(
            "550e8400-e29b-41d4-a716-446655440000",
            "Fachada sucursal centro",
            "Corporación ABC",
        );
        assert!(ok.validate().is_ok());
        assert_eq!(ok.version, 1);

        let mut bad = ok.clone();
        bad.project_id = "1".to_string();
        assert!(bad.validate().is_err());

        let mut bad = ok.clone();
        bad.client = "  ".to_string();
        assert_eq!(bad.validate(), Err(ValidationError::required("client")));

        let mut bad = ok;
        bad.version = 0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_new_budget_deserialize_defaults() {
        let json = r#"{"projectId":"p","name":"n","client":"c"}"#;
        let parsed: NewBudget = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.version, 1);
        assert!(parsed.issue_date.is_none());
    }
}
