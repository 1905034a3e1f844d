//! # Line Module
//!
//! `BudgetLineItem`, one row of a budget, and `LineItemRecord`, the flat
//! payload handed to the persistence layer and the UI.
//!
//! ## Consistency
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  set_height_cm(55.0)                                                    │
//! │       │                                                                 │
//! │       ├── validate ──✗──► Err(ValidationError), line untouched          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  pricing::price_line(inputs') ──✗──► Err, line untouched                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  commit inputs' + pricing' together                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Priced inputs and derived values are private and only change together,
//! so `area_m2`, `area_m2_rounded` and `line_total` always match the
//! current inputs.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::category::Category;
use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;
use crate::pricing::{self, LineInputs, LinePricing};
use crate::types::{AreaPricing, DiscountRate};
use crate::validation::{
    validate_color, validate_description, validate_dimension_cm, validate_faces,
    validate_quantity, validate_unit_price,
};

// =============================================================================
// Line Field
// =============================================================================

/// Numeric fields a user can type into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineField {
    HeightCm,
    WidthCm,
    Quantity,
    UnitPrice,
    DiscountPct,
    Faces,
}

impl LineField {
    /// Field name used in validation errors.
    pub fn field_name(&self) -> &'static str {
        match self {
            LineField::HeightCm => "height_cm",
            LineField::WidthCm => "width_cm",
            LineField::Quantity => "quantity",
            LineField::UnitPrice => "unit_price",
            LineField::DiscountPct => "discount_pct",
            LineField::Faces => "faces",
        }
    }
}

// =============================================================================
// Budget Line Item
// =============================================================================

/// One priced row of a budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LineItemRecord", into = "LineItemRecord")]
pub struct BudgetLineItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning budget document.
    pub document_id: String,

    /// 1-based position, display only.
    pub line_number: u32,

    pub description: String,

    pub category: Category,

    pub color: String,

    faces: u32,
    inputs: LineInputs,
    area_pricing: AreaPricing,
    pricing: LinePricing,
}

impl BudgetLineItem {
    /// Creates a blank line: one piece, one face, category `otros`, no
    /// dimensions and no price.
    pub fn new(
        id: impl Into<String>,
        document_id: impl Into<String>,
        line_number: u32,
        area_pricing: AreaPricing,
    ) -> Self {
        BudgetLineItem {
            id: id.into(),
            document_id: document_id.into(),
            line_number,
            description: String::new(),
            category: Category::Otros,
            color: String::new(),
            faces: 1,
            inputs: LineInputs::default(),
            area_pricing,
            // Default inputs price to zero on a zero area
            pricing: LinePricing::default(),
        }
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn faces(&self) -> u32 {
        self.faces
    }

    pub fn height_cm(&self) -> f64 {
        self.inputs.height_cm
    }

    pub fn width_cm(&self) -> f64 {
        self.inputs.width_cm
    }

    pub fn quantity(&self) -> f64 {
        self.inputs.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.inputs.unit_price
    }

    pub fn discount(&self) -> DiscountRate {
        self.inputs.discount
    }

    pub fn area_pricing(&self) -> AreaPricing {
        self.area_pricing
    }

    /// All priced inputs at once.
    pub fn inputs(&self) -> &LineInputs {
        &self.inputs
    }

    /// Measured area in m².
    pub fn area_m2(&self) -> f64 {
        self.pricing.area_m2
    }

    /// Area billed, rounded up to the next quarter m².
    pub fn area_m2_rounded(&self) -> f64 {
        self.pricing.area_m2_rounded
    }

    pub fn line_total(&self) -> Money {
        self.pricing.line_total
    }

    pub fn pricing(&self) -> &LinePricing {
        &self.pricing
    }

    // =========================================================================
    // Validated Setters
    // =========================================================================

    pub fn set_height_cm(&mut self, height_cm: f64) -> ValidationResult<()> {
        let height_cm = validate_dimension_cm(height_cm, "height_cm")?;
        self.apply(LineInputs { height_cm, ..self.inputs })
    }

    pub fn set_width_cm(&mut self, width_cm: f64) -> ValidationResult<()> {
        let width_cm = validate_dimension_cm(width_cm, "width_cm")?;
        self.apply(LineInputs { width_cm, ..self.inputs })
    }

    pub fn set_quantity(&mut self, quantity: f64) -> ValidationResult<()> {
        let quantity = validate_quantity(quantity)?;
        self.apply(LineInputs { quantity, ..self.inputs })
    }

    pub fn set_unit_price(&mut self, unit_price: Money) -> ValidationResult<()> {
        let unit_price = validate_unit_price(unit_price)?;
        self.apply(LineInputs { unit_price, ..self.inputs })
    }

    pub fn set_discount(&mut self, discount: DiscountRate) -> ValidationResult<()> {
        self.apply(LineInputs { discount, ..self.inputs })
    }

    /// Sets the discount from a fraction in `[0, 1)`.
    pub fn set_discount_pct(&mut self, fraction: f64) -> ValidationResult<()> {
        let discount = DiscountRate::from_fraction(fraction)?;
        self.set_discount(discount)
    }

    pub fn set_faces(&mut self, faces: u32) -> ValidationResult<()> {
        self.faces = validate_faces(faces)?;
        Ok(())
    }

    /// Switches the area convention and reprices.
    pub fn set_area_pricing(&mut self, area_pricing: AreaPricing) -> ValidationResult<()> {
        let pricing = pricing::price_line(&self.inputs, area_pricing)?;
        self.area_pricing = area_pricing;
        self.pricing = pricing;
        Ok(())
    }

    /// Prices `inputs` and commits them only if pricing succeeds.
    fn apply(&mut self, inputs: LineInputs) -> ValidationResult<()> {
        let pricing = pricing::price_line(&inputs, self.area_pricing)?;
        self.inputs = inputs;
        self.pricing = pricing;
        Ok(())
    }

    /// Recomputes derived values from the current inputs.
    pub(crate) fn reprice(&mut self) -> ValidationResult<()> {
        self.pricing = pricing::price_line(&self.inputs, self.area_pricing)?;
        Ok(())
    }

    /// Checks the free-text fields before the line is saved.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_description(&self.description)?;
        validate_color(&self.color)?;
        validate_faces(self.faces)?;
        Ok(())
    }

    /// Flattens the line into its persistence payload.
    pub fn to_record(&self) -> LineItemRecord {
        LineItemRecord {
            id: self.id.clone(),
            document_id: self.document_id.clone(),
            line_number: self.line_number,
            description: self.description.clone(),
            category: self.category.tag().to_string(),
            color: self.color.clone(),
            faces: self.faces,
            height_cm: self.inputs.height_cm,
            width_cm: self.inputs.width_cm,
            area_m2: self.pricing.area_m2,
            area_m2_rounded: self.pricing.area_m2_rounded,
            quantity: self.inputs.quantity,
            unit_price: self.inputs.unit_price,
            discount_pct: self.inputs.discount.fraction(),
            line_total: self.pricing.line_total,
            area_pricing: self.area_pricing,
        }
    }
}

// =============================================================================
// Line Item Record
// =============================================================================

/// Flat line payload, as saved to `budget_items` and sent to the UI.
///
/// ## Note
/// Derived fields (`areaM2`, `areaM2Rounded`, `lineTotal`) are informational
/// on the way in: converting a record back into a [`BudgetLineItem`]
/// recomputes them from the inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRecord {
    pub id: String,
    pub document_id: String,
    pub line_number: u32,
    pub description: String,
    pub category: String,
    pub color: String,
    pub faces: u32,
    pub height_cm: f64,
    pub width_cm: f64,
    pub area_m2: f64,
    pub area_m2_rounded: f64,
    pub quantity: f64,
    pub unit_price: Money,
    pub discount_pct: f64,
    pub line_total: Money,
    #[serde(default)]
    pub area_pricing: AreaPricing,
}

impl TryFrom<LineItemRecord> for BudgetLineItem {
    type Error = ValidationError;

    fn try_from(record: LineItemRecord) -> Result<Self, Self::Error> {
        let inputs = LineInputs {
            height_cm: validate_dimension_cm(record.height_cm, "height_cm")?,
            width_cm: validate_dimension_cm(record.width_cm, "width_cm")?,
            quantity: validate_quantity(record.quantity)?,
            unit_price: validate_unit_price(record.unit_price)?,
            discount: DiscountRate::from_fraction(record.discount_pct)?,
        };
        let pricing = pricing::price_line(&inputs, record.area_pricing)?;

        let line = BudgetLineItem {
            id: record.id,
            document_id: record.document_id,
            line_number: record.line_number,
            description: record.description,
            category: Category::from_tag(&record.category),
            color: record.color,
            faces: record.faces,
            inputs,
            area_pricing: record.area_pricing,
            pricing,
        };
        line.validate()?;
        Ok(line)
    }
}

impl From<BudgetLineItem> for LineItemRecord {
    fn from(line: BudgetLineItem) -> Self {
        line.to_record()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> BudgetLineItem {
        BudgetLineItem::new("line-1", "doc-1", 1, AreaPricing::Rescaled)
    }

    #[test]
    fn test_new_line_defaults() {
        let line = blank();
        assert_eq!(line.quantity(), 1.0);
        assert_eq!(line.faces(), 1);
        assert_eq!(line.category, Category::Otros);
        assert_eq!(line.height_cm(), 0.0);
        assert!(line.unit_price().is_zero());
        assert!(line.line_total().is_zero());
        assert_eq!(line.area_m2_rounded(), 0.0);
    }

    #[test]
    fn test_setters_recompute() {
        let mut line = blank();
        line.set_height_cm(50.0).unwrap();
        line.set_width_cm(400.0).unwrap();
        line.set_quantity(10.0).unwrap();
        line.set_unit_price(Money::from_guaranies(800_000)).unwrap();
        line.set_discount_pct(0.05).unwrap();

        assert_eq!(line.area_m2(), 2.0);
        assert_eq!(line.area_m2_rounded(), 2.0);
        assert_eq!(line.line_total().guaranies(), 7_600_000);
    }

    #[test]
    fn test_rejected_edit_leaves_line_unchanged() {
        let mut line = blank();
        line.set_height_cm(200.0).unwrap();
        line.set_width_cm(300.0).unwrap();
        line.set_unit_price(Money::from_guaranies(5_000_000)).unwrap();
        let before = line.clone();

        assert!(line.set_height_cm(-5.0).is_err());
        assert!(line.set_quantity(f64::NAN).is_err());
        assert!(line.set_discount_pct(1.0).is_err());
        assert!(line.set_faces(0).is_err());
        assert_eq!(line, before);
    }

    #[test]
    fn test_discount_pct_is_not_quantized() {
        let mut line = blank();
        line.set_unit_price(Money::from_guaranies(5_000_000)).unwrap();

        line.set_discount_pct(0.12345).unwrap();
        assert_eq!(line.discount().fraction(), 0.12345);
        assert_eq!(line.line_total().guaranies(), 4_382_750);

        line.set_discount_pct(0.99996).unwrap();
        assert_eq!(line.line_total().guaranies(), 200);
        assert_eq!(line.to_record().discount_pct, 0.99996);
    }

    #[test]
    fn test_set_area_pricing_reprices() {
        let mut line = blank();
        line.set_height_cm(55.0).unwrap();
        line.set_width_cm(55.0).unwrap();
        line.set_unit_price(Money::from_guaranies(100_000)).unwrap();
        assert_eq!(line.line_total().guaranies(), 165_289);

        line.set_area_pricing(AreaPricing::PerBillableArea).unwrap();
        assert_eq!(line.line_total().guaranies(), 50_000);
    }

    #[test]
    fn test_record_wire_shape() {
        let mut line = blank();
        line.description = "Letras Corpóreas".to_string();
        line.category = Category::Corporeo;
        line.set_unit_price(Money::from_guaranies(800_000)).unwrap();

        let json = serde_json::to_value(line.to_record()).unwrap();
        assert_eq!(json["documentId"], "doc-1");
        assert_eq!(json["lineNumber"], 1);
        assert_eq!(json["category"], "corporeo");
        assert_eq!(json["areaM2Rounded"], 0.0);
        assert_eq!(json["unitPrice"], 800_000);
        assert_eq!(json["lineTotal"], 800_000);
        assert_eq!(json["discountPct"], 0.0);
    }

    #[test]
    fn test_record_derived_fields_are_recomputed() {
        let mut record = blank().to_record();
        record.height_cm = 200.0;
        record.width_cm = 300.0;
        record.unit_price = Money::from_guaranies(5_000_000);
        // Stale values from an older client
        record.area_m2 = 1.0;
        record.line_total = Money::from_guaranies(1);

        let line = BudgetLineItem::try_from(record).unwrap();
        assert_eq!(line.area_m2(), 6.0);
        assert_eq!(line.line_total().guaranies(), 5_000_000);
    }

    #[test]
    fn test_record_with_invalid_input_is_rejected() {
        let mut record = blank().to_record();
        record.discount_pct = 1.0;
        assert!(BudgetLineItem::try_from(record).is_err());

        let mut record = blank().to_record();
        record.faces = 0;
        assert!(BudgetLineItem::try_from(record).is_err());
    }

    #[test]
    fn test_deserialize_missing_area_pricing_defaults() {
        let json = r#"{
            "id": "l1", "documentId": "d1", "lineNumber": 2,
            "description": "", "category": "vinilo", "color": "rojo",
            "faces": 2, "heightCm": 100, "widthCm": 100,
            "areaM2": 1, "areaM2Rounded": 1, "quantity": 2,
            "unitPrice": 120000, "discountPct": 0.1, "lineTotal": 216000
        }"#;
        let line: BudgetLineItem = serde_json::from_str(json).unwrap();
        assert_eq!(line.area_pricing(), AreaPricing::Rescaled);
        assert_eq!(line.category, Category::Vinilo);
        assert_eq!(line.discount().fraction(), 0.1);
        assert_eq!(line.line_total().guaranies(), 216_000);
    }

    #[test]
    fn test_field_names() {
        assert_eq!(LineField::HeightCm.field_name(), "height_cm");
        assert_eq!(LineField::DiscountPct.field_name(), "discount_pct");
    }
}
