//! # Document Module
//!
//! `BudgetDocument`: the header of a quote plus its ordered lines.
//!
//! ## Structure
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BudgetDocument                                                         │
//! │  ├── id, project_id, name, issue_date, status                          │
//! │  ├── client, version            (validated setters)                    │
//! │  ├── discount_doc, iva          (validated setters)                    │
//! │  ├── area_pricing               (reprices every line when changed)     │
//! │  └── items: Vec<BudgetLineItem> (ordered, display numbering only)      │
//! │                                                                         │
//! │  summary() ──► subtotal / discount / IVA / total, computed on read     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::Serialize;

use crate::category::{group_by_category, CategoryGroup};
use crate::error::{CoreError, CoreResult, ValidationResult};
use crate::line::BudgetLineItem;
use crate::money::Money;
use crate::settings::QuoteSettings;
use crate::summary::{self, BudgetSummary};
use crate::types::{AreaPricing, BudgetStatus, NewBudget, TaxRate};
use crate::validation::{validate_client, validate_discount_doc, validate_version};

/// A budget (quote) and its lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetDocument {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub issue_date: NaiveDate,
    pub status: BudgetStatus,
    client: String,
    version: u32,
    discount_doc: Money,
    iva: TaxRate,
    area_pricing: AreaPricing,
    items: Vec<BudgetLineItem>,
}

impl BudgetDocument {
    /// Creates an empty draft document.
    ///
    /// IVA and the area convention come from `settings`; the document
    /// discount starts at zero.
    pub fn new(
        id: impl Into<String>,
        input: NewBudget,
        issue_date: NaiveDate,
        settings: &QuoteSettings,
    ) -> ValidationResult<Self> {
        input.validate()?;

        Ok(BudgetDocument {
            id: id.into(),
            project_id: input.project_id,
            name: input.name.trim().to_string(),
            issue_date: input.issue_date.unwrap_or(issue_date),
            status: BudgetStatus::Draft,
            client: input.client.trim().to_string(),
            version: input.version,
            discount_doc: Money::zero(),
            iva: settings.default_iva,
            area_pricing: settings.area_pricing,
            items: Vec::new(),
        })
    }

    // =========================================================================
    // Header
    // =========================================================================

    pub fn client(&self) -> &str {
        &self.client
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn discount_doc(&self) -> Money {
        self.discount_doc
    }

    pub fn iva(&self) -> TaxRate {
        self.iva
    }

    pub fn area_pricing(&self) -> AreaPricing {
        self.area_pricing
    }

    pub fn set_client(&mut self, client: &str) -> ValidationResult<()> {
        validate_client(client)?;
        self.client = client.trim().to_string();
        Ok(())
    }

    pub fn set_version(&mut self, version: u32) -> ValidationResult<()> {
        validate_version(version)?;
        self.version = version;
        Ok(())
    }

    pub fn set_discount_doc(&mut self, discount: Money) -> ValidationResult<()> {
        self.discount_doc = validate_discount_doc(discount)?;
        Ok(())
    }

    /// `TaxRate` is range-checked on construction, so any value is accepted.
    pub fn set_iva(&mut self, iva: TaxRate) {
        self.iva = iva;
    }

    /// Changes the area convention of the document and every line.
    ///
    /// All lines are repriced first; if any fails nothing changes.
    pub fn set_area_pricing(&mut self, area_pricing: AreaPricing) -> ValidationResult<()> {
        let mut repriced = self.items.clone();
        for line in &mut repriced {
            line.set_area_pricing(area_pricing)?;
        }
        self.items = repriced;
        self.area_pricing = area_pricing;
        Ok(())
    }

    // =========================================================================
    // Lines
    // =========================================================================

    pub fn items(&self) -> &[BudgetLineItem] {
        &self.items
    }

    pub fn line(&self, line_id: &str) -> Option<&BudgetLineItem> {
        self.items.iter().find(|line| line.id == line_id)
    }

    /// Line number for the next appended line (`items.len() + 1`).
    pub fn next_line_number(&self) -> u32 {
        self.items.len() as u32 + 1
    }

    /// Appends a line, taking ownership of it for this document.
    ///
    /// The line adopts the document's area convention and is repriced if
    /// it was built under the other one.
    pub fn push_line(&mut self, mut line: BudgetLineItem) -> ValidationResult<()> {
        line.set_area_pricing(self.area_pricing)?;
        line.document_id = self.id.clone();
        self.items.push(line);
        Ok(())
    }

    /// Replaces the line with the same id, keeping its position.
    ///
    /// Like `push_line`, the replacement adopts the document's area convention.
    pub fn replace_line(&mut self, mut line: BudgetLineItem) -> CoreResult<()> {
        let index = self
            .items
            .iter()
            .position(|existing| existing.id == line.id)
            .ok_or_else(|| CoreError::LineNotFound(line.id.clone()))?;

        line.set_area_pricing(self.area_pricing)?;
        line.document_id = self.id.clone();
        self.items[index] = line;
        Ok(())
    }

    /// Removes a line. Remaining lines keep their numbers.
    pub fn remove_line(&mut self, line_id: &str) -> CoreResult<BudgetLineItem> {
        let index = self
            .items
            .iter()
            .position(|line| line.id == line_id)
            .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))?;

        Ok(self.items.remove(index))
    }

    // =========================================================================
    // Derived
    // =========================================================================

    /// Subtotal, discount, IVA and total for the current lines.
    ///
    /// ## Errors
    /// - `NotFinite` when a sum leaves the `i64` range
    pub fn summary(&self) -> ValidationResult<BudgetSummary> {
        summary::aggregate(&self.items, self.discount_doc, self.iva)
    }

    /// Lines grouped by category, first-seen order.
    pub fn grouped(&self) -> Vec<CategoryGroup<'_>> {
        group_by_category(&self.items)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    const PROJECT_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn document() -> BudgetDocument {
        BudgetDocument::new(
            "doc-1",
            NewBudget::new(PROJECT_ID, "Fachada", "Corporación ABC"),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            &QuoteSettings::default(),
        )
        .unwrap()
    }

    fn priced_line(id: &str, n: u32, price: i64) -> BudgetLineItem {
        let mut line = BudgetLineItem::new(id, "other-doc", n, AreaPricing::Rescaled);
        line.set_height_cm(55.0).unwrap();
        line.set_width_cm(55.0).unwrap();
        line.set_unit_price(Money::from_guaranies(price)).unwrap();
        line
    }

    #[test]
    fn test_new_document_defaults() {
        let doc = document();
        assert_eq!(doc.status, BudgetStatus::Draft);
        assert_eq!(doc.version(), 1);
        assert_eq!(doc.iva(), TaxRate::STANDARD);
        assert!(doc.discount_doc().is_zero());
        assert!(doc.items().is_empty());
        assert_eq!(doc.next_line_number(), 1);
        assert_eq!(doc.summary().unwrap(), BudgetSummary::default());
    }

    #[test]
    fn test_new_document_rejects_invalid_input() {
        let result = BudgetDocument::new(
            "doc-1",
            NewBudget::new(PROJECT_ID, "Fachada", ""),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            &QuoteSettings::default(),
        );
        assert_eq!(result.unwrap_err(), ValidationError::required("client"));
    }

    #[test]
    fn test_push_replace_remove() {
        let mut doc = document();
        doc.push_line(priced_line("a", 1, 100_000)).unwrap();
        doc.push_line(priced_line("b", 2, 200_000)).unwrap();
        assert_eq!(doc.items()[0].document_id, "doc-1");
        assert_eq!(doc.next_line_number(), 3);

        let mut updated = doc.line("a").unwrap().clone();
        updated.set_quantity(2.0).unwrap();
        doc.replace_line(updated).unwrap();
        assert_eq!(doc.items()[0].quantity(), 2.0);

        let removed = doc.remove_line("a").unwrap();
        assert_eq!(removed.id, "a");
        assert_eq!(doc.items()[0].line_number, 2);

        assert!(matches!(doc.remove_line("zzz"), Err(CoreError::LineNotFound(_))));
        assert!(matches!(
            doc.replace_line(priced_line("zzz", 9, 1)),
            Err(CoreError::LineNotFound(_))
        ));
    }

    #[test]
    fn test_summary_tracks_lines() {
        let mut doc = document();
        doc.push_line(priced_line("a", 1, 100_000)).unwrap();
        let first = doc.summary().unwrap();

        doc.push_line(priced_line("b", 2, 100_000)).unwrap();
        let second = doc.summary().unwrap();
        assert_eq!(second.subtotal.guaranies(), 2 * first.subtotal.guaranies());

        doc.set_discount_doc(Money::from_guaranies(10_000)).unwrap();
        assert_eq!(
            doc.summary().unwrap().total.guaranies(),
            second.total.guaranies() - 10_000
        );
    }

    #[test]
    fn test_header_setters_validate() {
        let mut doc = document();
        assert!(doc.set_discount_doc(Money::from_guaranies(-1)).is_err());
        assert!(doc.set_client("  ").is_err());
        assert!(doc.set_version(0).is_err());
        assert_eq!(doc.client(), "Corporación ABC");

        doc.set_iva(TaxRate::from_fraction(0.05).unwrap());
        doc.set_version(2).unwrap();
        assert_eq!(doc.iva().fraction(), 0.05);
        assert_eq!(doc.version(), 2);
    }

    #[test]
    fn test_set_area_pricing_reprices_all_lines() {
        let mut doc = document();
        doc.push_line(priced_line("a", 1, 100_000)).unwrap();
        assert_eq!(doc.summary().unwrap().subtotal.guaranies(), 165_289);

        doc.set_area_pricing(AreaPricing::PerBillableArea).unwrap();
        assert_eq!(doc.area_pricing(), AreaPricing::PerBillableArea);
        assert_eq!(doc.summary().unwrap().subtotal.guaranies(), 50_000);
    }

    #[test]
    fn test_pushed_lines_adopt_document_area_pricing() {
        let mut doc = document();
        doc.set_area_pricing(AreaPricing::PerBillableArea).unwrap();

        // built under the other convention: 165_289 if it kept it
        doc.push_line(priced_line("a", 1, 100_000)).unwrap();
        assert_eq!(doc.items()[0].area_pricing(), AreaPricing::PerBillableArea);
        assert_eq!(doc.summary().unwrap().subtotal.guaranies(), 50_000);

        let mut replacement = priced_line("a", 1, 200_000);
        replacement.set_area_pricing(AreaPricing::Rescaled).unwrap();
        doc.replace_line(replacement).unwrap();
        assert_eq!(doc.items()[0].area_pricing(), AreaPricing::PerBillableArea);
        assert_eq!(doc.summary().unwrap().subtotal.guaranies(), 100_000);
    }
}
