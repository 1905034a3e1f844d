//! # Budget Editor
//!
//! An editing session over one budget: at most one line is open at a time,
//! keystrokes are parsed and priced immediately, and `save` hands back the
//! payload the persistence layer stores.
//!
//! ## Session Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Line Editing Session                             │
//! │                                                                         │
//! │  add_line() / begin_edit(id)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────┐  edit_field(HeightCm, "55")                           │
//! │  │  draft line  │◄─────────────────────────── repriced on every call   │
//! │  └──────┬───────┘  set_text / set_category                              │
//! │         │                                                               │
//! │    ┌────┴─────┐                                                         │
//! │    ▼          ▼                                                         │
//! │  save()    cancel()                                                     │
//! │    │          │                                                         │
//! │    │          └──► draft dropped, document unchanged                    │
//! │    ▼                                                                    │
//! │  document line replaced ──► LineItemRecord for the store                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The document summary only reflects saved lines; the draft's own
//! `line_total` is live.

use uuid::Uuid;

use crate::category::{Category, CategoryGroup};
use crate::document::BudgetDocument;
use crate::error::{CoreError, CoreResult, ValidationError, ValidationResult};
use crate::line::{BudgetLineItem, LineField, LineItemRecord};
use crate::money::Money;
use crate::summary::BudgetSummary;
use crate::types::{DiscountRate, TaxRate};
use crate::validation::{
    parse_number, validate_color, validate_description, validate_unit_price_amount,
};

/// Free-text fields of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Description,
    Color,
}

/// Editing session over a budget document.
#[derive(Debug, Clone)]
pub struct BudgetEditor {
    document: BudgetDocument,
    draft: Option<BudgetLineItem>,
}

impl BudgetEditor {
    pub fn new(document: BudgetDocument) -> Self {
        BudgetEditor {
            document,
            draft: None,
        }
    }

    pub fn document(&self) -> &BudgetDocument {
        &self.document
    }

    /// Ends the session. An open draft is discarded.
    pub fn into_document(self) -> BudgetDocument {
        self.document
    }

    /// The line currently open for editing.
    pub fn editing(&self) -> Option<&BudgetLineItem> {
        self.draft.as_ref()
    }

    // =========================================================================
    // Opening a Line
    // =========================================================================

    /// Appends a blank line and opens it for editing.
    ///
    /// ## Errors
    /// - `AlreadyEditing` if another line is open
    pub fn add_line(&mut self) -> CoreResult<&BudgetLineItem> {
        self.ensure_closed()?;

        let line = BudgetLineItem::new(
            Uuid::new_v4().to_string(),
            self.document.id.clone(),
            self.document.next_line_number(),
            self.document.area_pricing(),
        );
        self.document.push_line(line.clone())?;

        Ok(self.draft.insert(line))
    }

    /// Opens an existing line for editing. Re-opening the open line is a
    /// no-op.
    pub fn begin_edit(&mut self, line_id: &str) -> CoreResult<&BudgetLineItem> {
        if let Some(draft) = &self.draft {
            if draft.id != line_id {
                return Err(CoreError::AlreadyEditing {
                    line_id: draft.id.clone(),
                });
            }
        }

        if self.draft.is_none() {
            let line = self
                .document
                .line(line_id)
                .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))?
                .clone();
            self.draft = Some(line);
        }

        self.draft.as_ref().ok_or(CoreError::NotEditing)
    }

    fn ensure_closed(&self) -> CoreResult<()> {
        match &self.draft {
            Some(draft) => Err(CoreError::AlreadyEditing {
                line_id: draft.id.clone(),
            }),
            None => Ok(()),
        }
    }

    fn draft_mut(&mut self) -> CoreResult<&mut BudgetLineItem> {
        self.draft.as_mut().ok_or(CoreError::NotEditing)
    }

    // =========================================================================
    // Editing the Draft
    // =========================================================================

    /// Applies raw keystroke text to a numeric field and reprices the draft.
    ///
    /// Empty text counts as zero. On error the draft keeps its previous
    /// value.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use signshop_core::document::BudgetDocument;
    /// use signshop_core::editor::BudgetEditor;
    /// use signshop_core::line::LineField;
    /// use signshop_core::settings::QuoteSettings;
    /// use signshop_core::types::NewBudget;
    ///
    /// let doc = BudgetDocument::new(
    ///     "doc-1",
    ///     NewBudget::new("550e8400-e29b-41d4-a716-446655440000", "Fachada", "Corporación ABC"),
    ///     NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
    ///     &QuoteSettings::default(),
    /// )
    /// .unwrap();
    ///
    /// let mut editor = BudgetEditor::new(doc);
    /// editor.add_line().unwrap();
    /// editor.edit_field(LineField::HeightCm, "55").unwrap();
    /// editor.edit_field(LineField::WidthCm, "55").unwrap();
    /// let line = editor.edit_field(LineField::UnitPrice, "100000").unwrap();
    /// assert_eq!(line.area_m2_rounded(), 0.5);
    ///
    /// assert!(editor.edit_field(LineField::HeightCm, "12a").is_err());
    /// ```
    pub fn edit_field(&mut self, field: LineField, raw: &str) -> CoreResult<&BudgetLineItem> {
        let name = field.field_name();
        let value = parse_number(name, raw)?;
        let draft = self.draft_mut()?;

        match field {
            LineField::HeightCm => draft.set_height_cm(value)?,
            LineField::WidthCm => draft.set_width_cm(value)?,
            LineField::Quantity => draft.set_quantity(value)?,
            LineField::UnitPrice => draft.set_unit_price(validate_unit_price_amount(value)?)?,
            LineField::DiscountPct => draft.set_discount(DiscountRate::from_fraction(value)?)?,
            LineField::Faces => draft.set_faces(whole_number(value, name)?)?,
        }

        Ok(draft)
    }

    /// Sets the description or color of the draft.
    pub fn set_text(&mut self, field: TextField, value: &str) -> CoreResult<&BudgetLineItem> {
        let draft = self.draft_mut()?;

        match field {
            TextField::Description => {
                validate_description(value)?;
                draft.description = value.to_string();
            }
            TextField::Color => {
                validate_color(value)?;
                draft.color = value.to_string();
            }
        }

        Ok(draft)
    }

    pub fn set_category(&mut self, category: Category) -> CoreResult<&BudgetLineItem> {
        let draft = self.draft_mut()?;
        draft.category = category;
        Ok(draft)
    }

    // =========================================================================
    // Closing the Draft
    // =========================================================================

    /// Writes the draft back into the document and returns the payload to
    /// persist.
    ///
    /// ## Errors
    /// - `NotEditing` if no line is open
    /// - `Validation` if the draft fails validation (the draft stays open)
    /// - `LineNotFound` if the line was removed meanwhile
    pub fn save(&mut self) -> CoreResult<LineItemRecord> {
        let draft = self.draft.as_ref().ok_or(CoreError::NotEditing)?;
        draft.validate()?;

        let record = draft.to_record();
        self.document.replace_line(draft.clone())?;
        self.draft = None;

        Ok(record)
    }

    /// Drops the draft without touching the document.
    pub fn cancel(&mut self) {
        self.draft = None;
    }

    /// Removes a line, closing the draft if it was that line.
    pub fn remove_line(&mut self, line_id: &str) -> CoreResult<BudgetLineItem> {
        let removed = self.document.remove_line(line_id)?;
        if self.draft.as_ref().is_some_and(|draft| draft.id == line_id) {
            self.draft = None;
        }
        Ok(removed)
    }

    // =========================================================================
    // Header and Reads
    // =========================================================================

    pub fn set_discount_doc(&mut self, discount: Money) -> CoreResult<BudgetSummary> {
        self.document.set_discount_doc(discount)?;
        Ok(self.summary()?)
    }

    pub fn set_iva(&mut self, iva: TaxRate) -> CoreResult<BudgetSummary> {
        self.document.set_iva(iva);
        Ok(self.summary()?)
    }

    pub fn set_client(&mut self, client: &str) -> CoreResult<()> {
        self.document.set_client(client)?;
        Ok(())
    }

    pub fn set_version(&mut self, version: u32) -> CoreResult<()> {
        self.document.set_version(version)?;
        Ok(())
    }

    pub fn summary(&self) -> ValidationResult<BudgetSummary> {
        self.document.summary()
    }

    pub fn grouped(&self) -> Vec<CategoryGroup<'_>> {
        self.document.grouped()
    }
}

fn whole_number(value: f64, field: &str) -> Result<u32, ValidationError> {
    if value.fract() != 0.0 || value < 0.0 || value > u32::MAX as f64 {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a whole number".to_string(),
        });
    }
    Ok(value as u32)
}

// =============================================================================
// Unit Tests
// =============================================================================
