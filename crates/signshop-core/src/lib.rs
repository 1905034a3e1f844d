//! # signshop-core: Pure Pricing Logic for Signshop Budgets
//!
//! This crate is the **heart** of the Signshop back office. It turns the
//! physical dimensions of a sign into billable area, prices each budget
//! line and aggregates lines into document totals, as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Signshop Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (TypeScript)                        │   │
//! │  │   Budget table ──► Line editor ──► Summary ──► Work orders     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON (ts-rs bindings)                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ signshop-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────┐       │   │
//! │  │   │ pricing  │  │ summary  │  │ category │  │  editor  │       │   │
//! │  │   │ area m²  │  │ subtotal │  │  labels  │  │  draft   │       │   │
//! │  │   │ ceil ¼m² │  │ IVA      │  │  groups  │  │  save    │       │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────┘       │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 signshop-db (Database Layer)                    │   │
//! │  │          budget_docs / budget_items, migrations, seed           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money in whole guaraníes (integer, no floating point)
//! - [`types`] - Rates, statuses, area convention, new-budget input
//! - [`pricing`] - Line pricing calculator
//! - [`summary`] - Document aggregator
//! - [`category`] - Category labels and grouping
//! - [`line`] / [`document`] - Budget lines and documents
//! - [`editor`] - One-line-at-a-time editing session
//! - [`settings`] - Currency, default IVA, area convention
//! - [`validation`] / [`error`] - Input rules and typed errors
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output; recomputing is always safe
//! 2. **No I/O**: the environment is read through an injected lookup
//! 3. **Integer Money**: fractional area math is rounded once into guaraníes,
//!    sums are checked and never wrap
//! 4. **Explicit Errors**: invalid input is a `ValidationError`, never clamped
//!
//! ## Example Usage
//!
//! ```rust
//! use signshop_core::money::Money;
//! use signshop_core::pricing::{price_line, LineInputs};
//! use signshop_core::summary::summarize;
//! use signshop_core::types::{AreaPricing, DiscountRate, TaxRate};
//!
//! let sign = LineInputs {
//!     height_cm: 200.0,
//!     width_cm: 300.0,
//!     quantity: 1.0,
//!     unit_price: Money::from_guaranies(5_000_000),
//!     discount: DiscountRate::NONE,
//! };
//! let priced = price_line(&sign, AreaPricing::Rescaled).unwrap();
//! assert_eq!(priced.area_m2_rounded, 6.0);
//! assert_eq!(priced.line_total.guaranies(), 5_000_000);
//!
//! let summary = summarize(&[], Money::zero(), TaxRate::STANDARD).unwrap();
//! assert!(summary.total.is_zero());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod category;
pub mod document;
pub mod editor;
pub mod error;
pub mod line;
pub mod money;
pub mod pricing;
pub mod settings;
pub mod summary;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use signshop_core::Money` instead of
// `use signshop_core::money::Money`

pub use category::{group_by_category, Category, CategoryGroup};
pub use document::BudgetDocument;
pub use editor::{BudgetEditor, TextField};
pub use error::{ConfigError, CoreError, ValidationError};
pub use line::{BudgetLineItem, LineField, LineItemRecord};
pub use money::Money;
pub use pricing::{price_line, recompute, LineInputs, LinePricing};
pub use settings::QuoteSettings;
pub use summary::{summarize, BudgetSummary};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Square centimeters in one square meter.
pub const CM2_PER_M2: f64 = 10_000.0;

/// Billable area is sold in quarter square meters.
pub const BILLABLE_AREA_STEP_M2: f64 = 0.25;

/// Maximum length of a line description.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Maximum length of a line color.
pub const MAX_COLOR_LEN: usize = 100;

/// Maximum length of a client name.
pub const MAX_CLIENT_LEN: usize = 200;

/// Maximum length of a budget name.
pub const MAX_NAME_LEN: usize = 200;
