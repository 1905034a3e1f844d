//! # Repository Module
//!
//! Database repository implementations for budgets.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  Caller (editor save, seed, API handler)                               │
//! │       │                                                                 │
//! │       │  db.items().upsert(&record)                                    │
//! │       ▼                                                                 │
//! │  BudgetItemRepository                                                  │
//! │  ├── record → BudgetLineItem (derived fields recomputed)               │
//! │  ├── INSERT ... ON CONFLICT(id) DO UPDATE                              │
//! │  └── refresh budget_docs.total_amount      ┐ one transaction           │
//! │       │                                    ┘                            │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stored derived columns are never trusted on the way out: every loaded
//! line is repriced by signshop-core and drift is logged.
//!
//! ## Available Repositories
//!
//! - [`BudgetRepository`](budget::BudgetRepository) - Budget headers and documents
//! - [`BudgetItemRepository`](item::BudgetItemRepository) - Line items

pub mod budget;
pub mod item;

use signshop_core::ValidationError;

/// Converts an INTEGER column into a `u32` domain value.
pub(crate) fn to_u32(value: i64, field: &str) -> Result<u32, ValidationError> {
    u32::try_from(value).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("{value} is out of range"),
    })
}
