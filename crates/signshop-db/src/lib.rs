//! # signshop-db: Database Layer for Signshop Budgets
//!
//! This crate stores budget documents and their line items in SQLite,
//! using sqlx for async operations. All pricing is delegated to
//! `signshop-core`; this crate only persists what the core computes.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Budget Data Flow                                 │
//! │                                                                         │
//! │  BudgetEditor::save() ──► LineItemRecord                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   signshop-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ BudgetRepo     │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ BudgetItemRepo │   │ 001_budget_  │  │   │
//! │  │   │ Connection    │    │                │   │   schema.sql │  │   │
//! │  │   │ Management    │    │                │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            SQLite Database (budget_docs, budget_items)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Budget and line item repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use signshop_core::{NewBudget, QuoteSettings};
//! use signshop_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/budgets.db")).await?;
//!
//! let settings = QuoteSettings::default();
//! let doc = db
//!     .budgets()
//!     .create(&NewBudget::new(project_id, "Fachada", "Corporación ABC"), &settings)
//!     .await?;
//!
//! // Lines come from the editor as records
//! db.items().upsert(&record).await?;
//!
//! let loaded = db.budgets().load_document(&doc.id).await?;
//! println!("Total: {}", loaded.summary()?.total);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::budget::{BudgetRecord, BudgetRepository};
pub use repository::item::BudgetItemRepository;
