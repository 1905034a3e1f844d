//! # Error Types
//!
//! Domain-specific error types for signshop-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  signshop-core errors (this file)                                      │
//! │  ├── CoreError        - Editing session / domain errors                │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── ConfigError      - Invalid quote settings                         │
//! │                                                                         │
//! │  signshop-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → UI notification         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, line ID, raw input)
//! 3. Errors are enum variants, never String
//! 4. A rejected edit never reaches a stored field

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent editing-session rule violations or domain logic
/// failures. They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Line item does not belong to the document being edited.
    #[error("Budget line not found: {0}")]
    LineNotFound(String),

    /// An edit arrived while no line is open for editing.
    ///
    /// ## When This Occurs
    /// - Typing into a row after it was saved or cancelled
    /// - Saving twice
    #[error("No budget line is being edited")]
    NotEditing,

    /// Another line is already open for editing.
    ///
    /// ## User Workflow
    /// ```text
    /// Row 2 in edit mode
    ///      │
    ///      ▼
    /// User clicks "edit" on row 5
    ///      │
    ///      ▼
    /// AlreadyEditing { line_id: <row 2> }
    ///      │
    ///      ▼
    /// UI asks to save or cancel row 2 first
    /// ```
    #[error("Budget line {line_id} is already being edited")]
    AlreadyEditing { line_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements. Callers
/// surface them to the user without persisting anything.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Text typed into a numeric field could not be parsed.
    #[error("{field} is not a number: '{input}'")]
    NotANumber { field: String, input: String },

    /// NaN or infinity reached a numeric field.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Fraction outside its allowed interval.
    ///
    /// `max_inclusive` distinguishes `[min, max]` from `[min, max)`.
    #[error("{field} must be between {min} and {max}{}", range_suffix(.max_inclusive))]
    FractionOutOfRange {
        field: String,
        min: f64,
        max: f64,
        max_inclusive: bool,
    },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a Required error for a field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates a Negative error for a field.
    pub fn negative(field: impl Into<String>) -> Self {
        ValidationError::Negative {
            field: field.into(),
        }
    }

    /// Creates a NotFinite error for a field.
    pub fn not_finite(field: impl Into<String>) -> Self {
        ValidationError::NotFinite {
            field: field.into(),
        }
    }
}

fn range_suffix(max_inclusive: &bool) -> &'static str {
    if *max_inclusive {
        ""
    } else {
        " (exclusive)"
    }
}

// =============================================================================
// Config Error
// =============================================================================

/// Quote settings errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================
