//! # Validation Module
//!
//! Input validation utilities for budgets and line items.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI (TypeScript)                                              │
//! │  ├── Input type="number", required fields                              │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: signshop-core (Rust)                                         │
//! │  ├── parse_number: keystroke text → finite f64                         │
//! │  └── THIS MODULE: ranges, required text, identifiers                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use signshop_core::validation::{parse_number, validate_dimension_cm};
//!
//! let height = parse_number("height_cm", "55").unwrap();
//! assert_eq!(validate_dimension_cm(height, "height_cm").unwrap(), 55.0);
//!
//! assert!(parse_number("height_cm", "abc").is_err());
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;
use crate::{MAX_CLIENT_LEN, MAX_COLOR_LEN, MAX_DESCRIPTION_LEN, MAX_NAME_LEN};

// =============================================================================
// Keystroke Parsing
// =============================================================================

/// Parses the raw text of a numeric input.
///
/// ## Rules
/// - Surrounding whitespace is ignored
/// - Empty text is `0` (the user cleared the field to retype it)
/// - A single comma is accepted as the decimal separator (`12,5`)
/// - `NaN`, `inf` and anything unparseable is rejected
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  User types "12a" into Alto (cm)                                        │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  parse_number("height_cm", "12a") ← THIS FUNCTION                       │
/// │       │                                                                 │
/// │       ├── Err(NotANumber) → field shows error, line keeps last value   │
/// │       │                                                                 │
/// │       └── Ok(12.0) → recompute area and total                          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn parse_number(field: &str, raw: &str) -> ValidationResult<f64> {
    let text = raw.trim();
    if text.is_empty() {
        return Ok(0.0);
    }

    let normalized = if !text.contains('.') && text.matches(',').count() == 1 {
        text.replace(',', ".")
    } else {
        text.to_string()
    };

    let not_a_number = || ValidationError::NotANumber {
        field: field.to_string(),
        input: raw.to_string(),
    };

    let value: f64 = normalized.parse().map_err(|_| not_a_number())?;
    if !value.is_finite() {
        return Err(not_a_number());
    }

    Ok(value)
}

// =============================================================================
// Numeric Validators
// =============================================================================

fn validate_non_negative(value: f64, field: &str) -> ValidationResult<f64> {
    if !value.is_finite() {
        return Err(ValidationError::not_finite(field));
    }
    if value < 0.0 {
        return Err(ValidationError::negative(field));
    }
    // Normalizes -0.0 so it never shows up in a stored field
    Ok(value + 0.0)
}

/// Validates a height or width in centimeters.
///
/// ## Rules
/// - Must be finite
/// - Must be non-negative (zero is allowed: the piece is priced per unit)
pub fn validate_dimension_cm(value: f64, field: &str) -> ValidationResult<f64> {
    validate_non_negative(value, field)
}

/// Validates a line quantity.
///
/// ## Rules
/// - Must be finite and non-negative
/// - Fractional quantities are allowed (half a sheet of vinyl)
pub fn validate_quantity(qty: f64) -> ValidationResult<f64> {
    validate_non_negative(qty, "quantity")
}

/// Validates a unit price.
///
/// ## Example
/// ```rust
/// use signshop_core::money::Money;
/// use signshop_core::validation::validate_unit_price;
///
/// assert!(validate_unit_price(Money::from_guaranies(800_000)).is_ok());
/// assert!(validate_unit_price(Money::zero()).is_ok());
/// assert!(validate_unit_price(Money::from_guaranies(-1)).is_err());
/// ```
pub fn validate_unit_price(price: Money) -> ValidationResult<Money> {
    if price.is_negative() {
        return Err(ValidationError::negative("unit_price"));
    }
    Ok(price)
}

/// Validates a typed unit price and converts it to money.
///
/// The sign is checked on the typed value, before rounding, so `-0.4`
/// is rejected rather than becoming ₲ 0.
///
/// ## Example
/// ```rust
/// use signshop_core::validation::validate_unit_price_amount;
///
/// assert_eq!(validate_unit_price_amount(799_999.5).unwrap().guaranies(), 800_000);
/// assert!(validate_unit_price_amount(-0.4).is_err());
/// ```
pub fn validate_unit_price_amount(amount: f64) -> ValidationResult<Money> {
    let amount = validate_non_negative(amount, "unit_price")?;
    Money::from_amount(amount, "unit_price")
}

/// Validates a document-level discount amount.
pub fn validate_discount_doc(discount: Money) -> ValidationResult<Money> {
    if discount.is_negative() {
        return Err(ValidationError::negative("discount_doc"));
    }
    Ok(discount)
}

/// Validates the number of faces of a piece.
///
/// ## Rules
/// - Must be positive; a sign always has at least one face
pub fn validate_faces(faces: u32) -> ValidationResult<u32> {
    if faces == 0 {
        return Err(ValidationError::MustBePositive {
            field: "faces".to_string(),
        });
    }
    Ok(faces)
}

/// Validates a budget version number.
pub fn validate_version(version: u32) -> ValidationResult<()> {
    if version == 0 {
        return Err(ValidationError::MustBePositive {
            field: "version".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

fn validate_required_text(value: &str, field: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    validate_optional_text(value, field, max)
}

fn validate_optional_text(value: &str, field: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates the budget name.
pub fn validate_budget_name(name: &str) -> ValidationResult<()> {
    validate_required_text(name, "name", MAX_NAME_LEN)
}

/// Validates the client name.
///
/// ## Example
/// ```rust
/// use signshop_core::validation::validate_client;
///
/// assert!(validate_client("Corporación ABC").is_ok());
/// assert!(validate_client("").is_err());
/// ```
pub fn validate_client(client: &str) -> ValidationResult<()> {
    validate_required_text(client, "client", MAX_CLIENT_LEN)
}

/// Validates a line description. May be empty while the line is being drafted.
pub fn validate_description(description: &str) -> ValidationResult<()> {
    validate_optional_text(description, "description", MAX_DESCRIPTION_LEN)
}

/// Validates a line color.
pub fn validate_color(color: &str) -> ValidationResult<()> {
    validate_optional_text(color, "color", MAX_COLOR_LEN)
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
///
/// ## Example
/// ```rust
/// use signshop_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000", "project_id").is_ok());
/// assert!(validate_uuid("not-a-uuid", "project_id").is_err());
/// ```
pub fn validate_uuid(id: &str, field: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("height_cm", "55").unwrap(), 55.0);
        assert_eq!(parse_number("height_cm", " 12.5 ").unwrap(), 12.5);
        assert_eq!(parse_number("height_cm", "12,5").unwrap(), 12.5);
        assert_eq!(parse_number("height_cm", "").unwrap(), 0.0);
        assert_eq!(parse_number("height_cm", "   ").unwrap(), 0.0);
        assert_eq!(parse_number("quantity", "-3").unwrap(), -3.0);
    }

    #[test]
    fn test_parse_number_rejects_garbage() {
        assert_eq!(
            parse_number("height_cm", "12a"),
            Err(ValidationError::NotANumber {
                field: "height_cm".to_string(),
                input: "12a".to_string(),
            })
        );
        assert!(parse_number("height_cm", "NaN").is_err());
        assert!(parse_number("height_cm", "inf").is_err());
        assert!(parse_number("height_cm", "1,000,000").is_err());
        assert!(parse_number("height_cm", "1e400").is_err());
    }

    #[test]
    fn test_validate_dimension() {
        assert_eq!(validate_dimension_cm(0.0, "width_cm").unwrap(), 0.0);
        assert_eq!(validate_dimension_cm(300.0, "width_cm").unwrap(), 300.0);
        assert_eq!(
            validate_dimension_cm(-1.0, "width_cm"),
            Err(ValidationError::negative("width_cm"))
        );
        assert!(validate_dimension_cm(f64::NAN, "width_cm").is_err());
    }

    #[test]
    fn test_validate_negative_zero_normalized() {
        let value = validate_quantity(-0.0).unwrap();
        assert!(value.is_sign_positive());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1.0).is_ok());
        assert!(validate_quantity(0.5).is_ok());
        assert!(validate_quantity(0.0).is_ok());
        assert!(validate_quantity(-1.0).is_err());
        assert!(validate_quantity(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_faces() {
        assert!(validate_faces(1).is_ok());
        assert!(validate_faces(2).is_ok());
        assert!(validate_faces(0).is_err());
    }

    #[test]
    fn test_validate_unit_price_amount() {
        assert_eq!(validate_unit_price_amount(0.0).unwrap(), Money::zero());
        assert_eq!(validate_unit_price_amount(1.5).unwrap().guaranies(), 2);
        assert_eq!(
            validate_unit_price_amount(-0.4),
            Err(ValidationError::negative("unit_price"))
        );
        assert!(validate_unit_price_amount(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_text() {
        assert!(validate_description("").is_ok());
        assert!(validate_description("Letras Corpóreas").is_ok());
        assert!(validate_description(&"x".repeat(MAX_DESCRIPTION_LEN + 1)).is_err());
        assert!(validate_color(&"x".repeat(MAX_COLOR_LEN)).is_ok());
        assert!(validate_budget_name("").is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000", "id").is_ok());
        assert_eq!(validate_uuid("", "id"), Err(ValidationError::required("id")));
        assert!(validate_uuid("123", "id").is_err());
    }
}
