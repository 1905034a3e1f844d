//! # Budget Store Errors
//!
//! `DbError` covers what can go wrong between a budget and its SQLite row:
//! a budget or line that isn't there, a line pointing at a missing budget,
//! a row the schema's CHECK constraints refuse, and rows that load but fail
//! the core's validation (`DbError::Core`).

use signshop_core::{CoreError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// A budget or line ID that doesn't exist, or a line ID owned by
    /// another budget.
    #[error("{entity} not found: {id}")]
    NotFound {
        entity: String,
        id: String,
    },

    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation {
        field: String,
        value: String,
    },

    /// A line saved for a budget that doesn't exist.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation {
        message: String,
    },

    /// A row outside the schema's bounds, e.g. `discount_pct >= 1` or a
    /// negative `unit_price` written by another tool.
    #[error("Constraint violation: {message}")]
    ConstraintViolation {
        message: String,
    },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),

    /// A stored row or an incoming budget failed the core's rules: a
    /// negative dimension, an empty client, a total out of range.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Core(CoreError::Validation(err))
    }
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Maps SQLite failures by their constraint message.
///
/// ```text
/// RowNotFound                    → NotFound
/// "UNIQUE constraint failed"     → UniqueViolation
/// "FOREIGN KEY constraint failed"→ ForeignKeyViolation
/// "CHECK constraint failed"      → ConstraintViolation
/// PoolTimedOut / PoolClosed      → PoolExhausted / ConnectionFailed
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::ConstraintViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DbError::not_found("Budget", "b-1").to_string(),
            "Budget not found: b-1"
        );
    }

    #[test]
    fn test_validation_error_wraps_into_core() {
        let err: DbError = ValidationError::negative("height_cm").into();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
        assert_eq!(err.to_string(), "Validation error: height_cm must not be negative");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err: DbError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, DbError::PoolExhausted));
    }

    #[tokio::test]
    async fn test_sqlite_constraints_map_to_variants() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let insert = "INSERT INTO budget_docs (id, project_id, name, client, issue_date, discount_doc, created_at, updated_at) \
                      VALUES ('b-1', 'p', 'n', 'c', '2024-03-01', ?1, '', '')";

        sqlx::query(insert).bind(0_i64).execute(db.pool()).await.unwrap();

        let err: DbError = sqlx::query(insert)
            .bind(0_i64)
            .execute(db.pool())
            .await
            .unwrap_err()
            .into();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "budget_docs.id"));

        let err: DbError = sqlx::query("UPDATE budget_docs SET discount_doc = -1 WHERE id = 'b-1'")
            .execute(db.pool())
            .await
            .unwrap_err()
            .into();
        assert!(matches!(err, DbError::ConstraintViolation { .. }));
    }
}
