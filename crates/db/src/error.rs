//! Translation of sqlx failures into [`CoreError`] kinds.

use agora_core::error::CoreError;

/// PostgreSQL `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Classify a sqlx error for the given entity.
///
/// - `RowNotFound` maps to NotFound.
/// - Unique constraint violations map to Conflict.
/// - Foreign key violations map to Validation (a referenced row is missing).
/// - Everything else maps to Internal and is logged here.
pub fn classify(err: sqlx::Error, entity: &'static str) -> CoreError {
    match err {
        sqlx::Error::RowNotFound => CoreError::not_found(entity),
        sqlx::Error::Database(db_err) => {
            let code = db_err.code();
            if code.as_deref() == Some(UNIQUE_VIOLATION) {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return CoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
            if code.as_deref() == Some(FOREIGN_KEY_VIOLATION) {
                return CoreError::Validation(format!("Referenced {entity} parent does not exist"));
            }
            tracing::error!(entity, error = %db_err, "Database error");
            CoreError::Internal(db_err.to_string())
        }
        other => {
            tracing::error!(entity, error = %other, "Database error");
            CoreError::Internal(other.to_string())
        }
    }
}

/// Map a zero-row mutation to NotFound.
pub fn expect_affected(rows_affected: u64, entity: &'static str) -> Result<(), CoreError> {
    if rows_affected == 0 {
        Err(CoreError::not_found(entity))
    } else {
        Ok(())
    }
}
