//! Store Errors
//!
//! Error types for the Postgres adapters.

/// Errors that can occur in the store adapters
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique or primary key constraint rejected the write
    #[error("Uniqueness conflict on constraint {constraint}")]
    UniqueViolation { constraint: String },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Classify a write error, separating uniqueness conflicts (SQLSTATE 23505)
    /// from every other failure
    pub fn classify(err: sqlx::Error) -> Self {
        let constraint = err
            .as_database_error()
            .filter(|db_err| db_err.is_unique_violation())
            .map(|db_err| db_err.constraint().unwrap_or("unknown").to_string());

        match constraint {
            Some(constraint) => StoreError::UniqueViolation { constraint },
            None => StoreError::Database(err),
        }
    }

    /// Check if this error is a uniqueness conflict
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation { .. })
    }
}
