//! Ledger store errors

use thiserror::Error;

/// Errors from a ledger backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt ledger value in {column}: {value}")]
    Corrupt { column: &'static str, value: String },

    #[error("{field} out of range for storage: {value}")]
    OutOfRange { field: &'static str, value: u64 },

    #[error("Aggregate of load amounts overflowed for customer {customer_id}")]
    Overflow { customer_id: u64 },

    #[error("Ledger backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn corrupt(column: &'static str, value: impl Into<String>) -> Self {
        Self::Corrupt {
            column,
            value: value.into(),
        }
    }
}

/// Result type for ledger operations
pub type StoreResult<T> = Result<T, StoreError>;
