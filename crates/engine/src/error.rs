//! Evaluation errors

use thiserror::Error;
use velocity_core::Decision;
use velocity_ledger::StoreError;

/// Errors that abort an evaluation.
///
/// A declined attempt is not an error; only the ledger failing or the
/// caller's deadline passing is.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Ledger store failed: {0}")]
    Store(#[from] StoreError),

    #[error("Evaluation cancelled after {} decisions", .decisions.len())]
    Cancelled { decisions: Vec<Decision> },
}

impl EvalError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Decisions produced before a cancellation, if any
    pub fn partial_decisions(&self) -> &[Decision] {
        match self {
            Self::Cancelled { decisions } => decisions.as_slice(),
            Self::Store(_) => &[],
        }
    }
}

/// Result type for evaluation
pub type EvalResult<T> = Result<T, EvalError>;
