use thiserror::Error;

use super::timeline::YearMonth;

/// Local validation failures of the ledger core, nothing here is retryable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("invalid `{field}`: {reason}")]
    InvalidInput {
        field: &'static str,
        reason: String,
    },
    #[error("inconsistent records for {month}: {reason}")]
    DataInconsistency {
        month: YearMonth,
        reason: String,
    },
}

impl LedgerError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput { field, reason: reason.into() }
    }
}
