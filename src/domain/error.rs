//! Ledger Error Types
//!
//! The error taxonomy surfaced by the transaction engine.

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

/// Errors returned by the transaction engine.
///
/// Every variant raised after a unit of work began is returned only after
/// that unit of work was rolled back.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Amount out of range, or a credit past the balance ceiling
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Target user has not been provisioned
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// Provisioning a user id that already exists
    #[error("User already exists: {0}")]
    UserAlreadyExists(Uuid),

    /// Idempotency key or transaction id already recorded
    #[error("Transaction already exists for idempotency key {idempotency_key}")]
    TransactionAlreadyExists { idempotency_key: Uuid },

    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    /// Operation deadline elapsed before commit
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Underlying store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// Check if this is a client error (caller's fault or failed precondition)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransaction(_)
                | Self::UserNotFound(_)
                | Self::UserAlreadyExists(_)
                | Self::TransactionAlreadyExists { .. }
                | Self::TransactionNotFound(_)
        )
    }

    /// Check if this is a uniqueness conflict
    pub fn is_conflict_error(&self) -> bool {
        matches!(
            self,
            Self::UserAlreadyExists(_) | Self::TransactionAlreadyExists { .. }
        )
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        Self::Store(StoreError::Database(err))
    }
}

impl From<super::AmountError> for LedgerError {
    fn from(err: super::AmountError) -> Self {
        Self::InvalidTransaction(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AmountError;
    use rust_decimal::Decimal;

    #[test]
    fn test_invalid_transaction_from_amount_error() {
        let err: LedgerError = AmountError::NotPositive(Decimal::ZERO).into();

        assert!(matches!(err, LedgerError::InvalidTransaction(_)));
        assert!(err.is_client_error());
        assert!(!err.is_conflict_error());
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn test_already_exists_is_conflict() {
        let key = Uuid::new_v4();
        let err = LedgerError::TransactionAlreadyExists { idempotency_key: key };

        assert!(err.is_client_error());
        assert!(err.is_conflict_error());
        assert!(err.to_string().contains(&key.to_string()));
    }

    #[test]
    fn test_server_side_errors() {
        let timeout = LedgerError::Timeout(Duration::from_millis(50));
        assert!(!timeout.is_client_error());

        let store = LedgerError::from(sqlx::Error::PoolTimedOut);
        assert!(!store.is_client_error());
        assert!(!store.is_conflict_error());
    }

    #[test]
    fn test_unexpected_uniqueness_conflict_keeps_store_source() {
        let err: LedgerError = StoreError::UniqueViolation {
            constraint: "users_pkey".to_string(),
        }
        .into();

        assert!(matches!(
            err,
            LedgerError::Store(StoreError::UniqueViolation { ref constraint }) if constraint == "users_pkey"
        ));
        assert!(!err.is_client_error());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_balance_overflow_is_invalid_transaction() {
        let err: LedgerError = AmountError::BalanceOverflow.into();
        assert!(matches!(err, LedgerError::InvalidTransaction(_)));
        assert!(err.is_client_error());
    }
}
