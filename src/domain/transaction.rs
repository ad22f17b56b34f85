//! Ledger records
//!
//! Users own a balance; transactions are the append-only movements that
//! produce it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Amount;

/// A provisioned user and its last committed balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub balance: Decimal,
}

/// A transaction as recorded in the log.
///
/// Immutable once stored. `created_at` is assigned by the store when the
/// row is written, never by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub idempotency_key: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A proposed transaction, the input of the apply path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub transaction_id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub idempotency_key: Uuid,
}

impl NewTransaction {
    /// Create a proposal with a freshly generated transaction id
    pub fn new(user_id: Uuid, amount: Decimal, idempotency_key: Uuid) -> Self {
        Self {
            transaction_id: Uuid::new_v4(),
            user_id,
            amount,
            idempotency_key,
        }
    }

    pub fn with_transaction_id(mut self, transaction_id: Uuid) -> Self {
        self.transaction_id = transaction_id;
        self
    }

    /// Validate the proposed amount
    pub fn validated_amount(&self) -> Result<Amount, super::AmountError> {
        Amount::new(self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_transaction_generates_id() {
        let user_id = Uuid::new_v4();
        let key = Uuid::new_v4();
        let a = NewTransaction::new(user_id, dec!(10), key);
        let b = NewTransaction::new(user_id, dec!(10), key);

        assert_ne!(a.transaction_id, b.transaction_id);
        assert_eq!(a.idempotency_key, b.idempotency_key);
    }

    #[test]
    fn test_with_transaction_id() {
        let id = Uuid::new_v4();
        let tx = NewTransaction::new(Uuid::new_v4(), dec!(1), Uuid::new_v4())
            .with_transaction_id(id);
        assert_eq!(tx.transaction_id, id);
    }

    #[test]
    fn test_validated_amount() {
        let ok = NewTransaction::new(Uuid::new_v4(), dec!(0.01), Uuid::new_v4());
        assert!(ok.validated_amount().is_ok());

        let zero = NewTransaction::new(Uuid::new_v4(), dec!(0), Uuid::new_v4());
        assert!(zero.validated_amount().is_err());
    }
}
