//! Transaction Repository
//!
//! The append-only transaction log. Rows are inserted inside the caller's
//! unit of work and never updated or deleted.

use sqlx::{PgPool, Postgres, Transaction as PgTransaction};
use uuid::Uuid;

use crate::domain::{NewTransaction, Transaction};

use super::StoreError;

/// Repository over the `transactions` table
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    /// Create a new TransactionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check for an already recorded idempotency key, seeing everything
    /// committed before this statement started
    pub async fn exists_by_idempotency_key(
        &self,
        tx: &mut PgTransaction<'_, Postgres>,
        idempotency_key: Uuid,
    ) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM transactions WHERE idempotency_key = $1)",
        )
        .bind(idempotency_key)
        .fetch_one(&mut **tx)
        .await?;

        Ok(exists)
    }

    /// Append a transaction. The creation timestamp is taken from the
    /// database clock at write time.
    ///
    /// A duplicate id or idempotency key comes back as
    /// `StoreError::UniqueViolation`; the unit of work is then unusable and
    /// must be rolled back.
    pub async fn insert(
        &self,
        tx: &mut PgTransaction<'_, Postgres>,
        transaction: &NewTransaction,
    ) -> Result<Transaction, StoreError> {
        sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (id, user_id, amount, idempotency_key, created_at)
            VALUES ($1, $2, $3, $4, clock_timestamp())
            RETURNING id, user_id, amount, idempotency_key, created_at
            "#,
        )
        .bind(transaction.transaction_id)
        .bind(transaction.user_id)
        .bind(transaction.amount)
        .bind(transaction.idempotency_key)
        .fetch_one(&mut **tx)
        .await
        .map_err(StoreError::classify)
    }

    /// Page through a user's transactions, newest first
    pub async fn list_by_user(
        &self,
        user_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Transaction>, StoreError> {
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, user_id, amount, idempotency_key, created_at
            FROM transactions
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    pub async fn find_by_id(&self, transaction_id: Uuid) -> Result<Option<Transaction>, StoreError> {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, user_id, amount, idempotency_key, created_at
            FROM transactions
            WHERE id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }

    pub async fn find_by_idempotency_key(
        &self,
        idempotency_key: Uuid,
    ) -> Result<Option<Transaction>, StoreError> {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, user_id, amount, idempotency_key, created_at
            FROM transactions
            WHERE idempotency_key = $1
            "#,
        )
        .bind(idempotency_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }
}
