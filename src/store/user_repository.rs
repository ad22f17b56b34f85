//! User Repository
//!
//! The balance store: one row per user holding the current balance.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::User;

use super::StoreError;

/// Repository over the `users` table
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lock the user's row for the rest of the unit of work and return its
    /// balance. `None` if the user does not exist.
    ///
    /// Concurrent callers for the same user block here until the holder
    /// commits or rolls back.
    pub async fn lock_and_get_balance(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> Result<Option<Decimal>, StoreError> {
        let balance: Option<Decimal> =
            sqlx::query_scalar("SELECT balance FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut **tx)
                .await?;

        Ok(balance)
    }

    /// Add `delta` to the user's balance inside the unit of work
    pub async fn increment_balance(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        delta: Decimal,
    ) -> Result<Decimal, StoreError> {
        let balance: Decimal = sqlx::query_scalar(
            r#"
            UPDATE users
            SET balance = balance + $2, updated_at = NOW()
            WHERE id = $1
            RETURNING balance
            "#,
        )
        .bind(user_id)
        .bind(delta)
        .fetch_one(&mut **tx)
        .await?;

        Ok(balance)
    }

    /// Check whether the user exists (no locking)
    pub async fn exists(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Last committed state of a user (no locking)
    pub async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT id, balance FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Provision a user with a zero balance.
    ///
    /// A duplicate id comes back as `StoreError::UniqueViolation`.
    pub async fn create(&self, user_id: Uuid) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, balance)
            VALUES ($1, 0)
            RETURNING id, balance
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::classify)
    }
}
