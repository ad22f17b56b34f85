//! Transaction Engine
//!
//! Validates proposed transactions and applies them against the per-user
//! balance in a single unit of work. Serves balance and history reads.

use std::future::Future;
use std::time::Duration;

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction as PgTransaction};
use uuid::Uuid;

use crate::domain::{Amount, LedgerError, NewTransaction, PageRequest, Transaction, User};
use crate::store::{StoreError, TransactionRepository, UserRepository};

/// Default deadline for a single engine call
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Engine settings
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Deadline for each call; an unfinished unit of work is rolled back
    pub operation_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

/// The transaction engine.
///
/// Holds no per-user state. Same-user appliers serialize on the balance row
/// lock inside Postgres; appliers for different users never contend.
#[derive(Debug, Clone)]
pub struct TransactionEngine {
    pool: PgPool,
    users: UserRepository,
    transactions: TransactionRepository,
    config: EngineConfig,
}

impl TransactionEngine {
    pub fn new(pool: PgPool, config: EngineConfig) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            transactions: TransactionRepository::new(pool.clone()),
            pool,
            config,
        }
    }

    // =========================================================================
    // Apply
    // =========================================================================

    /// Apply a transaction to its user's balance.
    ///
    /// An amount outside the accepted range fails with `InvalidTransaction`
    /// before any store access. So does a credit that would push the balance
    /// past what the store holds, after the row lock is taken. Otherwise the log row and the balance increment commit
    /// together or not at all. A repeated idempotency key fails with
    /// `TransactionAlreadyExists` and leaves the balance untouched.
    pub async fn apply_transaction(&self, input: NewTransaction) -> Result<Transaction, LedgerError> {
        let amount = input.validated_amount()?;

        self.with_deadline(self.apply_in_unit_of_work(&input, amount))
            .await
    }

    async fn apply_in_unit_of_work(
        &self,
        input: &NewTransaction,
        amount: Amount,
    ) -> Result<Transaction, LedgerError> {
        let mut tx = self.pool.begin().await?;

        match self.apply_locked(&mut tx, input, amount).await {
            Ok(transaction) => {
                tx.commit().await?;

                tracing::info!(
                    transaction_id = %transaction.id,
                    user_id = %transaction.user_id,
                    amount = %transaction.amount,
                    idempotency_key = %transaction.idempotency_key,
                    "Transaction applied"
                );

                Ok(transaction)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(
                        user_id = %input.user_id,
                        error = %rollback_err,
                        "Rollback failed, connection will be discarded"
                    );
                }

                tracing::debug!(
                    user_id = %input.user_id,
                    idempotency_key = %input.idempotency_key,
                    error = %err,
                    "Transaction rolled back"
                );

                Err(err)
            }
        }
    }

    /// Steps run while holding the user's row lock
    async fn apply_locked(
        &self,
        tx: &mut PgTransaction<'_, Postgres>,
        input: &NewTransaction,
        amount: Amount,
    ) -> Result<Transaction, LedgerError> {
        let previous_balance = self
            .users
            .lock_and_get_balance(tx, input.user_id)
            .await?
            .ok_or(LedgerError::UserNotFound(input.user_id))?;

        amount.credit(previous_balance).map_err(|err| {
            tracing::warn!(
                user_id = %input.user_id,
                balance = %previous_balance,
                amount = %amount,
                "Credit would overflow the balance"
            );
            LedgerError::from(err)
        })?;

        // The row lock makes this check exact for same-user retries; the
        // unique constraint below covers a key reused across users.
        if self
            .transactions
            .exists_by_idempotency_key(tx, input.idempotency_key)
            .await?
        {
            tracing::warn!(
                user_id = %input.user_id,
                idempotency_key = %input.idempotency_key,
                "Duplicate idempotency key rejected"
            );
            return Err(LedgerError::TransactionAlreadyExists {
                idempotency_key: input.idempotency_key,
            });
        }

        let transaction = self
            .transactions
            .insert(tx, input)
            .await
            .map_err(|err| match err {
                StoreError::UniqueViolation { constraint } => {
                    tracing::warn!(
                        user_id = %input.user_id,
                        idempotency_key = %input.idempotency_key,
                        constraint = %constraint,
                        "Uniqueness conflict on insert"
                    );
                    LedgerError::TransactionAlreadyExists {
                        idempotency_key: input.idempotency_key,
                    }
                }
                other => other.into(),
            })?;

        let new_balance = self
            .users
            .increment_balance(tx, input.user_id, amount.value())
            .await?;

        tracing::debug!(
            user_id = %input.user_id,
            previous_balance = %previous_balance,
            new_balance = %new_balance,
            "Balance incremented"
        );

        Ok(transaction)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Last committed balance of a user
    pub async fn get_balance(&self, user_id: Uuid) -> Result<Decimal, LedgerError> {
        self.with_deadline(async {
            let user = self
                .users
                .find_by_id(user_id)
                .await?
                .ok_or(LedgerError::UserNotFound(user_id))?;

            Ok::<_, LedgerError>(user.balance)
        })
        .await
    }

    /// A page of the user's transactions, newest first.
    ///
    /// Non-positive `page`/`page_size` fall back to 1 and 10. A page past the
    /// end of the data is an empty list.
    pub async fn get_history(
        &self,
        user_id: Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let page = PageRequest::new(page, page_size);

        self.with_deadline(async {
            if !self.users.exists(user_id).await? {
                return Err(LedgerError::UserNotFound(user_id));
            }

            let transactions = self
                .transactions
                .list_by_user(user_id, page.offset(), page.limit())
                .await?;

            Ok::<_, LedgerError>(transactions)
        })
        .await
    }

    pub async fn get_transaction(&self, transaction_id: Uuid) -> Result<Transaction, LedgerError> {
        self.with_deadline(async {
            self.transactions
                .find_by_id(transaction_id)
                .await?
                .ok_or(LedgerError::TransactionNotFound(transaction_id))
        })
        .await
    }

    /// Look up the record stored under an idempotency key, e.g. after a
    /// retry was answered with `TransactionAlreadyExists`
    pub async fn find_by_idempotency_key(
        &self,
        idempotency_key: Uuid,
    ) -> Result<Transaction, LedgerError> {
        self.with_deadline(async {
            self.transactions
                .find_by_idempotency_key(idempotency_key)
                .await?
                .ok_or(LedgerError::TransactionNotFound(idempotency_key))
        })
        .await
    }

    // =========================================================================
    // Provisioning
    // =========================================================================

    /// Provision a user with a zero balance
    pub async fn create_user(&self, user_id: Uuid) -> Result<User, LedgerError> {
        self.with_deadline(async {
            let user = self.users.create(user_id).await.map_err(|err| match err {
                StoreError::UniqueViolation { .. } => LedgerError::UserAlreadyExists(user_id),
                other => other.into(),
            })?;

            tracing::info!(user_id = %user.id, "User provisioned");

            Ok::<_, LedgerError>(user)
        })
        .await
    }

    /// Run `fut` under the configured deadline. On expiry the future is
    /// dropped, which rolls back any open unit of work.
    async fn with_deadline<T, F>(&self, fut: F) -> Result<T, LedgerError>
    where
        F: Future<Output = Result<T, LedgerError>>,
    {
        let limit = self.config.operation_timeout;

        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout_ms = %limit.as_millis(), "Operation deadline exceeded");
                Err(LedgerError::Timeout(limit))
            }
        }
    }
}
