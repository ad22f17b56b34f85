//! Store module
//!
//! Postgres adapters for the balance store and the transaction log.
//! Writes that must be atomic take the caller's `sqlx::Transaction`.

mod error;
mod transaction_repository;
mod user_repository;

pub use error::StoreError;
pub use transaction_repository::TransactionRepository;
pub use user_repository::UserRepository;
