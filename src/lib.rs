//! Ledger Service Library
//!
//! Per-user monetary ledger: an engine that applies idempotent transactions
//! atomically against a Postgres-backed balance, plus the HTTP boundary
//! around it.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
mod error;
pub mod store;

pub use config::Config;
pub use domain::{Amount, AmountError, LedgerError, NewTransaction, PageRequest, Transaction, User};
pub use engine::{EngineConfig, TransactionEngine};
pub use error::{AppError, AppResult, ErrorResponse};
