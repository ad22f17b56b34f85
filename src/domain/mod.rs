//! Domain module
//!
//! Core ledger types and the error taxonomy.

pub mod amount;
pub mod error;
pub mod pagination;
pub mod transaction;

pub use amount::{Amount, AmountError};
pub use error::LedgerError;
pub use pagination::PageRequest;
pub use transaction::{NewTransaction, Transaction, User};
