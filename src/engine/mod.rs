//! Engine module
//!
//! The transaction engine: validation, atomic application, idempotency and
//! history reads on top of the store adapters.

mod transaction_engine;

pub use transaction_engine::{EngineConfig, TransactionEngine, DEFAULT_OPERATION_TIMEOUT};
