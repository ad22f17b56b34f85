//! Error handling module
//!
//! Boundary error type and its HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::LedgerError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Missing required header: {0}")]
    MissingHeader(String),

    // Engine errors
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, Option<String>) {
        match self {
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::MissingHeader(header) => {
                (StatusCode::BAD_REQUEST, "missing_header", Some(header.clone()))
            }
            AppError::RateLimitExceeded => {
                (StatusCode::TOO_MANY_REQUESTS, "rate_limit_exceeded", None)
            }

            AppError::Ledger(ledger_err) => match ledger_err {
                LedgerError::InvalidTransaction(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_transaction", Some(msg.clone()))
                }
                LedgerError::UserNotFound(id) => {
                    (StatusCode::NOT_FOUND, "user_not_found", Some(id.to_string()))
                }
                LedgerError::TransactionNotFound(id) => {
                    (StatusCode::NOT_FOUND, "transaction_not_found", Some(id.to_string()))
                }
                LedgerError::UserAlreadyExists(id) => {
                    (StatusCode::CONFLICT, "user_already_exists", Some(id.to_string()))
                }
                LedgerError::TransactionAlreadyExists { idempotency_key } => (
                    StatusCode::CONFLICT,
                    "transaction_already_exists",
                    Some(idempotency_key.to_string()),
                ),
                LedgerError::Timeout(_) => {
                    tracing::error!("Engine timeout: {}", ledger_err);
                    (StatusCode::SERVICE_UNAVAILABLE, "timeout", None)
                }
                LedgerError::Store(e) => {
                    tracing::error!("Store error: {:?}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "store_error", None)
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = self.parts();

        // Server-side failures are logged above; do not leak their details
        let error = if status.is_server_error() {
            status
                .canonical_reason()
                .unwrap_or("Internal server error")
                .to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            error,
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
