//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Amount, AmountError, NewTransaction, PageRequest, Transaction};
use crate::engine::TransactionEngine;
use crate::error::{AppError, AppResult};

pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Shared router state
#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: TransactionEngine,
}

impl AppState {
    pub fn new(engine: TransactionEngine) -> Self {
        Self { engine }
    }
}

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub balance: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApplyTransactionRequest {
    /// Amount as a string for exact decimal parsing
    pub amount: String,
    #[serde(default)]
    pub transaction_id: Option<Uuid>,
    #[serde(default)]
    pub idempotency_key: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub idempotency_key: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            user_id: t.user_id,
            amount: t.amount.normalize(),
            idempotency_key: t.idempotency_key,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub user_id: Uuid,
    pub balance: Decimal,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub page_size: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub user_id: Uuid,
    pub page: i64,
    pub page_size: i64,
    pub transactions: Vec<TransactionResponse>,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/:user_id/balance", get(get_user_balance))
        .route("/users/:user_id/history", get(get_user_history))
        .route("/users/:user_id/transactions", post(apply_transaction))
        // Legacy path kept for existing clients
        .route("/users/:user_id/add", post(apply_transaction))
        .route("/transactions/:transaction_id", get(get_transaction))
        .route(
            "/transactions/idempotency/:idempotency_key",
            get(get_transaction_by_idempotency_key),
        )
}

// =========================================================================
// POST /users
// =========================================================================

/// Provision a user with a zero balance
async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user_id = request.user_id.unwrap_or_else(Uuid::new_v4);
    let user = state.engine.create_user(user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            user_id: user.id,
            balance: user.balance,
        }),
    ))
}

// =========================================================================
// GET /users/:user_id/balance
// =========================================================================

async fn get_user_balance(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<BalanceResponse>> {
    let balance = state.engine.get_balance(user_id).await?;

    Ok(Json(BalanceResponse {
        user_id,
        balance: balance.normalize(),
    }))
}

// =========================================================================
// GET /users/:user_id/history
// =========================================================================

async fn get_user_history(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<HistoryResponse>> {
    let page = PageRequest::new(query.page.unwrap_or(0), query.page_size.unwrap_or(0));

    let transactions = state
        .engine
        .get_history(user_id, page.page, page.page_size)
        .await?;

    Ok(Json(HistoryResponse {
        user_id,
        page: page.page,
        page_size: page.page_size,
        transactions: transactions.into_iter().map(Into::into).collect(),
    }))
}

// =========================================================================
// POST /users/:user_id/transactions
// =========================================================================

async fn apply_transaction(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<ApplyTransactionRequest>,
) -> AppResult<(StatusCode, Json<TransactionResponse>)> {
    let idempotency_key = resolve_idempotency_key(&headers, request.idempotency_key)?;

    let amount: Amount = request.amount.parse().map_err(|err| match err {
        AmountError::ParseError(msg) => AppError::InvalidRequest(format!("Invalid amount: {}", msg)),
        other => AppError::Ledger(other.into()),
    })?;

    let mut input = NewTransaction::new(user_id, amount.value(), idempotency_key);
    if let Some(transaction_id) = request.transaction_id {
        input = input.with_transaction_id(transaction_id);
    }

    let transaction = state.engine.apply_transaction(input).await?;

    Ok((StatusCode::CREATED, Json(transaction.into())))
}

/// The idempotency key comes from the header, the body, or both as long as
/// they agree
fn resolve_idempotency_key(headers: &HeaderMap, from_body: Option<Uuid>) -> AppResult<Uuid> {
    let from_header = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .map(|value| {
            value
                .to_str()
                .ok()
                .and_then(|s| Uuid::parse_str(s.trim()).ok())
                .ok_or_else(|| {
                    AppError::InvalidRequest(format!("Invalid {} header", IDEMPOTENCY_KEY_HEADER))
                })
        })
        .transpose()?;

    match (from_header, from_body) {
        (Some(header), Some(body)) if header != body => Err(AppError::InvalidRequest(
            "Idempotency key in header and body differ".to_string(),
        )),
        (Some(key), _) | (None, Some(key)) => Ok(key),
        (None, None) => Err(AppError::MissingHeader(IDEMPOTENCY_KEY_HEADER.to_string())),
    }
}

// =========================================================================
// GET /transactions/...
// =========================================================================

async fn get_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
) -> AppResult<Json<TransactionResponse>> {
    let transaction = state.engine.get_transaction(transaction_id).await?;
    Ok(Json(transaction.into()))
}

async fn get_transaction_by_idempotency_key(
    State(state): State<AppState>,
    Path(idempotency_key): Path<Uuid>,
) -> AppResult<Json<TransactionResponse>> {
    let transaction = state.engine.find_by_idempotency_key(idempotency_key).await?;
    Ok(Json(transaction.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idempotency_key_from_header() {
        let key = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(IDEMPOTENCY_KEY_HEADER, key.to_string().parse().unwrap());

        assert_eq!(resolve_idempotency_key(&headers, None).unwrap(), key);
        assert_eq!(resolve_idempotency_key(&headers, Some(key)).unwrap(), key);
    }

    #[test]
    fn test_idempotency_key_from_body() {
        let key = Uuid::new_v4();
        assert_eq!(resolve_idempotency_key(&HeaderMap::new(), Some(key)).unwrap(), key);
    }

    #[test]
    fn test_idempotency_key_missing() {
        let result = resolve_idempotency_key(&HeaderMap::new(), None);
        assert!(matches!(result, Err(AppError::MissingHeader(_))));
    }

    #[test]
    fn test_idempotency_key_invalid_or_mismatched() {
        let mut headers = HeaderMap::new();
        headers.insert(IDEMPOTENCY_KEY_HEADER, "not-a-uuid".parse().unwrap());
        assert!(matches!(
            resolve_idempotency_key(&headers, None),
            Err(AppError::InvalidRequest(_))
        ));

        let mut headers = HeaderMap::new();
        headers.insert(IDEMPOTENCY_KEY_HEADER, Uuid::new_v4().to_string().parse().unwrap());
        assert!(matches!(
            resolve_idempotency_key(&headers, Some(Uuid::new_v4())),
            Err(AppError::InvalidRequest(_))
        ));
    }
}
