//! REST API handlers for ledger operations

use crate::core::{Block, Ledger, LedgerError, Transaction};
use crate::mining::{CancelFlag, MiningError};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub ledger: Arc<Ledger>,
    /// Trips on shutdown so an in-flight proof-of-work search aborts.
    pub shutdown: CancelFlag,
}

// ============================================================================
// Request / Response Types
// ============================================================================

/// Body of `POST /transactions/new`. All three fields are required; the
/// check happens here so a missing field is a client error, not a ledger
/// error.
#[derive(Deserialize)]
pub struct NewTransactionRequest {
    pub sender: Option<String>,
    pub receiver: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct ChainResponse {
    pub length: usize,
    pub chain: Vec<Block>,
}

#[derive(Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub blocks_checked: usize,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiError {
    pub error: String,
}

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            error: message.into(),
        }),
    )
}

/// Pull the required fields out of a transaction request, naming the first
/// missing one.
fn require_fields(req: NewTransactionRequest) -> Result<Transaction, &'static str> {
    let sender = req.sender.ok_or("sender")?;
    let receiver = req.receiver.ok_or("receiver")?;
    let amount = req.amount.ok_or("amount")?;
    Ok(Transaction::new(sender, receiver, amount))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /transactions/new - Buffer a transaction for the next block
pub async fn new_transaction(
    State(state): State<ApiState>,
    Json(req): Json<NewTransactionRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), (StatusCode, Json<ApiError>)> {
    let tx = require_fields(req).map_err(|field| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("missing required field: {}", field),
        )
    })?;

    state.ledger.add_transaction(tx.sender, tx.receiver, tx.amount);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Transaction added".to_string(),
        }),
    ))
}

/// POST /mine - Mine and commit the next block
pub async fn mine_block(
    State(state): State<ApiState>,
) -> Result<Json<Block>, (StatusCode, Json<ApiError>)> {
    let ledger = Arc::clone(&state.ledger);
    let cancel = state.shutdown.clone();

    // The search is CPU-bound and unbounded; keep it off the async runtime.
    let result = tokio::task::spawn_blocking(move || ledger.mine_block(&cancel))
        .await
        .map_err(|e| {
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("mining task failed: {}", e),
            )
        })?;

    match result {
        Ok(block) => Ok(Json(block)),
        Err(LedgerError::MiningInProgress) => Err(api_error(
            StatusCode::CONFLICT,
            "mining already in progress",
        )),
        Err(LedgerError::Mining(MiningError::Cancelled)) => Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "mining cancelled",
        )),
        Err(LedgerError::Mining(MiningError::SearchExhausted)) => Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "proof-of-work search exhausted",
        )),
        Err(e) => Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("mining failed: {}", e),
        )),
    }
}

/// GET /chain - The full committed chain (never pending transactions)
pub async fn get_chain(State(state): State<ApiState>) -> Json<ChainResponse> {
    let chain = state.ledger.current_chain();
    Json(ChainResponse {
        length: chain.len(),
        chain,
    })
}

/// GET /chain/validate - On-demand integrity audit
pub async fn validate_chain(State(state): State<ApiState>) -> Json<ValidationResponse> {
    let blocks_checked = state.ledger.height() as usize;
    match state.ledger.validate() {
        Ok(()) => Json(ValidationResponse {
            valid: true,
            blocks_checked,
            message: format!("ledger is valid ({} blocks verified)", blocks_checked),
        }),
        Err(e) => Json(ValidationResponse {
            valid: false,
            blocks_checked,
            message: e.to_string(),
        }),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_fields_complete() {
        let req = NewTransactionRequest {
            sender: Some("A".to_string()),
            receiver: Some("B".to_string()),
            amount: Some(10.0),
        };
        let tx = require_fields(req).unwrap();
        assert_eq!(tx, Transaction::new("A", "B", 10.0));
    }

    #[test]
    fn test_require_fields_names_the_missing_one() {
        let req = NewTransactionRequest {
            sender: Some("A".to_string()),
            receiver: None,
            amount: Some(10.0),
        };
        assert_eq!(require_fields(req), Err("receiver"));

        let req = NewTransactionRequest {
            sender: Some("A".to_string()),
            receiver: Some("B".to_string()),
            amount: None,
        };
        assert_eq!(require_fields(req), Err("amount"));
    }
}
