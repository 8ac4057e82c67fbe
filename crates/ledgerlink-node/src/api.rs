//! # Read-only HTTP API
//!
//! Builds the axum router that exposes the chain. All handlers share the
//! chain through axum's `State` extractor and never write to it.
//!
//! ## Endpoints
//!
//! | Method | Path            | Description                                |
//! |--------|-----------------|--------------------------------------------|
//! | GET    | `/health`       | Liveness check                             |
//! | GET    | `/blocks/all`   | Every block in chain order                 |
//! | GET    | `/block/:hash`  | One block by hex digest                    |
//! | GET    | `/chain/verify` | Recompute digests and links from storage   |

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use ledgerlink::store::{SqliteStore, Store};
use ledgerlink::{BlockHash, Chain, ChainError};

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub chain: Arc<Chain<SqliteStore>>,
}

/// Builds the router with all API routes, CORS and request tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/blocks/all", get(all_blocks_handler))
        .route("/block/:hash", get(block_by_hash_handler))
        .route("/chain/verify", get(verify_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Error body for every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response payload for `GET /chain/verify`.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
    /// Number of blocks in the chain.
    pub length: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation: Option<ViolationInfo>,
}

/// The first violation found by verification.
#[derive(Debug, Serialize, Deserialize)]
pub struct ViolationInfo {
    /// Position of the offending block.
    pub index: u64,
    /// One of `genesis_mismatch`, `index_gap`, `broken_link`, `hash_mismatch`.
    pub kind: String,
    pub message: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

fn storage_error(error: &ChainError) -> Response {
    tracing::error!(error = %error, "could not read chain from storage");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Storage error: {}", error),
    )
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health`
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `GET /blocks/all`
async fn all_blocks_handler(State(state): State<AppState>) -> Response {
    match state.chain.all().await {
        Ok(blocks) => Json(blocks).into_response(),
        Err(e) => storage_error(&e),
    }
}

/// `GET /block/:hash`
///
/// A path that is not a 64-character hex digest cannot name a block and is
/// reported as not found.
async fn block_by_hash_handler(
    Path(hash): Path<String>,
    State(state): State<AppState>,
) -> Response {
    let Ok(parsed) = BlockHash::from_str(&hash) else {
        return error_response(StatusCode::NOT_FOUND, format!("Block not found: {}", hash));
    };

    match state.chain.get_by_hash(&parsed).await {
        Ok(Some(block)) => (StatusCode::OK, Json(block)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, format!("Block not found: {}", hash)),
        Err(e) => storage_error(&e),
    }
}

/// `GET /chain/verify`
///
/// `length` is the number of stored blocks in both outcomes.
async fn verify_handler(State(state): State<AppState>) -> Response {
    match state.chain.verify().await {
        Ok(length) => Json(VerifyResponse {
            valid: true,
            length,
            violation: None,
        })
        .into_response(),
        Err(ChainError::Validation(violation)) => {
            let length = match state.chain.store().block_count().await {
                Ok(length) => length,
                Err(e) => return storage_error(&ChainError::from(e)),
            };
            Json(VerifyResponse {
                valid: false,
                length,
                violation: Some(ViolationInfo {
                    index: violation.position(),
                    kind: violation.kind().as_str().to_string(),
                    message: violation.to_string(),
                }),
            })
            .into_response()
        }
        Err(e) => storage_error(&e),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
