//! HTTP surface of a node.
use crate::constants::{AUTHORITATIVE_MESSAGE, CHAIN_PATH, MINED_MESSAGE, REPLACED_MESSAGE};
use crate::transport::HttpTransport;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ledger_core::{Block, ChainView, LedgerError, Node, Transaction};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub node: Arc<Node>,
    pub transport: HttpTransport,
}

impl AppState {
    pub fn new(node: Arc<Node>, transport: HttpTransport) -> Self {
        Self { node, transport }
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Deserialize)]
struct TxIn {
    party_a: String,
    party_b: String,
}

#[derive(Serialize)]
struct TxAccepted {
    message: String,
    index: u64,
}

#[derive(Serialize, Deserialize)]
pub struct MineResult {
    pub message: String,
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl From<Block> for MineResult {
    fn from(block: Block) -> Self {
        Self {
            message: MINED_MESSAGE.to_string(),
            index: block.index,
            transactions: block.transactions,
            proof: block.proof,
            previous_hash: block.previous_hash,
        }
    }
}

#[derive(Deserialize)]
struct RegisterIn {
    nodes: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ResolveResult {
    pub message: String,
    pub replaced: bool,
    pub chain: Vec<Block>,
}

/// Error body `{"error": "..."}` with a status mapped from the core error.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let status = match err {
            LedgerError::InvalidAddress { .. } => StatusCode::BAD_REQUEST,
            LedgerError::MiningCancelled => StatusCode::SERVICE_UNAVAILABLE,
            LedgerError::BlockRejected { .. } => StatusCode::CONFLICT,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(Health { status: "ok" }) }))
        .route(CHAIN_PATH, get(full_chain))
        .route("/mine", get(mine))
        .route("/transactions/new", post(new_transaction))
        .route("/transactions/pending", get(pending_transactions))
        .route("/nodes/register", post(register_nodes))
        .route("/nodes/resolve", get(resolve))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn full_chain(State(state): State<AppState>) -> Json<ChainView> {
    Json(state.node.get_chain())
}

async fn new_transaction(
    State(state): State<AppState>,
    Json(tx): Json<TxIn>,
) -> (StatusCode, Json<TxAccepted>) {
    let index = state.node.submit_transaction(tx.party_a, tx.party_b).await;
    (
        StatusCode::CREATED,
        Json(TxAccepted {
            message: format!("Transaction will be added to Block {index}"),
            index,
        }),
    )
}

async fn pending_transactions(State(state): State<AppState>) -> Json<Vec<Transaction>> {
    Json(state.node.pending_transactions().await)
}

async fn mine(State(state): State<AppState>) -> Result<Json<MineResult>, ApiError> {
    let node = Arc::clone(&state.node);
    let block = tokio::task::spawn_blocking(move || node.mine())
        .await
        .map_err(|e| {
            error!(error = %e, "mining task failed");
            ApiError::internal("mining task failed")
        })??;
    Ok(Json(block.into()))
}

async fn register_nodes(
    State(state): State<AppState>,
    Json(body): Json<RegisterIn>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    if body.nodes.is_empty() {
        return Err(ApiError::bad_request("Please supply a valid list of nodes"));
    }
    state.node.register_nodes(&body.nodes)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "New nodes have been added",
            "total_nodes": state.node.peers(),
        })),
    ))
}

async fn resolve(State(state): State<AppState>) -> Json<ResolveResult> {
    let replaced = state.node.resolve_conflicts(&state.transport).await;
    let message = if replaced {
        REPLACED_MESSAGE
    } else {
        AUTHORITATIVE_MESSAGE
    };
    Json(ResolveResult {
        message: message.to_string(),
        replaced,
        chain: state.node.get_chain().chain,
    })
}
