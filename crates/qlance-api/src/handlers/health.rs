use axum::{
    extract::{Json, State},
    http::{StatusCode, Uri},
};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::info;

use crate::state::AppState;

pub const SERVICE_NAME: &str = "Qlance Backend";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Qlance Backend API - Qubic Micro-Freelance Marketplace",
        "version": VERSION,
        "endpoints": {
            "health": "/health",
            "info": "/api/info",
            "jobs": "/api/jobs",
            "contract": "/api/contract/jobs-count",
            "wallet": "/api/wallet",
        },
    }))
}

pub async fn api_info(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "project": "Qlance - Qubic Micro-Freelance Marketplace",
        "version": VERSION,
        "environment": state.config.environment,
        "blockchain": {
            "network": "Qubic Testnet",
            "rpcUrl": state.chain.rpc_url(),
            "contractAddress": state.config.contract.address,
            "contractIndex": state.config.contract.index,
        },
    }))
}

/// Liveness plus a reachability probe of the ledger RPC. Always 200.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let connected = state.chain.probe().await;
    info!("Health check, RPC connected: {}", connected);

    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "service": SERVICE_NAME,
        "version": VERSION,
        "environment": state.config.environment,
        "qubic": {
            "rpcUrl": state.chain.rpc_url(),
            "connected": connected,
        },
    }))
}

pub async fn not_found(uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Route not found",
            "path": uri.path(),
        })),
    )
}
