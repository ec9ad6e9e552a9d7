use axum::extract::{Json, Path, State, rejection::JsonRejection};
use qubic_client::identity::is_valid_identity;
use qubic_client::{PublicIdentity, Seed};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::{ApiResponse, ImportWalletRequest};

/// Derives the public identity for a seed and reports its balance. A failed
/// balance lookup does not fail the import; the balance is reported as "0".
pub async fn import_wallet(
    State(state): State<AppState>,
    payload: Result<Json<ImportWalletRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let Json(request) = payload?;
    let seed = request
        .seed
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Seed phrase is required".to_string()))?;
    let seed = Seed::parse(&seed)?;

    let identity = state.identities.derive_identity(&seed).await?;
    let balance = match state.chain.get_balance(identity.as_str()).await {
        Ok(balance) => balance,
        Err(e) => {
            warn!("Could not fetch balance for {}: {}", identity, e);
            0
        }
    };

    info!("Imported wallet {}", identity);
    Ok(Json(ApiResponse::ok(json!({
        "publicKey": identity.as_str(),
        "balance": balance.to_string(),
        "message": "Wallet imported successfully",
    }))))
}

pub async fn balance(
    State(state): State<AppState>,
    Path(public_key): Path<String>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let identity = PublicIdentity::parse(&public_key)?;
    let balance = state.chain.get_balance(identity.as_str()).await?;

    Ok(Json(ApiResponse::ok(json!({
        "publicKey": identity.as_str(),
        "balance": balance.to_string(),
    }))))
}

pub async fn validate_address(Path(address): Path<String>) -> Json<ApiResponse<Value>> {
    let is_valid = is_valid_identity(&address);
    Json(ApiResponse::ok(json!({
        "address": address,
        "isValid": is_valid,
    })))
}
