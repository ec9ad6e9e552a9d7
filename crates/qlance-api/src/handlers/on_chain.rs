use axum::extract::{Json, Path, State, rejection::JsonRejection};
use qubic_client::codec::ProcedureCall;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::{
    ApiResponse, OnChainActionRequest, OnChainResult, PostOnChainRequest, parse_amount,
    parse_job_id,
};

type OnChainResponse = Result<Json<ApiResponse<OnChainResult>>, ApiError>;

pub async fn post_job(
    State(state): State<AppState>,
    payload: Result<Json<PostOnChainRequest>, JsonRejection>,
) -> OnChainResponse {
    let Json(request) = payload?;
    let (Some(seed), Some(wallet), Some(price)) = (
        non_empty(request.seed),
        non_empty(request.wallet_address),
        request.price_in_qubic.filter(|v| !v.is_null()),
    ) else {
        return Err(ApiError::BadRequest(
            "Missing required fields: seed, walletAddress, priceInQubic".to_string(),
        ));
    };
    let price = parse_amount(&price, "priceInQubic")?;

    schedule(
        &state,
        &seed,
        &wallet,
        ProcedureCall::post_job(price),
        "Job posted to contract",
    )
    .await
}

pub async fn claim_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<OnChainActionRequest>, JsonRejection>,
) -> OnChainResponse {
    let (seed, wallet, job_id) = action_inputs(&id, payload)?;
    schedule(
        &state,
        &seed,
        &wallet,
        ProcedureCall::claim_job(job_id),
        "Job claimed on contract",
    )
    .await
}

pub async fn submit_work(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<OnChainActionRequest>, JsonRejection>,
) -> OnChainResponse {
    let (seed, wallet, job_id) = action_inputs(&id, payload)?;
    schedule(
        &state,
        &seed,
        &wallet,
        ProcedureCall::submit_work(job_id),
        "Work submitted on contract",
    )
    .await
}

pub async fn approve_work(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<OnChainActionRequest>, JsonRejection>,
) -> OnChainResponse {
    let (seed, wallet, job_id) = action_inputs(&id, payload)?;
    schedule(
        &state,
        &seed,
        &wallet,
        ProcedureCall::approve_work(job_id),
        "Work approved on contract",
    )
    .await
}

pub async fn reject_work(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<OnChainActionRequest>, JsonRejection>,
) -> OnChainResponse {
    let (seed, wallet, job_id) = action_inputs(&id, payload)?;
    schedule(
        &state,
        &seed,
        &wallet,
        ProcedureCall::reject_work(job_id),
        "Work rejected on contract",
    )
    .await
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn action_inputs(
    id: &str,
    payload: Result<Json<OnChainActionRequest>, JsonRejection>,
) -> Result<(String, String, u64), ApiError> {
    let Json(request) = payload?;
    let (Some(seed), Some(wallet)) = (non_empty(request.seed), non_empty(request.wallet_address))
    else {
        return Err(ApiError::BadRequest(
            "Missing required fields: seed, walletAddress".to_string(),
        ));
    };
    Ok((seed, wallet, parse_job_id(id)?))
}

async fn schedule(
    state: &AppState,
    seed: &str,
    wallet: &str,
    call: ProcedureCall,
    message: &'static str,
) -> OnChainResponse {
    let scheduled = state
        .scheduler
        .schedule_with_retry(seed, wallet, call, state.config.retry)
        .await?;

    info!(
        "{} broadcast as {} for tick {}",
        scheduled.procedure, scheduled.receipt.transaction_id, scheduled.target_tick
    );

    Ok(Json(ApiResponse::ok(OnChainResult {
        message,
        transaction_id: scheduled.receipt.transaction_id,
        target_tick: scheduled.target_tick,
        current_tick: scheduled.current_tick,
        details: scheduled.receipt.details,
    })))
}
