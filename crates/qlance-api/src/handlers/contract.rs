use axum::extract::{Json, Path, State};
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::{ApiResponse, parse_job_id};

pub async fn jobs_count(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let count = state
        .chain
        .get_jobs_count(state.config.contract.index)
        .await?;
    Ok(Json(ApiResponse::ok(json!({ "jobsCount": count }))))
}

/// Reads one job straight from contract state.
///
/// Ids are assigned from 0, so job 0 is a real job. The contract answers an
/// id past the end with a zeroed record; `exists` compares against the
/// current job count to tell the two apart.
pub async fn job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let job_id = parse_job_id(&id)?;
    let contract_index = state.config.contract.index;
    let job = state.chain.get_job(contract_index, job_id).await?;
    let count = state.chain.get_jobs_count(contract_index).await?;

    Ok(Json(ApiResponse::ok(json!({
        "jobId": job.job_id,
        "price": job.price.to_string(),
        "status": job.status.as_str(),
        "exists": job_id < count,
    }))))
}

pub async fn transaction_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let status = state.chain.get_transaction_status(&id).await?;
    Ok(Json(ApiResponse::ok(json!({
        "transactionId": status.transaction_id,
        "details": status.details,
    }))))
}
