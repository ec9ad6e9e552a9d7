use axum::{
    extract::{
        Json, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use job_registry::{Job, JobStatus, NewJob};
use qubic_client::PublicIdentity;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::{ApiResponse, ClaimJobRequest, CreateJobRequest, JobListQuery, parse_amount};

pub async fn list_jobs(
    State(state): State<AppState>,
    query: Result<Query<JobListQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Job>>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let status = match query.status.as_deref() {
        None => JobStatus::Open,
        Some(raw) => raw.parse::<JobStatus>().map_err(ApiError::BadRequest)?,
    };

    let jobs = state.registry.list(Some(status)).await;
    let message = format!("Retrieved {} {} jobs", jobs.len(), status);
    Ok(Json(ApiResponse::with_message(jobs, message)))
}

pub async fn create_job(
    State(state): State<AppState>,
    payload: Result<Json<CreateJobRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Job>>), ApiError> {
    let Json(request) = payload?;

    let price_in_qubic = request
        .price_in_qubic
        .as_ref()
        .filter(|v| !v.is_null())
        .map(|v| parse_amount(v, "priceInQubic"))
        .transpose()?;

    if let Some(address) = request.client_address.as_deref().filter(|a| !a.is_empty()) {
        PublicIdentity::parse(address)?;
    }

    let job = state
        .registry
        .create(NewJob {
            title: request.title,
            description: request.description,
            category: request.category,
            price_in_qubic,
            client_address: request.client_address,
            deadline: request.deadline,
            contract_address: request.contract_address,
        })
        .await?;

    info!("Job {} created by {}", job.id, job.client_address);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(job, "Job created successfully")),
    ))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Job>>, ApiError> {
    let job = state.registry.get(&id).await?;
    Ok(Json(ApiResponse::ok(job)))
}

pub async fn claim_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ClaimJobRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Job>>, ApiError> {
    let Json(request) = payload?;
    let worker = request
        .worker_address
        .filter(|w| !w.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("workerAddress is required".to_string()))?;
    let worker = PublicIdentity::parse(&worker)?;

    let job = state.registry.claim(&id, worker.as_str()).await?;
    info!("Job {} claimed by {}", job.id, worker);
    Ok(Json(ApiResponse::with_message(job, "Job claimed successfully")))
}
