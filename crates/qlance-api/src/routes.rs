use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::handlers::{contract, health, jobs, on_chain, wallet};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    info!("Setting up HTTP router");

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/api/info", get(health::api_info))
        // Off-chain registry
        .route("/api/jobs", get(jobs::list_jobs).post(jobs::create_job))
        .route("/api/jobs/{id}", get(jobs::get_job))
        .route("/api/jobs/{id}/claim", put(jobs::claim_job))
        // Contract procedures
        .route("/api/jobs/post-on-chain", post(on_chain::post_job))
        .route("/api/jobs/{id}/claim-on-chain", post(on_chain::claim_job))
        .route("/api/jobs/{id}/submit-work-on-chain", post(on_chain::submit_work))
        .route("/api/jobs/{id}/approve-work-on-chain", post(on_chain::approve_work))
        .route("/api/jobs/{id}/reject-work-on-chain", post(on_chain::reject_work))
        // Contract reads
        .route("/api/contract/jobs-count", get(contract::jobs_count))
        .route("/api/contract/jobs/{id}", get(contract::job))
        .route("/api/transactions/{id}", get(contract::transaction_status))
        // Wallet
        .route("/api/wallet/import", post(wallet::import_wallet))
        .route("/api/wallet/validate/{address}", get(wallet::validate_address))
        .route("/api/wallet/{public_key}/balance", get(wallet::balance))
        .fallback(health::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
