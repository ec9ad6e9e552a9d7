use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use job_registry::RegistryError;
use qubic_client::ChainError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

const LEDGER_UNAVAILABLE: &str = "Ledger RPC unavailable";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Chain(e) => match e {
                ChainError::NotFound(_) => StatusCode::NOT_FOUND,
                ChainError::Network(_) | ChainError::Protocol(_) => StatusCode::BAD_GATEWAY,
                ChainError::Validation(_)
                | ChainError::Encoding(_)
                | ChainError::Signing(_)
                | ChainError::Rejected { .. } => StatusCode::BAD_REQUEST,
            },
            Self::Registry(e) => match e {
                RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
                RegistryError::Validation(_) | RegistryError::InvalidState { .. } => {
                    StatusCode::BAD_REQUEST
                }
            },
        }
    }

    /// Message sent to the caller. Ledger failures keep their detail in the log only.
    pub fn public_message(&self) -> String {
        match self {
            Self::Chain(ChainError::Network(_) | ChainError::Protocol(_)) => {
                LEDGER_UNAVAILABLE.to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed with {}: {}", status, self);
        } else {
            warn!("Request rejected with {}: {}", status, self);
        }

        (
            status,
            Json(json!({
                "success": false,
                "error": self.public_message(),
            })),
        )
            .into_response()
    }
}
