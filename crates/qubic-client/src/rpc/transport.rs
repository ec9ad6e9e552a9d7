use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Raw answer from the ledger RPC. `body` is `Value::Null` when the payload is not JSON.
#[derive(Debug, Clone)]
pub struct RpcResponse {
    pub status: u16,
    pub body: Value,
    pub text: String,
}

impl RpcResponse {
    pub fn new(status: u16, text: String) -> Self {
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, body, text }
    }

    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            text: body.to_string(),
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Endpoint unreachable: {0}")]
    Unreachable(String),
}

/// The only seam between the chain client and the network.
/// Paths are relative to the RPC base URL, e.g. `v1/tick-info`.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn get(&self, path: &str) -> Result<RpcResponse, TransportError>;

    async fn post_json(&self, path: &str, body: &Value) -> Result<RpcResponse, TransportError>;

    fn base_url(&self) -> &str;
}
