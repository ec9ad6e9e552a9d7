use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::transport::{RpcResponse, RpcTransport, TransportError};
use crate::error::ChainError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: Url,
    client: Client,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ChainError> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChainError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::Unreachable(format!("invalid path '{}': {}", path, e)))
    }

    async fn read(response: reqwest::Response) -> Result<RpcResponse, TransportError> {
        let status = response.status().as_u16();
        let text = response.text().await.map_err(classify)?;
        Ok(RpcResponse::new(status, text))
    }
}

// `Url::join` drops the last segment unless the base ends with a slash.
fn normalize_base_url(raw: &str) -> Result<Url, ChainError> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&with_slash)
        .map_err(|e| ChainError::Validation(format!("invalid RPC URL '{}': {}", raw, e)))
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else {
        TransportError::Unreachable(e.to_string())
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn get(&self, path: &str) -> Result<RpcResponse, TransportError> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!("GET {} failed: {}", url, e);
            classify(e)
        })?;
        Self::read(response).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<RpcResponse, TransportError> {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);
        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!("POST {} failed: {}", url, e);
                classify(e)
            })?;
        Self::read(response).await
    }

    fn base_url(&self) -> &str {
        self.base_url.as_str()
    }
}
