use std::sync::Arc;

use base64::{Engine, prelude::BASE64_STANDARD};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::codec::{self, Function, OnChainJob};
use crate::error::{ChainError, Result};
use crate::identity::PublicIdentity;
use crate::rpc::{RpcResponse, RpcTransport};

const STATUS_PATH: &str = "status";
const TICK_INFO_PATH: &str = "v1/tick-info";
const QUERY_CONTRACT_PATH: &str = "v1/querySmartContract";
const BROADCAST_PATH: &str = "v1/broadcast-transaction";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastReceipt {
    /// `"pending"` when the RPC did not hand back an id.
    pub transaction_id: String,
    pub peers_broadcasted: Option<u64>,
    pub details: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatus {
    pub transaction_id: String,
    pub details: Value,
}

/// Talks to the ledger RPC and hides its response-shape quirks from callers.
#[derive(Clone)]
pub struct ChainClient {
    transport: Arc<dyn RpcTransport>,
}

impl ChainClient {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self { transport }
    }

    pub fn rpc_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Reachability check. A 404 on the RPC root still proves the server is up.
    pub async fn probe(&self) -> bool {
        match self.transport.get("").await {
            Ok(response) if response.is_success() || response.status == 404 => {
                debug!("Qubic RPC reachable at {}", self.rpc_url());
                true
            }
            Ok(response) => {
                warn!(
                    "Qubic RPC at {} answered probe with status {}",
                    self.rpc_url(),
                    response.status
                );
                false
            }
            Err(e) => {
                warn!("Cannot reach Qubic RPC at {}: {}", self.rpc_url(), e);
                false
            }
        }
    }

    pub async fn get_current_tick(&self) -> Result<u64> {
        match self.tick_from_status().await {
            Ok(tick) => return Ok(tick),
            Err(e) => warn!("Status endpoint failed ({}), trying tick-info", e),
        }

        self.tick_from_tick_info().await.inspect_err(|e| {
            warn!("Could not get current tick from either endpoint: {}", e);
        })
    }

    async fn tick_from_status(&self) -> Result<u64> {
        let response = self.transport.get(STATUS_PATH).await?;
        let body = expect_success(STATUS_PATH, response)?;
        body.get("tick")
            .and_then(Value::as_u64)
            .ok_or_else(|| ChainError::Protocol(format!("{} response has no tick", STATUS_PATH)))
    }

    async fn tick_from_tick_info(&self) -> Result<u64> {
        let response = self.transport.get(TICK_INFO_PATH).await?;
        let body = expect_success(TICK_INFO_PATH, response)?;
        body.get("tickInfo")
            .and_then(|info| info.get("tick"))
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                ChainError::Protocol(format!("{} response has no tickInfo.tick", TICK_INFO_PATH))
            })
    }

    /// Balance in the smallest currency unit.
    ///
    /// The RPC has answered with several shapes over time; all of them are
    /// accepted. An unrecognised shape yields zero with a warning instead of
    /// an error.
    pub async fn get_balance(&self, identity: &str) -> Result<u128> {
        let identity = PublicIdentity::parse(identity)?;
        let path = format!("v1/balances/{}", identity);
        let response = self.transport.get(&path).await?;

        if response.status == 404 {
            return Err(ChainError::NotFound(format!("identity {}", identity)));
        }
        let body = expect_success(&path, response)?;

        match extract_balance(&body) {
            Some(value) => parse_balance(value),
            None => {
                warn!("Unexpected balance response format: {}", body);
                Ok(0)
            }
        }
    }

    /// Read-only contract call. No tick, no signature.
    pub async fn query_function(
        &self,
        contract_index: u32,
        function: Function,
        payload: &[u8],
    ) -> Result<Vec<u8>> {
        let request = json!({
            "contractIndex": contract_index,
            "inputType": function.input_type(),
            "inputSize": payload.len(),
            "requestData": BASE64_STANDARD.encode(payload),
        });

        debug!(
            "Querying {} on contract {} with {} byte payload",
            function.name(),
            contract_index,
            payload.len()
        );

        let response = self.transport.post_json(QUERY_CONTRACT_PATH, &request).await?;
        let body = expect_success(QUERY_CONTRACT_PATH, response)?;

        let encoded = body
            .get("responseData")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ChainError::Protocol(format!("no response data from {} query", function.name()))
            })?;

        BASE64_STANDARD.decode(encoded).map_err(|e| {
            ChainError::Protocol(format!("{} response is not base64: {}", function.name(), e))
        })
    }

    pub async fn get_jobs_count(&self, contract_index: u32) -> Result<u64> {
        let bytes = self
            .query_function(
                contract_index,
                Function::GetJobsCount,
                &codec::encode_get_jobs_count(),
            )
            .await?;
        Ok(codec::decode_jobs_count(&bytes)?)
    }

    pub async fn get_job(&self, contract_index: u32, job_id: u64) -> Result<OnChainJob> {
        let bytes = self
            .query_function(contract_index, Function::GetJob, &codec::encode_get_job(job_id))
            .await?;
        Ok(codec::decode_get_job(&bytes)?)
    }

    /// Submits already-signed transaction bytes.
    pub async fn broadcast_transaction(&self, signed: &[u8]) -> Result<BroadcastReceipt> {
        let request = json!({ "encodedTransaction": BASE64_STANDARD.encode(signed) });
        let response = self.transport.post_json(BROADCAST_PATH, &request).await?;

        if !response.is_success() {
            warn!(
                "Broadcast rejected with status {}: {}",
                response.status, response.text
            );
            return Err(ChainError::Rejected {
                status: response.status,
                body: response.text,
            });
        }

        let body = response.body;
        let transaction_id = body
            .get("transactionId")
            .or_else(|| body.get("id"))
            .and_then(Value::as_str)
            .unwrap_or("pending")
            .to_string();
        let peers_broadcasted = body.get("peersBroadcasted").and_then(Value::as_u64);

        info!(
            "Broadcast accepted: transaction {} (peers: {:?})",
            transaction_id, peers_broadcasted
        );

        Ok(BroadcastReceipt {
            transaction_id,
            peers_broadcasted,
            details: body,
        })
    }

    /// Inclusion lookup. Before the target tick has passed this usually answers `NotFound`.
    pub async fn get_transaction_status(&self, transaction_id: &str) -> Result<TransactionStatus> {
        let path = format!("v1/transactions/{}", transaction_id);
        let response = self.transport.get(&path).await?;

        if response.status == 404 {
            return Err(ChainError::NotFound(format!(
                "transaction {}",
                transaction_id
            )));
        }
        let details = expect_success(&path, response)?;

        Ok(TransactionStatus {
            transaction_id: transaction_id.to_string(),
            details,
        })
    }
}

fn expect_success(path: &str, response: RpcResponse) -> Result<Value> {
    if !response.is_success() {
        return Err(ChainError::Protocol(format!(
            "{} returned status {}: {}",
            path, response.status, response.text
        )));
    }
    if response.body.is_null() {
        return Err(ChainError::Protocol(format!(
            "{} returned a non-JSON body",
            path
        )));
    }
    Ok(response.body)
}

// Shapes observed in the wild, checked in order:
//   { balance: { balance: "123" } }
//   { balance: "123" }
//   { balanceData: { balance: "123" } }
fn extract_balance(body: &Value) -> Option<&Value> {
    if let Some(nested) = body.get("balance").and_then(|b| b.get("balance")) {
        return Some(nested);
    }
    if let Some(direct) = body.get("balance").filter(|b| b.is_string()) {
        return Some(direct);
    }
    body.get("balanceData").and_then(|b| b.get("balance"))
}

fn parse_balance(value: &Value) -> Result<u128> {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<u128>().ok(),
        Value::Number(n) => n.as_u64().map(u128::from),
        _ => None,
    };
    parsed.ok_or_else(|| {
        ChainError::Protocol(format!("balance {} is not an unsigned integer", value))
    })
}
