use std::collections::HashMap;

use async_trait::async_trait;
use base64::{Engine, prelude::BASE64_STANDARD};
use qubic_client::codec::{Function, OnChainJobStatus};
use qubic_client::rpc::{RpcResponse, RpcTransport, TransportError};
use serde_json::{Value, json};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy)]
pub struct MockOnChainJob {
    pub price: u64,
    pub status: u8,
}

#[derive(Debug, Default)]
struct LedgerState {
    tick: u64,
    offline: bool,
    status_endpoint_down: bool,
    reject_broadcasts: bool,
    balances: HashMap<String, Value>,
    jobs: Vec<MockOnChainJob>,
    broadcasts: Vec<String>,
}

/// In-process ledger RPC speaking the same JSON paths as the Qubic RPC.
///
/// It keeps a tick counter, per-identity balance bodies and a list of Qlance
/// jobs for contract reads. Broadcasts are recorded and never executed.
#[derive(Debug, Default)]
pub struct MockLedger {
    state: Mutex<LedgerState>,
}

impl MockLedger {
    pub fn new(tick: u64) -> Self {
        Self {
            state: Mutex::new(LedgerState {
                tick,
                ..LedgerState::default()
            }),
        }
    }

    pub async fn set_tick(&self, tick: u64) {
        self.state.lock().await.tick = tick;
    }

    /// Every call fails as if the host were unreachable.
    pub async fn set_offline(&self, offline: bool) {
        self.state.lock().await.offline = offline;
    }

    /// Primary tick endpoint answers 500 so callers must fall back.
    pub async fn set_status_endpoint_down(&self, down: bool) {
        self.state.lock().await.status_endpoint_down = down;
    }

    pub async fn set_reject_broadcasts(&self, reject: bool) {
        self.state.lock().await.reject_broadcasts = reject;
    }

    /// Stores the canonical `{balance:{balance:"N"}}` shape.
    pub async fn set_balance(&self, identity: &str, amount: u128) {
        self.set_balance_body(identity, json!({ "balance": { "balance": amount.to_string() } }))
            .await;
    }

    pub async fn set_balance_body(&self, identity: &str, body: Value) {
        self.state
            .lock()
            .await
            .balances
            .insert(identity.to_string(), body);
    }

    /// Appends a job and returns its id. Ids start at 0, like the contract's counter.
    pub async fn add_job(&self, price: u64, status: OnChainJobStatus) -> u64 {
        let status = match status {
            OnChainJobStatus::Open => 0,
            OnChainJobStatus::Claimed => 1,
            OnChainJobStatus::Submitted => 2,
            OnChainJobStatus::Approved => 3,
            OnChainJobStatus::Rejected => 4,
            OnChainJobStatus::Unknown(raw) => raw,
        };
        let mut state = self.state.lock().await;
        let id = state.jobs.len() as u64;
        state.jobs.push(MockOnChainJob { price, status });
        id
    }

    /// Base64 bodies of every accepted or rejected broadcast, in order.
    pub async fn broadcasts(&self) -> Vec<String> {
        self.state.lock().await.broadcasts.clone()
    }

    fn answer_query(state: &LedgerState, body: &Value) -> RpcResponse {
        let input_type = body.get("inputType").and_then(Value::as_u64);
        let request = body
            .get("requestData")
            .and_then(Value::as_str)
            .map(|data| BASE64_STANDARD.decode(data).unwrap_or_default())
            .unwrap_or_default();

        let output = if input_type == Some(Function::GetJobsCount.input_type() as u64) {
            (state.jobs.len() as u64).to_le_bytes().to_vec()
        } else if input_type == Some(Function::GetJob.input_type() as u64) && request.len() == 8 {
            let mut id = [0u8; 8];
            id.copy_from_slice(&request);
            let id = u64::from_le_bytes(id);

            let mut record = vec![0u8; Function::GetJob.output_size()];
            if let Some(job) = usize::try_from(id).ok().and_then(|i| state.jobs.get(i)) {
                record[0..8].copy_from_slice(&id.to_le_bytes());
                record[8..16].copy_from_slice(&job.price.to_le_bytes());
                record[16] = job.status;
            }
            record
        } else {
            return RpcResponse::json(400, json!({ "code": 3, "message": "unknown input type" }));
        };

        RpcResponse::json(200, json!({ "responseData": BASE64_STANDARD.encode(output) }))
    }
}

#[async_trait]
impl RpcTransport for MockLedger {
    async fn get(&self, path: &str) -> Result<RpcResponse, TransportError> {
        let state = self.state.lock().await;
        if state.offline {
            return Err(TransportError::Unreachable("mock ledger offline".to_string()));
        }

        let response = match path {
            "status" if state.status_endpoint_down => {
                RpcResponse::json(500, json!({ "message": "internal error" }))
            }
            "status" => RpcResponse::json(200, json!({ "tick": state.tick, "epoch": 150 })),
            "v1/tick-info" => RpcResponse::json(
                200,
                json!({ "tickInfo": { "tick": state.tick, "duration": 1, "epoch": 150 } }),
            ),
            _ => {
                if let Some(identity) = path.strip_prefix("v1/balances/") {
                    let body = state.balances.get(identity).cloned().unwrap_or_else(
                        || json!({ "balance": { "id": identity, "balance": "0" } }),
                    );
                    RpcResponse::json(200, body)
                } else if let Some(id) = path.strip_prefix("v1/transactions/") {
                    let index = id
                        .strip_prefix("tx-")
                        .and_then(|n| n.parse::<usize>().ok())
                        .filter(|n| *n >= 1 && *n <= state.broadcasts.len());
                    match index {
                        Some(_) => RpcResponse::json(
                            200,
                            json!({ "transaction": { "txId": id, "tickNumber": state.tick } }),
                        ),
                        None => RpcResponse::json(404, json!({ "message": "not found" })),
                    }
                } else {
                    RpcResponse::json(404, json!({ "message": "Not Found" }))
                }
            }
        };
        Ok(response)
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<RpcResponse, TransportError> {
        let mut state = self.state.lock().await;
        if state.offline {
            return Err(TransportError::Unreachable("mock ledger offline".to_string()));
        }

        let response = match path {
            "v1/querySmartContract" => Self::answer_query(&state, body),
            "v1/broadcast-transaction" => {
                let encoded = body
                    .get("encodedTransaction")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                state.broadcasts.push(encoded);
                if state.reject_broadcasts {
                    RpcResponse::json(400, json!({ "code": 3, "message": "invalid transaction" }))
                } else {
                    RpcResponse::json(
                        200,
                        json!({
                            "transactionId": format!("tx-{}", state.broadcasts.len()),
                            "peersBroadcasted": 3,
                        }),
                    )
                }
            }
            _ => RpcResponse::json(404, json!({ "message": "Not Found" })),
        };
        Ok(response)
    }

    fn base_url(&self) -> &str {
        "http://mock-ledger.local/"
    }
}
