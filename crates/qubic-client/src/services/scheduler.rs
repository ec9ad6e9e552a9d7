use std::sync::Arc;

use serde::Serialize;
use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;
use tracing::{info, warn};

use super::chain_client::{BroadcastReceipt, ChainClient};
use super::signer::{TransactionSigner, UnsignedTransaction};
use crate::codec::ProcedureCall;
use crate::config::{ContractConfig, RetryPolicy};
use crate::error::{ChainError, Result};
use crate::identity::{PublicIdentity, Seed};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTransaction {
    pub procedure: &'static str,
    pub current_tick: u64,
    pub target_tick: u64,
    pub receipt: BroadcastReceipt,
}

/// Runs one procedure invocation end to end: tick lookup, payload, signing, broadcast.
pub struct TransactionScheduler {
    client: Arc<ChainClient>,
    signer: Arc<dyn TransactionSigner>,
    contract: ContractConfig,
}

impl TransactionScheduler {
    pub fn new(
        client: Arc<ChainClient>,
        signer: Arc<dyn TransactionSigner>,
        contract: ContractConfig,
    ) -> Self {
        Self {
            client,
            signer,
            contract,
        }
    }

    pub fn contract(&self) -> &ContractConfig {
        &self.contract
    }

    /// Single attempt. Nothing is retried; see [`Self::schedule_with_retry`].
    pub async fn schedule(
        &self,
        seed: &str,
        source: &str,
        call: ProcedureCall,
    ) -> Result<ScheduledTransaction> {
        self.schedule_with_retry(seed, source, call, RetryPolicy::none())
            .await
    }

    /// Same sequence as [`Self::schedule`], but the broadcast step is repeated
    /// on network failures according to `policy`. The signed bytes are reused
    /// as-is, so every attempt targets the same tick.
    pub async fn schedule_with_retry(
        &self,
        seed: &str,
        source: &str,
        call: ProcedureCall,
        policy: RetryPolicy,
    ) -> Result<ScheduledTransaction> {
        // Malformed input never reaches the network or the signer.
        let seed = Seed::parse(seed)?;
        let source = PublicIdentity::parse(source)?;
        let payload = call.payload()?;

        let current_tick = self.client.get_current_tick().await?;
        let target_tick = current_tick
            .checked_add(self.contract.tick_offset)
            .ok_or_else(|| ChainError::Encoding(format!("tick {} overflows", current_tick)))?;

        let unsigned = UnsignedTransaction {
            source_public_key: source.to_string(),
            destination_public_key: self.contract.address.clone(),
            amount: 0,
            tick: target_tick,
            input_type: call.procedure.input_type(),
            input_size: payload.len(),
            payload,
        };

        info!(
            "Scheduling {} from {} at tick {} (current {})",
            call.procedure.name(),
            source,
            target_tick,
            current_tick
        );

        let signed = self.signer.sign(&unsigned, &seed).await?;
        let receipt = self.broadcast(&signed, policy).await?;

        Ok(ScheduledTransaction {
            procedure: call.procedure.name(),
            current_tick,
            target_tick,
            receipt,
        })
    }

    async fn broadcast(&self, signed: &[u8], policy: RetryPolicy) -> Result<BroadcastReceipt> {
        let strategy = FixedInterval::new(policy.delay).take(policy.max_retries);

        RetryIf::spawn(
            strategy,
            || self.client.broadcast_transaction(signed),
            |e: &ChainError| {
                let retry = e.is_transient();
                if retry {
                    warn!("Broadcast failed, retrying: {}", e);
                }
                retry
            },
        )
        .await
    }
}
