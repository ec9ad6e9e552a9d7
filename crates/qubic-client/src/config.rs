use std::time::Duration;

pub const DEFAULT_CONTRACT_INDEX: u32 = 100;
pub const DEFAULT_CONTRACT_ADDRESS: &str =
    "KAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAXIUO";
pub const DEFAULT_TICK_OFFSET: u64 = 10;
pub const DEFAULT_MAX_RETRIES: usize = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
pub const DEFAULT_TESTNET_RPC_URL: &str = "https://testnet-rpc.qubicdev.com";

/// Where the Qlance contract lives and how far ahead transactions are scheduled.
#[derive(Debug, Clone)]
pub struct ContractConfig {
    pub index: u32,
    pub address: String,
    /// Must cover signing time plus network latency, or the target tick passes before broadcast.
    pub tick_offset: u64,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            index: DEFAULT_CONTRACT_INDEX,
            address: DEFAULT_CONTRACT_ADDRESS.to_string(),
            tick_offset: DEFAULT_TICK_OFFSET,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}
