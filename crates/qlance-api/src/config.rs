use std::env;
use std::str::FromStr;
use std::time::Duration;

use eyre::{Result, eyre};
use qubic_client::config::{DEFAULT_CONTRACT_ADDRESS, DEFAULT_TESTNET_RPC_URL};
use qubic_client::identity::is_valid_identity;
use qubic_client::{ContractConfig, RetryPolicy};

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_ENVIRONMENT: &str = "development";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub rpc_url: String,
    pub rpc_timeout: Duration,
    pub contract: ContractConfig,
    pub retry: RetryPolicy,
    pub signer_command: Option<String>,
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            rpc_url: DEFAULT_TESTNET_RPC_URL.to_string(),
            rpc_timeout: Duration::from_secs(DEFAULT_RPC_TIMEOUT_SECS),
            contract: ContractConfig::default(),
            retry: RetryPolicy::default(),
            signer_command: None,
            environment: DEFAULT_ENVIRONMENT.to_string(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or blank keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let contract_address = get("QUBIC_CONTRACT_ADDRESS")
            .unwrap_or_else(|| DEFAULT_CONTRACT_ADDRESS.to_string());
        if !is_valid_identity(&contract_address) {
            return Err(eyre!(
                "QUBIC_CONTRACT_ADDRESS is not a valid Qubic identity: {}",
                contract_address
            ));
        }

        let contract = ContractConfig {
            index: parse_or(&get, "QUBIC_CONTRACT_INDEX", defaults.contract.index)?,
            address: contract_address,
            tick_offset: parse_or(&get, "QLANCE_TICK_OFFSET", defaults.contract.tick_offset)?,
        };
        if contract.tick_offset == 0 {
            return Err(eyre!("QLANCE_TICK_OFFSET must be greater than zero"));
        }

        let retry = RetryPolicy {
            max_retries: parse_or(&get, "QLANCE_MAX_RETRIES", defaults.retry.max_retries)?,
            delay: Duration::from_millis(parse_or(
                &get,
                "QLANCE_RETRY_DELAY_MS",
                defaults.retry.delay.as_millis() as u64,
            )?),
        };

        Ok(Self {
            port: parse_or(&get, "PORT", defaults.port)?,
            rpc_url: get("QUBIC_RPC_URL")
                .or_else(|| get("QUBIC_TESTNET_RPC"))
                .unwrap_or(defaults.rpc_url),
            rpc_timeout: Duration::from_secs(parse_or(
                &get,
                "QUBIC_RPC_TIMEOUT_SECS",
                DEFAULT_RPC_TIMEOUT_SECS,
            )?),
            contract,
            retry,
            signer_command: get("QLANCE_SIGNER_COMMAND"),
            environment: get("APP_ENV")
                .or_else(|| get("NODE_ENV"))
                .unwrap_or(defaults.environment),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| eyre!("Invalid value for {}: '{}' ({})", key, raw, e)),
        None => Ok(default),
    }
}
