use std::sync::Arc;

use eyre::{Result, eyre};
use job_registry::JobRegistry;
use qubic_client::rpc::{HttpTransport, RpcTransport};
use qubic_client::{
    ChainClient, ExternalCommandSigner, IdentityDeriver, TransactionScheduler, TransactionSigner,
    UnconfiguredSigner,
};
use tracing::{info, warn};

use crate::config::ApiConfig;

/// Everything a handler needs. Built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<JobRegistry>,
    pub chain: Arc<ChainClient>,
    pub scheduler: Arc<TransactionScheduler>,
    pub identities: Arc<dyn IdentityDeriver>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(
        config: ApiConfig,
        transport: Arc<dyn RpcTransport>,
        signer: Arc<dyn TransactionSigner>,
        identities: Arc<dyn IdentityDeriver>,
    ) -> Self {
        let chain = Arc::new(ChainClient::new(transport));
        let scheduler = Arc::new(TransactionScheduler::new(
            chain.clone(),
            signer,
            config.contract.clone(),
        ));

        Self {
            registry: JobRegistry::new(),
            chain,
            scheduler,
            identities,
            config: Arc::new(config),
        }
    }

    /// Production wiring: HTTP transport to the configured RPC and the
    /// external signer when one is configured.
    pub fn from_config(config: ApiConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config.rpc_url, config.rpc_timeout)
            .map_err(|e| eyre!("Failed to set up Qubic RPC transport: {}", e))?;

        let signer = config.signer_command.as_deref().and_then(|command| {
            ExternalCommandSigner::from_command_line(command, config.rpc_timeout)
        });

        let state = match signer {
            Some(signer) => {
                info!("Using external signer for on-chain operations");
                let signer = Arc::new(signer);
                Self::new(config, Arc::new(transport), signer.clone(), signer)
            }
            None => {
                warn!("QLANCE_SIGNER_COMMAND not set, on-chain operations will fail");
                let signer = Arc::new(UnconfiguredSigner);
                Self::new(config, Arc::new(transport), signer.clone(), signer)
            }
        };
        Ok(state)
    }
}
