use eyre::Result;
use qlance_api::{ApiConfig, AppState, create_router};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub fn initialize_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| eyre::eyre!("setting default subscriber failed: {}", e))?;

    Ok(())
}

pub async fn setup_server(
    state: AppState,
    port: u16,
) -> Result<(
    tokio::task::JoinHandle<Result<(), std::io::Error>>,
    std::net::SocketAddr,
)> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    let addr = listener.local_addr()?;

    let server = axum::serve(listener, app);
    let handle = tokio::spawn(async move { server.await });

    Ok((handle, addr))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    initialize_tracing()?;

    info!("Starting Qlance backend");

    let config = ApiConfig::from_env()?;
    info!("Environment: {}", config.environment);
    info!("Qubic RPC: {}", config.rpc_url);
    info!(
        "Contract {} (index {}), tick offset {}",
        config.contract.address, config.contract.index, config.contract.tick_offset
    );

    let port = config.port;
    let state = AppState::from_config(config)?;

    if state.chain.probe().await {
        info!("Connected to Qubic RPC");
    } else {
        warn!("Qubic RPC is not reachable, on-chain routes will fail until it is");
    }

    let (handle, addr) = setup_server(state, port).await?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    signal::ctrl_c().await?;
    info!("Received shutdown signal, shutting down HTTP server...");
    handle.abort();

    info!("Shutdown complete");
    Ok(())
}
