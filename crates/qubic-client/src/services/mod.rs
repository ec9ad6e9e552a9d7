pub mod chain_client;
pub mod scheduler;
pub mod signer;
