pub mod codec;
pub mod config;
pub mod error;
pub mod identity;
pub mod rpc;
pub mod services;

pub use config::{ContractConfig, RetryPolicy};
pub use error::ChainError;
pub use identity::{PublicIdentity, Seed};
pub use services::chain_client::{BroadcastReceipt, ChainClient, TransactionStatus};
pub use services::scheduler::{ScheduledTransaction, TransactionScheduler};
pub use services::signer::{
    ExternalCommandSigner, IdentityDeriver, TransactionSigner, UnconfiguredSigner,
    UnsignedTransaction,
};
