use thiserror::Error;

use crate::codec::CodecError;
use crate::rpc::transport::TransportError;

/// Failure taxonomy for everything that talks to, or prepares data for, the ledger.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("ledger RPC unreachable: {0}")]
    Network(String),

    #[error("unexpected ledger RPC response: {0}")]
    Protocol(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("encoding failed: {0}")]
    Encoding(String),

    /// The RPC answered, but refused the request. `body` is its own error payload.
    #[error("ledger RPC rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl ChainError {
    /// Only transport-level failures are worth repeating verbatim.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<TransportError> for ChainError {
    fn from(e: TransportError) -> Self {
        Self::Network(e.to_string())
    }
}

impl From<CodecError> for ChainError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::Encoding(msg) => Self::Encoding(msg),
            CodecError::Decoding(msg) => Self::Protocol(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChainError>;
