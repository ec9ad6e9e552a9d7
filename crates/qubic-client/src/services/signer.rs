use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine, prelude::BASE64_STANDARD};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error};

use crate::error::ChainError;
use crate::identity::{PublicIdentity, Seed};

/// Everything a transaction carries before it is signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    pub source_public_key: String,
    pub destination_public_key: String,
    pub amount: u64,
    pub tick: u64,
    pub input_type: u16,
    pub input_size: usize,
    #[serde(serialize_with = "as_base64")]
    pub payload: Vec<u8>,
}

fn as_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&BASE64_STANDARD.encode(bytes))
}

/// Turns unsigned fields plus a seed into the exact bytes the ledger accepts.
/// Key derivation and the signature scheme live entirely behind this trait.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn sign(
        &self,
        unsigned: &UnsignedTransaction,
        seed: &Seed,
    ) -> Result<Vec<u8>, ChainError>;
}

/// Seed to public identity, as a wallet library would do it.
#[async_trait]
pub trait IdentityDeriver: Send + Sync {
    async fn derive_identity(&self, seed: &Seed) -> Result<PublicIdentity, ChainError>;
}

/// Used when no signer is configured; every call fails with `Signing`.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredSigner;

#[async_trait]
impl TransactionSigner for UnconfiguredSigner {
    async fn sign(
        &self,
        _unsigned: &UnsignedTransaction,
        _seed: &Seed,
    ) -> Result<Vec<u8>, ChainError> {
        Err(ChainError::Signing(
            "no transaction signer configured (set QLANCE_SIGNER_COMMAND)".to_string(),
        ))
    }
}

#[async_trait]
impl IdentityDeriver for UnconfiguredSigner {
    async fn derive_identity(&self, _seed: &Seed) -> Result<PublicIdentity, ChainError> {
        Err(ChainError::Signing(
            "no identity deriver configured (set QLANCE_SIGNER_COMMAND)".to_string(),
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignOutput {
    encoded_transaction: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityOutput {
    public_id: String,
}

/// Delegates to a local wallet program (e.g. a script around the official
/// Qubic library). The request goes in on stdin as one JSON document and the
/// answer comes back on stdout, so seed material stays on this host.
///
/// Requests: `{"action":"sign","seed":..,"transaction":{..}}` answered with
/// `{"encodedTransaction":"<base64>"}`, and `{"action":"identity","seed":..}`
/// answered with `{"publicId":".."}`.
#[derive(Debug, Clone)]
pub struct ExternalCommandSigner {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ExternalCommandSigner {
    pub fn new(program: String, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program,
            args,
            timeout,
        }
    }

    /// Splits a whitespace-separated command line, e.g. `node sign.mjs`.
    pub fn from_command_line(command: &str, timeout: Duration) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect(), timeout))
    }

    async fn run(&self, request: serde_json::Value) -> Result<Vec<u8>, ChainError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ChainError::Signing(format!("failed to start {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(request.to_string().as_bytes())
                .await
                .map_err(|e| ChainError::Signing(format!("failed to write request: {}", e)))?;
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ChainError::Signing(format!("{} timed out", self.program)))?
            .map_err(|e| ChainError::Signing(format!("{} failed: {}", self.program, e)))?;

        if !output.status.success() {
            error!("Signer {} exited with {}", self.program, output.status);
            return Err(ChainError::Signing(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl TransactionSigner for ExternalCommandSigner {
    async fn sign(
        &self,
        unsigned: &UnsignedTransaction,
        seed: &Seed,
    ) -> Result<Vec<u8>, ChainError> {
        debug!(
            "Signing input type {} for tick {} via {}",
            unsigned.input_type, unsigned.tick, self.program
        );
        let stdout = self
            .run(json!({
                "action": "sign",
                "seed": seed.expose_secret(),
                "transaction": unsigned,
            }))
            .await?;

        let output: SignOutput = serde_json::from_slice(&stdout)
            .map_err(|e| ChainError::Signing(format!("unreadable signer output: {}", e)))?;
        BASE64_STANDARD
            .decode(output.encoded_transaction.trim())
            .map_err(|e| ChainError::Signing(format!("signer output is not base64: {}", e)))
    }
}

#[async_trait]
impl IdentityDeriver for ExternalCommandSigner {
    async fn derive_identity(&self, seed: &Seed) -> Result<PublicIdentity, ChainError> {
        let stdout = self
            .run(json!({ "action": "identity", "seed": seed.expose_secret() }))
            .await?;

        let output: IdentityOutput = serde_json::from_slice(&stdout)
            .map_err(|e| ChainError::Signing(format!("unreadable signer output: {}", e)))?;
        PublicIdentity::parse(&output.public_id)
            .map_err(|e| ChainError::Signing(format!("signer returned a bad identity: {}", e)))
    }
}
