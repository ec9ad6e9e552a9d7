use async_trait::async_trait;
use qubic_client::{
    ChainError, IdentityDeriver, PublicIdentity, Seed, TransactionSigner, UnsignedTransaction,
};

/// Stand-in for a wallet library. "Signatures" are a readable concatenation of
/// the unsigned fields, so the same input always yields the same bytes.
///
/// The identity of a seed is the seed upper-cased and padded to 60 characters
/// with its last letter, e.g. `"a" * 55` derives `"A" * 60`.
#[derive(Debug, Clone, Default)]
pub struct DeterministicSigner {
    fail: bool,
}

impl DeterministicSigner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }

    pub fn identity_for(seed: &str) -> String {
        let upper = seed.to_ascii_uppercase();
        let pad = upper.chars().last().unwrap_or('A');
        let mut identity: String = upper.chars().take(60).collect();
        while identity.len() < 60 {
            identity.push(pad);
        }
        identity
    }
}

#[async_trait]
impl TransactionSigner for DeterministicSigner {
    async fn sign(
        &self,
        unsigned: &UnsignedTransaction,
        _seed: &Seed,
    ) -> Result<Vec<u8>, ChainError> {
        if self.fail {
            return Err(ChainError::Signing("deterministic signer told to fail".to_string()));
        }

        let mut bytes = Vec::new();
        bytes.extend_from_slice(unsigned.source_public_key.as_bytes());
        bytes.extend_from_slice(unsigned.destination_public_key.as_bytes());
        bytes.extend_from_slice(&unsigned.amount.to_le_bytes());
        bytes.extend_from_slice(&unsigned.tick.to_le_bytes());
        bytes.extend_from_slice(&unsigned.input_type.to_le_bytes());
        bytes.extend_from_slice(&(unsigned.input_size as u16).to_le_bytes());
        bytes.extend_from_slice(&unsigned.payload);
        Ok(bytes)
    }
}

#[async_trait]
impl IdentityDeriver for DeterministicSigner {
    async fn derive_identity(&self, seed: &Seed) -> Result<PublicIdentity, ChainError> {
        if self.fail {
            return Err(ChainError::Signing("deterministic signer told to fail".to_string()));
        }
        PublicIdentity::parse(&Self::identity_for(seed.expose_secret()))
    }
}
