use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ChainError;

pub const IDENTITY_LENGTH: usize = 60;
pub const SEED_MIN_LENGTH: usize = 55;
pub const SEED_MAX_LENGTH: usize = 56;

/// `^[A-Z0-9]{60}$`
pub fn is_valid_identity(address: &str) -> bool {
    address.len() == IDENTITY_LENGTH
        && address
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// `^[a-z]{55,56}$`
pub fn is_valid_seed(seed: &str) -> bool {
    (SEED_MIN_LENGTH..=SEED_MAX_LENGTH).contains(&seed.len())
        && seed.bytes().all(|b| b.is_ascii_lowercase())
}

/// A 60-character public address on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicIdentity(String);

impl PublicIdentity {
    pub fn parse(address: &str) -> Result<Self, ChainError> {
        if !is_valid_identity(address) {
            return Err(ChainError::Validation(format!(
                "invalid identity '{}': expected {} uppercase alphanumeric characters",
                address, IDENTITY_LENGTH
            )));
        }
        Ok(Self(address.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PublicIdentity {
    type Error = ChainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PublicIdentity> for String {
    fn from(identity: PublicIdentity) -> Self {
        identity.0
    }
}

impl fmt::Display for PublicIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Secret seed material. Never printed: `Debug` is redacted and there is no `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Seed(String);

impl Seed {
    pub fn parse(seed: &str) -> Result<Self, ChainError> {
        if !is_valid_seed(seed) {
            return Err(ChainError::Validation(format!(
                "invalid seed format: expected {}-{} lowercase letters",
                SEED_MIN_LENGTH, SEED_MAX_LENGTH
            )));
        }
        Ok(Self(seed.to_string()))
    }

    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(<redacted>)")
    }
}
