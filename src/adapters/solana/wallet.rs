//! Operator Wallet
//!
//! Loads the operator keypair from a JSON byte-array file (solana-keygen
//! format) or a base58-encoded secret from the environment.

use std::fs;
use std::path::Path;

use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("failed to load keypair: {0}")]
    Load(String),
    #[error("invalid keypair bytes: {0}")]
    InvalidKeypair(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Holder of the operator keypair
pub struct WalletManager {
    keypair: Keypair,
}

impl WalletManager {
    /// Load from a file containing a JSON array of bytes
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WalletError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let bytes: Vec<u8> = serde_json::from_str(&contents)
            .map_err(|e| WalletError::Load(format!("invalid JSON keypair format: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Load from a base58-encoded secret key string
    pub fn from_base58(encoded: &str) -> Result<Self, WalletError> {
        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| WalletError::Load(format!("invalid base58 secret: {e}")))?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let keypair =
            Keypair::try_from(bytes).map_err(|e| WalletError::InvalidKeypair(e.to_string()))?;
        Ok(Self { keypair })
    }

    /// Random keypair for tests and dry runs
    pub fn new_random() -> Self {
        Self {
            keypair: Keypair::new(),
        }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Base58 public key string
    pub fn public_key(&self) -> String {
        self.keypair.pubkey().to_string()
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

impl Clone for WalletManager {
    fn clone(&self) -> Self {
        Self {
            keypair: Keypair::try_from(&self.keypair.to_bytes()[..])
                .expect("keypair bytes roundtrip"),
        }
    }
}
