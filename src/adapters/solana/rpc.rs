//! Solana RPC Client
//!
//! Thin async wrapper over the blocking RPC client: the engine only needs
//! balance reads and transaction submission, each bridged through
//! `spawn_blocking`.

use std::str::FromStr;
use std::sync::Arc;

use solana_client::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey, transaction::Transaction,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolanaClientError {
    #[error("RPC request failed: {0}")]
    Rpc(String),
    #[error("transaction failed: {0}")]
    Transaction(String),
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
}

/// Async-compatible Solana RPC wrapper
#[derive(Clone)]
pub struct SolanaClient {
    client: Arc<RpcClient>,
}

impl SolanaClient {
    pub fn new(rpc_url: String) -> Self {
        let client = Arc::new(RpcClient::new_with_commitment(
            rpc_url,
            CommitmentConfig::confirmed(),
        ));
        Self { client }
    }

    /// SOL balance in lamports for a base58 public key
    pub async fn get_balance(&self, pubkey: &str) -> Result<u64, SolanaClientError> {
        let pubkey = Pubkey::from_str(pubkey)
            .map_err(|e| SolanaClientError::InvalidPublicKey(e.to_string()))?;

        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || {
            client
                .get_balance(&pubkey)
                .map_err(|e| SolanaClientError::Rpc(e.to_string()))
        })
        .await
        .map_err(|e| SolanaClientError::Rpc(format!("task join error: {e}")))?
    }

    /// Recent blockhash for transaction building
    pub async fn get_latest_blockhash(&self) -> Result<Hash, SolanaClientError> {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || {
            client
                .get_latest_blockhash()
                .map_err(|e| SolanaClientError::Rpc(e.to_string()))
        })
        .await
        .map_err(|e| SolanaClientError::Rpc(format!("task join error: {e}")))?
    }

    /// Submit a signed transaction and wait for confirmation
    pub async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<String, SolanaClientError> {
        let tx = transaction.clone();
        let client = Arc::clone(&self.client);

        tokio::task::spawn_blocking(move || {
            client
                .send_and_confirm_transaction(&tx)
                .map(|sig| sig.to_string())
                .map_err(|e| SolanaClientError::Transaction(e.to_string()))
        })
        .await
        .map_err(|e| SolanaClientError::Rpc(format!("task join error: {e}")))?
    }
}
