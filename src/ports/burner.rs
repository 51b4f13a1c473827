//! Token burn port
//!
//! The burn collaborator destroys a given amount of the protocol token from
//! the operator's account. The owning credential is fixed at construction.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BurnError {
    #[error("burner not initialized")]
    NotInitialized,
    #[error("invalid mint address: {0}")]
    InvalidMint(String),
    #[error("burn transaction failed: {0}")]
    Transaction(String),
}

/// Burns protocol tokens held by the operator
#[async_trait]
pub trait TokenBurner: Send + Sync {
    /// Burn `amount` (smallest unit) of `mint`; returns the transaction
    /// signature
    async fn burn(&self, mint: &str, amount: u64) -> Result<String, BurnError>;
}
