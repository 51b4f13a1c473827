//! DEX ports
//!
//! Trait abstractions for token swaps and liquidity-pool deposits. Concrete
//! AMM adapters plug in behind these; the in-repo implementation is the
//! deterministic mock used for dry runs and tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DexError {
    #[error("provider not initialized")]
    NotInitialized,
    #[error("API request failed: {0}")]
    Api(String),
    #[error("swap execution failed: {0}")]
    Execution(String),
    #[error("slippage tolerance exceeded")]
    SlippageExceeded,
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapParams {
    pub input_mint: String,
    pub output_mint: String,
    /// Input amount in the input mint's smallest unit
    pub amount_in: u64,
    /// Slippage bound in basis points (1 = 0.01%)
    pub slippage_bps: u32,
    /// Optional explicit floor on the output amount
    pub min_output_amount: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapQuote {
    pub output_amount: u64,
    pub price_impact_bps: u32,
    pub fee: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapResult {
    pub signature: String,
    pub amount_in: u64,
    pub amount_out: u64,
    pub price_impact_bps: u32,
}

/// Executes token swaps
#[async_trait]
pub trait SwapProvider: Send + Sync {
    async fn initialize(&self) -> Result<(), DexError>;

    async fn get_quote(&self, params: &SwapParams) -> Result<SwapQuote, DexError>;

    async fn swap(&self, params: &SwapParams) -> Result<SwapResult, DexError>;

    async fn shutdown(&self) -> Result<(), DexError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityParams {
    pub token_mint: String,
    pub quote_mint: String,
    /// Token-side deposit in the token's smallest unit
    pub token_amount: u64,
    /// Quote-side deposit in lamports
    pub quote_amount: u64,
    pub slippage_bps: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityResult {
    pub signature: String,
    pub token_amount: u64,
    pub quote_amount: u64,
    pub lp_tokens_received: u64,
}

/// Deposits into a liquidity pool
#[async_trait]
pub trait LiquidityProvider: Send + Sync {
    async fn initialize(&self) -> Result<(), DexError>;

    async fn add_liquidity(&self, params: &LiquidityParams) -> Result<LiquidityResult, DexError>;

    async fn shutdown(&self) -> Result<(), DexError>;
}
