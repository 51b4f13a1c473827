//! Ports Layer - Trait definitions for external dependencies
//!
//! Following hexagonal architecture, these traits abstract:
//! - Fee ingestion (webhook queue, polling API, wallet watcher, mock)
//! - Token swaps and liquidity-pool deposits (DEX adapters)
//! - Token burning (SPL burn via the operator wallet)
//! - Report persistence

pub mod fee_source;
pub mod dex;
pub mod burner;
pub mod reporting;

pub use burner::{BurnError, TokenBurner};
pub use dex::{
    DexError, LiquidityParams, LiquidityProvider, LiquidityResult, SwapParams, SwapProvider,
    SwapQuote, SwapResult,
};
pub use fee_source::{FeeSource, FeeSourceError};
pub use reporting::{ReportError, ReportSink};
