//! Adapters Layer - External System Implementations
//!
//! Implementations of the port traits:
//! - Fee sources: webhook queue, mock generator, polling API, wallet watcher
//! - DEX: deterministic mock swap/liquidity/burn
//! - Solana: RPC client, operator wallet, SPL burn
//! - Webhook: axum ingress feeding the queue fee source
//! - Report: file sink with content hashing, in-memory recorder
//! - CLI: command definitions

pub mod fee_source;
pub mod dex;
pub mod solana;
pub mod webhook;
pub mod report;
pub mod cli;

pub use cli::CliApp;
pub use dex::{MockLiquidityProvider, MockSwapProvider, MockTokenBurner};
pub use fee_source::{ApiFeeSource, MockFeeSource, QueueFeeSource, WalletWatcherFeeSource};
pub use report::{FileReportSink, MemoryReportSink};
pub use solana::{SolanaClient, SplTokenBurner, WalletManager};
