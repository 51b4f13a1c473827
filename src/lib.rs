//! Flywheel - Creator-Fee Buyback Engine for Solana
//!
//! Harvests accumulated creator fees on a fixed epoch cadence, converts a
//! configured share into the protocol token via a swap provider, burns a
//! fraction of the buyback, and deposits the remainder into a liquidity pool.
//!
//! # Modules
//!
//! - `domain`: Core business logic (CircuitBreaker, RiskManager, allocation planner, epoch report)
//! - `ports`: Trait abstractions (FeeSource, SwapProvider, LiquidityProvider, TokenBurner, ReportSink)
//! - `adapters`: External implementations (fee sources, mock DEX, Solana, webhook ingress, report writer, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: ExecutionEngine and EpochScheduler

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;
