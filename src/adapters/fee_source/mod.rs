//! Fee Source Adapters
//!
//! Concrete fee ingestion variants, selected by configuration:
//! - `QueueFeeSource`: in-memory queue fed by the webhook ingress
//! - `MockFeeSource`: synthetic generator for development and tests
//! - `ApiFeeSource`: cursor-based HTTP polling
//! - `WalletWatcherFeeSource`: on-chain balance watcher

pub mod memory;
pub mod api;
pub mod wallet_watcher;

pub use api::ApiFeeSource;
pub use memory::{MockFeeSource, QueueFeeSource};
pub use wallet_watcher::WalletWatcherFeeSource;
