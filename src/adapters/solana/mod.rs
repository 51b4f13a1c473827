//! Solana Adapters
//!
//! RPC client wrapper, operator wallet management, and the SPL burn
//! implementation of the token-burn port.

pub mod rpc;
pub mod wallet;
pub mod burner;

pub use burner::SplTokenBurner;
pub use rpc::{SolanaClient, SolanaClientError};
pub use wallet::{WalletError, WalletManager};
