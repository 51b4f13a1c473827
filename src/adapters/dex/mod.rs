//! DEX Adapters
//!
//! In-repo implementations of the swap/liquidity ports. Real AMM adapters
//! are external; the mock is used for tests, dry runs, and development.

pub mod mock;

pub use mock::{MockLiquidityProvider, MockSwapProvider, MockTokenBurner};
