//! Fee source port
//!
//! Abstraction over where creator fees come from: a webhook-fed queue, a
//! polled API, an on-chain wallet watcher, or a synthetic generator.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::fee::FeeEvent;

#[derive(Debug, Error)]
pub enum FeeSourceError {
    #[error("fee source not initialized")]
    NotInitialized,
    #[error("fee API request failed: {0}")]
    Api(String),
    #[error("RPC request failed: {0}")]
    Rpc(String),
    #[error("malformed fee payload: {0}")]
    Malformed(String),
}

/// Supplies pending fee events to the execution engine
#[async_trait]
pub trait FeeSource: Send + Sync {
    async fn initialize(&self) -> Result<(), FeeSourceError>;

    /// Fees accumulated since the last acknowledgment.
    ///
    /// Must be safe to call repeatedly: without an intervening
    /// acknowledgment, the same pending events are returned again (push
    /// sources may return a superset as new events arrive).
    async fn available_fees(&self) -> Result<Vec<FeeEvent>, FeeSourceError>;

    /// Mark the given events as consumed; they are never returned again
    async fn acknowledge_fees(&self, fees: &[FeeEvent]) -> Result<(), FeeSourceError>;

    async fn shutdown(&self) -> Result<(), FeeSourceError>;
}
