//! Wallet Watcher Fee Source
//!
//! Monitors a fee-collector wallet's SOL balance and turns balance growth
//! over a high-water mark into synthetic fee events. The mark only advances
//! on acknowledgment, so a failed epoch retries the same delta.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::adapters::solana::rpc::SolanaClient;
use crate::domain::fee::FeeEvent;
use crate::ports::fee_source::{FeeSource, FeeSourceError};

#[derive(Debug, Default)]
struct WatcherState {
    initialized: bool,
    /// Balance already accounted for (acknowledged)
    high_water: u64,
    pending: Vec<FeeEvent>,
}

/// Balance-delta watcher over a collector wallet
pub struct WalletWatcherFeeSource {
    rpc: SolanaClient,
    wallet_address: String,
    state: Mutex<WatcherState>,
}

impl WalletWatcherFeeSource {
    pub fn new(rpc: SolanaClient, wallet_address: String) -> Self {
        Self {
            rpc,
            wallet_address,
            state: Mutex::new(WatcherState::default()),
        }
    }
}

/// New lamports beyond what is already tracked, if any
fn detect_delta(balance: u64, high_water: u64, pending_total: u64) -> Option<u64> {
    let tracked = high_water.saturating_add(pending_total);
    (balance > tracked).then(|| balance - tracked)
}

#[async_trait]
impl FeeSource for WalletWatcherFeeSource {
    async fn initialize(&self) -> Result<(), FeeSourceError> {
        let balance = self
            .rpc
            .get_balance(&self.wallet_address)
            .await
            .map_err(|e| FeeSourceError::Rpc(e.to_string()))?;

        let mut state = self.state.lock().await;
        // The pre-existing balance is not fees
        state.high_water = balance;
        state.initialized = true;

        tracing::info!(
            wallet = %self.wallet_address,
            baseline_lamports = balance,
            "WalletWatcherFeeSource initialized"
        );
        Ok(())
    }

    async fn available_fees(&self) -> Result<Vec<FeeEvent>, FeeSourceError> {
        let mut state = self.state.lock().await;
        if !state.initialized {
            return Err(FeeSourceError::NotInitialized);
        }

        let balance = self
            .rpc
            .get_balance(&self.wallet_address)
            .await
            .map_err(|e| FeeSourceError::Rpc(e.to_string()))?;

        let pending_total: u64 = state.pending.iter().map(|f| f.amount).sum();
        if let Some(delta) = detect_delta(balance, state.high_water, pending_total) {
            let timestamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs();
            tracing::info!(delta_lamports = delta, "collector wallet balance grew");
            state.pending.push(FeeEvent::native(delta, timestamp));
        }

        Ok(state.pending.clone())
    }

    async fn acknowledge_fees(&self, fees: &[FeeEvent]) -> Result<(), FeeSourceError> {
        let mut state = self.state.lock().await;
        if !state.initialized {
            return Err(FeeSourceError::NotInitialized);
        }

        let acked: u64 = fees.iter().map(|f| f.amount).sum();
        state.high_water = state.high_water.saturating_add(acked);
        state.pending.retain(|pending| !fees.contains(pending));

        tracing::info!(count = fees.len(), acked_lamports = acked, "acknowledged fees");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), FeeSourceError> {
        tracing::info!("WalletWatcherFeeSource shutdown");
        let mut state = self.state.lock().await;
        state.initialized = false;
        state.pending.clear();
        Ok(())
    }
}
