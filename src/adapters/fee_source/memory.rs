//! In-Memory Fee Sources
//!
//! [`QueueFeeSource`] holds webhook-pushed events until the engine consumes
//! and acknowledges them. [`MockFeeSource`] generates synthetic events for
//! development and tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rand::Rng;

use crate::domain::fee::{FeeEvent, NATIVE_MINT};
use crate::ports::fee_source::{FeeSource, FeeSourceError};

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Webhook-fed FIFO of fee events.
///
/// Cloning shares the underlying queue, so the webhook server and the
/// engine operate on the same state.
#[derive(Debug, Clone, Default)]
pub struct QueueFeeSource {
    inner: Arc<QueueInner>,
}

#[derive(Debug, Default)]
struct QueueInner {
    initialized: AtomicBool,
    queue: Mutex<Vec<FeeEvent>>,
}

impl QueueFeeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue an event received over the webhook ingress
    pub fn push(&self, fee: FeeEvent) {
        tracing::info!(
            amount = fee.amount,
            mint = %fee.mint,
            "received webhook fee event"
        );
        self.inner.queue.lock().unwrap().push(fee);
    }

    /// Current queue depth
    pub fn len(&self) -> usize {
        self.inner.queue.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl FeeSource for QueueFeeSource {
    async fn initialize(&self) -> Result<(), FeeSourceError> {
        tracing::info!("QueueFeeSource initialized (events pushed via webhook ingress)");
        self.inner.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn available_fees(&self) -> Result<Vec<FeeEvent>, FeeSourceError> {
        if !self.inner.initialized.load(Ordering::SeqCst) {
            return Err(FeeSourceError::NotInitialized);
        }

        let fees = self.inner.queue.lock().unwrap().clone();
        tracing::debug!(count = fees.len(), "retrieved fees from webhook queue");
        Ok(fees)
    }

    async fn acknowledge_fees(&self, fees: &[FeeEvent]) -> Result<(), FeeSourceError> {
        if !self.inner.initialized.load(Ordering::SeqCst) {
            return Err(FeeSourceError::NotInitialized);
        }

        let mut queue = self.inner.queue.lock().unwrap();
        queue.retain(|pending| !fees.contains(pending));
        tracing::info!(count = fees.len(), "acknowledged fees");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), FeeSourceError> {
        tracing::info!("QueueFeeSource shutdown");
        self.inner.initialized.store(false, Ordering::SeqCst);
        self.inner.queue.lock().unwrap().clear();
        Ok(())
    }
}

/// Synthetic fee generator for development and tests
#[derive(Debug, Default)]
pub struct MockFeeSource {
    initialized: AtomicBool,
    generate_on_get: bool,
    base_amount: u64,
    fees: Mutex<Vec<FeeEvent>>,
}

impl MockFeeSource {
    /// Inject-driven source: returns only what tests push in
    pub fn new() -> Self {
        Self::default()
    }

    /// Self-generating source: fabricates one fee of roughly `base_amount`
    /// lamports whenever the queue is drained
    pub fn generating(base_amount: u64) -> Self {
        Self {
            generate_on_get: true,
            base_amount,
            ..Self::default()
        }
    }

    /// Manually inject a fee
    pub fn inject(&self, fee: FeeEvent) {
        tracing::debug!(amount = fee.amount, "injected mock fee");
        self.fees.lock().unwrap().push(fee);
    }

    /// Events currently pending acknowledgment
    pub fn pending(&self) -> Vec<FeeEvent> {
        self.fees.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeeSource for MockFeeSource {
    async fn initialize(&self) -> Result<(), FeeSourceError> {
        tracing::info!("MockFeeSource initialized (synthetic fees)");
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn available_fees(&self) -> Result<Vec<FeeEvent>, FeeSourceError> {
        if !self.initialized.load(Ordering::SeqCst) {
            return Err(FeeSourceError::NotInitialized);
        }

        let mut fees = self.fees.lock().unwrap();
        if self.generate_on_get && fees.is_empty() {
            // Base amount plus up to 0.05 SOL of jitter
            let jitter = rand::thread_rng().gen_range(0..50_000_000);
            let amount = self.base_amount.saturating_add(jitter);

            let mut metadata = serde_json::Map::new();
            metadata.insert("source".to_string(), "mock".into());
            fees.push(FeeEvent {
                amount,
                mint: NATIVE_MINT.to_string(),
                timestamp: unix_now(),
                signature: None,
                metadata: Some(metadata),
            });

            tracing::info!(amount, "generated mock fee");
        }

        Ok(fees.clone())
    }

    async fn acknowledge_fees(&self, fees: &[FeeEvent]) -> Result<(), FeeSourceError> {
        if !self.initialized.load(Ordering::SeqCst) {
            return Err(FeeSourceError::NotInitialized);
        }

        self.fees.lock().unwrap().retain(|pending| !fees.contains(pending));
        tracing::info!(count = fees.len(), "acknowledged mock fees");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), FeeSourceError> {
        tracing::info!("MockFeeSource shutdown");
        self.initialized.store(false, Ordering::SeqCst);
        self.fees.lock().unwrap().clear();
        Ok(())
    }
}
