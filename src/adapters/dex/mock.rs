//! Mock DEX Adapters
//!
//! Deterministic simulated swap, liquidity, and burn implementations for
//! tests and non-live runs: a fixed 1:1000 fill rate with 2% price impact
//! and a 1% fee, and liquidity adds minting 1% of the deposited value as LP
//! tokens. Call counters and failure switches let tests drive error paths.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;

use crate::ports::burner::{BurnError, TokenBurner};
use crate::ports::dex::{
    DexError, LiquidityParams, LiquidityProvider, LiquidityResult, SwapParams, SwapProvider,
    SwapQuote, SwapResult,
};

/// Simulated SOL-to-token fill rate
const MOCK_FILL_RATE: u64 = 1_000;

/// Simulated price impact in basis points
const MOCK_PRICE_IMPACT_BPS: u32 = 200;

fn mock_signature(fill: char) -> String {
    format!("5{}", fill.to_string().repeat(87))
}

/// Simulated swap engine
#[derive(Debug, Default)]
pub struct MockSwapProvider {
    initialized: AtomicBool,
    failing: AtomicBool,
    price_impact_bps: AtomicU32,
    quote_calls: AtomicU32,
    swap_call_count: AtomicU32,
}

impl MockSwapProvider {
    pub fn new() -> Self {
        Self {
            price_impact_bps: AtomicU32::new(MOCK_PRICE_IMPACT_BPS),
            ..Self::default()
        }
    }

    /// Make every subsequent swap fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Override the simulated price impact
    pub fn set_price_impact_bps(&self, bps: u32) {
        self.price_impact_bps.store(bps, Ordering::SeqCst);
    }

    pub fn quote_calls(&self) -> u32 {
        self.quote_calls.load(Ordering::SeqCst)
    }

    pub fn swap_calls(&self) -> u32 {
        self.swap_call_count.load(Ordering::SeqCst)
    }

    fn quote_for(&self, params: &SwapParams) -> SwapQuote {
        SwapQuote {
            output_amount: params.amount_in.saturating_mul(MOCK_FILL_RATE),
            price_impact_bps: self.price_impact_bps.load(Ordering::SeqCst),
            fee: params.amount_in / 100,
        }
    }
}

#[async_trait]
impl SwapProvider for MockSwapProvider {
    async fn initialize(&self) -> Result<(), DexError> {
        tracing::info!("MockSwapProvider initialized");
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn get_quote(&self, params: &SwapParams) -> Result<SwapQuote, DexError> {
        if !self.initialized.load(Ordering::SeqCst) {
            return Err(DexError::NotInitialized);
        }

        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        let quote = self.quote_for(params);
        tracing::debug!(
            amount_in = params.amount_in,
            output_amount = quote.output_amount,
            price_impact_bps = quote.price_impact_bps,
            "mock quote"
        );
        Ok(quote)
    }

    async fn swap(&self, params: &SwapParams) -> Result<SwapResult, DexError> {
        if !self.initialized.load(Ordering::SeqCst) {
            return Err(DexError::NotInitialized);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(DexError::Execution("simulated swap failure".to_string()));
        }

        let quote = self.quote_for(params);
        if params
            .min_output_amount
            .is_some_and(|floor| quote.output_amount < floor)
        {
            return Err(DexError::SlippageExceeded);
        }

        self.swap_call_count.fetch_add(1, Ordering::SeqCst);
        let result = SwapResult {
            signature: mock_signature('x'),
            amount_in: params.amount_in,
            amount_out: quote.output_amount,
            price_impact_bps: quote.price_impact_bps,
        };

        tracing::info!(
            amount_in = result.amount_in,
            amount_out = result.amount_out,
            "mock swap executed"
        );
        Ok(result)
    }

    async fn shutdown(&self) -> Result<(), DexError> {
        tracing::info!("MockSwapProvider shutdown");
        self.initialized.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Simulated liquidity-pool adapter
#[derive(Debug, Default)]
pub struct MockLiquidityProvider {
    initialized: AtomicBool,
    failing: AtomicBool,
    add_call_count: AtomicU32,
}

impl MockLiquidityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn add_calls(&self) -> u32 {
        self.add_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LiquidityProvider for MockLiquidityProvider {
    async fn initialize(&self) -> Result<(), DexError> {
        tracing::info!("MockLiquidityProvider initialized");
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn add_liquidity(&self, params: &LiquidityParams) -> Result<LiquidityResult, DexError> {
        if !self.initialized.load(Ordering::SeqCst) {
            return Err(DexError::NotInitialized);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(DexError::Execution(
                "simulated liquidity failure".to_string(),
            ));
        }

        self.add_call_count.fetch_add(1, Ordering::SeqCst);
        // LP tokens minted as 1% of deposited value
        let lp_tokens_received =
            params.token_amount.saturating_add(params.quote_amount) / 100;

        let result = LiquidityResult {
            signature: mock_signature('y'),
            token_amount: params.token_amount,
            quote_amount: params.quote_amount,
            lp_tokens_received,
        };

        tracing::info!(
            token_amount = result.token_amount,
            quote_amount = result.quote_amount,
            lp_tokens = result.lp_tokens_received,
            "mock liquidity added"
        );
        Ok(result)
    }

    async fn shutdown(&self) -> Result<(), DexError> {
        tracing::info!("MockLiquidityProvider shutdown");
        self.initialized.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Simulated token burner
#[derive(Debug, Default)]
pub struct MockTokenBurner {
    fail_next: AtomicBool,
    burn_call_count: AtomicU32,
}

impl MockTokenBurner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next burn fail once
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn burn_calls(&self) -> u32 {
        self.burn_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenBurner for MockTokenBurner {
    async fn burn(&self, mint: &str, amount: u64) -> Result<String, BurnError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(BurnError::Transaction(
                "simulated burn failure".to_string(),
            ));
        }

        self.burn_call_count.fetch_add(1, Ordering::SeqCst);
        tracing::info!(%mint, amount, "mock burn executed");
        Ok(mock_signature('z'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swap_params(amount_in: u64) -> SwapParams {
        SwapParams {
            input_mint: crate::domain::fee::NATIVE_MINT.to_string(),
            output_mint: "TokenMint111111111111111111111111111111111".to_string(),
            amount_in,
            slippage_bps: 300,
            min_output_amount: None,
        }
    }

    #[tokio::test]
    async fn test_quote_uses_fixed_rate() {
        let provider = MockSwapProvider::new();
        provider.initialize().await.unwrap();

        let quote = provider.get_quote(&swap_params(1_000_000)).await.unwrap();
        assert_eq!(quote.output_amount, 1_000_000_000);
        assert_eq!(quote.price_impact_bps, 200);
        assert_eq!(quote.fee, 10_000);
    }

    #[tokio::test]
    async fn test_swap_requires_initialization() {
        let provider = MockSwapProvider::new();
        let err = provider.swap(&swap_params(1_000)).await.unwrap_err();
        assert!(matches!(err, DexError::NotInitialized));
    }

    #[tokio::test]
    async fn test_swap_respects_min_output() {
        let provider = MockSwapProvider::new();
        provider.initialize().await.unwrap();

        let mut params = swap_params(1_000_000);
        params.min_output_amount = Some(2_000_000_000);
        let err = provider.swap(&params).await.unwrap_err();
        assert!(matches!(err, DexError::SlippageExceeded));
        assert_eq!(provider.swap_calls(), 0);
    }

    #[tokio::test]
    async fn test_swap_failure_switch() {
        let provider = MockSwapProvider::new();
        provider.initialize().await.unwrap();
        provider.set_failing(true);

        assert!(provider.swap(&swap_params(1_000)).await.is_err());
        provider.set_failing(false);
        assert!(provider.swap(&swap_params(1_000)).await.is_ok());
    }

    #[tokio::test]
    async fn test_liquidity_mints_one_percent() {
        let provider = MockLiquidityProvider::new();
        provider.initialize().await.unwrap();

        let result = provider
            .add_liquidity(&LiquidityParams {
                token_mint: "TokenMint111111111111111111111111111111111".to_string(),
                quote_mint: crate::domain::fee::NATIVE_MINT.to_string(),
                token_amount: 600,
                quote_amount: 400,
                slippage_bps: None,
            })
            .await
            .unwrap();

        assert_eq!(result.lp_tokens_received, 10);
        assert_eq!(provider.add_calls(), 1);
    }

    #[tokio::test]
    async fn test_burner_fail_next_is_one_shot() {
        let burner = MockTokenBurner::new();
        burner.fail_next();

        assert!(burner.burn("mint", 100).await.is_err());
        assert!(burner.burn("mint", 100).await.is_ok());
        assert_eq!(burner.burn_calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_signatures_have_solana_shape() {
        let burner = MockTokenBurner::new();
        let signature = burner.burn("mint", 1).await.unwrap();
        assert_eq!(signature.len(), 88);
        assert!(signature.starts_with('5'));
    }
}
