//! Epoch Pipeline Integration Tests
//!
//! End-to-end scenarios over the execution engine and scheduler with mock
//! adapters:
//! 1. Dry-run epoch: full planning, zero transactions
//! 2. Circuit breaker: repeated failures trip, fourth attempt fails fast
//! 3. Scheduler mutual exclusion: concurrent trigger dropped, one report
//! 4. Budget rejection: validation aborts before any provider call
//!
//! All tests are deterministic (no real network calls).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use flywheel::adapters::dex::{MockLiquidityProvider, MockSwapProvider, MockTokenBurner};
use flywheel::adapters::fee_source::{MockFeeSource, QueueFeeSource};
use flywheel::adapters::report::MemoryReportSink;
use flywheel::adapters::webhook;
use flywheel::application::{
    EngineError, EngineSettings, EpochOutcome, EpochScheduler, ExecutionEngine, SkipReason,
};
use flywheel::domain::circuit_breaker::{CircuitBreaker, CircuitState};
use flywheel::domain::fee::FeeEvent;
use flywheel::domain::planner::AllocationConfig;
use flywheel::domain::risk::{RiskManager, RiskParameters};
use flywheel::ports::dex::{
    DexError, LiquidityProvider, SwapParams, SwapProvider, SwapQuote, SwapResult,
};
use flywheel::ports::fee_source::FeeSource;

// ============================================================================
// Test Fixtures
// ============================================================================

const TOKEN_MINT: &str = "FLYWHEELtokenMint1111111111111111111111111";

fn allocation(buyback: f64, liquidity: f64, treasury: f64, burn: f64) -> AllocationConfig {
    AllocationConfig {
        buyback_pct: buyback,
        liquidity_pct: liquidity,
        treasury_pct: treasury,
        burn_pct_of_buyback: burn,
    }
}

fn risk_params(max_budget_lamports: u64, min_interval_seconds: u64) -> RiskParameters {
    RiskParameters {
        max_budget_per_epoch_lamports: max_budget_lamports,
        min_interval_seconds,
        max_slippage_bps: 300,
        max_price_impact_bps: 500,
        min_liquidity_threshold_lamports: 0,
    }
}

struct Fixture {
    fee_source: Arc<MockFeeSource>,
    swap: Arc<MockSwapProvider>,
    liquidity: Arc<MockLiquidityProvider>,
    burner: Arc<MockTokenBurner>,
    sink: Arc<MemoryReportSink>,
}

impl Fixture {
    async fn new() -> Self {
        let fixture = Self {
            fee_source: Arc::new(MockFeeSource::new()),
            swap: Arc::new(MockSwapProvider::new()),
            liquidity: Arc::new(MockLiquidityProvider::new()),
            burner: Arc::new(MockTokenBurner::new()),
            sink: Arc::new(MemoryReportSink::new()),
        };
        fixture.fee_source.initialize().await.unwrap();
        fixture.swap.initialize().await.unwrap();
        fixture.liquidity.initialize().await.unwrap();
        fixture
    }

    fn engine(
        &self,
        settings: EngineSettings,
        params: RiskParameters,
        breaker: CircuitBreaker,
    ) -> Arc<ExecutionEngine> {
        Arc::new(ExecutionEngine::new(
            self.fee_source.clone(),
            self.swap.clone(),
            self.liquidity.clone(),
            self.burner.clone(),
            self.sink.clone(),
            RiskManager::new(params),
            breaker,
            settings,
        ))
    }
}

fn settings(alloc: AllocationConfig, dry_run: bool) -> EngineSettings {
    EngineSettings {
        token_mint: TOKEN_MINT.to_string(),
        allocation: alloc,
        swap_slippage_bps: 300,
        dry_run,
    }
}

// ============================================================================
// Scenario: dry run plans everything, executes nothing
// ============================================================================

#[tokio::test]
async fn dry_run_epoch_plans_without_transactions() {
    let fixture = Fixture::new().await;
    let engine = fixture.engine(
        settings(allocation(60.0, 40.0, 0.0, 25.0), true),
        risk_params(2_000_000_000, 0),
        CircuitBreaker::default(),
    );

    fixture
        .fee_source
        .inject(FeeEvent::native(1_000_000_000, 1_700_000_000));

    let outcome = engine.run_epoch(1).await.unwrap();
    let EpochOutcome::Completed(report) = outcome else {
        panic!("expected completed epoch");
    };

    assert!(report.dry_run);
    assert_eq!(report.plan.buyback_lamports, 600_000_000);
    assert_eq!(report.plan.liquidity_lamports, 400_000_000);
    assert_eq!(report.plan.treasury_lamports, 0);
    assert!(report.transactions.is_empty());

    // No provider saw a call
    assert_eq!(fixture.swap.quote_calls(), 0);
    assert_eq!(fixture.swap.swap_calls(), 0);
    assert_eq!(fixture.liquidity.add_calls(), 0);
    assert_eq!(fixture.burner.burn_calls(), 0);

    // Exactly one report, and the consumed fees are acknowledged
    assert_eq!(fixture.sink.written().len(), 1);
    assert!(fixture.fee_source.pending().is_empty());
}

// ============================================================================
// Scenario: circuit breaker trips after repeated failures
// ============================================================================

#[tokio::test]
async fn breaker_trips_after_three_failures_and_blocks_fourth() {
    let fixture = Fixture::new().await;
    let engine = fixture.engine(
        settings(allocation(60.0, 40.0, 0.0, 25.0), false),
        risk_params(2_000_000_000, 0),
        CircuitBreaker::new(3, 3_600),
    );

    fixture
        .fee_source
        .inject(FeeEvent::native(1_000_000_000, 1_700_000_000));
    fixture.swap.set_failing(true);

    for attempt in 1..=3 {
        let err = engine.run_epoch(attempt).await.unwrap_err();
        assert!(matches!(err, EngineError::Swap(_)), "attempt {attempt}");
    }
    assert_eq!(
        engine.gating_status().await.breaker_state,
        CircuitState::Open
    );

    // Fourth attempt inside the timeout window fails fast, without touching
    // the fee source
    let err = engine.run_epoch(4).await.unwrap_err();
    assert!(matches!(err, EngineError::CircuitOpen { .. }));

    // The fees were never acknowledged across any attempt
    assert_eq!(fixture.fee_source.pending().len(), 1);
}

// ============================================================================
// Scenario: overlapping triggers are dropped, one report per window
// ============================================================================

/// Swap provider that stalls mid-swap, keeping the first cycle in flight
struct SlowSwapProvider {
    inner: MockSwapProvider,
    delay: Duration,
}

#[async_trait]
impl SwapProvider for SlowSwapProvider {
    async fn initialize(&self) -> Result<(), DexError> {
        self.inner.initialize().await
    }

    async fn get_quote(&self, params: &SwapParams) -> Result<SwapQuote, DexError> {
        self.inner.get_quote(params).await
    }

    async fn swap(&self, params: &SwapParams) -> Result<SwapResult, DexError> {
        tokio::time::sleep(self.delay).await;
        self.inner.swap(params).await
    }

    async fn shutdown(&self) -> Result<(), DexError> {
        self.inner.shutdown().await
    }
}

#[tokio::test]
async fn concurrent_trigger_is_dropped_and_one_report_written() {
    let fixture = Fixture::new().await;

    let slow_swap = Arc::new(SlowSwapProvider {
        inner: MockSwapProvider::new(),
        delay: Duration::from_millis(100),
    });
    slow_swap.initialize().await.unwrap();

    let engine = Arc::new(ExecutionEngine::new(
        fixture.fee_source.clone(),
        slow_swap,
        fixture.liquidity.clone(),
        fixture.burner.clone(),
        fixture.sink.clone(),
        RiskManager::new(risk_params(2_000_000_000, 0)),
        CircuitBreaker::default(),
        settings(allocation(60.0, 40.0, 0.0, 0.0), false),
    ));

    fixture
        .fee_source
        .inject(FeeEvent::native(1_000_000_000, 1_700_000_000));

    let scheduler = Arc::new(EpochScheduler::new(engine, 3_600));

    // First trigger enters its swap and stalls there
    let first = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move { scheduler.trigger_now().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    // Second trigger arrives while the first cycle is still executing
    let second_ran = scheduler.trigger_now().await;
    let first_ran = first.await.unwrap();

    assert!(first_ran);
    assert!(!second_ran, "overlapping trigger must be dropped");

    assert_eq!(fixture.sink.written().len(), 1);
    assert_eq!(scheduler.stats().epochs_started, 1);
}

// ============================================================================
// Scenario: budget overflow rejected before any provider call
// ============================================================================

#[tokio::test]
async fn over_budget_plan_rejected_before_providers() {
    let fixture = Fixture::new().await;
    let engine = fixture.engine(
        settings(allocation(60.0, 40.0, 0.0, 25.0), false),
        // 1 SOL budget, 1.5 SOL of fees
        risk_params(1_000_000_000, 0),
        CircuitBreaker::default(),
    );

    fixture
        .fee_source
        .inject(FeeEvent::native(1_500_000_000, 1_700_000_000));

    let err = engine.run_epoch(1).await.unwrap_err();
    let EngineError::PlanRejected(violation) = &err else {
        panic!("expected plan rejection, got {err}");
    };

    // The reason names both the computed total and the configured maximum
    let reason = violation.to_string();
    assert!(reason.contains("1.5000"), "reason was: {reason}");
    assert!(reason.contains("1.0000"), "reason was: {reason}");

    assert_eq!(fixture.swap.quote_calls(), 0);
    assert_eq!(fixture.swap.swap_calls(), 0);
    assert_eq!(fixture.liquidity.add_calls(), 0);
}

// ============================================================================
// Minimum interval gating
// ============================================================================

#[tokio::test]
async fn second_epoch_within_interval_skips_without_work() {
    let fixture = Fixture::new().await;
    let engine = fixture.engine(
        settings(allocation(60.0, 40.0, 0.0, 0.0), true),
        risk_params(2_000_000_000, 900),
        CircuitBreaker::default(),
    );

    fixture
        .fee_source
        .inject(FeeEvent::native(1_000_000_000, 1_700_000_000));
    let outcome = engine.run_epoch(1).await.unwrap();
    assert!(matches!(outcome, EpochOutcome::Completed(_)));

    // New fees arrive, but the interval has not elapsed
    fixture
        .fee_source
        .inject(FeeEvent::native(500_000_000, 1_700_000_100));
    let outcome = engine.run_epoch(2).await.unwrap();
    assert!(matches!(
        outcome,
        EpochOutcome::Skipped(SkipReason::MinIntervalNotElapsed { .. })
    ));

    // The skip wrote no report and acknowledged nothing
    assert_eq!(fixture.sink.written().len(), 1);
    assert_eq!(fixture.fee_source.pending().len(), 1);
}

// ============================================================================
// Webhook ingress to engine, full path
// ============================================================================

#[tokio::test]
async fn webhook_event_flows_through_queue_into_epoch() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let queue = QueueFeeSource::new();
    queue.initialize().await.unwrap();
    let app = webhook::router(queue.clone(), None);

    let body = serde_json::json!({
        "amount": "1000000000",
        "mint": flywheel::domain::fee::NATIVE_MINT,
        "timestamp": 1_700_000_000u64,
    })
    .to_string();
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook/fees")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), axum::http::StatusCode::OK);

    let sink = Arc::new(MemoryReportSink::new());
    let engine = ExecutionEngine::new(
        Arc::new(queue.clone()),
        Arc::new(MockSwapProvider::new()),
        Arc::new(MockLiquidityProvider::new()),
        Arc::new(MockTokenBurner::new()),
        sink.clone(),
        RiskManager::new(risk_params(2_000_000_000, 0)),
        CircuitBreaker::default(),
        settings(allocation(60.0, 40.0, 0.0, 25.0), true),
    );

    let outcome = engine.run_epoch(1).await.unwrap();
    let EpochOutcome::Completed(report) = outcome else {
        panic!("expected completed epoch");
    };
    assert_eq!(report.plan.total_lamports, 1_000_000_000);

    // Acknowledged through the shared queue
    assert!(queue.is_empty());
    assert_eq!(sink.written().len(), 1);
}
