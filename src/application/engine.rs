//! Execution Engine
//!
//! The control-flow hub of the flywheel: runs one epoch end-to-end through
//! gating (circuit breaker + minimum interval), fee retrieval, allocation
//! planning, validation, buyback swap, burn, liquidity add, reporting, and
//! fee acknowledgment.
//!
//! Failure handling follows one rule: any failure after gating counts as a
//! circuit-breaker failure and leaves the fees unacknowledged, so they are
//! retried next epoch (at-least-once processing; downstream idempotency is
//! the provider's responsibility).

use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::amount::{apply_slippage, format_sol, percentage};
use crate::domain::circuit_breaker::CircuitBreaker;
use crate::domain::fee::{NATIVE_MINT, total_native_lamports};
use crate::domain::planner::{AllocationConfig, build_plan};
use crate::domain::report::{EpochReport, ReportedFee, TransactionRecord};
use crate::domain::risk::{RiskManager, RiskViolation, SwapBounds};
use crate::ports::burner::{BurnError, TokenBurner};
use crate::ports::dex::{
    DexError, LiquidityParams, LiquidityProvider, SwapParams, SwapProvider,
};
use crate::ports::fee_source::{FeeSource, FeeSourceError};
use crate::ports::reporting::{ReportError, ReportSink};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("circuit breaker is open (next attempt at unix {next_attempt_at:?})")]
    CircuitOpen { next_attempt_at: Option<u64> },

    #[error("execution plan rejected: {0}")]
    PlanRejected(#[from] RiskViolation),

    #[error("buyback quote rejected: {0}")]
    QuoteRejected(#[source] RiskViolation),

    #[error("fee retrieval failed: {0}")]
    FeeSource(#[source] FeeSourceError),

    #[error("buyback swap failed: {0}")]
    Swap(#[source] DexError),

    #[error("token burn failed: {0}")]
    Burn(#[source] BurnError),

    #[error("liquidity add failed: {0}")]
    Liquidity(#[source] DexError),

    #[error("report persistence failed: {0}")]
    Report(#[source] ReportError),

    #[error("fee acknowledgment failed: {0}")]
    Acknowledge(#[source] FeeSourceError),
}

/// Why an epoch completed without doing any work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Minimum interval since the last successful epoch has not elapsed
    MinIntervalNotElapsed { remaining_seconds: u64 },
    /// The fee source had nothing pending
    NoFees,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MinIntervalNotElapsed { remaining_seconds } => {
                write!(f, "minimum interval not elapsed ({remaining_seconds}s remaining)")
            }
            SkipReason::NoFees => write!(f, "no fees available"),
        }
    }
}

/// Outcome of one epoch attempt
#[derive(Debug)]
pub enum EpochOutcome {
    /// The epoch ran to completion and its report was persisted
    Completed(EpochReport),
    /// Nothing to do; not an error and not a circuit-breaker event
    Skipped(SkipReason),
}

/// Engine settings fixed at construction
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Mint address of the protocol token bought back and burned
    pub token_mint: String,
    pub allocation: AllocationConfig,
    /// Slippage bound passed to the swap provider, in basis points
    pub swap_slippage_bps: u32,
    /// When set, plan and validate but never call a provider
    pub dry_run: bool,
}

/// Runs one epoch end-to-end; shared safely across the scheduler and manual
/// triggers (the scheduler's guard serializes epochs)
pub struct ExecutionEngine {
    fee_source: Arc<dyn FeeSource>,
    swap: Arc<dyn SwapProvider>,
    liquidity: Arc<dyn LiquidityProvider>,
    burner: Arc<dyn TokenBurner>,
    report_sink: Arc<dyn ReportSink>,
    risk: Mutex<RiskManager>,
    breaker: Mutex<CircuitBreaker>,
    settings: EngineSettings,
}

impl ExecutionEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        fee_source: Arc<dyn FeeSource>,
        swap: Arc<dyn SwapProvider>,
        liquidity: Arc<dyn LiquidityProvider>,
        burner: Arc<dyn TokenBurner>,
        report_sink: Arc<dyn ReportSink>,
        risk: RiskManager,
        breaker: CircuitBreaker,
        settings: EngineSettings,
    ) -> Self {
        Self {
            fee_source,
            swap,
            liquidity,
            burner,
            report_sink,
            risk: Mutex::new(risk),
            breaker: Mutex::new(breaker),
            settings,
        }
    }

    /// Run one epoch. `epoch_id` comes from the scheduler and is only used
    /// for report correlation.
    pub async fn run_epoch(&self, epoch_id: u64) -> Result<EpochOutcome, EngineError> {
        let now = unix_now();

        // Gating: a refused epoch has no side effects and is not a new
        // breaker failure
        {
            let mut breaker = self.breaker.lock().await;
            if !breaker.can_execute(now) {
                return Err(EngineError::CircuitOpen {
                    next_attempt_at: breaker.next_attempt_at(),
                });
            }
        }

        {
            let risk = self.risk.lock().await;
            if !risk.can_execute_at(now) {
                let remaining = risk.time_until_next_execution(now);
                tracing::info!(epoch_id, remaining_seconds = remaining, "epoch skipped");
                return Ok(EpochOutcome::Skipped(SkipReason::MinIntervalNotElapsed {
                    remaining_seconds: remaining,
                }));
            }
        }

        match self.execute_epoch(epoch_id).await {
            Ok(outcome) => {
                if matches!(outcome, EpochOutcome::Completed(_)) {
                    let now = unix_now();
                    self.risk.lock().await.record_execution_at(now);
                    self.breaker.lock().await.record_success();
                }
                Ok(outcome)
            }
            Err(err) => {
                self.breaker.lock().await.record_failure(unix_now());
                Err(err)
            }
        }
    }

    /// Operator override: force the circuit breaker closed
    pub async fn reset_breaker(&self) {
        self.breaker.lock().await.reset();
    }

    /// Snapshot of gating state for status output
    pub async fn gating_status(&self) -> GatingStatus {
        let now = unix_now();
        let breaker = self.breaker.lock().await;
        let risk = self.risk.lock().await;
        GatingStatus {
            breaker_state: breaker.state(),
            failure_count: breaker.failure_count(),
            next_attempt_at: breaker.next_attempt_at(),
            last_execution_at: risk.last_execution_at(),
            seconds_until_next_execution: risk.time_until_next_execution(now),
        }
    }

    async fn execute_epoch(&self, epoch_id: u64) -> Result<EpochOutcome, EngineError> {
        let fees = self
            .fee_source
            .available_fees()
            .await
            .map_err(EngineError::FeeSource)?;

        if fees.is_empty() {
            tracing::info!(epoch_id, "no fees available, skipping epoch");
            return Ok(EpochOutcome::Skipped(SkipReason::NoFees));
        }

        let total_lamports = total_native_lamports(&fees);
        tracing::info!(
            epoch_id,
            total_sol = %format_sol(total_lamports),
            fee_count = fees.len(),
            "fees collected"
        );

        let plan = build_plan(total_lamports, &self.settings.allocation);
        tracing::info!(epoch_id, ?plan, "execution plan built");

        self.risk.lock().await.validate_plan(&plan)?;

        // Side effects run sequentially; the transaction list accumulates
        // incrementally so a best-effort report survives a mid-epoch failure
        let mut transactions = Vec::new();
        let result = self.execute_plan(&plan, &mut transactions).await;

        let mut report = EpochReport {
            epoch_id,
            timestamp: rfc3339_now(),
            dry_run: self.settings.dry_run,
            fees: fees.iter().map(ReportedFee::from).collect(),
            plan,
            transactions,
            summary: String::new(),
            error: result.as_ref().err().map(|e| e.to_string()),
        };
        report.summary = report.render_summary();

        match result {
            Ok(()) => {
                self.report_sink
                    .write_report(&report)
                    .await
                    .map_err(EngineError::Report)?;
                tracing::info!(epoch_id, "report written");

                self.fee_source
                    .acknowledge_fees(&fees)
                    .await
                    .map_err(EngineError::Acknowledge)?;

                tracing::info!(epoch_id, "epoch completed successfully");
                Ok(EpochOutcome::Completed(report))
            }
            Err(err) => {
                // Partial on-chain effects may exist; persist what completed
                // without masking the primary error
                if let Err(report_err) = self.report_sink.write_report(&report).await {
                    tracing::warn!(
                        epoch_id,
                        error = %report_err,
                        "failed to write best-effort failure report"
                    );
                } else {
                    tracing::info!(epoch_id, "best-effort failure report written");
                }
                Err(err)
            }
        }
    }

    async fn execute_plan(
        &self,
        plan: &crate::domain::planner::AllocationPlan,
        transactions: &mut Vec<TransactionRecord>,
    ) -> Result<(), EngineError> {
        if plan.buyback_lamports > 0 {
            self.execute_buyback(plan.buyback_lamports, transactions)
                .await?;
        }

        if plan.liquidity_lamports > 0 {
            self.execute_liquidity_add(plan.liquidity_lamports, transactions)
                .await?;
        }

        Ok(())
    }

    async fn execute_buyback(
        &self,
        amount_lamports: u64,
        transactions: &mut Vec<TransactionRecord>,
    ) -> Result<(), EngineError> {
        tracing::info!(amount_sol = %format_sol(amount_lamports), "executing buyback");

        if self.settings.dry_run {
            tracing::info!("[dry run] would swap SOL into the protocol token");
            return Ok(());
        }

        let params = SwapParams {
            input_mint: NATIVE_MINT.to_string(),
            output_mint: self.settings.token_mint.clone(),
            amount_in: amount_lamports,
            slippage_bps: self.settings.swap_slippage_bps,
            min_output_amount: None,
        };

        // Pre-trade quality check: reject before anything hits the chain
        let quote = self.swap.get_quote(&params).await.map_err(EngineError::Swap)?;
        let min_output = apply_slippage(quote.output_amount, self.settings.swap_slippage_bps);
        self.risk
            .lock()
            .await
            .validate_swap(&SwapBounds {
                input_amount: amount_lamports,
                expected_output: quote.output_amount,
                min_output_amount: min_output,
                actual_slippage_bps: self.settings.swap_slippage_bps,
                price_impact_bps: quote.price_impact_bps,
            })
            .map_err(EngineError::QuoteRejected)?;

        let swap_result = self
            .swap
            .swap(&SwapParams {
                min_output_amount: Some(min_output),
                ..params
            })
            .await
            .map_err(EngineError::Swap)?;

        tracing::info!(
            signature = %swap_result.signature,
            amount_out = swap_result.amount_out,
            "buyback executed"
        );
        transactions.push(TransactionRecord::Buyback {
            signature: swap_result.signature.clone(),
            amount_in: swap_result.amount_in,
            amount_out: swap_result.amount_out,
        });

        let burn_amount = percentage(
            swap_result.amount_out,
            self.settings.allocation.burn_pct_of_buyback,
        );
        if burn_amount > 0 {
            tracing::info!(burn_amount, "burning buyback share");
            let signature = self
                .burner
                .burn(&self.settings.token_mint, burn_amount)
                .await
                .map_err(EngineError::Burn)?;

            tracing::info!(%signature, burn_amount, "burn executed");
            transactions.push(TransactionRecord::Burn {
                signature,
                amount: burn_amount,
            });
        }

        Ok(())
    }

    async fn execute_liquidity_add(
        &self,
        amount_lamports: u64,
        transactions: &mut Vec<TransactionRecord>,
    ) -> Result<(), EngineError> {
        tracing::info!(amount_sol = %format_sol(amount_lamports), "adding liquidity");

        if self.settings.dry_run {
            tracing::info!("[dry run] would add liquidity");
            return Ok(());
        }

        let result = self
            .liquidity
            .add_liquidity(&LiquidityParams {
                token_mint: self.settings.token_mint.clone(),
                quote_mint: NATIVE_MINT.to_string(),
                // TODO: derive the token leg from pool price for balanced
                // deposits; quote-side only until the adapter supports it
                token_amount: 0,
                quote_amount: amount_lamports,
                slippage_bps: None,
            })
            .await
            .map_err(EngineError::Liquidity)?;

        tracing::info!(
            signature = %result.signature,
            lp_tokens = result.lp_tokens_received,
            "liquidity added"
        );
        transactions.push(TransactionRecord::AddLiquidity {
            signature: result.signature,
            quote_amount: result.quote_amount,
            lp_tokens: result.lp_tokens_received,
        });

        Ok(())
    }
}

/// Gating state snapshot for status output
#[derive(Debug, Clone)]
pub struct GatingStatus {
    pub breaker_state: crate::domain::circuit_breaker::CircuitState,
    pub failure_count: u32,
    pub next_attempt_at: Option<u64>,
    pub last_execution_at: Option<u64>,
    pub seconds_until_next_execution: u64,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn rfc3339_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
