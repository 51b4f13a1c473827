//! Risk Manager
//!
//! Enforces timing and magnitude safety bounds on epoch execution,
//! independent of the circuit breaker's failure-based gating. All validation
//! is pure given the immutable [`RiskParameters`]; the only mutable state is
//! the last successful execution timestamp.

use thiserror::Error;

use crate::domain::amount::format_sol;
use crate::domain::planner::AllocationPlan;

/// Immutable risk limits, supplied at construction
#[derive(Debug, Clone)]
pub struct RiskParameters {
    /// Hard cap on the total lamports an epoch may allocate
    pub max_budget_per_epoch_lamports: u64,
    /// Minimum seconds between two successful executions
    pub min_interval_seconds: u64,
    /// Maximum acceptable swap slippage in basis points
    pub max_slippage_bps: u32,
    /// Maximum acceptable swap price impact in basis points
    pub max_price_impact_bps: u32,
    /// Minimum pool liquidity in lamports for a liquidity add to be sane
    pub min_liquidity_threshold_lamports: u64,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskViolation {
    #[error("epoch total {0} SOL exceeds max budget per epoch {1} SOL")]
    BudgetExceeded(String, String),

    #[error("plan components exceed the epoch total by {0} lamports")]
    ComponentOverflow(u64),

    #[error("slippage {0}bps exceeds max {1}bps")]
    SlippageExceeded(u32, u32),

    #[error("price impact {0}bps exceeds max {1}bps")]
    PriceImpactExceeded(u32, u32),

    #[error("liquidity {0} SOL below minimum threshold {1} SOL")]
    LiquidityBelowThreshold(String, String),
}

/// Swap execution-quality figures checked against the configured caps
#[derive(Debug, Clone)]
pub struct SwapBounds {
    pub input_amount: u64,
    pub expected_output: u64,
    pub min_output_amount: u64,
    pub actual_slippage_bps: u32,
    pub price_impact_bps: u32,
}

/// Timing and magnitude gate for epoch execution
#[derive(Debug, Clone)]
pub struct RiskManager {
    params: RiskParameters,
    last_execution_at: Option<u64>,
}

impl RiskManager {
    pub fn new(params: RiskParameters) -> Self {
        Self {
            params,
            last_execution_at: None,
        }
    }

    /// Whether execution is allowed at `now` (unix seconds): true when no
    /// prior execution is recorded or the minimum interval has elapsed.
    pub fn can_execute_at(&self, now: u64) -> bool {
        let Some(last) = self.last_execution_at else {
            return true;
        };

        let elapsed = now.saturating_sub(last);
        if elapsed < self.params.min_interval_seconds {
            tracing::warn!(
                elapsed_seconds = elapsed,
                required_seconds = self.params.min_interval_seconds,
                "execution blocked: minimum interval not elapsed"
            );
            return false;
        }

        true
    }

    /// Validate an allocation plan. Returns the first violated reason only.
    pub fn validate_plan(&self, plan: &AllocationPlan) -> Result<(), RiskViolation> {
        if plan.total_lamports > self.params.max_budget_per_epoch_lamports {
            return Err(RiskViolation::BudgetExceeded(
                format_sol(plan.total_lamports),
                format_sol(self.params.max_budget_per_epoch_lamports),
            ));
        }

        // Amounts are unsigned, so negative components cannot exist; the
        // remaining invalid shape is components summing past the total.
        let allocated = plan
            .buyback_lamports
            .saturating_add(plan.liquidity_lamports)
            .saturating_add(plan.treasury_lamports);
        if allocated > plan.total_lamports {
            return Err(RiskViolation::ComponentOverflow(
                allocated - plan.total_lamports,
            ));
        }

        Ok(())
    }

    /// Validate swap execution-quality figures against the configured caps
    pub fn validate_swap(&self, bounds: &SwapBounds) -> Result<(), RiskViolation> {
        if bounds.actual_slippage_bps > self.params.max_slippage_bps {
            return Err(RiskViolation::SlippageExceeded(
                bounds.actual_slippage_bps,
                self.params.max_slippage_bps,
            ));
        }

        if bounds.price_impact_bps > self.params.max_price_impact_bps {
            return Err(RiskViolation::PriceImpactExceeded(
                bounds.price_impact_bps,
                self.params.max_price_impact_bps,
            ));
        }

        Ok(())
    }

    /// Validate that pool liquidity meets the configured floor
    pub fn validate_liquidity(&self, liquidity_lamports: u64) -> Result<(), RiskViolation> {
        if liquidity_lamports < self.params.min_liquidity_threshold_lamports {
            return Err(RiskViolation::LiquidityBelowThreshold(
                format_sol(liquidity_lamports),
                format_sol(self.params.min_liquidity_threshold_lamports),
            ));
        }

        Ok(())
    }

    /// Stamp the last execution time; called only after a fully successful
    /// epoch.
    pub fn record_execution_at(&mut self, now: u64) {
        self.last_execution_at = Some(now);
        tracing::info!(timestamp = now, "recorded execution timestamp");
    }

    /// Seconds until the next allowed execution, zero when already allowed
    pub fn time_until_next_execution(&self, now: u64) -> u64 {
        let Some(last) = self.last_execution_at else {
            return 0;
        };

        let elapsed = now.saturating_sub(last);
        self.params.min_interval_seconds.saturating_sub(elapsed)
    }

    pub fn params(&self) -> &RiskParameters {
        &self.params
    }

    pub fn last_execution_at(&self) -> Option<u64> {
        self.last_execution_at
    }
}
