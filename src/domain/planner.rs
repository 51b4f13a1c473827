//! Allocation Planner
//!
//! Pure function turning an epoch's fee total into a percentage-based
//! allocation plan. Each component is computed by independent truncating
//! multiplication (see [`crate::domain::amount::percentage`]); no
//! rounding-error correction is applied, so the components may under-run the
//! total by up to two lamports.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::amount::percentage;

/// Tolerance on the percentage-sum check, in percent
const PCT_SUM_TOLERANCE: f64 = 0.01;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    #[error("allocation percentages must sum to 100, got {0} (buyback {1}, liquidity {2}, treasury {3})")]
    BadSum(f64, f64, f64, f64),

    #[error("{0} percentage {1} outside 0..=100")]
    OutOfRange(&'static str, f64),
}

/// Configured fee split, validated once at configuration load
#[derive(Debug, Clone, Deserialize)]
pub struct AllocationConfig {
    /// Share of the epoch total swapped into the protocol token
    pub buyback_pct: f64,
    /// Share of the epoch total deposited into the liquidity pool
    pub liquidity_pct: f64,
    /// Share of the epoch total retained for the treasury
    pub treasury_pct: f64,
    /// Fraction of the buyback's swap output that is burned
    pub burn_pct_of_buyback: f64,
}

impl AllocationConfig {
    /// Check ranges and that the three split percentages sum to 100.
    /// Called at configuration time, never per epoch.
    pub fn validate(&self) -> Result<(), AllocationError> {
        for (name, pct) in [
            ("buyback", self.buyback_pct),
            ("liquidity", self.liquidity_pct),
            ("treasury", self.treasury_pct),
            ("burn-of-buyback", self.burn_pct_of_buyback),
        ] {
            if !(0.0..=100.0).contains(&pct) {
                return Err(AllocationError::OutOfRange(name, pct));
            }
        }

        let sum = self.buyback_pct + self.liquidity_pct + self.treasury_pct;
        if (sum - 100.0).abs() > PCT_SUM_TOLERANCE {
            return Err(AllocationError::BadSum(
                sum,
                self.buyback_pct,
                self.liquidity_pct,
                self.treasury_pct,
            ));
        }

        Ok(())
    }
}

/// Lamport split of one epoch's fee total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub buyback_lamports: u64,
    pub liquidity_lamports: u64,
    pub treasury_lamports: u64,
    pub total_lamports: u64,
}

impl AllocationPlan {
    /// Lamports left unallocated by truncation; at most two when the
    /// configured percentages sum to exactly 100
    pub fn unallocated(&self) -> u64 {
        let allocated = self
            .buyback_lamports
            .saturating_add(self.liquidity_lamports)
            .saturating_add(self.treasury_lamports);
        self.total_lamports.saturating_sub(allocated)
    }
}

/// Build an allocation plan from an epoch fee total
pub fn build_plan(total_lamports: u64, allocation: &AllocationConfig) -> AllocationPlan {
    AllocationPlan {
        buyback_lamports: percentage(total_lamports, allocation.buyback_pct),
        liquidity_lamports: percentage(total_lamports, allocation.liquidity_pct),
        treasury_lamports: percentage(total_lamports, allocation.treasury_pct),
        total_lamports,
    }
}
