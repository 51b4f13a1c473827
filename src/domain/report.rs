//! Epoch Reports
//!
//! Append-only record of one epoch attempt: the raw fee events, the
//! allocation plan, every transaction that completed, and a human-readable
//! summary. Reports for failed epochs carry the error and whatever
//! transactions finished before the failure.

use serde::{Deserialize, Serialize};

use crate::domain::amount::format_sol;
use crate::domain::fee::FeeEvent;
use crate::domain::planner::AllocationPlan;

/// Raw fee event as listed in a report; amounts are stringified so the
/// JSON survives consumers that truncate large integers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportedFee {
    pub amount: String,
    pub mint: String,
    pub timestamp: u64,
}

impl From<&FeeEvent> for ReportedFee {
    fn from(fee: &FeeEvent) -> Self {
        Self {
            amount: fee.amount.to_string(),
            mint: fee.mint.clone(),
            timestamp: fee.timestamp,
        }
    }
}

/// One completed on-chain action within an epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionRecord {
    Buyback {
        signature: String,
        amount_in: u64,
        amount_out: u64,
    },
    Burn {
        signature: String,
        amount: u64,
    },
    AddLiquidity {
        signature: String,
        quote_amount: u64,
        lp_tokens: u64,
    },
}

/// Record of one epoch attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochReport {
    pub epoch_id: u64,
    /// RFC 3339 timestamp of the attempt
    pub timestamp: String,
    pub dry_run: bool,
    pub fees: Vec<ReportedFee>,
    pub plan: AllocationPlan,
    pub transactions: Vec<TransactionRecord>,
    pub summary: String,
    /// Populated on best-effort reports written for failed epochs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EpochReport {
    /// Total tokens burned across the epoch's burn transactions
    pub fn burned_tokens(&self) -> u64 {
        self.transactions
            .iter()
            .map(|tx| match tx {
                TransactionRecord::Burn { amount, .. } => *amount,
                _ => 0,
            })
            .sum()
    }

    /// Compose the human-readable summary from the plan and transaction
    /// list. The result is what lands in the plain-text summary artifact.
    pub fn render_summary(&self) -> String {
        let mode = if self.error.is_some() {
            "FAILED"
        } else if self.dry_run {
            "DRY RUN"
        } else {
            "LIVE"
        };

        format!(
            "Epoch {id}\n\
             Fees: {total} SOL ({fee_count} events)\n\
             Buyback: {buyback} SOL\n\
             Burned: {burned} tokens\n\
             Liquidity added: {liquidity} SOL\n\
             Treasury: {treasury} SOL\n\
             Transactions: {tx_count}\n\
             Mode: {mode}",
            id = self.epoch_id,
            total = format_sol(self.plan.total_lamports),
            fee_count = self.fees.len(),
            buyback = format_sol(self.plan.buyback_lamports),
            burned = self.burned_tokens(),
            liquidity = format_sol(self.plan.liquidity_lamports),
            treasury = format_sol(self.plan.treasury_lamports),
            tx_count = self.transactions.len(),
            mode = mode,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_plan() -> AllocationPlan {
        AllocationPlan {
            buyback_lamports: 600_000_000,
            liquidity_lamports: 400_000_000,
            treasury_lamports: 0,
            total_lamports: 1_000_000_000,
        }
    }

    fn test_report() -> EpochReport {
        EpochReport {
            epoch_id: 7,
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            dry_run: false,
            fees: vec![ReportedFee {
                amount: "1000000000".to_string(),
                mint: crate::domain::fee::NATIVE_MINT.to_string(),
                timestamp: 1_700_000_000,
            }],
            plan: test_plan(),
            transactions: vec![
                TransactionRecord::Buyback {
                    signature: "sig-buyback".to_string(),
                    amount_in: 600_000_000,
                    amount_out: 600_000_000_000,
                },
                TransactionRecord::Burn {
                    signature: "sig-burn".to_string(),
                    amount: 150_000_000_000,
                },
            ],
            summary: String::new(),
            error: None,
        }
    }

    #[test]
    fn test_reported_fee_from_event() {
        let fee = FeeEvent::native(123, 456);
        let reported = ReportedFee::from(&fee);
        assert_eq!(reported.amount, "123");
        assert_eq!(reported.timestamp, 456);
    }

    #[test]
    fn test_burned_tokens_sums_burn_records_only() {
        let report = test_report();
        assert_eq!(report.burned_tokens(), 150_000_000_000);
    }

    #[test]
    fn test_summary_contents() {
        let report = test_report();
        let summary = report.render_summary();

        assert!(summary.contains("Epoch 7"));
        assert!(summary.contains("Fees: 1.0000 SOL (1 events)"));
        assert!(summary.contains("Buyback: 0.6000 SOL"));
        assert!(summary.contains("Burned: 150000000000 tokens"));
        assert!(summary.contains("Liquidity added: 0.4000 SOL"));
        assert!(summary.contains("Transactions: 2"));
        assert!(summary.contains("Mode: LIVE"));
    }

    #[test]
    fn test_summary_dry_run_and_failed_modes() {
        let mut report = test_report();
        report.dry_run = true;
        assert!(report.render_summary().contains("Mode: DRY RUN"));

        report.error = Some("swap failed".to_string());
        assert!(report.render_summary().contains("Mode: FAILED"));
    }

    #[test]
    fn test_transaction_record_serde_tags() {
        let json = serde_json::to_value(TransactionRecord::AddLiquidity {
            signature: "s".to_string(),
            quote_amount: 1,
            lp_tokens: 2,
        })
        .unwrap();
        assert_eq!(json["type"], "add_liquidity");

        let json = serde_json::to_value(TransactionRecord::Buyback {
            signature: "s".to_string(),
            amount_in: 1,
            amount_out: 2,
        })
        .unwrap();
        assert_eq!(json["type"], "buyback");
    }

    #[test]
    fn test_error_field_skipped_when_absent() {
        let report = test_report();
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("\"error\""));
    }
}
