//! Fee Events
//!
//! A fee event is a single observed inbound payment attributable to creator
//! or platform fees. Events are immutable once produced; the execution engine
//! consumes and acknowledges each event exactly once per successful epoch.

use serde::{Deserialize, Serialize};

/// Mint address of native SOL
pub const NATIVE_MINT: &str = "So11111111111111111111111111111111111111112";

/// A single observed fee payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeEvent {
    /// Amount in lamports (or the mint's smallest unit for non-SOL assets)
    pub amount: u64,
    /// Asset mint address; [`NATIVE_MINT`] for SOL
    pub mint: String,
    /// Unix seconds when the fee was observed
    pub timestamp: u64,
    /// Originating transaction signature, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Free-form source metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl FeeEvent {
    /// Construct a native-SOL fee event with no signature or metadata
    pub fn native(amount: u64, timestamp: u64) -> Self {
        Self {
            amount,
            mint: NATIVE_MINT.to_string(),
            timestamp,
            signature: None,
            metadata: None,
        }
    }

    /// Whether this event is denominated in native SOL
    pub fn is_native(&self) -> bool {
        self.mint == NATIVE_MINT
    }
}

/// Sum the native-SOL fee events of an epoch, in lamports.
///
/// Non-SOL events are excluded from the total (conversion is deferred, not
/// implemented) but remain part of the epoch's raw fee list; each exclusion
/// is logged so it is never silently dropped.
pub fn total_native_lamports(fees: &[FeeEvent]) -> u64 {
    let mut total: u64 = 0;
    for fee in fees {
        if fee.is_native() {
            total = total.saturating_add(fee.amount);
        } else {
            tracing::warn!(
                mint = %fee.mint,
                amount = fee.amount,
                "non-SOL fee excluded from epoch total (conversion deferred)"
            );
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_constructor() {
        let fee = FeeEvent::native(100_000_000, 1_700_000_000);
        assert_eq!(fee.amount, 100_000_000);
        assert_eq!(fee.mint, NATIVE_MINT);
        assert!(fee.is_native());
        assert!(fee.signature.is_none());
    }

    #[test]
    fn test_total_sums_native_only() {
        let fees = vec![
            FeeEvent::native(600_000_000, 1000),
            FeeEvent::native(400_000_000, 1001),
            FeeEvent {
                amount: 5_000_000,
                mint: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string(),
                timestamp: 1002,
                signature: None,
                metadata: None,
            },
        ];

        assert_eq!(total_native_lamports(&fees), 1_000_000_000);
    }

    #[test]
    fn test_total_empty() {
        assert_eq!(total_native_lamports(&[]), 0);
    }

    #[test]
    fn test_total_saturates() {
        let fees = vec![FeeEvent::native(u64::MAX, 1000), FeeEvent::native(1, 1001)];
        assert_eq!(total_native_lamports(&fees), u64::MAX);
    }

    #[test]
    fn test_serde_roundtrip_skips_empty_options() {
        let fee = FeeEvent::native(42, 1000);
        let json = serde_json::to_string(&fee).unwrap();
        assert!(!json.contains("signature"));
        assert!(!json.contains("metadata"));

        let parsed: FeeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, fee);
    }
}
