//! Lamport Arithmetic
//!
//! All planning and validation math runs on u64 lamports (fixed-point,
//! smallest unit). Floating SOL values exist only for display in summaries
//! and log lines.

use rust_decimal::Decimal;

/// Lamports per SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Convert lamports to a display-only SOL decimal (scale 9)
pub fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from_i128_with_scale(lamports as i128, 9)
}

/// Convert a SOL amount to lamports, truncating sub-lamport precision
pub fn sol_to_lamports(sol: f64) -> u64 {
    (sol * LAMPORTS_PER_SOL as f64).floor() as u64
}

/// Truncating percentage of a lamport amount.
///
/// `pct` is quantized to 1/100th-of-a-percent resolution (rounded, so that
/// e.g. 33.33 survives float representation intact) and the lamport result
/// is floored. Flooring is the deterministic rounding rule used throughout
/// the allocation path.
pub fn percentage(amount: u64, pct: f64) -> u64 {
    let centi_pct = (pct * 100.0).round() as u128;
    ((amount as u128 * centi_pct) / 10_000) as u64
}

/// Absolute difference between two amounts expressed in basis points of
/// `original`. Returns 0 when `original` is 0.
pub fn diff_bps(original: u64, changed: u64) -> u32 {
    if original == 0 {
        return 0;
    }
    ((original.abs_diff(changed) as u128 * 10_000) / original as u128) as u32
}

/// Amount remaining after subtracting `slippage_bps` basis points
pub fn apply_slippage(amount: u64, slippage_bps: u32) -> u64 {
    let cut = (amount as u128 * slippage_bps as u128) / 10_000;
    amount - cut as u64
}

/// Render lamports as a fixed four-decimal SOL string for summaries
pub fn format_sol(lamports: u64) -> String {
    lamports_to_sol(lamports).round_dp(4).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_lamports_to_sol() {
        assert_eq!(lamports_to_sol(1_000_000_000), dec!(1.000000000));
        assert_eq!(lamports_to_sol(600_000_000), dec!(0.600000000));
        assert_eq!(lamports_to_sol(0), dec!(0.000000000));
    }

    #[test]
    fn test_sol_to_lamports() {
        assert_eq!(sol_to_lamports(1.0), 1_000_000_000);
        assert_eq!(sol_to_lamports(0.6), 600_000_000);
        assert_eq!(sol_to_lamports(0.0), 0);
    }

    #[test]
    fn test_percentage_whole() {
        assert_eq!(percentage(1_000_000_000, 60.0), 600_000_000);
        assert_eq!(percentage(1_000_000_000, 40.0), 400_000_000);
        assert_eq!(percentage(1_000_000_000, 0.0), 0);
        assert_eq!(percentage(1_000_000_000, 100.0), 1_000_000_000);
    }

    #[test]
    fn test_percentage_fractional_truncates() {
        // 33.33% of 100 lamports = 33.33 -> floor to 33
        assert_eq!(percentage(100, 33.33), 33);
        // 1/100th-percent quantization rounds: 0.004% -> 0, 0.005% -> 0.01%
        assert_eq!(percentage(1_000_000, 0.004), 0);
        assert_eq!(percentage(1_000_000, 0.005), 100);
        assert_eq!(percentage(1_000_000, 0.01), 100);
    }

    #[test]
    fn test_percentage_no_overflow_on_large_amounts() {
        // u64::MAX lamports at 100% must not overflow the intermediate
        assert_eq!(percentage(u64::MAX, 100.0), u64::MAX);
    }

    #[test]
    fn test_diff_bps() {
        assert_eq!(diff_bps(10_000, 9_900), 100);
        assert_eq!(diff_bps(10_000, 10_100), 100);
        assert_eq!(diff_bps(10_000, 10_000), 0);
        assert_eq!(diff_bps(0, 5_000), 0);
    }

    #[test]
    fn test_apply_slippage() {
        assert_eq!(apply_slippage(10_000, 100), 9_900);
        assert_eq!(apply_slippage(10_000, 0), 10_000);
        assert_eq!(apply_slippage(10_000, 10_000), 0);
    }

    #[test]
    fn test_format_sol() {
        assert_eq!(format_sol(1_000_000_000), "1.0000");
        assert_eq!(format_sol(600_000_000), "0.6000");
        assert_eq!(format_sol(123_456_789), "0.1235");
        assert_eq!(format_sol(0), "0.0000");
    }
}
