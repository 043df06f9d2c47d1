//! Derived ledger values.
//!
//! Everything here is a pure function of the two capital totals and the
//! holdings list. Degenerate inputs (unset or non-positive totals, empty
//! lists, NaN or infinite amounts) resolve to the zero-equivalent strings
//! [`ZERO_AMOUNT`] and [`ZERO_RATIO`] rather than errors.

use serde::Serialize;

use super::holding::HoldingRecord;

pub const ZERO_AMOUNT: &str = "0.00";
pub const ZERO_RATIO: &str = " 0:0";

/// All headline values of a ledger, computed together.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub benchmark_current_total: f64,
    pub benchmark_position_ratio: String,
    pub user_position_ratio: String,
    pub position_ratio: String,
    pub should_invest_total: String,
    pub actual_invested_total: String,
}

impl LedgerSummary {
    pub fn compute(benchmark_total: f64, user_total: f64, holdings: &[HoldingRecord]) -> Self {
        Self {
            benchmark_current_total: benchmark_current_total(holdings),
            benchmark_position_ratio: benchmark_position_ratio(benchmark_total, holdings),
            user_position_ratio: user_position_ratio(user_total, holdings),
            position_ratio: position_ratio(benchmark_total, user_total),
            should_invest_total: should_invest_total(benchmark_total, user_total, holdings),
            actual_invested_total: actual_invested_total(holdings),
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn positive(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Formats with exactly two decimals, rounding half away from zero.
/// Non-finite values become [`ZERO_AMOUNT`].
pub fn fixed2(value: f64) -> String {
    if !value.is_finite() {
        return ZERO_AMOUNT.to_string();
    }
    // `{:.2}` alone rounds exact binary ties to even
    let scaled = value * 100.0;
    let rounded = if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        value
    };
    // adding 0.0 turns -0.0 into 0.0
    format!("{:.2}", rounded + 0.0)
}

fn sum_by(holdings: &[HoldingRecord], field: impl Fn(&HoldingRecord) -> f64) -> f64 {
    finite_or_zero(holdings.iter().map(|h| finite_or_zero(field(h))).sum())
}

pub fn benchmark_current_total(holdings: &[HoldingRecord]) -> f64 {
    sum_by(holdings, |h| h.benchmark_amount)
}

pub fn actual_sum(holdings: &[HoldingRecord]) -> f64 {
    sum_by(holdings, |h| h.actual_amount)
}

/// Share of the benchmark holder's capital that is deployed in the tracked
/// holdings, in percent.
///
/// A zero holdings sum is treated as degenerate even when the total is valid.
/// The output is `"0.00"` either way.
pub fn benchmark_position_ratio(benchmark_total: f64, holdings: &[HoldingRecord]) -> String {
    let Some(total) = positive(benchmark_total) else {
        return ZERO_AMOUNT.to_string();
    };
    let current = benchmark_current_total(holdings);
    if current == 0.0 {
        return ZERO_AMOUNT.to_string();
    }
    fixed2(current / total * 100.0)
}

/// Share of the user's capital actually invested, in percent.
pub fn user_position_ratio(user_total: f64, holdings: &[HoldingRecord]) -> String {
    let Some(total) = positive(user_total) else {
        return ZERO_AMOUNT.to_string();
    };
    fixed2(actual_sum(holdings) / total * 100.0)
}

/// Euclid's algorithm; `gcd(a, 0) == a`.
pub fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}

/// Rounds half away from zero; `None` when the result does not fit a `u64`.
fn whole_units(value: f64) -> Option<u64> {
    let rounded = value.round();
    // u64::MAX as f64 is 2^64, the first value that no longer fits
    (rounded < u64::MAX as f64).then_some(rounded as u64)
}

/// `benchmark_total : user_total` rounded to whole units and reduced to
/// lowest terms, benchmark first, e.g. `" 100 : 1"`.
pub fn position_ratio(benchmark_total: f64, user_total: f64) -> String {
    let (Some(benchmark), Some(user)) = (positive(benchmark_total), positive(user_total)) else {
        return ZERO_RATIO.to_string();
    };
    let (Some(benchmark), Some(user)) = (whole_units(benchmark), whole_units(user)) else {
        return ZERO_RATIO.to_string();
    };
    let divisor = gcd(benchmark, user);
    if divisor == 0 {
        return ZERO_RATIO.to_string();
    }
    format!(" {} : {}", benchmark / divisor, user / divisor)
}

/// Capital the user should have deployed in aggregate to match the
/// benchmark holder's deployed fraction.
pub fn should_invest_total(
    benchmark_total: f64,
    user_total: f64,
    holdings: &[HoldingRecord],
) -> String {
    let current = benchmark_current_total(holdings);
    if current <= 0.0 {
        return ZERO_AMOUNT.to_string();
    }
    let Some(total) = positive(benchmark_total) else {
        return ZERO_AMOUNT.to_string();
    };
    fixed2(current * (user_total / total))
}

pub fn actual_invested_total(holdings: &[HoldingRecord]) -> String {
    fixed2(actual_sum(holdings))
}

/// The amount the user would hold in `holding` if mirroring the benchmark
/// holder exactly at the current capital ratio.
pub fn proportional_amount(
    holding: &HoldingRecord,
    benchmark_total: f64,
    user_total: f64,
) -> String {
    let Some(total) = positive(benchmark_total) else {
        return ZERO_AMOUNT.to_string();
    };
    fixed2(finite_or_zero(holding.benchmark_amount) * (user_total / total))
}

/// Target still to be invested; negative when the user is over target.
pub fn remaining_amount(holding: &HoldingRecord) -> String {
    fixed2(finite_or_zero(holding.target_amount) - finite_or_zero(holding.actual_amount))
}
