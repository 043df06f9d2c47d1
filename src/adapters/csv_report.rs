//! CSV holdings report.

use serde::Serialize;
use std::io::Write;

use crate::domain::calc;
use crate::domain::error::FundMirrorError;
use crate::domain::ledger::Ledger;

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    id: u64,
    name: &'a str,
    code: &'a str,
    benchmark_amount: String,
    target_amount: String,
    actual_amount: String,
    proportional_amount: String,
    remaining_amount: String,
}

/// Writes one row per holding, in ledger order, with a header row.
pub fn write_holdings_report<W: Write>(ledger: &Ledger, writer: W) -> Result<(), FundMirrorError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let csv_error = |e: csv::Error| FundMirrorError::Storage {
        reason: format!("CSV write error: {}", e),
    };

    for holding in ledger.holdings() {
        wtr.serialize(ReportRow {
            id: holding.id,
            name: &holding.name,
            code: &holding.code,
            benchmark_amount: calc::fixed2(holding.benchmark_amount),
            target_amount: calc::fixed2(holding.target_amount),
            actual_amount: calc::fixed2(holding.actual_amount),
            proportional_amount: ledger.proportional_amount(holding),
            remaining_amount: calc::remaining_amount(holding),
        })
        .map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}
