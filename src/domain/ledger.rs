//! The holdings ledger: two capital totals plus an ordered list of holdings.

use std::collections::HashSet;

use super::calc::{self, LedgerSummary};
use super::holding::{HoldingPatch, HoldingRecord, NewHolding};
use super::snapshot::{Snapshot, SnapshotPatch};

pub const SEED_BENCHMARK_TOTAL: f64 = 350_000.0;
pub const SEED_USER_TOTAL: f64 = 3_500.0;

/// Aggregate root owning the capital totals and every holding record.
///
/// Setters accept any number; the derived-value methods are responsible for
/// producing sane output from whatever is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    benchmark_total: f64,
    user_total: f64,
    holdings: Vec<HoldingRecord>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::seeded()
    }
}

impl Ledger {
    pub fn new(benchmark_total: f64, user_total: f64) -> Self {
        Ledger {
            benchmark_total,
            user_total,
            holdings: Vec::new(),
        }
    }

    /// The state a fresh installation starts from: one placeholder holding.
    pub fn seeded() -> Self {
        Ledger {
            benchmark_total: SEED_BENCHMARK_TOTAL,
            user_total: SEED_USER_TOTAL,
            holdings: vec![HoldingRecord {
                id: 1,
                name: "示例基金 (请修改)".to_string(),
                code: "000000".to_string(),
                benchmark_amount: 10_000.0,
                target_amount: 100.0,
                actual_amount: 0.0,
            }],
        }
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut ledger = Ledger::new(snapshot.benchmark_total, snapshot.user_total);
        ledger.replace_holdings(snapshot.holdings);
        ledger
    }

    pub fn benchmark_total(&self) -> f64 {
        self.benchmark_total
    }

    pub fn user_total(&self) -> f64 {
        self.user_total
    }

    pub fn holdings(&self) -> &[HoldingRecord] {
        &self.holdings
    }

    pub fn holding(&self, id: u64) -> Option<&HoldingRecord> {
        self.holdings.iter().find(|h| h.id == id)
    }

    pub fn set_benchmark_total(&mut self, value: f64) {
        self.benchmark_total = value;
    }

    pub fn set_user_total(&mut self, value: f64) {
        self.user_total = value;
    }

    /// One above the current maximum, or the lowest unused id once the
    /// maximum is `u64::MAX`.
    fn next_id(&self) -> u64 {
        let max = self.holdings.iter().map(|h| h.id).max().unwrap_or(0);
        max.checked_add(1).unwrap_or_else(|| {
            let used: HashSet<u64> = self.holdings.iter().map(|h| h.id).collect();
            lowest_free_id(&used)
        })
    }

    /// Appends a holding and returns the id assigned to it.
    pub fn add_holding(&mut self, holding: NewHolding) -> u64 {
        let id = self.next_id();
        self.holdings.push(holding.into_record(id));
        id
    }

    /// Merges `patch` into the holding with `id`. Returns `false`, changing
    /// nothing, when no such holding exists.
    pub fn update_holding(&mut self, id: u64, patch: &HoldingPatch) -> bool {
        match self.holdings.iter_mut().find(|h| h.id == id) {
            Some(record) => {
                patch.apply_to(record);
                true
            }
            None => false,
        }
    }

    pub fn delete_holding(&mut self, id: u64) -> Option<HoldingRecord> {
        let index = self.holdings.iter().position(|h| h.id == id)?;
        Some(self.holdings.remove(index))
    }

    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot {
            benchmark_total: self.benchmark_total,
            user_total: self.user_total,
            holdings: self.holdings.clone(),
        }
    }

    /// Overwrites only the parts present in `patch`. Holdings are replaced
    /// wholesale, never merged.
    pub fn import_snapshot(&mut self, patch: SnapshotPatch) {
        if let Some(total) = patch.benchmark_total {
            self.benchmark_total = total;
        }
        if let Some(total) = patch.user_total {
            self.user_total = total;
        }
        if let Some(holdings) = patch.holdings {
            self.replace_holdings(holdings);
        }
    }

    pub fn reset(&mut self) {
        *self = Ledger::seeded();
    }

    /// Installs `holdings` keeping their order and ids. Records with id 0 or a
    /// duplicate id get fresh ids above the current maximum.
    fn replace_holdings(&mut self, mut holdings: Vec<HoldingRecord>) {
        let mut used: HashSet<u64> = holdings.iter().map(|h| h.id).collect();
        let mut next = holdings.iter().map(|h| h.id).max().unwrap_or(0).checked_add(1);
        let mut seen = HashSet::with_capacity(holdings.len());
        for record in &mut holdings {
            if record.id == 0 || !seen.insert(record.id) {
                let id = next.unwrap_or_else(|| lowest_free_id(&used));
                next = next.and_then(|n| n.checked_add(1));
                tracing::debug!(old_id = record.id, new_id = id, "reassigning holding id");
                record.id = id;
                used.insert(id);
                seen.insert(id);
            }
        }
        self.holdings = holdings;
    }

    pub fn benchmark_current_total(&self) -> f64 {
        calc::benchmark_current_total(&self.holdings)
    }

    pub fn benchmark_position_ratio(&self) -> String {
        calc::benchmark_position_ratio(self.benchmark_total, &self.holdings)
    }

    pub fn user_position_ratio(&self) -> String {
        calc::user_position_ratio(self.user_total, &self.holdings)
    }

    pub fn position_ratio(&self) -> String {
        calc::position_ratio(self.benchmark_total, self.user_total)
    }

    pub fn should_invest_total(&self) -> String {
        calc::should_invest_total(self.benchmark_total, self.user_total, &self.holdings)
    }

    pub fn actual_invested_total(&self) -> String {
        calc::actual_invested_total(&self.holdings)
    }

    pub fn proportional_amount(&self, holding: &HoldingRecord) -> String {
        calc::proportional_amount(holding, self.benchmark_total, self.user_total)
    }

    pub fn summary(&self) -> LedgerSummary {
        LedgerSummary::compute(self.benchmark_total, self.user_total, &self.holdings)
    }
}

fn lowest_free_id(used: &HashSet<u64>) -> u64 {
    (1..=u64::MAX).find(|id| !used.contains(id)).unwrap_or(0)
}
