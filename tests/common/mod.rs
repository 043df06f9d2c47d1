#![allow(dead_code)]

use async_trait::async_trait;
use fundmirror::domain::error::{FundMirrorError, LookupError};
use fundmirror::domain::fund_info::FundInfo;
pub use fundmirror::domain::holding::{HoldingRecord, NewHolding};
use fundmirror::domain::snapshot::{Snapshot, SnapshotPatch};
use fundmirror::ports::lookup_port::FundLookup;
use fundmirror::ports::snapshot_port::SnapshotStore;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Mutex;

/// Keeps every saved snapshot in memory, newest last.
pub struct MemoryStore {
    pub initial: Option<SnapshotPatch>,
    pub saved: RefCell<Vec<Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            initial: None,
            saved: RefCell::new(Vec::new()),
        }
    }

    pub fn with_initial(mut self, patch: SnapshotPatch) -> Self {
        self.initial = Some(patch);
        self
    }

    pub fn save_count(&self) -> usize {
        self.saved.borrow().len()
    }

    pub fn last_saved(&self) -> Option<Snapshot> {
        self.saved.borrow().last().cloned()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<SnapshotPatch>, FundMirrorError> {
        Ok(self
            .last_saved()
            .map(SnapshotPatch::from)
            .or_else(|| self.initial.clone()))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), FundMirrorError> {
        self.saved.borrow_mut().push(snapshot.clone());
        Ok(())
    }
}

/// Loads nothing and refuses every save.
pub struct FailingStore;

impl SnapshotStore for FailingStore {
    fn load(&self) -> Result<Option<SnapshotPatch>, FundMirrorError> {
        Ok(None)
    }

    fn save(&self, _snapshot: &Snapshot) -> Result<(), FundMirrorError> {
        Err(FundMirrorError::Storage {
            reason: "read-only store".into(),
        })
    }
}

/// Canned lookup results keyed by code; unknown codes are "not found".
pub struct StubLookup {
    pub results: HashMap<String, Result<FundInfo, LookupError>>,
    pub calls: Mutex<Vec<String>>,
}

impl StubLookup {
    pub fn new() -> Self {
        Self {
            results: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_fund(mut self, code: &str, name: &str) -> Self {
        self.results.insert(
            code.to_string(),
            Ok(FundInfo {
                name: name.to_string(),
                code: code.to_string(),
            }),
        );
        self
    }

    pub fn with_error(mut self, code: &str, error: LookupError) -> Self {
        self.results.insert(code.to_string(), Err(error));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl FundLookup for StubLookup {
    async fn lookup(&self, code: &str) -> Result<FundInfo, LookupError> {
        self.calls.lock().unwrap().push(code.to_string());
        self.results.get(code).cloned().unwrap_or_else(|| {
            Err(LookupError::NotFound {
                code: code.to_string(),
            })
        })
    }
}

pub fn make_holding(id: u64, name: &str, benchmark: f64, target: f64, actual: f64) -> HoldingRecord {
    HoldingRecord {
        id,
        name: name.to_string(),
        code: format!("{:06}", id),
        benchmark_amount: benchmark,
        target_amount: target,
        actual_amount: actual,
    }
}

/// Totals 350000 / 3500 with holdings summing to 315000 benchmark and 2380
/// actually invested.
pub fn reference_snapshot() -> Snapshot {
    Snapshot {
        benchmark_total: 350_000.0,
        user_total: 3_500.0,
        holdings: vec![
            make_holding(1, "Hang Seng Tech C", 89_870.0, 898.7, 0.0),
            make_holding(2, "Advanced Manufacturing C", 63_448.0, 634.48, 0.0),
            make_holding(3, "STAR 50 C", 62_922.0, 629.22, 350.0),
            make_holding(4, "Robotics C", 25_169.0, 251.69, 0.0),
            make_holding(5, "Innovation 50 C", 19_769.0, 197.69, 0.0),
            make_holding(6, "Semiconductor C", 19_440.0, 194.4, 0.0),
            make_holding(7, "ChiNext C", 18_821.0, 188.21, 0.0),
            make_holding(8, "Industrial Upgrade", 9_000.0, 90.0, 0.0),
            make_holding(9, "Growth Flexible C", 3_000.0, 30.0, 30.0),
            make_holding(10, "Information Industry C", 3_561.0, 35.61, 2_000.0),
        ],
    }
}
