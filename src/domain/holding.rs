//! Holding records tracked in parallel for the benchmark holder and the user.

use serde::{Deserialize, Serialize};

use super::lenient;

/// One fund position: what the benchmark holder has in it, what the user
/// should hold and what the user actually holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingRecord {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub code: String,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub benchmark_amount: f64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub target_amount: f64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub actual_amount: f64,
}

/// A holding as supplied by a caller, before the ledger assigns its id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewHolding {
    pub name: String,
    pub code: String,
    pub benchmark_amount: f64,
    pub target_amount: f64,
    pub actual_amount: f64,
}

impl NewHolding {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            ..Self::default()
        }
    }

    pub fn with_amounts(mut self, benchmark: f64, target: f64, actual: f64) -> Self {
        self.benchmark_amount = benchmark;
        self.target_amount = target;
        self.actual_amount = actual;
        self
    }

    pub(crate) fn into_record(self, id: u64) -> HoldingRecord {
        HoldingRecord {
            id,
            name: self.name,
            code: self.code,
            benchmark_amount: self.benchmark_amount,
            target_amount: self.target_amount,
            actual_amount: self.actual_amount,
        }
    }
}

/// Drops the record's id; the ledger always assigns its own.
impl From<HoldingRecord> for NewHolding {
    fn from(record: HoldingRecord) -> Self {
        Self {
            name: record.name,
            code: record.code,
            benchmark_amount: record.benchmark_amount,
            target_amount: record.target_amount,
            actual_amount: record.actual_amount,
        }
    }
}

/// Partial update of a holding. Unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoldingPatch {
    pub name: Option<String>,
    pub code: Option<String>,
    pub benchmark_amount: Option<f64>,
    pub target_amount: Option<f64>,
    pub actual_amount: Option<f64>,
}

impl HoldingPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.code.is_none()
            && self.benchmark_amount.is_none()
            && self.target_amount.is_none()
            && self.actual_amount.is_none()
    }

    pub fn apply_to(&self, record: &mut HoldingRecord) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(code) = &self.code {
            record.code = code.clone();
        }
        if let Some(v) = self.benchmark_amount {
            record.benchmark_amount = v;
        }
        if let Some(v) = self.target_amount {
            record.target_amount = v;
        }
        if let Some(v) = self.actual_amount {
            record.actual_amount = v;
        }
    }
}
