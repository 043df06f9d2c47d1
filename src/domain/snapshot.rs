//! Serializable ledger state used for persistence and import/export.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::FundMirrorError;
use super::holding::HoldingRecord;
use super::lenient::number_from_value;

/// Full ledger state, captured at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub benchmark_total: f64,
    pub user_total: f64,
    pub holdings: Vec<HoldingRecord>,
}

impl Snapshot {
    pub fn to_json_pretty(&self) -> Result<String, FundMirrorError> {
        serde_json::to_string_pretty(self).map_err(|e| FundMirrorError::Snapshot {
            reason: e.to_string(),
        })
    }
}

/// A possibly partial snapshot. Absent fields leave the ledger untouched
/// when imported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotPatch {
    pub benchmark_total: Option<f64>,
    pub user_total: Option<f64>,
    pub holdings: Option<Vec<HoldingRecord>>,
}

impl SnapshotPatch {
    /// Parses an import document. The document itself must be a JSON object;
    /// inside it, unusable fields are dropped rather than reported.
    pub fn from_json(content: &str) -> Result<Self, FundMirrorError> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| FundMirrorError::Snapshot {
                reason: e.to_string(),
            })?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, FundMirrorError> {
        let object = value.as_object().ok_or_else(|| FundMirrorError::Snapshot {
            reason: "expected a JSON object at the top level".into(),
        })?;

        let benchmark_total = object.get("benchmarkTotal").and_then(number_from_value);
        let user_total = object.get("userTotal").and_then(number_from_value);

        let holdings = match object.get("holdings") {
            Some(Value::Array(items)) => holdings_from_items(items),
            Some(other) => {
                tracing::warn!("ignoring holdings field that is not a list: {other}");
                None
            }
            None => None,
        };

        Ok(Self {
            benchmark_total,
            user_total,
            holdings,
        })
    }
}

/// Keeps the entries that read as holding records. A non-empty list with no
/// readable entry is ignored as a whole.
fn holdings_from_items(items: &[Value]) -> Option<Vec<HoldingRecord>> {
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match HoldingRecord::deserialize(item) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(index, "skipping unreadable holding: {e}"),
        }
    }
    if records.is_empty() && !items.is_empty() {
        tracing::warn!("ignoring holdings list with no readable entries");
        return None;
    }
    Some(records)
}

impl From<Snapshot> for SnapshotPatch {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            benchmark_total: Some(snapshot.benchmark_total),
            user_total: Some(snapshot.user_total),
            holdings: Some(snapshot.holdings),
        }
    }
}
