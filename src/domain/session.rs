//! A ledger bound to a snapshot store for the length of one session.

use super::error::FundMirrorError;
use super::holding::{HoldingPatch, HoldingRecord, NewHolding};
use super::ledger::Ledger;
use super::snapshot::SnapshotPatch;
use crate::ports::snapshot_port::SnapshotStore;

/// Forwards mutations to the [`Ledger`] and saves a snapshot after each one
/// that changed state. Reads go straight to [`PersistentLedger::ledger`].
pub struct PersistentLedger<'a> {
    ledger: Ledger,
    store: &'a dyn SnapshotStore,
}

impl<'a> PersistentLedger<'a> {
    /// Restores the last saved state over the default seed. Fields missing
    /// from the stored document keep their seed values.
    pub fn open(store: &'a dyn SnapshotStore) -> Result<Self, FundMirrorError> {
        let mut ledger = Ledger::seeded();
        match store.load()? {
            Some(patch) => {
                ledger.import_snapshot(patch);
                tracing::debug!(holdings = ledger.holdings().len(), "restored ledger");
            }
            None => tracing::info!("no saved ledger found, starting from the default seed"),
        }
        Ok(Self { ledger, store })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn persist(&self) -> Result<(), FundMirrorError> {
        self.store.save(&self.ledger.export_snapshot())
    }

    pub fn set_benchmark_total(&mut self, value: f64) -> Result<(), FundMirrorError> {
        self.ledger.set_benchmark_total(value);
        self.persist()
    }

    pub fn set_user_total(&mut self, value: f64) -> Result<(), FundMirrorError> {
        self.ledger.set_user_total(value);
        self.persist()
    }

    pub fn add_holding(&mut self, holding: NewHolding) -> Result<u64, FundMirrorError> {
        let id = self.ledger.add_holding(holding);
        tracing::info!(id, "added holding");
        self.persist()?;
        Ok(id)
    }

    pub fn update_holding(
        &mut self,
        id: u64,
        patch: &HoldingPatch,
    ) -> Result<bool, FundMirrorError> {
        if !self.ledger.update_holding(id, patch) {
            tracing::debug!(id, "update skipped, no such holding");
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    pub fn delete_holding(&mut self, id: u64) -> Result<Option<HoldingRecord>, FundMirrorError> {
        let removed = self.ledger.delete_holding(id);
        if removed.is_some() {
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn import_snapshot(&mut self, patch: SnapshotPatch) -> Result<(), FundMirrorError> {
        self.ledger.import_snapshot(patch);
        self.persist()
    }

    pub fn reset(&mut self) -> Result<(), FundMirrorError> {
        self.ledger.reset();
        self.persist()
    }
}
