//! Snapshot persistence port trait.

use crate::domain::error::FundMirrorError;
use crate::domain::snapshot::{Snapshot, SnapshotPatch};

/// Where ledger state is saved between sessions.
pub trait SnapshotStore {
    /// Returns the most recently saved state, or `None` if nothing was ever
    /// saved. Stored documents may be partial.
    fn load(&self) -> Result<Option<SnapshotPatch>, FundMirrorError>;

    fn save(&self, snapshot: &Snapshot) -> Result<(), FundMirrorError>;
}
