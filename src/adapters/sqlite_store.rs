//! SQLite snapshot store.
//!
//! Every save appends a row and prunes all but the newest `history` rows, so
//! the table keeps a bounded history of past states. Loading reads the newest
//! row.

use chrono::{SecondsFormat, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, params};
use std::path::Path;

use crate::domain::error::FundMirrorError;
use crate::domain::settings::DEFAULT_SQLITE_HISTORY;
use crate::domain::snapshot::{Snapshot, SnapshotPatch};
use crate::ports::snapshot_port::SnapshotStore;

pub struct SqliteSnapshotStore {
    pool: Pool<SqliteConnectionManager>,
    history: usize,
}

fn pool_error(e: r2d2::Error) -> FundMirrorError {
    FundMirrorError::Storage {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> FundMirrorError {
    FundMirrorError::Storage {
        reason: e.to_string(),
    }
}

impl SqliteSnapshotStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FundMirrorError> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(2).build(manager).map_err(pool_error)?;
        let store = Self {
            pool,
            history: DEFAULT_SQLITE_HISTORY,
        };
        store.initialize_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, FundMirrorError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager).map_err(pool_error)?;
        let store = Self {
            pool,
            history: DEFAULT_SQLITE_HISTORY,
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Number of snapshots kept after each save. Clamped to at least one.
    pub fn with_history(mut self, history: usize) -> Self {
        self.history = history.max(1);
        self
    }

    fn initialize_schema(&self) -> Result<(), FundMirrorError> {
        let conn = self.pool.get().map_err(pool_error)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS snapshots (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                saved_at TEXT NOT NULL,
                payload TEXT NOT NULL
            );",
        )
        .map_err(query_error)?;
        Ok(())
    }

    pub fn snapshot_count(&self) -> Result<usize, FundMirrorError> {
        let conn = self.pool.get().map_err(pool_error)?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM snapshots", [], |row| row.get(0))
            .map_err(query_error)?;
        Ok(count as usize)
    }

    /// Deletes all but the newest `keep` snapshots.
    pub fn prune(&self, keep: usize) -> Result<usize, FundMirrorError> {
        let conn = self.pool.get().map_err(pool_error)?;
        let removed = conn
            .execute(
                "DELETE FROM snapshots WHERE id NOT IN
                 (SELECT id FROM snapshots ORDER BY id DESC LIMIT ?1)",
                params![keep as i64],
            )
            .map_err(query_error)?;
        Ok(removed)
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn load(&self) -> Result<Option<SnapshotPatch>, FundMirrorError> {
        let conn = self.pool.get().map_err(pool_error)?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM snapshots ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(query_error)?;

        payload
            .map(|json| SnapshotPatch::from_json(&json))
            .transpose()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), FundMirrorError> {
        let payload = serde_json::to_string(snapshot).map_err(|e| FundMirrorError::Snapshot {
            reason: e.to_string(),
        })?;
        let saved_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let conn = self.pool.get().map_err(pool_error)?;
        conn.execute(
            "INSERT INTO snapshots (saved_at, payload) VALUES (?1, ?2)",
            params![saved_at, payload],
        )
        .map_err(query_error)?;
        drop(conn);
        tracing::debug!(%saved_at, "saved snapshot to sqlite");

        let removed = self.prune(self.history)?;
        if removed > 0 {
            tracing::debug!(removed, keep = self.history, "pruned old snapshots");
        }
        Ok(())
    }
}
