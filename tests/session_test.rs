//! Session tests: a ledger wired to a snapshot store, and the lookup flow
//! that pre-fills new holdings.
//!
//! Tests cover:
//! - Restoring from a store, falling back to the default seed
//! - Saving after every state-changing mutation and only then
//! - Persistence across sessions with the JSON file and SQLite stores
//! - Lookup results feeding `add_holding` without touching the ledger

mod common;

use common::*;
use fundmirror::adapters::json_store::JsonFileStore;
use fundmirror::domain::error::{FundMirrorError, LookupError};
use fundmirror::domain::fund_info::{lookup_fund, prefill_holding};
use fundmirror::domain::holding::HoldingPatch;
use fundmirror::domain::ledger::{Ledger, SEED_BENCHMARK_TOTAL};
use fundmirror::domain::session::PersistentLedger;
use fundmirror::domain::snapshot::SnapshotPatch;

mod restore {
    use super::*;

    #[test]
    fn empty_store_starts_from_seed() {
        let store = MemoryStore::new();
        let session = PersistentLedger::open(&store).unwrap();
        assert_eq!(session.ledger(), &Ledger::seeded());
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn full_snapshot_is_restored() {
        let store = MemoryStore::new().with_initial(reference_snapshot().into());
        let session = PersistentLedger::open(&store).unwrap();
        assert_eq!(session.ledger().export_snapshot(), reference_snapshot());
        assert_eq!(session.ledger().position_ratio(), " 100 : 1");
    }

    #[test]
    fn partial_snapshot_keeps_seed_for_missing_fields() {
        let store = MemoryStore::new().with_initial(SnapshotPatch {
            user_total: Some(7000.0),
            ..SnapshotPatch::default()
        });
        let session = PersistentLedger::open(&store).unwrap();
        assert_eq!(session.ledger().benchmark_total(), SEED_BENCHMARK_TOTAL);
        assert_eq!(session.ledger().user_total(), 7000.0);
        assert_eq!(session.ledger().holdings(), Ledger::seeded().holdings());
    }
}

mod persistence_triggers {
    use super::*;

    #[test]
    fn every_mutation_saves() {
        let store = MemoryStore::new();
        let mut session = PersistentLedger::open(&store).unwrap();

        session.set_benchmark_total(200_000.0).unwrap();
        session.set_user_total(2_000.0).unwrap();
        let id = session
            .add_holding(NewHolding::new("New fund", "000123").with_amounts(5000.0, 50.0, 0.0))
            .unwrap();
        let patch = HoldingPatch {
            actual_amount: Some(25.0),
            ..HoldingPatch::default()
        };
        assert!(session.update_holding(id, &patch).unwrap());
        assert!(session.delete_holding(1).unwrap().is_some());
        session.import_snapshot(SnapshotPatch::default()).unwrap();
        session.reset().unwrap();

        assert_eq!(store.save_count(), 7);
        assert_eq!(store.last_saved().unwrap(), Ledger::seeded().export_snapshot());
    }

    #[test]
    fn no_op_mutations_do_not_save() {
        let store = MemoryStore::new();
        let mut session = PersistentLedger::open(&store).unwrap();
        let patch = HoldingPatch {
            name: Some("ghost".into()),
            ..HoldingPatch::default()
        };

        assert!(!session.update_holding(404, &patch).unwrap());
        assert!(session.delete_holding(404).unwrap().is_none());
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn saved_state_matches_ledger_after_each_step() {
        let store = MemoryStore::new();
        let mut session = PersistentLedger::open(&store).unwrap();
        session.set_user_total(4_000.0).unwrap();
        assert_eq!(store.last_saved().unwrap(), session.ledger().export_snapshot());

        session
            .add_holding(NewHolding::new("Second", "000002"))
            .unwrap();
        assert_eq!(store.last_saved().unwrap(), session.ledger().export_snapshot());
    }

    #[test]
    fn save_failure_is_reported() {
        let store = FailingStore;
        let mut session = PersistentLedger::open(&store).unwrap();
        let err = session.set_user_total(1.0).unwrap_err();
        assert!(matches!(err, FundMirrorError::Storage { .. }));
    }
}

mod across_sessions {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn json_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("ledger.json"));

        {
            let mut session = PersistentLedger::open(&store).unwrap();
            session.import_snapshot(reference_snapshot().into()).unwrap();
            session
                .add_holding(NewHolding::new("Later addition", "000011").with_amounts(1.0, 0.0, 0.0))
                .unwrap();
        }

        let session = PersistentLedger::open(&store).unwrap();
        let holdings = session.ledger().holdings();
        assert_eq!(holdings.len(), 11);
        assert_eq!(holdings[10].id, 11);
        assert_eq!(holdings[10].name, "Later addition");
        assert_eq!(session.ledger().user_position_ratio(), "68.00");
    }

    #[test]
    fn stored_maximum_id_still_opens_and_accepts_adds() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(
            &path,
            r#"{"benchmarkTotal": 100, "userTotal": 1,
                "holdings": [{"id": 18446744073709551615, "name": "edge"}]}"#,
        )
        .unwrap();
        let store = JsonFileStore::new(&path);

        let mut session = PersistentLedger::open(&store).unwrap();
        assert_eq!(session.ledger().holdings()[0].id, u64::MAX);

        let id = session.add_holding(NewHolding::new("next", "000002")).unwrap();
        assert_eq!(id, 1);
        assert_eq!(session.ledger().holdings().len(), 2);
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn sqlite_store_round_trip() {
        use fundmirror::adapters::sqlite_store::SqliteSnapshotStore;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.db");

        {
            let store = SqliteSnapshotStore::open(&path).unwrap();
            let mut session = PersistentLedger::open(&store).unwrap();
            session.set_benchmark_total(500_000.0).unwrap();
            session.set_user_total(5_000.0).unwrap();
        }

        let store = SqliteSnapshotStore::open(&path).unwrap();
        let session = PersistentLedger::open(&store).unwrap();
        assert_eq!(session.ledger().benchmark_total(), 500_000.0);
        assert_eq!(session.ledger().user_total(), 5_000.0);
        assert_eq!(store.snapshot_count().unwrap(), 2);
    }
}

mod lookup_flow {
    use super::*;

    #[tokio::test]
    async fn successful_lookup_prefills_the_new_holding() {
        let lookup = StubLookup::new().with_fund("019769", "易方达创新50联接C");
        let store = MemoryStore::new();
        let mut session = PersistentLedger::open(&store).unwrap();

        let result = lookup_fund(&lookup, " 019769 ").await;
        assert_eq!(store.save_count(), 0);

        let holding = prefill_holding(result, "019769", None)
            .unwrap()
            .with_amounts(19_769.0, 197.69, 0.0);
        let id = session.add_holding(holding).unwrap();

        let added = session.ledger().holding(id).unwrap();
        assert_eq!(added.name, "易方达创新50联接C");
        assert_eq!(added.code, "019769");
        assert_eq!(lookup.calls.lock().unwrap().as_slice(), ["019769"]);
    }

    #[tokio::test]
    async fn empty_code_never_reaches_the_port() {
        let lookup = StubLookup::new();
        let err = lookup_fund(&lookup, "   ").await.unwrap_err();
        assert_eq!(err, LookupError::EmptyCode);
        assert_eq!(lookup.call_count(), 0);
    }

    #[tokio::test]
    async fn failed_lookup_leaves_the_ledger_alone() {
        let lookup = StubLookup::new().with_error(
            "000001",
            LookupError::Transport {
                reason: "connection reset".into(),
            },
        );
        let store = MemoryStore::new();
        let session = PersistentLedger::open(&store).unwrap();
        let before = session.ledger().clone();

        let result = lookup_fund(&lookup, "000001").await;
        let err = prefill_holding(result, "000001", None).unwrap_err();

        assert!(err.user_message().contains("manually"));
        assert_eq!(session.ledger(), &before);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn unknown_code_falls_back_to_typed_name() {
        let lookup = StubLookup::new();
        let result = lookup_fund(&lookup, "123456").await;
        assert!(matches!(result, Err(LookupError::NotFound { .. })));

        let holding = prefill_holding(result, "123456", Some("Typed by hand")).unwrap();
        assert_eq!(holding.name, "Typed by hand");
        assert_eq!(holding.code, "123456");
    }
}
