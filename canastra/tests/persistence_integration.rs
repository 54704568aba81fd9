//! Integration tests for snapshot persistence.
//!
//! Covers reopening a tournament from disk, repairing legacy snapshots on
//! load and keeping the in-memory state when the store misbehaves.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use canastra::store::{
    self, FileStore, LoadOutcome, MemoryStore, SnapshotStore, StoreConfig, StoreError, StoreResult,
};
use canastra::tournament::{MatchStatus, Player, TournamentEngine};
use serde_json::{Value, json};
use uuid::Uuid;

const KEY: &str = "canastra-tournament";

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("canastra-it-{}", Uuid::new_v4()))
}

fn players() -> [Player; 2] {
    [Player::new("player1", "Ana"), Player::new("player2", "Bia")]
}

/// Store whose reads or writes can be made to fail
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_reads: bool,
    fail_writes: AtomicBool,
}

impl SnapshotStore for FlakyStore {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        if self.fail_reads {
            return Err(StoreError::Io(io::Error::other("disk unavailable")));
        }
        self.inner.read(key)
    }

    fn write(&self, key: &str, contents: &str) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io(io::Error::other("disk full")));
        }
        self.inner.write(key, contents)
    }
}

#[test]
fn test_reopen_from_disk_restores_bracket() {
    let dir = scratch_dir();
    let config = StoreConfig {
        data_dir: dir.clone(),
        storage_key: KEY.to_string(),
    };

    let (round_id, match_id, loser) = {
        let mut engine =
            TournamentEngine::open(FileStore::from_config(&config), &config.storage_key);
        let a = engine.add_team("Ases", players());
        let b = engine.add_team("Curingas", players());
        let round = engine.create_round();
        let game = engine
            .create_match(Some(a.id), Some(b.id), round.id)
            .unwrap();
        let result = engine.finish_match(game.id, 1500, 4000).unwrap();
        (round.id, game.id, result.loser_id)
    };

    let mut reopened = TournamentEngine::new(FileStore::from_config(&config), KEY);
    assert_eq!(reopened.load(), LoadOutcome::Clean);

    let tournament = reopened.tournament();
    assert_eq!(tournament.teams.len(), 2);
    assert_eq!(tournament.current_round_number, 1);
    assert_eq!(tournament.team(loser).unwrap().lives, 1);
    let (round, game) = tournament.find_match(match_id).unwrap();
    assert_eq!(round.id, round_id);
    assert_eq!(game.status, MatchStatus::Finished);
    assert!(game.end_time.is_some());

    // The file holds camelCase JSON with ISO timestamps
    let raw = fs::read_to_string(dir.join(format!("{KEY}.json"))).unwrap();
    let value: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["currentRoundNumber"], 1);
    assert!(value["rounds"][0]["createdAt"].as_str().unwrap().contains('T'));

    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn test_legacy_snapshot_is_repaired_and_written_back() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let legacy = json!({
        "nome": "Copa do Bairro",
        "duplas": [
            { "id": a.to_string(), "nome": "Reis", "vidas": 1 },
            { "id": b.to_string(), "nome": "Damas", "vidas": -3 }
        ],
        "rodadaAtual": 7
    });
    let store = MemoryStore::with_snapshot(KEY, &legacy.to_string());

    let mut engine = TournamentEngine::new(store.clone(), KEY);
    assert_eq!(engine.load(), LoadOutcome::Repaired);
    assert_eq!(store.write_count(), 1);

    let tournament = engine.tournament();
    assert_eq!(tournament.name, "Copa do Bairro");
    assert_eq!(tournament.current_round_number, 0);
    let damas = tournament.team(b).unwrap();
    assert_eq!((damas.lives, damas.eliminated), (0, true));
    assert_eq!(damas.players[1].id, "player2");

    // A second load sees the canonical form
    let report = store::load(&store, KEY);
    assert_eq!(report.outcome, LoadOutcome::Clean);
    assert_eq!(&report.tournament, engine.tournament());
}

#[test]
fn test_garbage_snapshot_resets_to_fresh_tournament() {
    let store = MemoryStore::with_snapshot(KEY, "not json at all");
    let engine = TournamentEngine::open(store.clone(), KEY);

    assert!(engine.tournament().teams.is_empty());
    assert_eq!(engine.tournament().current_round_number, 0);
    assert!(serde_json::from_str::<Value>(&store.get(KEY).unwrap()).is_ok());
}

#[test]
fn test_save_failure_keeps_in_memory_state() {
    let store = FlakyStore::default();
    let mut engine = TournamentEngine::open(store, KEY);

    engine.store().fail_writes.store(true, Ordering::SeqCst);
    let team = engine.add_team("Ases", players());
    assert!(engine.tournament().team(team.id).is_some());
    assert_eq!(engine.store().inner.get(KEY).map(|s| s.contains(&team.id.to_string())), Some(false));

    engine.store().fail_writes.store(false, Ordering::SeqCst);
    engine.create_round();
    assert!(engine.store().inner.get(KEY).unwrap().contains(&team.id.to_string()));
}

#[test]
fn test_unreadable_store_is_not_overwritten() {
    let store = FlakyStore {
        fail_reads: true,
        ..Default::default()
    };
    store.inner.write(KEY, r#"{"name":"precious"}"#).unwrap();

    let mut engine = TournamentEngine::new(store, KEY);
    assert_eq!(engine.load(), LoadOutcome::Unreadable);
    assert_eq!(engine.store().inner.write_count(), 1);
    assert!(engine.tournament().teams.is_empty());
}

#[test]
fn test_undoing_results_from_an_oversized_snapshot() {
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let (first, second) = (Uuid::new_v4(), Uuid::new_v4());
    let finished = |id: Uuid, winner: Uuid, loser: Uuid, life_taken: bool| {
        json!({
            "id": id.to_string(),
            "teamOneId": winner.to_string(), "teamTwoId": loser.to_string(),
            "teamOneScore": 4000, "teamTwoScore": 100,
            "status": "FINISHED", "winnerId": winner.to_string(), "loserId": loser.to_string(),
            "lifeTaken": life_taken
        })
    };
    let snapshot = json!({
        "name": "Copa",
        "teams": [
            { "id": a.to_string(), "name": "Ases", "lives": 4_294_967_295_u64 },
            { "id": b.to_string(), "name": "Reis", "lives": 99_999_999_999_i64 },
            { "id": c.to_string(), "name": "Damas", "lives": 0 }
        ],
        "rounds": [{ "number": 1, "matches": [
            finished(first, a, b, true),
            finished(second, a, c, false)
        ]}],
        "currentRound": 1
    });
    let store = MemoryStore::with_snapshot(KEY, &snapshot.to_string());

    let mut engine = TournamentEngine::new(store, KEY);
    assert_eq!(engine.load(), LoadOutcome::Repaired);
    let reis = engine.tournament().team(b).unwrap();
    assert_eq!(reis.lives, 2);

    engine.delete_match(first).unwrap();
    assert_eq!(engine.tournament().team(b).unwrap().lives, 3);

    let reopened = engine.reverse_match_result(second).unwrap();
    assert_eq!(reopened.status, MatchStatus::InProgress);
    let damas = engine.tournament().team(c).unwrap();
    assert_eq!((damas.lives, damas.eliminated), (0, true));
}
