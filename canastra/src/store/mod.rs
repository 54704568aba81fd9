//! Snapshot persistence for the tournament.
//!
//! The whole tournament is stored as one JSON document under a fixed key and
//! is rewritten in full after every mutation. Loading never fails: a missing
//! snapshot yields a fresh tournament, a damaged one is repaired field by
//! field, and the repaired form is written back.
//!
//! ## Example
//!
//! ```
//! use canastra::store::{self, LoadOutcome, MemoryStore};
//!
//! let store = MemoryStore::with_snapshot("canastra-tournament", r#"{"teams": "oops"}"#);
//! let report = store::load(&store, "canastra-tournament");
//!
//! assert_eq!(report.outcome, LoadOutcome::Repaired);
//! assert!(report.tournament.teams.is_empty());
//! ```

pub mod config;
pub mod errors;
pub mod file;
pub mod memory;
pub mod repair;

pub use config::{ConfigError, StoreConfig};
pub use errors::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;

use crate::tournament::Tournament;

/// Durable key/value storage for raw snapshots
pub trait SnapshotStore {
    /// Raw snapshot saved under `key`, `None` when nothing was saved yet
    fn read(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replace the snapshot saved under `key`
    fn write(&self, key: &str, contents: &str) -> StoreResult<()>;
}

/// How a snapshot came out of [`load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Stored snapshot was already well formed
    Clean,
    /// Nothing stored yet
    Fresh,
    /// Stored snapshot had missing or invalid fields that were coerced
    Repaired,
    /// Stored snapshot was unusable and replaced with a new tournament
    Reset,
    /// Store could not be read; nothing was written back
    Unreadable,
}

/// Result of loading a snapshot
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub tournament: Tournament,
    pub outcome: LoadOutcome,
}

/// Load the tournament saved under `key`, repairing it when needed.
pub fn load<S: SnapshotStore + ?Sized>(store: &S, key: &str) -> LoadReport {
    let raw = match store.read(key) {
        Ok(raw) => raw,
        Err(e) => {
            log::error!("Failed to read snapshot '{}': {}", key, e);
            return LoadReport {
                tournament: Tournament::default(),
                outcome: LoadOutcome::Unreadable,
            };
        }
    };

    let (tournament, outcome) = match raw {
        Some(raw) => repair::repair(&raw),
        None => (Tournament::default(), LoadOutcome::Fresh),
    };

    if outcome != LoadOutcome::Clean {
        log::info!("Snapshot '{}' loaded as {:?}, writing it back", key, outcome);
        if let Err(e) = save(store, key, &tournament) {
            log::error!("Failed to write back snapshot '{}': {}", key, e);
        }
    }

    LoadReport {
        tournament,
        outcome,
    }
}

/// Serialize and write the full snapshot.
pub fn save<S: SnapshotStore + ?Sized>(
    store: &S,
    key: &str,
    tournament: &Tournament,
) -> StoreResult<()> {
    let contents = serde_json::to_string(tournament)?;
    store.write(key, &contents)
}

/// Keys become file names, so only a conservative character set is allowed.
pub(crate) fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
