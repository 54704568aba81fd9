//! # Canastra
//!
//! Bracket engine for doubles canastra tournaments played with lives.
//!
//! Every team ("dupla") enters with two lives. Losing a match costs one life
//! and a team with no lives left is eliminated, unless it reregisters before
//! the cutoff round. Rounds are numbered, matches are paired manually inside a
//! round, and once a round is fully played its winners are paired
//! automatically into the next one.
//!
//! ## Core Modules
//!
//! - [`tournament`]: entity model, pure rule functions and the state engine
//! - [`store`]: snapshot persistence with structural repair of damaged data
//! - [`service`]: async actor that serializes access to one engine
//!
//! ## Example
//!
//! ```
//! use canastra::store::MemoryStore;
//! use canastra::tournament::{Player, TournamentEngine};
//!
//! let mut engine = TournamentEngine::open(MemoryStore::new(), "canastra-tournament");
//! let ana = engine.add_team("Ana & Bia", [Player::new("p1", "Ana"), Player::new("p2", "Bia")]);
//! let caio = engine.add_team("Caio & Davi", [Player::new("p1", "Caio"), Player::new("p2", "Davi")]);
//!
//! let round = engine.create_round();
//! let game = engine
//!     .create_match(Some(ana.id), Some(caio.id), round.id)
//!     .unwrap();
//! let result = engine.finish_match(game.id, 4010, 2350).unwrap();
//! assert_eq!(result.winner_id, ana.id);
//! ```

/// Bracket entities, rules and the state engine.
pub mod tournament;
pub use tournament::{
    ErrorKind, Match, MatchId, MatchStatus, Player, Round, RoundId, Team, TeamId, Tournament,
    TournamentEngine, TournamentError, TournamentResult,
    constants::{self, STARTING_LIVES, WIN_THRESHOLD},
};

/// Snapshot persistence.
pub mod store;
pub use store::{FileStore, MemoryStore, SnapshotStore, StoreConfig};

/// Single-writer actor wrapping the engine.
pub mod service;
pub use service::{TournamentActor, TournamentHandle};
