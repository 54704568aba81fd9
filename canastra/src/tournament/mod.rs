//! Doubles bracket played with lives.
//!
//! This module provides:
//! - Entity model: teams, rounds, matches and the tournament snapshot
//! - Pure rule functions for outcomes, lives, availability and pairing
//! - The state engine that applies every operation and saves the snapshot
//! - Read models for the scoreboard and the roster
//!
//! ## Example
//!
//! ```
//! use canastra::store::MemoryStore;
//! use canastra::tournament::{Player, TournamentEngine, TournamentError};
//!
//! let mut engine = TournamentEngine::open(MemoryStore::new(), "copa");
//! let teams: Vec<_> = ["Ases", "Curingas", "Damas", "Reis"]
//!     .into_iter()
//!     .map(|name| engine.add_team(name, [Player::new("player1", "A"), Player::new("player2", "B")]).id)
//!     .collect();
//!
//! let round = engine.create_round();
//! for pair in teams.chunks(2) {
//!     let game = engine.create_match(Some(pair[0]), Some(pair[1]), round.id).unwrap();
//!     engine.finish_match(game.id, 4000, 2000).unwrap();
//! }
//!
//! let next = engine.advance_round().unwrap();
//! assert_eq!(next.round.number, 2);
//! assert_eq!(next.round.matches.len(), 1);
//! assert_eq!(engine.advance_round(), Err(TournamentError::RoundIncomplete {
//!     round_number: 2,
//!     finished: 0,
//!     total: 1,
//! }));
//! ```

pub mod constants;
pub mod engine;
pub mod errors;
pub mod models;
pub mod rules;
pub mod views;

pub use engine::{AdvanceOutcome, MatchResult, TournamentEngine};
pub use errors::{ErrorKind, TournamentError, TournamentResult};
pub use models::{
    Match, MatchId, MatchStatus, Player, Round, RoundId, Team, TeamId, Tournament, TournamentId,
};
pub use views::{MatchCounts, MatchView, RosterEntry, Scoreboard, Standing};
