//! Single-writer service around the tournament engine.
//!
//! The engine is synchronous and owns the snapshot. When more than one
//! surface drives the same tournament (an admin panel and a public
//! scoreboard, say) they talk to a [`TournamentActor`] through cloneable
//! [`TournamentHandle`]s instead, and can subscribe to change notifications.
//!
//! ## Example
//!
//! ```
//! use canastra::service::{ChangeNotification, TournamentActor};
//! use canastra::store::MemoryStore;
//! use canastra::tournament::Player;
//!
//! #[tokio::main]
//! async fn main() {
//!     let handle = TournamentActor::spawn(MemoryStore::new(), "canastra-tournament");
//!     let (_, mut changes) = handle.subscribe().await.unwrap();
//!
//!     handle
//!         .add_team("Ana & Bia", [Player::new("player1", "Ana"), Player::new("player2", "Bia")])
//!         .await
//!         .unwrap();
//!     assert_eq!(changes.recv().await, Some(ChangeNotification::TeamsChanged));
//!
//!     handle.close().await.unwrap();
//! }
//! ```

pub mod actor;
pub mod errors;
pub mod messages;

pub use actor::{TournamentActor, TournamentHandle};
pub use errors::{ServiceError, ServiceResult};
pub use messages::{ChangeNotification, SnapshotResponse, TournamentMessage};
