//! Tournament actor message types.

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::tournament::{
    AdvanceOutcome, Match, MatchId, MatchResult, MatchStatus, Player, Round, RoundId, Team,
    TeamId, Tournament, TournamentResult,
};

/// Messages that can be sent to a TournamentActor
#[derive(Debug)]
pub enum TournamentMessage {
    AddTeam {
        name: String,
        players: [Player; 2],
        response: oneshot::Sender<Team>,
    },

    UpdateTeam {
        team: Team,
        response: oneshot::Sender<bool>,
    },

    DeleteTeam {
        team_id: TeamId,
        response: oneshot::Sender<bool>,
    },

    ReregisterTeam {
        team_id: TeamId,
        response: oneshot::Sender<TournamentResult<Team>>,
    },

    CreateRound {
        response: oneshot::Sender<Round>,
    },

    CompleteRound {
        round_id: RoundId,
        response: oneshot::Sender<TournamentResult<()>>,
    },

    /// Pair the winners of the current round into a new one
    AdvanceRound {
        response: oneshot::Sender<TournamentResult<AdvanceOutcome>>,
    },

    DeleteRound {
        round_id: RoundId,
        response: oneshot::Sender<TournamentResult<Round>>,
    },

    CreateMatch {
        team_one_id: Option<TeamId>,
        team_two_id: Option<TeamId>,
        round_id: RoundId,
        response: oneshot::Sender<TournamentResult<Match>>,
    },

    UpdateMatchStatus {
        match_id: MatchId,
        status: MatchStatus,
        response: oneshot::Sender<TournamentResult<Match>>,
    },

    UpdateMatchScore {
        match_id: MatchId,
        team_one_score: i32,
        team_two_score: i32,
        response: oneshot::Sender<TournamentResult<Match>>,
    },

    FinishMatch {
        match_id: MatchId,
        team_one_score: i32,
        team_two_score: i32,
        response: oneshot::Sender<TournamentResult<MatchResult>>,
    },

    ReverseMatchResult {
        match_id: MatchId,
        response: oneshot::Sender<TournamentResult<Match>>,
    },

    DeleteMatch {
        match_id: MatchId,
        response: oneshot::Sender<TournamentResult<Match>>,
    },

    /// Teams that can still be paired in a round
    AvailableTeams {
        round_id: RoundId,
        response: oneshot::Sender<Vec<Team>>,
    },

    /// Get a copy of the current snapshot
    GetSnapshot {
        response: oneshot::Sender<SnapshotResponse>,
    },

    /// Subscribe to change notifications
    Subscribe {
        subscriber_id: Uuid,
        sender: mpsc::Sender<ChangeNotification>,
    },

    Unsubscribe { subscriber_id: Uuid },

    /// Stop the actor after answering
    Close { response: oneshot::Sender<()> },
}

/// Snapshot copy handed to readers
#[derive(Debug, Clone)]
pub struct SnapshotResponse {
    pub tournament: Tournament,
    /// Stored snapshot not loaded yet
    pub loading: bool,
}

/// Notification sent after a successful mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeNotification {
    /// Team added, edited, removed or reregistered, or a result moved its lives
    TeamsChanged,
    /// Round created, completed, advanced or deleted
    RoundsChanged,
    /// Match created, updated, finished, reversed or deleted
    MatchChanged(MatchId),
}
