//! Tournament error types.

use thiserror::Error;

use super::models::{MatchId, RoundId, TeamId};

/// Errors reported by engine operations.
///
/// Every variant leaves the snapshot untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TournamentError {
    /// One or both teams were not selected
    #[error("Both teams must be selected")]
    MissingTeam,

    /// Both sides of a match are the same team
    #[error("Team {0} cannot play against itself")]
    SelfMatch(TeamId),

    #[error("Team not found: {0}")]
    TeamNotFound(TeamId),

    #[error("Round not found: {0}")]
    RoundNotFound(RoundId),

    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    /// Team already plays in the round
    #[error("Team {team_id} already has a match in round {round_number}")]
    TeamUnavailable { team_id: TeamId, round_number: u32 },

    /// No round carries the current round number
    #[error("No current round")]
    NoCurrentRound,

    #[error("Round {round_number} is not complete: {finished} of {total} matches finished")]
    RoundIncomplete {
        round_number: u32,
        finished: usize,
        total: usize,
    },

    /// Fewer than two winners to pair
    #[error("Need at least 2 winners to advance, have {0}")]
    NotEnoughWinners(usize),

    /// Reversal needs a finished match with a recorded result
    #[error("Match {0} is not finished")]
    MatchNotFinished(MatchId),

    #[error("Match {0} is already finished")]
    MatchAlreadyFinished(MatchId),

    /// Status change would orphan a recorded winner and loser
    #[error("Match {0} has a recorded result, reverse it first")]
    ResultRecorded(MatchId),

    #[error("Reregistration closed: current round {current} reached cutoff {cutoff}")]
    ReregistrationClosed { current: u32, cutoff: u32 },
}

/// Broad class of an engine error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or unknown ids, self-match, unavailable team
    Validation,
    /// Operation not allowed in the current bracket state
    Precondition,
}

impl TournamentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TournamentError::MissingTeam
            | TournamentError::SelfMatch(_)
            | TournamentError::TeamNotFound(_)
            | TournamentError::RoundNotFound(_)
            | TournamentError::MatchNotFound(_)
            | TournamentError::TeamUnavailable { .. } => ErrorKind::Validation,
            TournamentError::NoCurrentRound
            | TournamentError::RoundIncomplete { .. }
            | TournamentError::NotEnoughWinners(_)
            | TournamentError::MatchNotFinished(_)
            | TournamentError::MatchAlreadyFinished(_)
            | TournamentError::ResultRecorded(_)
            | TournamentError::ReregistrationClosed { .. } => ErrorKind::Precondition,
        }
    }

    /// Whether the UI should show this as a warning rather than an error
    pub fn is_warning(&self) -> bool {
        matches!(self, TournamentError::NotEnoughWinners(_))
    }

    /// Message for a toast, without internal ids
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::SelfMatch(_) => "A team cannot play against itself".to_string(),
            TournamentError::TeamNotFound(_) => "Team not found".to_string(),
            TournamentError::RoundNotFound(_) => "Round not found".to_string(),
            TournamentError::MatchNotFound(_) => "Match not found".to_string(),
            TournamentError::TeamUnavailable { round_number, .. } => {
                format!("Team already has a match in round {round_number}")
            }
            TournamentError::MatchNotFinished(_) => {
                "Cannot reverse a match that is not finished".to_string()
            }
            TournamentError::MatchAlreadyFinished(_) => "Match is already finished".to_string(),
            TournamentError::ResultRecorded(_) => {
                "Match has a recorded result, reverse it first".to_string()
            }
            TournamentError::ReregistrationClosed { cutoff, .. } => {
                format!("Cannot reregister after round {cutoff}")
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
