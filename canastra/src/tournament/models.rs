//! Tournament data models for doubles brackets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::constants::{DEFAULT_TOURNAMENT_NAME, REREGISTRATION_CUTOFF_ROUND, STARTING_LIVES};

/// Tournament ID type
pub type TournamentId = Uuid;

/// Team ID type
pub type TeamId = Uuid;

/// Round ID type
pub type RoundId = Uuid;

/// Match ID type
pub type MatchId = Uuid;

/// Match status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    /// Paired, not started yet
    Waiting,
    /// Being played
    InProgress,
    /// Played out
    Finished,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Waiting => write!(f, "WAITING"),
            MatchStatus::InProgress => write!(f, "IN_PROGRESS"),
            MatchStatus::Finished => write!(f, "FINISHED"),
        }
    }
}

/// One half of a team
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            contact: None,
        }
    }

    /// Attach a phone number or e-mail
    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }
}

/// A two-player team (dupla)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub players: [Player; 2],
    /// Remaining lives, the team is out at zero
    pub lives: u32,
    pub eliminated: bool,
    /// Whether the team already used its reregistration
    pub reregistered: bool,
}

impl Team {
    /// Create a team with a fresh id and full lives
    pub fn new(name: impl Into<String>, players: [Player; 2]) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            players,
            lives: STARTING_LIVES,
            eliminated: false,
            reregistered: false,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.eliminated
    }

    /// Whether the roster should offer reregistration for this team.
    ///
    /// Only eliminated teams that never reregistered qualify, and only while
    /// the tournament is still before the cutoff round.
    pub fn can_reregister(&self, current_round_number: u32) -> bool {
        self.eliminated && !self.reregistered && current_round_number < REREGISTRATION_CUTOFF_ROUND
    }
}

/// A single contest between two teams
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub round_id: RoundId,
    pub team_one_id: TeamId,
    pub team_two_id: TeamId,
    pub team_one_score: i32,
    pub team_two_score: i32,
    pub status: MatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<TeamId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loser_id: Option<TeamId>,
    /// Finishing the match cost the loser a life
    #[serde(default)]
    pub life_taken: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl Match {
    /// Create a waiting match with zero scores
    pub fn new(round_id: RoundId, team_one_id: TeamId, team_two_id: TeamId) -> Self {
        Self {
            id: Uuid::new_v4(),
            round_id,
            team_one_id,
            team_two_id,
            team_one_score: 0,
            team_two_score: 0,
            status: MatchStatus::Waiting,
            winner_id: None,
            loser_id: None,
            life_taken: false,
            start_time: None,
            end_time: None,
        }
    }

    /// Whether the team plays in this match
    pub fn involves(&self, team_id: TeamId) -> bool {
        self.team_one_id == team_id || self.team_two_id == team_id
    }

    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }

    /// The loser of a finished match that carries a result
    pub fn recorded_loser(&self) -> Option<TeamId> {
        match (self.status, self.winner_id, self.loser_id) {
            (MatchStatus::Finished, Some(_), Some(loser)) => Some(loser),
            _ => None,
        }
    }

    /// The loser to give a life back to when this result is undone
    pub fn life_owed(&self) -> Option<TeamId> {
        self.recorded_loser().filter(|_| self.life_taken)
    }
}

/// A numbered stage of the tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub id: RoundId,
    pub number: u32,
    pub matches: Vec<Match>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    /// Winners carried into this round without an opponent
    #[serde(default)]
    pub byes: Vec<TeamId>,
}

impl Round {
    pub fn new(number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            matches: Vec::new(),
            completed: false,
            created_at: Utc::now(),
            byes: Vec::new(),
        }
    }

    pub fn get_match(&self, match_id: MatchId) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == match_id)
    }
}

/// The whole tournament snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub teams: Vec<Team>,
    pub rounds: Vec<Round>,
    /// Number of the round currently being played, 0 before the first round
    pub current_round_number: u32,
}

impl Default for Tournament {
    fn default() -> Self {
        Self::new(DEFAULT_TOURNAMENT_NAME)
    }
}

impl Tournament {
    /// Create an empty tournament
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            teams: Vec::new(),
            rounds: Vec::new(),
            current_round_number: 0,
        }
    }

    pub fn team(&self, team_id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    pub(crate) fn team_mut(&mut self, team_id: TeamId) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.id == team_id)
    }

    pub fn round(&self, round_id: RoundId) -> Option<&Round> {
        self.rounds.iter().find(|r| r.id == round_id)
    }

    pub(crate) fn round_mut(&mut self, round_id: RoundId) -> Option<&mut Round> {
        self.rounds.iter_mut().find(|r| r.id == round_id)
    }

    pub fn round_by_number(&self, number: u32) -> Option<&Round> {
        self.rounds.iter().find(|r| r.number == number)
    }

    /// The round whose number is the current round number
    pub fn current_round(&self) -> Option<&Round> {
        self.round_by_number(self.current_round_number)
    }

    /// Find a match anywhere in the bracket, together with its round
    pub fn find_match(&self, match_id: MatchId) -> Option<(&Round, &Match)> {
        self.rounds
            .iter()
            .find_map(|round| round.get_match(match_id).map(|m| (round, m)))
    }

    pub(crate) fn match_mut(&mut self, match_id: MatchId) -> Option<&mut Match> {
        self.rounds
            .iter_mut()
            .flat_map(|round| round.matches.iter_mut())
            .find(|m| m.id == match_id)
    }

    /// Highest round number in the bracket, 0 when there are no rounds
    pub fn highest_round_number(&self) -> u32 {
        self.rounds.iter().map(|r| r.number).max().unwrap_or(0)
    }

    /// Teams still in the tournament
    pub fn active_teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.iter().filter(|t| t.is_active())
    }

    pub fn eliminated_teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.iter().filter(|t| t.eliminated)
    }
}
