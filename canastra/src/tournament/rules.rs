//! Pure bracket rules.
//!
//! Nothing in here touches the engine or the store: each function takes a
//! piece of the snapshot and returns a value or a new roster. The engine
//! composes them into state transitions.

use super::constants::WIN_THRESHOLD;
use super::models::{Match, MatchStatus, Round, RoundId, Team, TeamId, Tournament};

/// Winner and loser of a played match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub winner_id: TeamId,
    pub loser_id: TeamId,
}

/// Decide who won a match from its scores.
///
/// A team at or above [`WIN_THRESHOLD`] wins, team one being checked first.
/// Below the threshold the higher score wins and a tie goes to team one.
pub fn determine_outcome(game: &Match) -> Outcome {
    let one = game.team_one_score;
    let two = game.team_two_score;

    let team_one_wins = if one >= WIN_THRESHOLD {
        true
    } else if two >= WIN_THRESHOLD {
        false
    } else {
        one >= two
    };

    if team_one_wins {
        Outcome {
            winner_id: game.team_one_id,
            loser_id: game.team_two_id,
        }
    } else {
        Outcome {
            winner_id: game.team_two_id,
            loser_id: game.team_one_id,
        }
    }
}

/// Take one life from the loser. Other teams are left untouched.
pub fn apply_loss(teams: &[Team], loser_id: TeamId) -> Vec<Team> {
    teams
        .iter()
        .map(|team| {
            if team.id != loser_id {
                return team.clone();
            }
            let lives = team.lives.saturating_sub(1);
            Team {
                lives,
                eliminated: lives == 0,
                ..team.clone()
            }
        })
        .collect()
}

/// Give one life back, recomputing elimination from the new count.
pub fn restore_life(teams: &[Team], team_id: TeamId) -> Vec<Team> {
    teams
        .iter()
        .map(|team| {
            if team.id != team_id {
                return team.clone();
            }
            let lives = team.lives.saturating_add(1);
            Team {
                lives,
                eliminated: lives == 0,
                ..team.clone()
            }
        })
        .collect()
}

/// A team is available in a round until it appears in one of its matches.
/// Unknown rounds count as empty.
pub fn is_team_available(team_id: TeamId, round_id: RoundId, tournament: &Tournament) -> bool {
    tournament
        .round(round_id)
        .is_none_or(|round| !round.matches.iter().any(|m| m.involves(team_id)))
}

/// A round is complete once it has matches and all of them are finished.
pub fn is_round_complete(round: &Round) -> bool {
    !round.matches.is_empty()
        && round
            .matches
            .iter()
            .all(|m| m.status == MatchStatus::Finished)
}

/// Winners of the finished matches of a round, in match order
pub fn round_winners(round: &Round) -> Vec<TeamId> {
    round
        .matches
        .iter()
        .filter(|m| m.status == MatchStatus::Finished)
        .filter_map(|m| m.winner_id)
        .collect()
}

/// Pair winners in order: (0, 1), (2, 3), ... An odd count leaves the last
/// winner without an opponent.
pub fn pair_winners(winners: &[TeamId]) -> (Vec<(TeamId, TeamId)>, Option<TeamId>) {
    let pairs = winners
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect();
    let leftover = winners.chunks_exact(2).remainder().first().copied();
    (pairs, leftover)
}

/// Number for the next round: one past the highest existing number.
pub fn next_round_number(rounds: &[Round]) -> u32 {
    rounds.iter().map(|r| r.number).max().unwrap_or(0) + 1
}
