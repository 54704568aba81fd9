//! Read models derived from a tournament snapshot.

use serde::Serialize;

use super::models::{Match, MatchStatus, Round, Team, TeamId, Tournament};

/// Progress of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchCounts {
    pub total: usize,
    pub finished: usize,
}

impl MatchCounts {
    pub fn of(round: &Round) -> Self {
        Self {
            total: round.matches.len(),
            finished: round.matches.iter().filter(|m| m.is_finished()).count(),
        }
    }

    /// Same condition `advance_round` requires
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.finished == self.total
    }
}

/// A match together with both of its teams
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView<'a> {
    #[serde(rename = "match")]
    pub game: &'a Match,
    pub team_one: &'a Team,
    pub team_two: &'a Team,
}

impl<'a> MatchView<'a> {
    /// Resolve both teams, `None` if either was deleted
    pub fn resolve(tournament: &'a Tournament, game: &'a Match) -> Option<Self> {
        Some(Self {
            game,
            team_one: tournament.team(game.team_one_id)?,
            team_two: tournament.team(game.team_two_id)?,
        })
    }

    pub fn winner(&self) -> Option<&'a Team> {
        match self.game.winner_id? {
            id if id == self.team_one.id => Some(self.team_one),
            id if id == self.team_two.id => Some(self.team_two),
            _ => None,
        }
    }
}

/// Live view of the current round
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scoreboard<'a> {
    /// `None` before the first round
    pub round_number: Option<u32>,
    /// Waiting and in-progress matches
    pub active: Vec<MatchView<'a>>,
    pub completed: Vec<MatchView<'a>>,
}

/// Split the current round into active and completed matches.
///
/// Matches whose teams no longer exist are left out.
pub fn scoreboard(tournament: &Tournament) -> Scoreboard<'_> {
    let Some(round) = tournament.current_round() else {
        return Scoreboard::default();
    };

    let mut board = Scoreboard {
        round_number: Some(round.number),
        ..Default::default()
    };
    for view in round
        .matches
        .iter()
        .filter_map(|game| MatchView::resolve(tournament, game))
    {
        match view.game.status {
            MatchStatus::Waiting | MatchStatus::InProgress => board.active.push(view),
            MatchStatus::Finished => board.completed.push(view),
        }
    }
    board
}

/// Rounds with the most recent first
pub fn rounds_newest_first(tournament: &Tournament) -> Vec<&Round> {
    let mut rounds: Vec<&Round> = tournament.rounds.iter().collect();
    rounds.sort_by(|a, b| b.number.cmp(&a.number));
    rounds
}

/// A team as listed on the roster
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry<'a> {
    pub team: &'a Team,
    pub can_reregister: bool,
}

pub fn roster(tournament: &Tournament) -> Vec<RosterEntry<'_>> {
    tournament
        .teams
        .iter()
        .map(|team| RosterEntry {
            team,
            can_reregister: team.can_reregister(tournament.current_round_number),
        })
        .collect()
}

/// Win/loss record of a team
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing<'a> {
    pub team: &'a Team,
    pub wins: usize,
    pub losses: usize,
}

/// Teams ranked by lives, then wins, then name. Eliminated teams go last.
pub fn standings(tournament: &Tournament) -> Vec<Standing<'_>> {
    let results: Vec<(TeamId, TeamId)> = tournament
        .rounds
        .iter()
        .flat_map(|round| round.matches.iter())
        .filter_map(|game| Some((game.winner_id?, game.recorded_loser()?)))
        .collect();

    let mut standings: Vec<Standing<'_>> = tournament
        .teams
        .iter()
        .map(|team| Standing {
            team,
            wins: results.iter().filter(|(w, _)| *w == team.id).count(),
            losses: results.iter().filter(|(_, l)| *l == team.id).count(),
        })
        .collect();

    standings.sort_by(|a, b| {
        a.team
            .eliminated
            .cmp(&b.team.eliminated)
            .then(b.team.lives.cmp(&a.team.lives))
            .then(b.wins.cmp(&a.wins))
            .then_with(|| a.team.name.cmp(&b.team.name))
    });
    standings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::tournament::{Player, TournamentEngine};

    fn engine_with_teams(names: &[&str]) -> (TournamentEngine<MemoryStore>, Vec<TeamId>) {
        let mut engine = TournamentEngine::open(MemoryStore::new(), "views");
        let ids = names
            .iter()
            .map(|name| engine.add_team(*name, Default::default()).id)
            .collect();
        (engine, ids)
    }

    #[test]
    fn test_scoreboard_before_first_round() {
        let (engine, _) = engine_with_teams(&["A", "B"]);
        let board = scoreboard(engine.tournament());
        assert_eq!(board.round_number, None);
        assert!(board.active.is_empty());
        assert!(board.completed.is_empty());
    }

    #[test]
    fn test_scoreboard_splits_and_skips_deleted_teams() {
        let (mut engine, ids) = engine_with_teams(&["A", "B", "C", "D", "E", "F"]);
        let round = engine.create_round();
        let done = engine
            .create_match(Some(ids[0]), Some(ids[1]), round.id)
            .unwrap();
        engine.finish_match(done.id, 4000, 100).unwrap();
        let live = engine
            .create_match(Some(ids[2]), Some(ids[3]), round.id)
            .unwrap();
        engine
            .update_match_status(live.id, MatchStatus::InProgress)
            .unwrap();
        engine
            .create_match(Some(ids[4]), Some(ids[5]), round.id)
            .unwrap();
        engine.delete_team(ids[5]);

        let board = scoreboard(engine.tournament());
        assert_eq!(board.round_number, Some(1));
        assert_eq!(board.active.len(), 1);
        assert_eq!(board.active[0].game.id, live.id);
        assert_eq!(board.completed.len(), 1);
        assert_eq!(board.completed[0].winner().map(|t| t.id), Some(ids[0]));

        let counts = MatchCounts::of(engine.tournament().current_round().unwrap());
        assert_eq!(counts, MatchCounts { total: 3, finished: 1 });
        assert!(!counts.is_complete());
    }

    #[test]
    fn test_rounds_newest_first() {
        let (mut engine, _) = engine_with_teams(&[]);
        for _ in 0..3 {
            engine.create_round();
        }
        let numbers: Vec<u32> = rounds_newest_first(engine.tournament())
            .iter()
            .map(|r| r.number)
            .collect();
        assert_eq!(numbers, vec![3, 2, 1]);
    }

    #[test]
    fn test_roster_and_standings() {
        let (mut engine, ids) = engine_with_teams(&["Ases", "Curingas", "Damas"]);
        let first = engine.create_round();
        let game = engine
            .create_match(Some(ids[0]), Some(ids[1]), first.id)
            .unwrap();
        engine.finish_match(game.id, 4100, 1200).unwrap();
        let second = engine.create_round();
        let game = engine
            .create_match(Some(ids[2]), Some(ids[1]), second.id)
            .unwrap();
        engine.finish_match(game.id, 4000, 3950).unwrap();

        let roster = roster(engine.tournament());
        let offers: Vec<bool> = roster.iter().map(|entry| entry.can_reregister).collect();
        assert_eq!(offers, vec![false, true, false]);

        let table = standings(engine.tournament());
        let order: Vec<&str> = table.iter().map(|s| s.team.name.as_str()).collect();
        assert_eq!(order, vec!["Ases", "Damas", "Curingas"]);
        assert_eq!((table[0].wins, table[0].losses), (1, 0));
        assert_eq!((table[2].wins, table[2].losses), (0, 2));
    }

    #[test]
    fn test_scoreboard_serializes_match_under_its_own_key() {
        let (mut engine, ids) = engine_with_teams(&["A", "B"]);
        let round = engine.create_round();
        engine
            .create_match(Some(ids[0]), Some(ids[1]), round.id)
            .unwrap();

        let value = serde_json::to_value(scoreboard(engine.tournament())).unwrap();
        assert_eq!(value["roundNumber"], 1);
        assert_eq!(value["active"][0]["match"]["status"], "WAITING");
        assert_eq!(value["active"][0]["teamOne"]["name"], "A");
    }
}
