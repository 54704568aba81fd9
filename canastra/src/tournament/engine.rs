//! Tournament state engine.
//!
//! The engine owns the canonical [`Tournament`] snapshot. Each operation
//! validates against the current snapshot, builds the next one with the pure
//! rules, swaps it in and saves it. A failed operation returns an error and
//! leaves both the snapshot and the store untouched.

use chrono::Utc;

use super::constants::{REREGISTRATION_CUTOFF_ROUND, REREGISTRATION_LIVES};
use super::errors::{TournamentError, TournamentResult};
use super::models::{
    Match, MatchId, MatchStatus, Player, Round, RoundId, Team, TeamId, Tournament,
};
use super::rules;
use crate::store::{self, LoadOutcome, SnapshotStore};

/// Result of finishing a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub match_id: MatchId,
    pub winner_id: TeamId,
    pub loser_id: TeamId,
    /// The loss took the loser's last life
    pub loser_eliminated: bool,
}

/// Result of advancing to the next round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceOutcome {
    /// The newly created round with its paired matches
    pub round: Round,
    /// Winner left without an opponent, recorded in `round.byes`
    pub bye: Option<TeamId>,
}

/// Owner of the tournament snapshot
pub struct TournamentEngine<S: SnapshotStore> {
    tournament: Tournament,
    store: S,
    storage_key: String,
    loading: bool,
}

impl<S: SnapshotStore> TournamentEngine<S> {
    /// Create an engine holding an empty tournament.
    ///
    /// Nothing is saved until [`load`](Self::load) has run.
    pub fn new(store: S, storage_key: impl Into<String>) -> Self {
        Self {
            tournament: Tournament::default(),
            store,
            storage_key: storage_key.into(),
            loading: true,
        }
    }

    /// Create an engine and load the stored snapshot
    pub fn open(store: S, storage_key: impl Into<String>) -> Self {
        let mut engine = Self::new(store, storage_key);
        engine.load();
        engine
    }

    /// Replace the in-memory snapshot with the stored one
    pub fn load(&mut self) -> LoadOutcome {
        let report = store::load(&self.store, &self.storage_key);
        log::info!(
            "Loaded tournament '{}' ({:?}): {} teams, {} rounds",
            report.tournament.name,
            report.outcome,
            report.tournament.teams.len(),
            report.tournament.rounds.len()
        );
        self.tournament = report.tournament;
        self.loading = false;
        report.outcome
    }

    pub fn tournament(&self) -> &Tournament {
        &self.tournament
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Swap in the next snapshot and save it
    fn commit(&mut self, next: Tournament) {
        self.tournament = next;
        if self.loading {
            return;
        }
        if let Err(e) = store::save(&self.store, &self.storage_key, &self.tournament) {
            log::error!("Failed to save tournament '{}': {}", self.storage_key, e);
        }
    }

    fn reject<T>(&self, error: TournamentError) -> TournamentResult<T> {
        if error.is_warning() {
            log::warn!("{}", error);
        } else {
            log::error!("{}", error);
        }
        Err(error)
    }

    // Teams

    /// Register a new team with full lives. Names are not checked for duplicates.
    pub fn add_team(&mut self, name: impl Into<String>, players: [Player; 2]) -> Team {
        let team = Team::new(name, players);
        let mut next = self.tournament.clone();
        next.teams.push(team.clone());
        self.commit(next);

        log::info!("Team '{}' added ({})", team.name, team.id);
        team
    }

    /// Replace the team with the same id. Returns false if there is none.
    ///
    /// `eliminated` is recomputed from `lives` on the way in.
    pub fn update_team(&mut self, team: Team) -> bool {
        if self.tournament.team(team.id).is_none() {
            log::debug!("Ignoring update for unknown team {}", team.id);
            return false;
        }

        let team = Team {
            eliminated: team.lives == 0,
            ..team
        };
        let mut next = self.tournament.clone();
        if let Some(slot) = next.team_mut(team.id) {
            *slot = team;
        }
        self.commit(next);
        true
    }

    /// Remove a team from the roster. Matches that reference it are kept.
    pub fn delete_team(&mut self, team_id: TeamId) -> bool {
        if self.tournament.team(team_id).is_none() {
            return false;
        }

        let mut next = self.tournament.clone();
        next.teams.retain(|t| t.id != team_id);
        self.commit(next);

        log::info!("Team {} removed", team_id);
        true
    }

    /// Bring a team back with one life, allowed only before the cutoff round
    pub fn reregister_team(&mut self, team_id: TeamId) -> TournamentResult<Team> {
        let current = self.tournament.current_round_number;
        if current >= REREGISTRATION_CUTOFF_ROUND {
            return self.reject(TournamentError::ReregistrationClosed {
                current,
                cutoff: REREGISTRATION_CUTOFF_ROUND,
            });
        }
        let Some(team) = self.tournament.team(team_id) else {
            return self.reject(TournamentError::TeamNotFound(team_id));
        };

        let team = Team {
            lives: REREGISTRATION_LIVES,
            eliminated: false,
            reregistered: true,
            ..team.clone()
        };
        let mut next = self.tournament.clone();
        if let Some(slot) = next.team_mut(team_id) {
            *slot = team.clone();
        }
        self.commit(next);

        log::info!("Team '{}' reregistered", team.name);
        Ok(team)
    }

    // Rounds

    /// Open a new empty round numbered after the highest existing one
    pub fn create_round(&mut self) -> Round {
        let round = Round::new(rules::next_round_number(&self.tournament.rounds));
        let mut next = self.tournament.clone();
        next.rounds.push(round.clone());
        next.current_round_number = round.number;
        self.commit(next);

        log::info!("Round {} created", round.number);
        round
    }

    /// Mark a round as completed. Does not check its matches.
    pub fn complete_round(&mut self, round_id: RoundId) -> TournamentResult<()> {
        if self.tournament.round(round_id).is_none() {
            return self.reject(TournamentError::RoundNotFound(round_id));
        }

        let mut next = self.tournament.clone();
        if let Some(round) = next.round_mut(round_id) {
            round.completed = true;
        }
        self.commit(next);
        Ok(())
    }

    /// Pair the winners of the finished current round into a new round.
    ///
    /// Winners are paired in match order; with an odd count the last winner
    /// gets a bye and is recorded on the new round without a match.
    pub fn advance_round(&mut self) -> TournamentResult<AdvanceOutcome> {
        let Some(current) = self.tournament.current_round() else {
            return self.reject(TournamentError::NoCurrentRound);
        };

        if !rules::is_round_complete(current) {
            let finished = current.matches.iter().filter(|m| m.is_finished()).count();
            return self.reject(TournamentError::RoundIncomplete {
                round_number: current.number,
                finished,
                total: current.matches.len(),
            });
        }

        let winners = rules::round_winners(current);
        if winners.len() < 2 {
            return self.reject(TournamentError::NotEnoughWinners(winners.len()));
        }
        let previous_id = current.id;

        let mut round = Round::new(rules::next_round_number(&self.tournament.rounds));
        let (pairs, bye) = rules::pair_winners(&winners);
        round.matches = pairs
            .into_iter()
            .map(|(one, two)| Match::new(round.id, one, two))
            .collect();
        round.byes.extend(bye);

        let mut next = self.tournament.clone();
        next.rounds.push(round.clone());
        next.current_round_number = round.number;
        if let Some(previous) = next.round_mut(previous_id) {
            previous.completed = true;
        }
        self.commit(next);

        log::info!(
            "Advanced to round {} with {} matches",
            round.number,
            round.matches.len()
        );
        if let Some(team_id) = bye {
            log::info!("Team {} advances to round {} with a bye", team_id, round.number);
        }

        Ok(AdvanceOutcome { round, bye })
    }

    /// Remove a round and its matches, giving back the lives its finished
    /// matches took.
    pub fn delete_round(&mut self, round_id: RoundId) -> TournamentResult<Round> {
        let Some(round) = self.tournament.round(round_id).cloned() else {
            return self.reject(TournamentError::RoundNotFound(round_id));
        };

        let mut next = self.tournament.clone();
        for loser in round.matches.iter().filter_map(Match::life_owed) {
            next.teams = rules::restore_life(&next.teams, loser);
        }
        next.rounds.retain(|r| r.id != round_id);
        next.current_round_number = next.highest_round_number();
        self.commit(next);

        log::info!("Round {} deleted", round.number);
        Ok(round)
    }

    // Matches

    /// Pair two teams in a round.
    ///
    /// Checks, in order: both teams selected, distinct, known, the round
    /// exists and neither team already plays in it.
    pub fn create_match(
        &mut self,
        team_one_id: Option<TeamId>,
        team_two_id: Option<TeamId>,
        round_id: RoundId,
    ) -> TournamentResult<Match> {
        let (Some(team_one_id), Some(team_two_id)) = (team_one_id, team_two_id) else {
            return self.reject(TournamentError::MissingTeam);
        };
        if team_one_id == team_two_id {
            return self.reject(TournamentError::SelfMatch(team_one_id));
        }
        for team_id in [team_one_id, team_two_id] {
            if self.tournament.team(team_id).is_none() {
                return self.reject(TournamentError::TeamNotFound(team_id));
            }
        }
        let Some(round) = self.tournament.round(round_id) else {
            return self.reject(TournamentError::RoundNotFound(round_id));
        };
        let round_number = round.number;
        for team_id in [team_one_id, team_two_id] {
            if !rules::is_team_available(team_id, round_id, &self.tournament) {
                return self.reject(TournamentError::TeamUnavailable {
                    team_id,
                    round_number,
                });
            }
        }

        let game = Match::new(round_id, team_one_id, team_two_id);
        let mut next = self.tournament.clone();
        if let Some(round) = next.round_mut(round_id) {
            round.matches.push(game.clone());
        }
        self.commit(next);

        log::info!("Match {} created in round {}", game.id, round_number);
        Ok(game)
    }

    /// Set a match status, stamping the start time when it goes in progress.
    ///
    /// A match with a recorded result can only leave FINISHED through
    /// [`reverse_match_result`](Self::reverse_match_result).
    pub fn update_match_status(
        &mut self,
        match_id: MatchId,
        status: MatchStatus,
    ) -> TournamentResult<Match> {
        let Some((_, game)) = self.tournament.find_match(match_id) else {
            return self.reject(TournamentError::MatchNotFound(match_id));
        };
        if status != MatchStatus::Finished && game.recorded_loser().is_some() {
            return self.reject(TournamentError::ResultRecorded(match_id));
        }

        let mut next = self.tournament.clone();
        let Some(game) = next.match_mut(match_id) else {
            return self.reject(TournamentError::MatchNotFound(match_id));
        };
        game.status = status;
        if status == MatchStatus::InProgress {
            game.start_time = Some(Utc::now());
        }
        let updated = game.clone();
        self.commit(next);

        log::debug!("Match {} is now {}", match_id, status);
        Ok(updated)
    }

    /// Overwrite the running scores of a match
    pub fn update_match_score(
        &mut self,
        match_id: MatchId,
        team_one_score: i32,
        team_two_score: i32,
    ) -> TournamentResult<Match> {
        let mut next = self.tournament.clone();
        let Some(game) = next.match_mut(match_id) else {
            return self.reject(TournamentError::MatchNotFound(match_id));
        };
        game.team_one_score = team_one_score;
        game.team_two_score = team_two_score;
        let updated = game.clone();
        self.commit(next);
        Ok(updated)
    }

    /// Record final scores, decide the winner and take a life from the loser
    pub fn finish_match(
        &mut self,
        match_id: MatchId,
        team_one_score: i32,
        team_two_score: i32,
    ) -> TournamentResult<MatchResult> {
        let Some((_, game)) = self.tournament.find_match(match_id) else {
            return self.reject(TournamentError::MatchNotFound(match_id));
        };
        if game.is_finished() {
            return self.reject(TournamentError::MatchAlreadyFinished(match_id));
        }

        let mut next = self.tournament.clone();
        let Some(game) = next.match_mut(match_id) else {
            return self.reject(TournamentError::MatchNotFound(match_id));
        };
        game.team_one_score = team_one_score;
        game.team_two_score = team_two_score;
        let outcome = rules::determine_outcome(game);
        game.winner_id = Some(outcome.winner_id);
        game.loser_id = Some(outcome.loser_id);
        game.life_taken = self
            .tournament
            .team(outcome.loser_id)
            .is_some_and(|team| team.lives > 0);
        game.status = MatchStatus::Finished;
        game.end_time = Some(Utc::now());

        next.teams = rules::apply_loss(&next.teams, outcome.loser_id);
        let loser_eliminated = next
            .team(outcome.loser_id)
            .is_some_and(|team| team.eliminated);
        self.commit(next);

        log::info!(
            "Match {} finished {}-{}, winner {}",
            match_id,
            team_one_score,
            team_two_score,
            outcome.winner_id
        );
        if loser_eliminated {
            log::info!("Team {} eliminated", outcome.loser_id);
        }

        Ok(MatchResult {
            match_id,
            winner_id: outcome.winner_id,
            loser_id: outcome.loser_id,
            loser_eliminated,
        })
    }

    /// Undo a finished match: the loser gets back the life the result cost
    /// it, if any, and the match returns to IN_PROGRESS without a result.
    pub fn reverse_match_result(&mut self, match_id: MatchId) -> TournamentResult<Match> {
        let Some((_, game)) = self.tournament.find_match(match_id) else {
            return self.reject(TournamentError::MatchNotFound(match_id));
        };
        if game.recorded_loser().is_none() {
            return self.reject(TournamentError::MatchNotFinished(match_id));
        }

        let mut next = self.tournament.clone();
        if let Some(loser) = game.life_owed() {
            next.teams = rules::restore_life(&next.teams, loser);
        }
        let Some(game) = next.match_mut(match_id) else {
            return self.reject(TournamentError::MatchNotFound(match_id));
        };
        game.winner_id = None;
        game.loser_id = None;
        game.life_taken = false;
        game.status = MatchStatus::InProgress;
        game.end_time = None;
        let reversed = game.clone();
        self.commit(next);

        log::info!("Match {} result reversed", match_id);
        Ok(reversed)
    }

    /// Remove a match from its round, first giving back the life its result
    /// cost the loser
    pub fn delete_match(&mut self, match_id: MatchId) -> TournamentResult<Match> {
        let Some((round, game)) = self.tournament.find_match(match_id) else {
            return self.reject(TournamentError::MatchNotFound(match_id));
        };
        let round_id = round.id;
        let removed = game.clone();

        let mut next = self.tournament.clone();
        if let Some(loser) = removed.life_owed() {
            next.teams = rules::restore_life(&next.teams, loser);
        }
        if let Some(round) = next.round_mut(round_id) {
            round.matches.retain(|m| m.id != match_id);
        }
        self.commit(next);

        log::info!("Match {} deleted", match_id);
        Ok(removed)
    }

    /// Active teams that can still be paired in a round
    pub fn available_teams(&self, round_id: RoundId) -> Vec<&Team> {
        self.tournament
            .active_teams()
            .filter(|team| rules::is_team_available(team.id, round_id, &self.tournament))
            .collect()
    }
}
