//! Structural repair of stored snapshots.
//!
//! Snapshots are read field by field from untyped JSON instead of being
//! deserialized directly, so a single bad field costs that field and not the
//! whole tournament. Older snapshots used Portuguese field names (`duplas`,
//! `rodadas`, `vidas`, ...) and an earlier English schema (`roundNumber`,
//! `currentRound`, `winner`); both are accepted.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashSet;
use uuid::Uuid;

use super::LoadOutcome;
use crate::tournament::{
    Match, MatchStatus, Player, Round, RoundId, Team, Tournament,
    constants::{DEFAULT_TOURNAMENT_NAME, STARTING_LIVES},
};

type Object = Map<String, Value>;

/// Rebuild a tournament from raw snapshot text.
///
/// Returns [`LoadOutcome::Clean`] when the rebuilt tournament serializes to
/// exactly the stored document, [`LoadOutcome::Repaired`] when anything had
/// to be coerced and [`LoadOutcome::Reset`] when the text is not a JSON
/// object at all.
pub fn repair(raw: &str) -> (Tournament, LoadOutcome) {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Snapshot is not valid JSON, starting a new tournament: {}", e);
            return (Tournament::default(), LoadOutcome::Reset);
        }
    };

    let Some(obj) = value.as_object() else {
        log::warn!("Snapshot is not a JSON object, starting a new tournament");
        return (Tournament::default(), LoadOutcome::Reset);
    };

    let tournament = tournament_from(obj);
    let outcome = match serde_json::to_value(&tournament) {
        Ok(rebuilt) if rebuilt == value => LoadOutcome::Clean,
        _ => LoadOutcome::Repaired,
    };

    (tournament, outcome)
}

fn tournament_from(obj: &Object) -> Tournament {
    let teams = objects(array_field(obj, &["teams", "duplas"]))
        .map(team_from)
        .collect();

    let mut rounds: Vec<Round> = Vec::new();
    let mut seen_numbers = HashSet::new();
    for round_obj in objects(array_field(obj, &["rounds", "rodadas"])) {
        let highest = rounds.iter().map(|r| r.number).max().unwrap_or(0);
        let mut round = round_from(round_obj, highest + 1);
        if !seen_numbers.insert(round.number) {
            log::warn!("Duplicate round number {}, renumbering", round.number);
            round.number = highest + 1;
            seen_numbers.insert(round.number);
        }
        rounds.push(round);
    }

    let mut tournament = Tournament {
        id: uuid_field(obj, &["id"]).unwrap_or_else(Uuid::new_v4),
        name: string_field(obj, &["name", "nome"])
            .unwrap_or_else(|| DEFAULT_TOURNAMENT_NAME.to_string()),
        teams,
        rounds,
        current_round_number: 0,
    };
    tournament.current_round_number = tournament.highest_round_number();
    tournament
}

fn team_from(obj: &Object) -> Team {
    let mut players = [default_player(0), default_player(1)];
    for (index, player_obj) in objects(array_field(obj, &["players", "jogadores"]))
        .take(2)
        .enumerate()
    {
        players[index] = player_from(player_obj, index);
    }

    let lives = field(obj, &["lives", "vidas"])
        .and_then(Value::as_i64)
        .map(|n| u32::try_from(n.clamp(0, i64::from(STARTING_LIVES))).unwrap_or(STARTING_LIVES))
        .unwrap_or(STARTING_LIVES);

    Team {
        id: uuid_field(obj, &["id"]).unwrap_or_else(Uuid::new_v4),
        name: string_field(obj, &["name", "nome"]).unwrap_or_default(),
        players,
        lives,
        eliminated: lives == 0,
        reregistered: bool_field(obj, &["reregistered", "reinscrita"]).unwrap_or(false),
    }
}

fn default_player(index: usize) -> Player {
    Player::new(format!("player{}", index + 1), "")
}

fn player_from(obj: &Object, index: usize) -> Player {
    Player {
        id: string_field(obj, &["id"]).unwrap_or_else(|| default_player(index).id),
        name: string_field(obj, &["name", "nome"]).unwrap_or_default(),
        contact: string_field(obj, &["contact", "contato"]),
    }
}

fn round_from(obj: &Object, fallback_number: u32) -> Round {
    let id = uuid_field(obj, &["id"]).unwrap_or_else(Uuid::new_v4);
    let number = field(obj, &["number", "roundNumber", "numero"])
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
        .unwrap_or(fallback_number);

    let matches = objects(array_field(obj, &["matches", "partidas"]))
        .filter_map(|m| match_from(m, id))
        .collect();

    Round {
        id,
        number,
        matches,
        completed: bool_field(obj, &["completed", "completa"]).unwrap_or(false),
        created_at: time_field(obj, &["createdAt", "criadaEm"]).unwrap_or_else(Utc::now),
        byes: array_field(obj, &["byes"])
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|s| Uuid::parse_str(s).ok())
            .collect(),
    }
}

/// Matches without two distinct, parseable team ids are dropped.
fn match_from(obj: &Object, round_id: RoundId) -> Option<Match> {
    let team_one_id = uuid_field(obj, &["teamOneId", "duplaUmId"]);
    let team_two_id = uuid_field(obj, &["teamTwoId", "duplaDoisId"]);
    let (team_one_id, team_two_id) = match (team_one_id, team_two_id) {
        (Some(one), Some(two)) if one != two => (one, two),
        _ => {
            log::warn!("Dropping match without two distinct teams in round {}", round_id);
            return None;
        }
    };

    let status = string_field(obj, &["status"])
        .and_then(|s| parse_status(&s))
        .unwrap_or(MatchStatus::Waiting);

    let winner = uuid_field(obj, &["winnerId", "winner", "vencedor"]);
    let loser = uuid_field(obj, &["loserId", "loser", "perdedor"]);
    let (winner_id, loser_id) = match (status, winner, loser) {
        (MatchStatus::Finished, Some(w), Some(l))
            if (w == team_one_id && l == team_two_id) || (w == team_two_id && l == team_one_id) =>
        {
            (Some(w), Some(l))
        }
        _ => (None, None),
    };
    let life_taken = loser_id.is_some() && bool_field(obj, &["lifeTaken"]).unwrap_or(true);

    Some(Match {
        id: uuid_field(obj, &["id"]).unwrap_or_else(Uuid::new_v4),
        round_id,
        team_one_id,
        team_two_id,
        team_one_score: score_field(obj, &["teamOneScore", "pontosDuplaUm"]),
        team_two_score: score_field(obj, &["teamTwoScore", "pontosDuplaDois"]),
        status,
        winner_id,
        loser_id,
        life_taken,
        start_time: time_field(obj, &["startTime", "horaInicio"]),
        end_time: time_field(obj, &["endTime", "horaFim"]),
    })
}

fn parse_status(s: &str) -> Option<MatchStatus> {
    match s {
        "WAITING" | "AGUARDANDO" => Some(MatchStatus::Waiting),
        "IN_PROGRESS" | "EM_ANDAMENTO" => Some(MatchStatus::InProgress),
        "FINISHED" | "FINALIZADA" => Some(MatchStatus::Finished),
        _ => None,
    }
}

fn field<'a>(obj: &'a Object, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| obj.get(*name))
}

fn string_field(obj: &Object, names: &[&str]) -> Option<String> {
    field(obj, names).and_then(Value::as_str).map(str::to_owned)
}

fn uuid_field(obj: &Object, names: &[&str]) -> Option<Uuid> {
    field(obj, names)
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}

fn bool_field(obj: &Object, names: &[&str]) -> Option<bool> {
    field(obj, names).and_then(Value::as_bool)
}

fn score_field(obj: &Object, names: &[&str]) -> i32 {
    field(obj, names)
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f.round() as i64)))
        .and_then(|n| i32::try_from(n).ok())
        .unwrap_or(0)
}

fn time_field(obj: &Object, names: &[&str]) -> Option<DateTime<Utc>> {
    field(obj, names)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn array_field<'a>(obj: &'a Object, names: &[&str]) -> &'a [Value] {
    field(obj, names)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn objects(values: &[Value]) -> impl Iterator<Item = &Object> {
    values.iter().filter_map(Value::as_object)
}
