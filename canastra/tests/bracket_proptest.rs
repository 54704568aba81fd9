/// Property-based tests for the bracket engine using proptest
///
/// These tests run random sequences of operations and check that the
/// snapshot invariants hold after every step.
use std::collections::HashSet;

use canastra::store::MemoryStore;
use canastra::tournament::{
    Match, MatchStatus, Player, Tournament, TournamentEngine, constants::WIN_THRESHOLD, rules,
};
use proptest::prelude::*;
use uuid::Uuid;

#[derive(Debug, Clone)]
enum Op {
    AddTeam,
    CreateRound,
    CreateMatch(usize, usize),
    Start(usize),
    Finish(usize, i32, i32),
    Reverse(usize),
    DeleteMatch(usize),
    DeleteRound(usize),
    DeleteTeam(usize),
    Reregister(usize),
    Advance,
}

fn score_strategy() -> impl Strategy<Value = i32> {
    prop_oneof![
        -500i32..5000,
        Just(WIN_THRESHOLD),
        Just(WIN_THRESHOLD - 1),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::AddTeam),
        1 => Just(Op::CreateRound),
        4 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::CreateMatch(a, b)),
        1 => any::<usize>().prop_map(Op::Start),
        4 => (any::<usize>(), score_strategy(), score_strategy())
            .prop_map(|(m, one, two)| Op::Finish(m, one, two)),
        1 => any::<usize>().prop_map(Op::Reverse),
        1 => any::<usize>().prop_map(Op::DeleteMatch),
        1 => any::<usize>().prop_map(Op::DeleteRound),
        1 => any::<usize>().prop_map(Op::DeleteTeam),
        1 => any::<usize>().prop_map(Op::Reregister),
        2 => Just(Op::Advance),
    ]
}

fn all_matches(tournament: &Tournament) -> Vec<&Match> {
    tournament
        .rounds
        .iter()
        .flat_map(|r| r.matches.iter())
        .collect()
}

fn pick<T: Copy>(items: &[T], index: usize) -> Option<T> {
    (!items.is_empty()).then(|| items[index % items.len()])
}

/// Apply one operation, returning whether the engine accepted it
fn apply(engine: &mut TournamentEngine<MemoryStore>, op: &Op) -> bool {
    let tournament = engine.tournament();
    let team_ids: Vec<Uuid> = tournament.teams.iter().map(|t| t.id).collect();
    let round_ids: Vec<Uuid> = tournament.rounds.iter().map(|r| r.id).collect();
    let match_ids: Vec<Uuid> = all_matches(tournament).iter().map(|m| m.id).collect();
    let current = tournament.current_round().map(|r| r.id);

    match *op {
        Op::AddTeam => {
            engine.add_team("T", [Player::new("player1", "A"), Player::new("player2", "B")]);
            true
        }
        Op::CreateRound => {
            engine.create_round();
            true
        }
        Op::CreateMatch(a, b) => match current {
            Some(round_id) => engine
                .create_match(pick(&team_ids, a), pick(&team_ids, b), round_id)
                .is_ok(),
            None => false,
        },
        Op::Start(m) => pick(&match_ids, m)
            .is_some_and(|id| engine.update_match_status(id, MatchStatus::InProgress).is_ok()),
        Op::Finish(m, one, two) => {
            pick(&match_ids, m).is_some_and(|id| engine.finish_match(id, one, two).is_ok())
        }
        Op::Reverse(m) => {
            pick(&match_ids, m).is_some_and(|id| engine.reverse_match_result(id).is_ok())
        }
        Op::DeleteMatch(m) => {
            pick(&match_ids, m).is_some_and(|id| engine.delete_match(id).is_ok())
        }
        Op::DeleteRound(r) => {
            pick(&round_ids, r).is_some_and(|id| engine.delete_round(id).is_ok())
        }
        Op::DeleteTeam(t) => pick(&team_ids, t).is_some_and(|id| engine.delete_team(id)),
        Op::Reregister(t) => {
            pick(&team_ids, t).is_some_and(|id| engine.reregister_team(id).is_ok())
        }
        Op::Advance => engine.advance_round().is_ok(),
    }
}

fn check_invariants(tournament: &Tournament) -> Result<(), TestCaseError> {
    for team in &tournament.teams {
        prop_assert_eq!(team.eliminated, team.lives == 0, "team {:?}", team);
    }

    prop_assert_eq!(
        tournament.current_round_number,
        tournament.highest_round_number()
    );

    let numbers: HashSet<u32> = tournament.rounds.iter().map(|r| r.number).collect();
    prop_assert_eq!(numbers.len(), tournament.rounds.len());

    for round in &tournament.rounds {
        let mut seen = HashSet::new();
        for game in &round.matches {
            prop_assert_ne!(game.team_one_id, game.team_two_id);
            prop_assert_eq!(game.round_id, round.id);
            prop_assert_eq!(game.winner_id.is_some(), game.loser_id.is_some());
            if game.life_taken {
                prop_assert!(game.loser_id.is_some(), "life taken without a result");
            }
            if game.winner_id.is_some() {
                prop_assert_eq!(game.status, MatchStatus::Finished);
            }
            prop_assert!(seen.insert(game.team_one_id), "team paired twice in a round");
            prop_assert!(seen.insert(game.team_two_id), "team paired twice in a round");
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn test_invariants_hold_after_every_operation(
        ops in prop::collection::vec(op_strategy(), 1..80)
    ) {
        let store = MemoryStore::new();
        let mut engine = TournamentEngine::open(store.clone(), "prop");

        for op in &ops {
            let before = engine.tournament().clone();
            let writes = store.write_count();

            let accepted = apply(&mut engine, op);
            check_invariants(engine.tournament())?;

            if !accepted {
                prop_assert_eq!(engine.tournament(), &before, "rejected {:?} mutated", op);
                prop_assert_eq!(store.write_count(), writes);
            }
        }
    }

    #[test]
    fn test_finish_then_reverse_restores_lives(
        one in score_strategy(),
        two in score_strategy(),
        prior_losses in 0u32..3,
    ) {
        let mut engine = TournamentEngine::open(MemoryStore::new(), "prop");
        let players = || [Player::new("player1", "A"), Player::new("player2", "B")];
        let a = engine.add_team("A", players()).id;
        let b = engine.add_team("B", players()).id;

        for id in [a, b] {
            let mut team = engine.tournament().team(id).unwrap().clone();
            team.lives -= prior_losses;
            engine.update_team(team);
        }

        let round = engine.create_round();
        let game = engine.create_match(Some(a), Some(b), round.id).unwrap();
        let before = engine.tournament().teams.clone();

        let result = engine.finish_match(game.id, one, two).unwrap();
        let loser = engine.tournament().team(result.loser_id).unwrap();
        prop_assert_eq!(result.loser_eliminated, loser.lives == 0);

        let reversed = engine.reverse_match_result(game.id).unwrap();
        prop_assert_eq!(&engine.tournament().teams, &before);
        prop_assert_eq!(reversed.status, MatchStatus::InProgress);
        prop_assert_eq!(reversed.winner_id, None);
        prop_assert_eq!(reversed.loser_id, None);
        prop_assert_eq!(reversed.end_time, None);
    }

    #[test]
    fn test_outcome_follows_threshold_then_higher_score(
        one in score_strategy(),
        two in score_strategy(),
    ) {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut game = Match::new(Uuid::new_v4(), a, b);
        game.team_one_score = one;
        game.team_two_score = two;

        let outcome = rules::determine_outcome(&game);
        prop_assert_ne!(outcome.winner_id, outcome.loser_id);

        let expected = if one >= WIN_THRESHOLD {
            a
        } else if two >= WIN_THRESHOLD {
            b
        } else if one >= two {
            a
        } else {
            b
        };
        prop_assert_eq!(outcome.winner_id, expected);
    }

    #[test]
    fn test_pairing_covers_every_winner_once(count in 0usize..20) {
        let winners: Vec<Uuid> = (0..count).map(|_| Uuid::new_v4()).collect();
        let (pairs, bye) = rules::pair_winners(&winners);

        prop_assert_eq!(pairs.len(), count / 2);
        prop_assert_eq!(bye.is_some(), count % 2 == 1);

        let mut flattened: Vec<Uuid> = pairs.iter().flat_map(|&(x, y)| [x, y]).collect();
        flattened.extend(bye);
        prop_assert_eq!(flattened, winners);
    }
}
