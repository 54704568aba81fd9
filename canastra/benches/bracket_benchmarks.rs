use canastra::{
    store::{self, MemoryStore, repair::repair},
    tournament::{Player, TournamentEngine, rules, views},
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

/// Helper to create an engine whose current round is fully played
fn setup_played_round(n_teams: usize) -> TournamentEngine<MemoryStore> {
    let mut engine = TournamentEngine::open(MemoryStore::new(), "bench");
    let ids: Vec<_> = (0..n_teams)
        .map(|i| {
            engine
                .add_team(
                    format!("Dupla {i}"),
                    [Player::new("player1", "A"), Player::new("player2", "B")],
                )
                .id
        })
        .collect();

    let round = engine.create_round();
    for pair in ids.chunks_exact(2) {
        let game = engine
            .create_match(Some(pair[0]), Some(pair[1]), round.id)
            .unwrap();
        engine.finish_match(game.id, 4000, 2500).unwrap();
    }
    engine
}

/// Benchmark pairing winners into the next round, including the snapshot save
fn bench_advance_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance_round");

    for n_teams in [8, 32, 128].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_teams", n_teams)),
            n_teams,
            |b, &n| {
                b.iter_batched(
                    || setup_played_round(n),
                    |mut engine| {
                        engine.advance_round().unwrap();
                        engine
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

/// Benchmark the availability check used by the pairing dialog
fn bench_available_teams(c: &mut Criterion) {
    let engine = setup_played_round(64);
    let round_id = engine.tournament().rounds[0].id;

    c.bench_function("available_teams_64", |b| {
        b.iter(|| engine.available_teams(round_id).len());
    });
}

fn bench_round_winners(c: &mut Criterion) {
    let engine = setup_played_round(128);
    let round = &engine.tournament().rounds[0];

    c.bench_function("round_winners_128", |b| {
        b.iter(|| rules::pair_winners(&rules::round_winners(round)));
    });
}

fn bench_standings(c: &mut Criterion) {
    let engine = setup_played_round(128);

    c.bench_function("standings_128", |b| {
        b.iter(|| views::standings(engine.tournament()).len());
    });
}

/// Benchmark loading a stored snapshot through structural repair
fn bench_repair(c: &mut Criterion) {
    let mut group = c.benchmark_group("repair");

    for n_teams in [8, 128].iter() {
        let engine = setup_played_round(*n_teams);
        let raw = engine.store().get("bench").unwrap_or_default();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_teams", n_teams)),
            &raw,
            |b, raw| {
                b.iter(|| repair(raw));
            },
        );
    }

    group.finish();
}

fn bench_save(c: &mut Criterion) {
    let engine = setup_played_round(128);
    let target = MemoryStore::new();

    c.bench_function("save_128", |b| {
        b.iter(|| store::save(&target, "bench", engine.tournament()).unwrap());
    });
}

criterion_group!(
    scheduling,
    bench_advance_round,
    bench_available_teams,
    bench_round_winners,
    bench_standings,
);

criterion_group!(persistence, bench_repair, bench_save);

criterion_main!(scheduling, persistence);
