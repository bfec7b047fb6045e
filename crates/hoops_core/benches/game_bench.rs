//! Game simulation benchmarks.
//!
//! Run with: `cargo bench -p hoops_core`

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use hoops_core::engine::EngineConfig;
use hoops_core::{from_blob, to_blob, GameEngine, PlayerSnapshot, Position, TeamSetup};

fn roster(prefix: &str) -> TeamSetup {
    let players = (0..12u8)
        .map(|i| {
            let position = Position::ALL[usize::from(i) % 5];
            PlayerSnapshot::new(format!("{}{}", prefix, i), format!("{} {}", prefix, i), position, 82 - i)
        })
        .collect();
    TeamSetup::new(prefix, prefix, players)
}

fn full_game(c: &mut Criterion) {
    c.bench_function("full_game_headless", |b| {
        b.iter_batched(
            || GameEngine::with_config(roster("h"), roster("a"), 42, EngineConfig::headless()).unwrap(),
            |mut engine| black_box(engine.simulate_game().unwrap()),
            BatchSize::SmallInput,
        )
    });

    c.bench_function("full_game_with_animation", |b| {
        b.iter_batched(
            || GameEngine::new(roster("h"), roster("a"), 42).unwrap(),
            |mut engine| black_box(engine.simulate_game().unwrap()),
            BatchSize::SmallInput,
        )
    });
}

fn state_codec(c: &mut Criterion) {
    let mut engine = GameEngine::with_config(roster("h"), roster("a"), 7, EngineConfig::headless()).unwrap();
    engine.simulate_quarter().unwrap();
    let state = engine.snapshot_state();
    let blob = to_blob(&state).unwrap();

    c.bench_function("state_to_blob", |b| b.iter(|| to_blob(black_box(&state)).unwrap()));
    c.bench_function("state_from_blob", |b| b.iter(|| from_blob(black_box(&blob)).unwrap()));
}

criterion_group!(benches, full_game, state_codec);
criterion_main!(benches);
