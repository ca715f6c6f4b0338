//! Performance benchmarks for the duel engine
//!
//! Measures bot-vs-bot match throughput with Criterion.rs in two modes:
//!
//! 1. **Fresh** - create a new match (deck validation, shuffles, opening
//!    hands) for each iteration
//! 2. **Action** - time single `execute_action` calls against a prepared
//!    state, which is dominated by the state clone
//!
//! Build with `--no-default-features` to drop verbose narration.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mindspark_duel::{
    core::{ArithmeticContentService, CardDefinition, Element, Side},
    game::{ActionKind, GameAction, TurnOrchestrator},
    loader::sample_deck,
    simulation::play_match,
    DuelConfig,
};
use std::time::{Duration, Instant};

const MAX_TURNS: u32 = 60;

struct BenchmarkSetup {
    config: DuelConfig,
    player_deck: Vec<CardDefinition>,
    opponent_deck: Vec<CardDefinition>,
}

impl BenchmarkSetup {
    fn load() -> Self {
        BenchmarkSetup {
            config: DuelConfig::default(),
            player_deck: sample_deck(Element::Fire),
            opponent_deck: sample_deck(Element::Water),
        }
    }
}

/// Benchmark: Fresh mode - new match each iteration
fn bench_match_fresh(c: &mut Criterion) {
    let setup = BenchmarkSetup::load();

    let mut group = c.benchmark_group("match_execution");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    for seed in [42u64, 12345] {
        // Warmup match to print metrics
        let start = Instant::now();
        match play_match(&setup.config, &setup.player_deck, &setup.opponent_deck, seed, MAX_TURNS) {
            Ok(result) => {
                let secs = start.elapsed().as_secs_f64();
                println!("\nWarmup match (seed {seed}):");
                println!("  Winner: {:?}", result.winner);
                println!("  Turns: {}", result.turns);
                println!("  Actions: {}", result.actions);
                println!("  Actions/sec: {:.2}", result.actions as f64 / secs);
            }
            Err(e) => {
                eprintln!("Skipping benchmark - warmup match failed: {e}");
                return;
            }
        }

        group.bench_with_input(BenchmarkId::new("fresh", seed), &seed, |b, &seed| {
            b.iter(|| {
                play_match(
                    &setup.config,
                    &setup.player_deck,
                    &setup.opponent_deck,
                    black_box(seed),
                    MAX_TURNS,
                )
                .expect("match should complete")
            });
        });
    }

    group.finish();
}

/// Benchmark: Action mode - one validated action against a prepared state
fn bench_single_action(c: &mut Criterion) {
    let setup = BenchmarkSetup::load();
    let content = ArithmeticContentService;
    let orchestrator = TurnOrchestrator::new(&setup.config, &content);
    let state = orchestrator
        .new_match(&setup.player_deck, &setup.opponent_deck, 42)
        .expect("match should start")
        .state;

    let mut group = c.benchmark_group("action_execution");
    for (name, action) in [("end_phase", ActionKind::EndPhase), ("pass_turn", ActionKind::PassTurn)] {
        let action = GameAction::new(Side::Player, action);
        group.bench_function(name, |b| {
            b.iter(|| {
                orchestrator
                    .execute_action(black_box(&state), &action)
                    .expect("action should be legal")
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_match_fresh, bench_single_action);
criterion_main!(benches);
