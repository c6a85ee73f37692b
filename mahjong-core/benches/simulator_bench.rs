use criterion::{criterion_group, criterion_main, Criterion};
use mahjong_core::{CpuSelector, FirstActionSelector, GameRunner, SafetyInfo};
use mahjong_engine::agari::{is_complete, waits};
use mahjong_engine::parser::parse_tiles;
use mahjong_engine::GameRule;

fn bench_single_game(c: &mut Criterion) {
    c.bench_function("single_game_first_action", |b| {
        b.iter(|| {
            let mut runner = GameRunner::new(GameRule::default(), [42; 32], 0).unwrap();
            runner.run_to_completion(&mut FirstActionSelector).unwrap();
            runner.scores()
        });
    });
    c.bench_function("single_game_cpu", |b| {
        b.iter(|| {
            let mut runner = GameRunner::new(GameRule::default(), [42; 32], 0).unwrap();
            runner.run_to_completion(&mut CpuSelector).unwrap();
            runner.scores()
        });
    });
}

fn bench_batch_100(c: &mut Criterion) {
    use rayon::prelude::*;
    c.bench_function("batch_100_cpu_games", |b| {
        b.iter(|| {
            let results: Vec<[i32; 4]> = (0..100u64)
                .into_par_iter()
                .map(|i| {
                    let mut r = GameRunner::new(GameRule::default(), [7; 32], i).unwrap();
                    r.run_to_completion(&mut CpuSelector).unwrap();
                    r.scores()
                })
                .collect();
            results
        });
    });
}

fn bench_completeness(c: &mut Criterion) {
    let complete = parse_tiles("11123455678999m", false).unwrap();
    let nine_gates = parse_tiles("1112345678999m", false).unwrap();
    c.bench_function("is_complete_1000x", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                std::hint::black_box(is_complete(&complete, &[]));
            }
        });
    });
    c.bench_function("waits_nine_gates", |b| {
        b.iter(|| waits(&nine_gates, &[]));
    });
}

fn bench_safety(c: &mut Criterion) {
    let mut runner = GameRunner::new(GameRule::default(), [42; 32], 0).unwrap();
    for _ in 0..120 {
        if !runner.step_once(&mut CpuSelector).unwrap() {
            break;
        }
    }
    let round = runner.game().round();
    c.bench_function("safety_from_round_1000x", |b| {
        b.iter(|| {
            for seat in 0..1000 {
                std::hint::black_box(SafetyInfo::from_round(round, seat % 4));
            }
        });
    });
}

criterion_group!(benches, bench_single_game, bench_batch_100, bench_completeness, bench_safety);
criterion_main!(benches);
