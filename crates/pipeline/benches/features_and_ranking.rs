//! Benchmarks for the synchronous part of a request
//!
//! Run with: cargo bench --package pipeline

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pipeline::{FeatureBuilder, Recommendation, rank};
use upstream::{MatchContext, PlayerContext};

fn build_players(count: u64) -> Vec<PlayerContext> {
    (1..=count)
        .map(|id| {
            if id % 7 == 0 {
                PlayerContext::new(id)
            } else {
                PlayerContext::new(id).with_avg_points((id % 80) as f64)
            }
        })
        .collect()
}

fn bench_build_features(c: &mut Criterion) {
    let builder = FeatureBuilder::new();
    let match_context = MatchContext::new(1).with_conditions(1.0, 0.0);
    let players = build_players(500);

    c.bench_function("build_features_500", |b| {
        b.iter(|| {
            let features = builder.build_all(black_box(&match_context), black_box(&players));
            black_box(features)
        })
    });
}

fn bench_rank(c: &mut Criterion) {
    let scored: Vec<Recommendation> = (1..=500u64)
        .map(|id| Recommendation::new(id, ((id * 37) % 101) as f64 / 1.7))
        .collect();

    c.bench_function("rank_500", |b| {
        b.iter(|| {
            let ranked = rank(black_box(scored.clone()));
            black_box(ranked)
        })
    });
}

criterion_group!(benches, bench_build_features, bench_rank);
criterion_main!(benches);
