use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use league_sim::config::ModelConfig;
use league_sim::game::Outcome;
use league_sim::goals::{GoalModel, ScoringBaselines};
use league_sim::rating::RatingModel;
use league_sim::season::SeasonSimulator;
use league_sim::standings::Aggregator;
use league_sim::League;

fn bench_probabilities(c: &mut Criterion) {
    let model = RatingModel::default();

    c.bench_function("probabilities", |b| {
        b.iter(|| model.probabilities(black_box(1912.0), black_box(1857.0)))
    });
}

fn bench_sample_score(c: &mut Criterion) {
    let model = GoalModel::new(ScoringBaselines::default(), 38);
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    c.bench_function("sample_score_home_win", |b| {
        b.iter(|| {
            model
                .sample_score(black_box(1.8), black_box(1.1), Outcome::HomeWin, &mut rng)
                .unwrap()
        })
    });

    c.bench_function("sample_score_draw", |b| {
        b.iter(|| {
            model
                .sample_score(black_box(1.8), black_box(1.1), Outcome::Draw, &mut rng)
                .unwrap()
        })
    });
}

fn bench_season(c: &mut Criterion) {
    let league = League::premier_league_2019().unwrap();
    let sim = SeasonSimulator::new(&league, &ModelConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(2019);

    c.bench_function("season_20_teams", |b| {
        b.iter(|| sim.run(black_box(&mut rng)).unwrap())
    });
}

fn bench_season_chunk(c: &mut Criterion) {
    let league = League::premier_league_2019().unwrap();
    let sim = SeasonSimulator::new(&league, &ModelConfig::default());
    let seeds: Vec<u64> = (0..200).collect();

    let mut group = c.benchmark_group("season_chunk");
    group.sample_size(10);

    group.bench_function("200_seasons_parallel", |b| {
        b.iter(|| {
            seeds
                .par_iter()
                .fold(
                    || Aggregator::new(&league),
                    |mut acc, &seed| {
                        let mut rng = ChaCha8Rng::seed_from_u64(seed);
                        acc.include(&sim.run(&mut rng).unwrap()).unwrap();
                        acc
                    },
                )
                .reduce(|| Aggregator::new(&league), |a, b| a.merge(b).unwrap())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_probabilities,
    bench_sample_score,
    bench_season,
    bench_season_chunk
);
criterion_main!(benches);
