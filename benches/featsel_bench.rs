//! Criterion benchmarks for u-featsel search strategies.
//!
//! Uses synthetic evaluators (a fixed set of informative features, a target
//! weight vector) to measure pure search overhead independent of any model.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_featsel::search::{
    EvaluationError, FeatureMask, FitnessScore, SearchConfig, SearchRunner, WeightVector,
};
use u_featsel::space::FeatureSet;
use u_featsel::strategies::{
    BruteForceConfig, EvolutionaryWeightingConfig, ForwardSelectionConfig, GeneticSelectionConfig,
};
use u_featsel::weighting::{FeatureWeights, Relation, WeightSelector};

// ===========================================================================
// Synthetic evaluators
// ===========================================================================

/// Every fifth feature is informative, the rest cost a little.
fn informative(mask: &FeatureMask) -> Result<FitnessScore, EvaluationError> {
    let (good, bad) = mask
        .active_indices()
        .fold((0usize, 0usize), |(g, b), i| if i % 5 == 0 { (g + 1, b) } else { (g, b + 1) });
    Ok(FitnessScore::new(good as f64 - 0.1 * bad as f64))
}

/// Negative squared distance to a weight ramp.
fn ramp(weights: &WeightVector) -> Result<FitnessScore, EvaluationError> {
    let n = weights.as_slice().len().max(1) as f64;
    let err: f64 = weights
        .as_slice()
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let d = w - i as f64 / n;
            d * d
        })
        .sum();
    Ok(FitnessScore::new(-err))
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_genetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("genetic_selection");
    group.sample_size(10);

    for (n, pop, gen) in [(20usize, 20usize, 30usize), (50, 40, 30), (100, 50, 20)] {
        let space = FeatureSet::anonymous(n);
        let config = GeneticSelectionConfig::default()
            .with_population_size(pop)
            .with_max_generations(gen);
        let run_config = SearchConfig::default().with_seed(42);
        group.bench_with_input(
            BenchmarkId::new(format!("n{}_p{}_g{}", n, pop, gen), n),
            &(space, config),
            |b, (space, config)| {
                b.iter(|| {
                    let mut strategy = config.build(n).unwrap();
                    let space = black_box(space);
                    let result = SearchRunner::run(space, &mut strategy, &informative, &run_config);
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

fn bench_evolutionary(c: &mut Criterion) {
    let mut group = c.benchmark_group("evolutionary_weighting");
    group.sample_size(10);

    for &n in &[10, 50, 100] {
        let space = FeatureSet::anonymous(n);
        let config = EvolutionaryWeightingConfig::default()
            .with_population_size(10)
            .with_max_generations(50)
            .with_variance(0.1);
        let run_config = SearchConfig::default().with_seed(42);
        let id = BenchmarkId::from_parameter(n);
        group.bench_with_input(id, &(space, config), |b, (space, config)| {
            b.iter(|| {
                let mut strategy = config.build(n).unwrap();
                let result = SearchRunner::run(black_box(space), &mut strategy, &ramp, &run_config);
                black_box(result)
            })
        });
    }
    group.finish();
}

fn bench_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward_selection");
    group.sample_size(10);

    for &n in &[20, 50, 100] {
        let space = FeatureSet::anonymous(n);
        let config = ForwardSelectionConfig::default().with_keep_best(2);
        let id = BenchmarkId::from_parameter(n);
        group.bench_with_input(id, &(space, config), |b, (space, config)| {
            b.iter(|| {
                let mut strategy = config.build(n).unwrap();
                let result = SearchRunner::run(
                    black_box(space),
                    &mut strategy,
                    &informative,
                    &SearchConfig::default(),
                );
                black_box(result)
            })
        });
    }
    group.finish();
}

fn bench_brute_force(c: &mut Criterion) {
    let mut group = c.benchmark_group("brute_force");
    group.sample_size(10);

    for &n in &[8, 12, 16] {
        let space = FeatureSet::anonymous(n);
        let config = BruteForceConfig::default().with_max_features(4);
        let id = BenchmarkId::from_parameter(n);
        group.bench_with_input(id, &(space, config), |b, (space, config)| {
            b.iter(|| {
                let mut strategy = config.build(n).unwrap();
                let result = SearchRunner::run(
                    black_box(space),
                    &mut strategy,
                    &informative,
                    &SearchConfig::default(),
                );
                black_box(result)
            })
        });
    }
    group.finish();
}

fn bench_weight_selector(c: &mut Criterion) {
    let mut group = c.benchmark_group("weight_selector");

    for &n in &[100, 1_000, 10_000] {
        let names: Vec<String> = (0..n).map(|i| format!("f{i}")).collect();
        let values: Vec<f64> = (0..n).map(|i| ((i * 7919) % 1000) as f64 / 1000.0).collect();
        let weights = FeatureWeights::new(names, values).unwrap();
        let selector = WeightSelector::new(Relation::TopPercent(0.1));
        group.bench_with_input(BenchmarkId::from_parameter(n), &weights, |b, w| {
            b.iter(|| black_box(selector.select(black_box(w))))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_genetic,
    bench_evolutionary,
    bench_forward,
    bench_brute_force,
    bench_weight_selector
);
criterion_main!(benches);
