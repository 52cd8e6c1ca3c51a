//! Fitness-based re-sampling of the next generation.
//!
//! Selection decides which evaluated individuals survive into the next
//! generation. Different schemes provide different selection pressure.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use super::PopulationOperator;
use crate::search::{Candidate, Individual, Population};
use rand::{Rng, RngCore};
use std::any::Any;

/// Selection scheme.
///
/// All schemes assume **maximization** (higher fitness = better) and only
/// consider evaluated individuals.
///
/// # Examples
///
/// ```
/// use u_featsel::operators::selection::Selection;
///
/// // Fitness-proportional (the classic genetic feature selection default)
/// let sel = Selection::Roulette;
///
/// // Tournament with size 3 (moderate selection pressure)
/// let sel = Selection::Tournament(3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Tournament selection: pick `k` individuals at random, select the best.
    ///
    /// Higher `k` = stronger selection pressure.
    ///
    /// # Complexity
    /// O(k) per selection
    Tournament(usize),

    /// Fitness-proportionate (roulette wheel) selection.
    ///
    /// Fitness is shifted so the worst individual still gets a tiny share;
    /// negative scores are therefore fine.
    ///
    /// # Complexity
    /// O(n) per selection (linear scan)
    Roulette,

    /// Linear rank-based selection.
    ///
    /// Selection probability is proportional to rank position, not raw
    /// fitness, avoiding the scaling problems of the roulette wheel.
    ///
    /// Reference: Baker (1985), "Adaptive Selection Methods for Genetic
    /// Algorithms"
    ///
    /// # Complexity
    /// O(n log n) per call (sort), O(n) per selection
    Rank,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Roulette
    }
}

impl Selection {
    /// Selects an index into `pool`.
    ///
    /// Returns `None` if `pool` is empty. Every element of `pool` must be
    /// evaluated.
    pub fn select<C: Candidate, R: Rng + ?Sized>(
        &self,
        pool: &[&Individual<C>],
        rng: &mut R,
    ) -> Option<usize> {
        if pool.is_empty() {
            return None;
        }
        Some(match self {
            Selection::Tournament(k) => tournament(pool, *k, rng),
            Selection::Roulette => roulette(pool, rng),
            Selection::Rank => rank(pool, rng),
        })
    }
}

fn fitness_of<C: Candidate>(ind: &Individual<C>) -> f64 {
    ind.fitness_value().unwrap_or(f64::NEG_INFINITY)
}

/// Tournament selection: pick k random individuals, return best.
fn tournament<C: Candidate, R: Rng + ?Sized>(
    pool: &[&Individual<C>],
    k: usize,
    rng: &mut R,
) -> usize {
    let k = k.max(1);
    let n = pool.len();

    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if fitness_of(pool[idx]) > fitness_of(pool[best_idx]) {
            best_idx = idx;
        }
    }
    best_idx
}

/// Roulette wheel selection on shifted fitness.
///
/// weight_i = fitness_i - min_fitness + epsilon
fn roulette<C: Candidate, R: Rng + ?Sized>(pool: &[&Individual<C>], rng: &mut R) -> usize {
    let n = pool.len();
    if n == 1 {
        return 0;
    }

    let fitnesses: Vec<f64> = pool.iter().map(|ind| fitness_of(ind)).collect();
    let min_fitness = fitnesses.iter().cloned().fold(f64::INFINITY, f64::min);

    let epsilon = 1e-10;
    let weights: Vec<f64> = fitnesses
        .iter()
        .map(|&f| {
            let w = f - min_fitness + epsilon;
            if w > 0.0 {
                w
            } else {
                epsilon
            }
        })
        .collect();

    let total: f64 = weights.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return rng.random_range(0..n);
    }

    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative > threshold {
            return i;
        }
    }

    n - 1 // floating-point fallback
}

/// Linear ranking: best gets weight n, worst gets weight 1.
fn rank<C: Candidate, R: Rng + ?Sized>(pool: &[&Individual<C>], rng: &mut R) -> usize {
    let n = pool.len();
    if n == 1 {
        return 0;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| pool[a].rank_cmp(pool[b]));

    let total: f64 = (n * (n + 1)) as f64 / 2.0;
    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;

    for (rank, &original_idx) in order.iter().enumerate() {
        cumulative += (n - rank) as f64;
        if cumulative > threshold {
            return original_idx;
        }
    }

    order[n - 1]
}

/// Re-samples a generation of fixed size from the evaluated individuals.
///
/// Sampling is with replacement, so fit individuals may appear several
/// times (they keep their cached fitness and are not re-evaluated). With
/// `keep_best` the single best individual is always carried over first.
/// Unevaluated individuals are discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessSelection {
    size: usize,
    scheme: Selection,
    keep_best: bool,
}

impl FitnessSelection {
    pub fn new(size: usize, scheme: Selection, keep_best: bool) -> Self {
        Self {
            size,
            scheme,
            keep_best,
        }
    }
}

impl<C: Candidate> PopulationOperator<C> for FitnessSelection {
    fn name(&self) -> &str {
        "fitness-selection"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn apply(&mut self, population: &mut Population<C>, rng: &mut dyn RngCore) {
        let individuals = population.take();
        let pool: Vec<&Individual<C>> = individuals.iter().filter(|i| i.is_evaluated()).collect();
        if pool.is_empty() {
            return;
        }

        let mut next = Vec::with_capacity(self.size);
        if self.keep_best && self.size > 0 {
            let best = pool
                .iter()
                .copied()
                .reduce(|a, b| if b.rank_cmp(a).is_lt() { b } else { a });
            if let Some(best) = best {
                next.push(best.clone());
            }
        }
        while next.len() < self.size {
            match self.scheme.select(&pool, rng) {
                Some(idx) => next.push(pool[idx].clone()),
                None => break,
            }
        }
        population.replace(next);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use crate::search::{FeatureMask, FitnessScore};

    fn make_population(fitnesses: &[f64]) -> Vec<Individual<FeatureMask>> {
        fitnesses
            .iter()
            .enumerate()
            .map(|(i, &f)| {
                Individual::new(FeatureMask::from_indices(8, [i]))
                    .with_fitness(FitnessScore::new(f))
            })
            .collect()
    }

    fn counts(scheme: Selection, fitnesses: &[f64], draws: usize) -> Vec<u32> {
        let pop = make_population(fitnesses);
        let pool: Vec<&Individual<FeatureMask>> = pop.iter().collect();
        let mut rng = create_rng(42);
        let mut counts = vec![0u32; fitnesses.len()];
        for _ in 0..draws {
            let idx = scheme.select(&pool, &mut rng).unwrap();
            counts[idx] += 1;
        }
        counts
    }

    #[test]
    fn test_tournament_favors_best() {
        let c = counts(Selection::Tournament(4), &[1.0, 5.0, 10.0, 2.0], 10000);
        assert!(c[2] > 6000, "expected best >60% of the time, got {c:?}");
    }

    #[test]
    fn test_tournament_size_1_is_random() {
        let c = counts(Selection::Tournament(1), &[1.0, 5.0, 10.0, 2.0], 10000);
        for &x in &c {
            assert!(x > 1500, "expected uniform, got counts: {c:?}");
        }
    }

    #[test]
    fn test_roulette_favors_best() {
        let c = counts(Selection::Roulette, &[1.0, 50.0, 100.0, 20.0], 10000);
        assert!(c[2] > c[0], "best should be selected more often: {c:?}");
    }

    #[test]
    fn test_roulette_handles_negative_fitness() {
        let c = counts(Selection::Roulette, &[-10.0, -5.0, -1.0], 10000);
        assert!(c[2] > c[0], "highest (least negative) should win: {c:?}");
    }

    #[test]
    fn test_rank_favors_best() {
        let c = counts(Selection::Rank, &[1.0, 50.0, 100.0, 20.0], 10000);
        assert!(c[2] > c[0], "best should be selected more: {c:?}");
    }

    #[test]
    fn test_single_and_empty_pool() {
        let pop = make_population(&[5.0]);
        let pool: Vec<&Individual<FeatureMask>> = pop.iter().collect();
        let mut rng = create_rng(42);
        for scheme in [Selection::Tournament(3), Selection::Roulette, Selection::Rank] {
            assert_eq!(scheme.select(&pool, &mut rng), Some(0));
            assert_eq!(scheme.select::<FeatureMask, _>(&[], &mut rng), None);
        }
    }

    #[test]
    fn test_fitness_selection_size_and_elitism() {
        let mut pop = Population::from_individuals(make_population(&[0.1, 0.2, 0.9, 0.3]));
        pop.add(Individual::new(FeatureMask::full(8)));
        let mut rng = create_rng(3);
        let mut op = FitnessSelection::new(6, Selection::Tournament(2), true);
        op.apply(&mut pop, &mut rng);
        assert_eq!(pop.len(), 6);
        assert!(pop.individuals().iter().all(|i| i.is_evaluated()));
        assert_eq!(pop.individuals()[0].fitness_value(), Some(0.9));
    }

    #[test]
    fn test_fitness_selection_empty_pool_leaves_empty() {
        let mut pop = Population::from_individuals(vec![Individual::new(FeatureMask::full(2))]);
        let mut rng = create_rng(3);
        FitnessSelection::new(4, Selection::Roulette, true).apply(&mut pop, &mut rng);
        assert!(pop.is_empty());
    }
}
