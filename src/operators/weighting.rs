//! Weight-vector operators for evolutionary feature weighting.
//!
//! # Self-adaptation
//!
//! [`AdaptiveWeightMutation`] owns its Gaussian step size and adapts it with
//! Rechenberg's 1/5 success rule: if more than a fifth of the mutants beat
//! their parent the step is too small and grows, if fewer it shrinks.
//!
//! # References
//!
//! - Rechenberg (1973), "Evolutionsstrategie"
//! - Beyer & Schwefel (2002), "Evolution strategies: A comprehensive
//!   introduction"

use super::{apply_each, IndividualOperator, PopulationOperator};
use crate::search::strategy::InitialPopulation;
use crate::search::{Candidate, Individual, Population, WeightVector};
use log::debug;
use rand::{Rng, RngCore};
use rand_distr::StandardNormal;
use std::any::Any;

/// Success ratio at which the step size is left unchanged.
pub const TARGET_SUCCESS_RATIO: f64 = 0.2;

/// Parameters of the 1/5 success rule.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarianceAdaptation {
    /// Generations with offspring between two adaptation steps.
    pub window: usize,
    /// Variance factor when the success ratio is above 1/5.
    pub increase: f64,
    /// Variance factor when the success ratio is below 1/5.
    pub decrease: f64,
}

impl Default for VarianceAdaptation {
    fn default() -> Self {
        Self {
            window: 1,
            increase: 1.22,
            decrease: 0.82,
        }
    }
}

/// Gaussian weight mutation with an optional self-adapting variance.
///
/// Every weight receives `w' = w + N(0, variance)`. In bounded mode a
/// proposal outside `[0, 1]` is rejected and the prior weight is kept. The
/// single child is emitted only if it still uses at least one feature.
///
/// The operator is registered once as a pre-evaluation step; the runner
/// reports every evaluated generation back through
/// [`PopulationOperator::after_evaluation`], where the success counts for the
/// 1/5 rule are collected.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveWeightMutation {
    variance: f64,
    bounded: bool,
    adaptation: Option<VarianceAdaptation>,
    successes: usize,
    trials: usize,
    observed: usize,
}

impl AdaptiveWeightMutation {
    /// Mutation with a fixed `variance`.
    pub fn new(variance: f64, bounded: bool) -> Self {
        Self {
            variance,
            bounded,
            adaptation: None,
            successes: 0,
            trials: 0,
            observed: 0,
        }
    }

    /// Enables the 1/5 success rule.
    pub fn with_adaptation(mut self, adaptation: VarianceAdaptation) -> Self {
        self.adaptation = Some(adaptation);
        self
    }

    /// Current variance of the Gaussian step.
    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub fn is_bounded(&self) -> bool {
        self.bounded
    }

    /// Perturbs a copy of `weights`.
    pub fn mutate<R: Rng + ?Sized>(&self, weights: &WeightVector, rng: &mut R) -> WeightVector {
        let sigma = self.variance.max(0.0).sqrt();
        let mut child = weights.clone();
        for i in 0..child.len() {
            let w = child.get(i);
            let z: f64 = rng.sample(StandardNormal);
            let proposal = w + sigma * z;
            if self.bounded && !(0.0..=1.0).contains(&proposal) {
                continue;
            }
            child.set(i, proposal);
        }
        child
    }

    /// Feeds the outcome of one evaluated generation to the 1/5 rule.
    ///
    /// `successes` of `trials` children beat their parent. Generations
    /// without children are ignored.
    pub fn record_outcome(&mut self, successes: usize, trials: usize) {
        let Some(rule) = self.adaptation else {
            return;
        };
        if trials == 0 {
            return;
        }
        self.successes += successes;
        self.trials += trials;
        self.observed += 1;
        if self.observed < rule.window.max(1) {
            return;
        }

        let ratio = self.successes as f64 / self.trials as f64;
        let before = self.variance;
        if ratio > TARGET_SUCCESS_RATIO {
            self.variance *= rule.increase;
        } else if ratio < TARGET_SUCCESS_RATIO {
            self.variance *= rule.decrease;
        }
        debug!(
            "weight mutation: success ratio {:.3} ({}/{}), variance {:.6} -> {:.6}",
            ratio, self.successes, self.trials, before, self.variance
        );
        self.successes = 0;
        self.trials = 0;
        self.observed = 0;
    }
}

impl IndividualOperator<WeightVector> for AdaptiveWeightMutation {
    fn name(&self) -> &str {
        "weight-mutation"
    }

    fn operate(
        &mut self,
        individual: &Individual<WeightVector>,
        rng: &mut dyn RngCore,
    ) -> Vec<Individual<WeightVector>> {
        let child = self.mutate(individual.candidate(), rng);
        if child.active_count() == 0 {
            return Vec::new();
        }
        vec![individual.derive(child)]
    }
}

impl PopulationOperator<WeightVector> for AdaptiveWeightMutation {
    fn name(&self) -> &str {
        "weight-mutation"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    // Not wrapped in `PerIndividual`: the variance adapts in
    // `after_evaluation`, which needs the operator itself in the list.
    fn apply(&mut self, population: &mut Population<WeightVector>, rng: &mut dyn RngCore) {
        apply_each(self, population, rng);
    }

    fn after_evaluation(&mut self, population: &Population<WeightVector>) {
        let generation = population.generation();
        let (successes, trials) = population
            .individuals()
            .iter()
            .filter(|ind| ind.generation() == generation)
            .filter_map(|ind| Some((ind.fitness_value()?, ind.parent_fitness()?)))
            .fold((0, 0), |(s, t), (fitness, parent)| {
                (s + usize::from(fitness > parent), t + 1)
            });
        self.record_outcome(successes, trials);
    }
}

/// Random initial weight vectors, each weight uniform in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomWeights {
    size: usize,
}

impl RandomWeights {
    pub fn new(size: usize) -> Self {
        Self { size }
    }
}

impl InitialPopulation<WeightVector> for RandomWeights {
    fn build(&self, feature_count: usize, rng: &mut dyn RngCore) -> Vec<WeightVector> {
        (0..self.size)
            .map(|_| {
                WeightVector::new(
                    (0..feature_count)
                        .map(|_| rng.random_range(0.0..1.0))
                        .collect(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use crate::search::FitnessScore;

    fn adaptive(variance: f64) -> AdaptiveWeightMutation {
        AdaptiveWeightMutation::new(variance, true).with_adaptation(VarianceAdaptation::default())
    }

    #[test]
    fn test_one_fifth_rule_directions() {
        let mut op = adaptive(1.0);
        op.record_outcome(3, 10);
        assert!((op.variance() - 1.22).abs() < 1e-12);

        let mut op = adaptive(1.0);
        op.record_outcome(1, 10);
        assert!((op.variance() - 0.82).abs() < 1e-12);

        let mut op = adaptive(1.0);
        op.record_outcome(2, 10);
        assert_eq!(op.variance(), 1.0);
    }

    #[test]
    fn test_no_trials_no_adaptation() {
        let mut op = adaptive(0.5);
        op.record_outcome(0, 0);
        assert_eq!(op.variance(), 0.5);
    }

    #[test]
    fn test_window_accumulates() {
        let mut op = AdaptiveWeightMutation::new(1.0, false).with_adaptation(VarianceAdaptation {
            window: 2,
            ..VarianceAdaptation::default()
        });
        op.record_outcome(0, 5);
        assert_eq!(op.variance(), 1.0);
        // 5 of 10 over the window
        op.record_outcome(5, 5);
        assert!((op.variance() - 1.22).abs() < 1e-12);
    }

    #[test]
    fn test_fixed_variance_never_adapts() {
        let mut op = AdaptiveWeightMutation::new(0.3, true);
        op.record_outcome(10, 10);
        assert_eq!(op.variance(), 0.3);
    }

    #[test]
    fn test_bounded_mutation_stays_in_unit_interval() {
        let op = AdaptiveWeightMutation::new(4.0, true);
        let mut rng = create_rng(21);
        let parent = WeightVector::uniform(16, 0.5);
        for _ in 0..200 {
            let child = op.mutate(&parent, &mut rng);
            assert!(child.as_slice().iter().all(|w| (0.0..=1.0).contains(w)));
        }
    }

    #[test]
    fn test_operate_emits_single_derived_child() {
        let parent =
            Individual::new(WeightVector::uniform(4, 0.5)).with_fitness(FitnessScore::new(0.6));
        let mut op = AdaptiveWeightMutation::new(0.01, true);
        let mut rng = create_rng(2);
        let out = IndividualOperator::operate(&mut op, &parent, &mut rng);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].parent_fitness(), Some(0.6));
        assert_ne!(out[0].candidate(), parent.candidate());
    }

    #[test]
    fn test_apply_replaces_each_vector_with_its_child() {
        let parents: Vec<Individual<WeightVector>> = [0.2, 0.8]
            .iter()
            .map(|&w| {
                Individual::new(WeightVector::uniform(3, w)).with_fitness(FitnessScore::new(w))
            })
            .collect();
        let mut pop = Population::from_individuals(parents);
        let mut op = AdaptiveWeightMutation::new(0.01, true);
        let mut rng = create_rng(42);
        PopulationOperator::apply(&mut op, &mut pop, &mut rng);

        let parent_fitness: Vec<Option<f64>> =
            pop.individuals().iter().map(Individual::parent_fitness).collect();
        assert_eq!(parent_fitness, vec![Some(0.2), Some(0.8)]);
        assert!(pop.individuals().iter().all(|i| !i.is_evaluated()));
    }

    #[test]
    fn test_after_evaluation_counts_current_children() {
        let parent =
            Individual::new(WeightVector::uniform(2, 0.5)).with_fitness(FitnessScore::new(0.5));
        let better = parent
            .derive(WeightVector::uniform(2, 0.6))
            .with_fitness(FitnessScore::new(0.9));
        let worse = parent
            .derive(WeightVector::uniform(2, 0.4))
            .with_fitness(FitnessScore::new(0.1));
        let pop = Population::from_individuals(vec![better, worse.clone(), worse.clone(), worse]);

        let mut op = adaptive(1.0);
        op.after_evaluation(&pop);
        // 1 of 4 succeeded: above 1/5
        assert!((op.variance() - 1.22).abs() < 1e-12);
    }

    #[test]
    fn test_random_weights_in_unit_interval() {
        let mut rng = create_rng(3);
        let ws = RandomWeights::new(10).build(5, &mut rng);
        assert_eq!(ws.len(), 10);
        assert!(ws
            .iter()
            .all(|w| w.len() == 5 && w.as_slice().iter().all(|x| (0.0..1.0).contains(x))));
    }
}
