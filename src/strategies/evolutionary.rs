//! Evolutionary feature weighting.

use super::check_probability;
use crate::error::SearchError;
use crate::operators::crossover::{Crossover, CrossoverPattern};
use crate::operators::selection::{FitnessSelection, Selection};
use crate::operators::weighting::{AdaptiveWeightMutation, RandomWeights, VarianceAdaptation};
use crate::operators::CardinalityBounds;
use crate::search::{Strategy, Termination, WeightVector};

/// Configuration for an evolution strategy over weight vectors.
///
/// Every vector is replaced by a Gaussian mutant, pairs may be recombined,
/// and after evaluation the population is re-sampled to `population_size`.
/// With `one_fifth_rule` the mutation variance adapts to the observed
/// success rate.
///
/// ```
/// use u_featsel::strategies::EvolutionaryWeightingConfig;
///
/// let config = EvolutionaryWeightingConfig::default()
///     .with_population_size(10)
///     .with_variance(0.5)
///     .with_bounded(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvolutionaryWeightingConfig {
    /// Number of weight vectors kept after selection.
    pub population_size: usize,

    /// Maximum number of generations.
    pub max_generations: usize,

    /// Generations without improvement before stopping (0 disables).
    pub stagnation_limit: usize,

    /// Initial variance of the Gaussian step.
    pub variance: f64,

    /// Adapt the variance with the 1/5 success rule.
    pub one_fifth_rule: bool,

    /// 1/5 rule parameters, used when `one_fifth_rule` is set.
    pub adaptation: VarianceAdaptation,

    /// Keep every weight in `[0, 1]`.
    pub bounded: bool,

    /// Probability that a drawn pair is recombined.
    pub p_crossover: f64,

    /// How crossover picks the weights to swap.
    pub crossover_pattern: CrossoverPattern,

    /// Scheme used to re-sample the population after evaluation.
    pub selection: Selection,

    /// Always carry the best vector into the next generation.
    pub keep_best: bool,

    /// Stop once this fitness is reached.
    pub target_fitness: Option<f64>,
}

impl Default for EvolutionaryWeightingConfig {
    fn default() -> Self {
        Self {
            population_size: 5,
            max_generations: 30,
            stagnation_limit: 0,
            variance: 1.0,
            one_fifth_rule: true,
            adaptation: VarianceAdaptation::default(),
            bounded: true,
            p_crossover: 0.0,
            crossover_pattern: CrossoverPattern::Uniform,
            selection: Selection::Tournament(2),
            keep_best: true,
            target_fitness: None,
        }
    }
}

impl EvolutionaryWeightingConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the initial variance.
    pub fn with_variance(mut self, variance: f64) -> Self {
        self.variance = variance;
        self
    }

    /// Enables or disables the 1/5 success rule.
    pub fn with_one_fifth_rule(mut self, enabled: bool) -> Self {
        self.one_fifth_rule = enabled;
        self
    }

    pub fn with_adaptation(mut self, adaptation: VarianceAdaptation) -> Self {
        self.adaptation = adaptation;
        self
    }

    pub fn with_bounded(mut self, bounded: bool) -> Self {
        self.bounded = bounded;
        self
    }

    /// Sets the crossover probability.
    pub fn with_p_crossover(mut self, p: f64) -> Self {
        self.p_crossover = p.clamp(0.0, 1.0);
        self
    }

    pub fn with_crossover_pattern(mut self, pattern: CrossoverPattern) -> Self {
        self.crossover_pattern = pattern;
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_keep_best(mut self, keep_best: bool) -> Self {
        self.keep_best = keep_best;
        self
    }

    pub fn with_target_fitness(mut self, target: f64) -> Self {
        self.target_fitness = Some(target);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.population_size == 0 {
            return Err(SearchError::invalid("population_size must be at least 1"));
        }
        if !(self.variance.is_finite() && self.variance > 0.0) {
            return Err(SearchError::invalid(format!(
                "variance must be positive and finite, got {}",
                self.variance
            )));
        }
        if self.one_fifth_rule {
            let a = &self.adaptation;
            if a.window == 0 {
                return Err(SearchError::invalid("adaptation window must be at least 1"));
            }
            if !(a.increase > 1.0 && a.decrease > 0.0 && a.decrease < 1.0) {
                return Err(SearchError::invalid(format!(
                    "adaptation factors must satisfy increase > 1 and 0 < decrease < 1, \
                     got {} / {}",
                    a.increase, a.decrease
                )));
            }
        }
        if let Selection::Tournament(0) = self.selection {
            return Err(SearchError::invalid("tournament size must be at least 1"));
        }
        check_probability("p_crossover", self.p_crossover)
    }

    /// Builds the strategy for `feature_count` features.
    pub fn build(&self, feature_count: usize) -> Result<Strategy<WeightVector>, SearchError> {
        self.validate()?;
        if feature_count == 0 {
            return Err(SearchError::invalid("feature space is empty"));
        }

        let mut mutation = AdaptiveWeightMutation::new(self.variance, self.bounded);
        if self.one_fifth_rule {
            mutation = mutation.with_adaptation(self.adaptation);
        }
        let bounds = CardinalityBounds::default();

        let initial = RandomWeights::new(self.population_size);
        Ok(Strategy::new("evolutionary weighting", feature_count, initial)
            .with_pre(mutation)
            .with_pre(Crossover::new(self.p_crossover, self.crossover_pattern, bounds))
            .with_post(FitnessSelection::new(
                self.population_size,
                self.selection,
                self.keep_best,
            ))
            .with_termination(Termination {
                max_generations: self.max_generations,
                stagnation_limit: self.stagnation_limit,
                stop_when_empty: true,
                target_fitness: self.target_fitness,
            })
            .with_bounds(bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{EvaluationError, FitnessScore, SearchConfig, SearchRunner};
    use crate::space::FeatureSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Runs 10 generations where every evaluation scores `sign * call_index`
    /// and returns the adapted variance.
    fn variance_after_run(sign: f64) -> f64 {
        let calls = AtomicUsize::new(0);
        let eval = |_: &WeightVector| -> Result<FitnessScore, EvaluationError> {
            let n = calls.fetch_add(1, Ordering::SeqCst) as f64;
            Ok(FitnessScore::new(sign * n))
        };
        let space = FeatureSet::anonymous(3);
        let mut strategy = EvolutionaryWeightingConfig::default()
            .with_max_generations(10)
            .build(3)
            .unwrap();
        let config = SearchConfig::default().with_seed(42);
        let result = SearchRunner::run(&space, &mut strategy, &eval, &config).unwrap();
        assert_eq!(result.generations, 10);
        strategy
            .operator::<AdaptiveWeightMutation>()
            .map(AdaptiveWeightMutation::variance)
            .unwrap()
    }

    #[test]
    fn test_validate() {
        assert!(EvolutionaryWeightingConfig::default().validate().is_ok());
        assert!(EvolutionaryWeightingConfig::default()
            .with_variance(0.0)
            .validate()
            .is_err());
        assert!(EvolutionaryWeightingConfig::default()
            .with_adaptation(VarianceAdaptation {
                window: 0,
                ..VarianceAdaptation::default()
            })
            .validate()
            .is_err());
        // Adaptation parameters are ignored when the rule is off.
        assert!(EvolutionaryWeightingConfig::default()
            .with_one_fifth_rule(false)
            .with_adaptation(VarianceAdaptation {
                window: 0,
                ..VarianceAdaptation::default()
            })
            .validate()
            .is_ok());
        assert!(EvolutionaryWeightingConfig::default().build(0).is_err());
    }

    #[test]
    fn test_operator_layout() {
        let strategy = EvolutionaryWeightingConfig::default().build(4).unwrap();
        let (pre, post) = strategy.operator_names();
        assert_eq!(pre, vec!["weight-mutation", "crossover"]);
        assert_eq!(post, vec!["fitness-selection"]);
    }

    #[test]
    fn test_weights_approach_target() {
        let target = [0.9, 0.1, 0.5, 0.0];
        let space = FeatureSet::anonymous(4);
        let eval = |w: &WeightVector| -> Result<FitnessScore, EvaluationError> {
            let err: f64 = w
                .as_slice()
                .iter()
                .zip(&target)
                .map(|(a, b)| (a - b) * (a - b))
                .sum();
            Ok(FitnessScore::new(-err))
        };
        let mut strategy = EvolutionaryWeightingConfig::default()
            .with_population_size(10)
            .with_max_generations(150)
            .with_variance(0.05)
            .build(4)
            .unwrap();
        let result =
            SearchRunner::run(&space, &mut strategy, &eval, &SearchConfig::default().with_seed(8))
                .unwrap();
        assert!(
            result.best_fitness.value() > -0.05,
            "expected squared error below 0.05, got {}",
            -result.best_fitness.value()
        );
        assert!(result
            .best
            .candidate()
            .as_slice()
            .iter()
            .all(|w| (0.0..=1.0).contains(w)));
        for pair in result.fitness_history.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn test_variance_shrinks_when_children_never_improve() {
        let variance = variance_after_run(-1.0);
        let expected = 0.82f64.powi(10);
        assert!((variance - expected).abs() < 1e-9 * expected, "{variance} vs {expected}");
    }

    #[test]
    fn test_variance_grows_when_children_always_improve() {
        let variance = variance_after_run(1.0);
        let expected = 1.22f64.powi(10);
        assert!((variance - expected).abs() < 1e-9 * expected, "{variance} vs {expected}");
    }

    #[test]
    fn test_variance_fixed_without_one_fifth_rule() {
        let space = FeatureSet::anonymous(3);
        let eval = |w: &WeightVector| -> Result<FitnessScore, EvaluationError> {
            Ok(FitnessScore::new(w.get(0)))
        };
        let mut strategy = EvolutionaryWeightingConfig::default()
            .with_one_fifth_rule(false)
            .with_variance(0.3)
            .with_max_generations(5)
            .build(3)
            .unwrap();
        SearchRunner::run(&space, &mut strategy, &eval, &SearchConfig::default().with_seed(42))
            .unwrap();
        let mutation = strategy.operator::<AdaptiveWeightMutation>().unwrap();
        assert_eq!(mutation.variance(), 0.3);
    }
}
