//! Genetic feature selection.

use super::{check_bounds, check_probability};
use crate::error::SearchError;
use crate::operators::crossover::{Crossover, CrossoverPattern};
use crate::operators::mask::{MaskMutation, RandomMasks};
use crate::operators::selection::{FitnessSelection, Selection};
use crate::operators::PerIndividual;
use crate::search::{FeatureMask, Strategy, Termination};

/// Configuration for genetic search over usage masks.
///
/// Per generation every mask is mutated (the original is kept next to the
/// mutant), pairs are recombined, and after evaluation the population is
/// re-sampled back to `population_size`.
///
/// # Defaults
///
/// ```
/// use u_featsel::strategies::GeneticSelectionConfig;
///
/// let config = GeneticSelectionConfig::default();
/// assert_eq!(config.population_size, 20);
/// assert_eq!(config.max_generations, 30);
/// assert!(config.p_mutation < 0.0); // 1 / feature_count
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_featsel::operators::crossover::CrossoverPattern;
/// use u_featsel::operators::selection::Selection;
/// use u_featsel::strategies::GeneticSelectionConfig;
///
/// let config = GeneticSelectionConfig::default()
///     .with_population_size(50)
///     .with_selection(Selection::Tournament(3))
///     .with_crossover_pattern(CrossoverPattern::OnePoint)
///     .with_max_features(10);
/// let strategy = config.build(40).unwrap();
/// assert_eq!(strategy.feature_count(), 40);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneticSelectionConfig {
    /// Number of masks kept after selection.
    pub population_size: usize,

    /// Maximum number of generations.
    pub max_generations: usize,

    /// Generations without improvement before stopping (0 disables).
    pub stagnation_limit: usize,

    /// Probability that a feature is active in an initial mask.
    pub p_initialize: f64,

    /// Per-feature flip probability. Negative means `1 / feature_count`.
    pub p_mutation: f64,

    /// Probability that a drawn pair is recombined.
    pub p_crossover: f64,

    /// How crossover picks the features to swap.
    pub crossover_pattern: CrossoverPattern,

    /// Scheme used to re-sample the population after evaluation.
    pub selection: Selection,

    /// Always carry the best mask into the next generation.
    pub keep_best: bool,

    /// Minimum number of active features in any mask.
    pub min_features: usize,

    /// Maximum number of active features, `None` for unbounded.
    pub max_features: Option<usize>,

    /// Stop once this fitness is reached.
    pub target_fitness: Option<f64>,
}

impl Default for GeneticSelectionConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            max_generations: 30,
            stagnation_limit: 0,
            p_initialize: 0.5,
            p_mutation: -1.0,
            p_crossover: 0.5,
            crossover_pattern: CrossoverPattern::Uniform,
            selection: Selection::Roulette,
            keep_best: true,
            min_features: 1,
            max_features: None,
            target_fitness: None,
        }
    }
}

impl GeneticSelectionConfig {
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

    /// Sets the initial activation probability.
    pub fn with_p_initialize(mut self, p: f64) -> Self {
        self.p_initialize = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the flip probability; negative selects `1 / feature_count`.
    pub fn with_p_mutation(mut self, p: f64) -> Self {
        self.p_mutation = if p < 0.0 { -1.0 } else { p.min(1.0) };
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

    pub fn with_min_features(mut self, n: usize) -> Self {
        self.min_features = n;
        self
    }

    pub fn with_max_features(mut self, n: usize) -> Self {
        self.max_features = Some(n);
        self
    }

    pub fn with_target_fitness(mut self, target: f64) -> Self {
        self.target_fitness = Some(target);
        self
    }

    /// Preset for quick screening: small population, early stopping.
    ///
    /// - Population: 10, Generations: 20, Stagnation limit: 5
    pub fn fast() -> Self {
        Self {
            population_size: 10,
            max_generations: 20,
            stagnation_limit: 5,
            ..Self::default()
        }
    }

    /// Preset for thorough search: large population, tournament selection.
    ///
    /// - Population: 100, Generations: 200, Stagnation limit: 40
    pub fn thorough() -> Self {
        Self {
            population_size: 100,
            max_generations: 200,
            stagnation_limit: 40,
            selection: Selection::Tournament(3),
            ..Self::default()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.population_size == 0 {
            return Err(SearchError::invalid("population_size must be at least 1"));
        }
        if let Selection::Tournament(0) = self.selection {
            return Err(SearchError::invalid("tournament size must be at least 1"));
        }
        check_probability("p_initialize", self.p_initialize)?;
        check_probability("p_crossover", self.p_crossover)?;
        if self.p_mutation > 1.0 || self.p_mutation.is_nan() {
            return Err(SearchError::invalid(format!(
                "p_mutation must be <= 1 (or negative for 1/n), got {}",
                self.p_mutation
            )));
        }
        check_bounds(self.min_features, self.max_features, None)?;
        Ok(())
    }

    /// Builds the strategy for `feature_count` features.
    pub fn build(&self, feature_count: usize) -> Result<Strategy<FeatureMask>, SearchError> {
        self.validate()?;
        let bounds = check_bounds(self.min_features, self.max_features, Some(feature_count))?;

        Ok(Strategy::new(
            "genetic selection",
            feature_count,
            RandomMasks::new(self.population_size, self.p_initialize, bounds),
        )
        .with_pre(PerIndividual::new(MaskMutation::new(self.p_mutation, bounds)))
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
