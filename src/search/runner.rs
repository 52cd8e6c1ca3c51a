//! Search loop execution.
//!
//! [`SearchRunner`] drives any [`Strategy`] through the same cycle:
//! initialization → evaluation → post-operators → termination check →
//! pre-operators → evaluation → ...
//!
//! Only individuals without a cached fitness are sent to the evaluator, so
//! survivors carried over by selection or pruning are never re-evaluated.
//! Evaluation failures remove the affected individual and the run continues.

use super::config::SearchConfig;
use super::population::Population;
use super::strategy::{StopReason, Strategy};
use super::types::{
    Candidate, EvaluationError, FeatureMask, FitnessEvaluator, FitnessScore, Individual,
};
use crate::error::SearchError;
use crate::random::create_rng;
use crate::space::FeatureSpace;
use log::{debug, info, warn};
use rand::RngCore;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Per-generation statistics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    /// Generation number (0 = initial population).
    pub generation: usize,

    /// Individuals alive after evaluation.
    pub population_size: usize,

    /// Evaluator calls made in this generation.
    pub evaluations: usize,

    /// Evaluator calls whose result was rejected.
    pub failures: usize,

    /// Best fitness in this generation, if anything was evaluated.
    pub best_fitness: Option<f64>,

    /// Mean fitness in this generation.
    pub mean_fitness: Option<f64>,

    /// Best fitness seen in any generation so far.
    pub best_ever_fitness: Option<f64>,
}

/// Result of a search run.
#[derive(Debug, Clone)]
pub struct SearchResult<C: Candidate> {
    /// The best individual found during the entire run.
    pub best: Individual<C>,

    /// Score of `best`.
    pub best_fitness: FitnessScore,

    /// Number of generations executed after the initial one.
    pub generations: usize,

    /// Why the run stopped.
    pub stop_reason: StopReason,

    /// Total evaluator calls.
    pub evaluations: usize,

    /// Evaluator calls that failed or returned an unusable score.
    pub failed_evaluations: usize,

    /// Best-ever fitness at the end of each generation, starting with the
    /// initial population.
    pub fitness_history: Vec<f64>,

    /// Statistics for every generation, starting with the initial population.
    pub history: Vec<GenerationStats>,
}

impl SearchResult<FeatureMask> {
    /// Names of the features selected by the best mask.
    pub fn selected_names<'a, S>(&self, space: &'a S) -> Vec<&'a str>
    where
        S: FeatureSpace + ?Sized,
    {
        space.selected_names(self.best.candidate())
    }
}

/// Executes a search strategy.
///
/// # Usage
///
/// ```
/// use u_featsel::search::{EvaluationError, FeatureMask, FitnessScore, SearchConfig, SearchRunner};
/// use u_featsel::space::FeatureSet;
/// use u_featsel::strategies::ForwardSelectionConfig;
///
/// let space = FeatureSet::new(["a", "b", "c"]).unwrap();
/// let mut strategy = ForwardSelectionConfig::default().build(3).unwrap();
/// let eval = |m: &FeatureMask| -> Result<FitnessScore, EvaluationError> {
///     let score = if m.is_active(1) { 1.0 } else { 0.0 };
///     Ok(FitnessScore::new(score - 0.1 * m.active_indices().count() as f64))
/// };
/// let result = SearchRunner::run(&space, &mut strategy, &eval, &SearchConfig::default()).unwrap();
/// assert_eq!(result.selected_names(&space), vec!["b"]);
/// ```
pub struct SearchRunner;

impl SearchRunner {
    /// Runs `strategy` to completion.
    ///
    /// Operators keep their adapted state (e.g. mutation variance) in
    /// `strategy` after the run.
    pub fn run<C, S, E>(
        space: &S,
        strategy: &mut Strategy<C>,
        evaluator: &E,
        config: &SearchConfig,
    ) -> Result<SearchResult<C>, SearchError>
    where
        C: Candidate,
        S: FeatureSpace + ?Sized,
        E: FitnessEvaluator<C>,
    {
        Self::run_with_cancel(space, strategy, evaluator, config, None)
    }

    /// Runs with an optional cancellation token.
    ///
    /// The flag is checked before every generation. A run cancelled after
    /// the initial evaluation returns the best individual found so far with
    /// [`StopReason::Cancelled`]; one cancelled earlier fails with
    /// [`SearchError::Cancelled`].
    pub fn run_with_cancel<C, S, E>(
        space: &S,
        strategy: &mut Strategy<C>,
        evaluator: &E,
        config: &SearchConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<SearchResult<C>, SearchError>
    where
        C: Candidate,
        S: FeatureSpace + ?Sized,
        E: FitnessEvaluator<C>,
    {
        let mut rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };
        Self::run_with_rng(space, strategy, evaluator, config, &mut rng, cancel)
    }

    /// Runs drawing all randomness from `rng`; `config.seed` is ignored.
    pub fn run_with_rng<C, S, E>(
        space: &S,
        strategy: &mut Strategy<C>,
        evaluator: &E,
        config: &SearchConfig,
        rng: &mut dyn RngCore,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<SearchResult<C>, SearchError>
    where
        C: Candidate,
        S: FeatureSpace + ?Sized,
        E: FitnessEvaluator<C>,
    {
        config.validate()?;
        let feature_count = space.feature_count();
        if strategy.feature_count() != feature_count {
            return Err(SearchError::invalid(format!(
                "strategy '{}' was built for {} features, feature space has {}",
                strategy.name(),
                strategy.feature_count(),
                feature_count
            )));
        }

        let start = Instant::now();
        let bounds = *strategy.bounds();
        let termination = *strategy.termination();
        info!(
            "starting {} search over {} features (parallel: {})",
            strategy.name(),
            feature_count,
            config.parallel
        );

        // 1. Initial population
        let initial: Vec<Individual<C>> = strategy
            .initial()
            .build(feature_count, rng)
            .into_iter()
            .filter(|c| c.len() == feature_count && bounds.admits(c))
            .map(Individual::new)
            .collect();
        if initial.is_empty() {
            return Err(SearchError::EmptyPopulation { generation: 0 });
        }
        let mut population = Population::from_individuals(initial);

        if is_cancelled(&cancel) {
            return Err(SearchError::Cancelled);
        }

        // 2. Evaluate generation 0
        let mut evaluator = Evaluation::new(evaluator, config.parallel);
        let mut history = Vec::new();
        let mut fitness_history = Vec::new();
        let (calls, failures) = evaluator.evaluate(&mut population);
        if population.is_empty() {
            return Err(SearchError::EmptyPopulation { generation: 0 });
        }
        finish_generation(
            strategy,
            &mut population,
            rng,
            calls,
            failures,
            &mut history,
            &mut fitness_history,
        );

        // 3. Generational loop
        let stop_reason = loop {
            let best = population.best_ever().and_then(Individual::fitness_value);
            if let Some(reason) = termination.check(
                population.generation(),
                population.generations_without_improvement(),
                population.is_empty(),
                best,
            ) {
                break reason;
            }
            if let Some(limit) = config.time_limit_ms {
                if start.elapsed().as_millis() >= u128::from(limit) {
                    break StopReason::TimeLimit;
                }
            }
            if is_cancelled(&cancel) {
                break StopReason::Cancelled;
            }

            population.advance_generation();
            let generation = population.generation();
            for op in strategy.pre_mut() {
                if op.applies_at(generation) {
                    op.apply(&mut population, rng);
                }
            }

            let mut individuals = population.take();
            for ind in &mut individuals {
                ind.stamp_generation(generation);
            }
            individuals.retain(|ind| ind.is_evaluated() || bounds.admits(ind.candidate()));
            population.replace(individuals);

            let (calls, failures) = evaluator.evaluate(&mut population);
            if calls > 0 && population.is_empty() {
                return Err(SearchError::EmptyPopulation { generation });
            }
            finish_generation(
                strategy,
                &mut population,
                rng,
                calls,
                failures,
                &mut history,
                &mut fitness_history,
            );
        };

        let best = population
            .best_ever()
            .cloned()
            .ok_or(SearchError::EmptyPopulation {
                generation: population.generation(),
            })?;
        let best_fitness = best
            .fitness()
            .cloned()
            .ok_or(SearchError::EmptyPopulation {
                generation: population.generation(),
            })?;

        info!(
            "{} search finished after {} generations ({:?}): best {} = {:.6} with {} features, \
             {} evaluations ({} failed)",
            strategy.name(),
            population.generation(),
            stop_reason,
            best_fitness.criterion(),
            best_fitness.value(),
            best.active_count(),
            evaluator.calls,
            evaluator.failures
        );

        Ok(SearchResult {
            best,
            best_fitness,
            generations: population.generation(),
            stop_reason,
            evaluations: evaluator.calls,
            failed_evaluations: evaluator.failures,
            fitness_history,
            history,
        })
    }
}

fn is_cancelled(cancel: &Option<Arc<AtomicBool>>) -> bool {
    cancel
        .as_ref()
        .is_some_and(|flag| flag.load(Ordering::Relaxed))
}

/// Best tracking, operator feedback and post-operators for one evaluated
/// generation.
fn finish_generation<C: Candidate>(
    strategy: &mut Strategy<C>,
    population: &mut Population<C>,
    rng: &mut dyn RngCore,
    calls: usize,
    failures: usize,
    history: &mut Vec<GenerationStats>,
    fitness_history: &mut Vec<f64>,
) {
    let generation = population.generation();
    let improved = population.record_best();

    let stats = GenerationStats {
        generation,
        population_size: population.len(),
        evaluations: calls,
        failures,
        best_fitness: population.best_current().and_then(Individual::fitness_value),
        mean_fitness: population.mean_fitness(),
        best_ever_fitness: population.best_ever().and_then(Individual::fitness_value),
    };
    debug!(
        "generation {}: {} individuals, {} evaluated ({} failed), best {:?}, best ever {:?}{}",
        generation,
        stats.population_size,
        calls,
        failures,
        stats.best_fitness,
        stats.best_ever_fitness,
        if improved { " (improved)" } else { "" }
    );
    if let Some(best) = stats.best_ever_fitness {
        fitness_history.push(best);
    }
    history.push(stats);

    for op in strategy.pre_mut() {
        op.after_evaluation(population);
    }
    for op in strategy.post_mut() {
        op.after_evaluation(population);
    }
    for op in strategy.post_mut() {
        if op.applies_at(generation) {
            op.apply(population, rng);
        }
    }
}

/// Sends unevaluated individuals to the evaluator and validates the scores.
struct Evaluation<'a, E> {
    evaluator: &'a E,
    parallel: bool,
    criterion: Option<String>,
    calls: usize,
    failures: usize,
}

impl<'a, E> Evaluation<'a, E> {
    fn new(evaluator: &'a E, parallel: bool) -> Self {
        Self {
            evaluator,
            parallel,
            criterion: None,
            calls: 0,
            failures: 0,
        }
    }

    /// Evaluates every individual without fitness, dropping failures.
    ///
    /// Returns the number of evaluator calls and failures.
    fn evaluate<C>(&mut self, population: &mut Population<C>) -> (usize, usize)
    where
        C: Candidate,
        E: FitnessEvaluator<C>,
    {
        let individuals = population.take();
        let pending: Vec<&Individual<C>> =
            individuals.iter().filter(|i| !i.is_evaluated()).collect();
        let evaluator = self.evaluator;
        let results: Vec<Result<FitnessScore, EvaluationError>> = if self.parallel {
            pending
                .par_iter()
                .map(|ind| evaluator.evaluate(ind.candidate()))
                .collect()
        } else {
            pending
                .iter()
                .map(|ind| evaluator.evaluate(ind.candidate()))
                .collect()
        };
        let calls = results.len();

        let mut results = results.into_iter();
        let mut failures = 0;
        let mut next = Vec::with_capacity(individuals.len());
        for ind in individuals {
            if ind.is_evaluated() {
                next.push(ind);
                continue;
            }
            let Some(result) = results.next() else {
                break;
            };
            match result.and_then(|score| self.check(score)) {
                Ok(score) => next.push(ind.with_fitness(score)),
                Err(err) => {
                    failures += 1;
                    warn!(
                        "dropping candidate with {} active features: {}",
                        ind.active_count(),
                        err
                    );
                }
            }
        }
        population.replace(next);

        self.calls += calls;
        self.failures += failures;
        (calls, failures)
    }

    /// Rejects non-finite scores and scores of a foreign criterion.
    fn check(&mut self, score: FitnessScore) -> Result<FitnessScore, EvaluationError> {
        if !score.value().is_finite() {
            return Err(EvaluationError::new(format!(
                "non-finite {} score {}",
                score.criterion(),
                score.value()
            )));
        }
        match &self.criterion {
            Some(criterion) if criterion != score.criterion() => Err(EvaluationError::new(format!(
                "score of criterion '{}' in a run optimizing '{}'",
                score.criterion(),
                criterion
            ))),
            Some(_) => Ok(score),
            None => {
                self.criterion = Some(score.criterion().to_string());
                Ok(score)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
