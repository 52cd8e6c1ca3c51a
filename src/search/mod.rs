//! Generic search core.
//!
//! # Overview
//!
//! A search maximizes an externally computed fitness over candidates of one
//! kind: [`FeatureMask`] for feature selection or [`WeightVector`] for
//! feature weighting. The method is described by a [`Strategy`] and run by
//! [`SearchRunner`]:
//!
//! 1. **Initialize**: the strategy's builder creates generation 0;
//!    candidates violating the cardinality bounds are discarded.
//! 2. **Evaluate**: every individual without a cached fitness is scored,
//!    optionally in parallel. Failures drop the individual.
//! 3. **Track**: the best-ever individual and the stagnation counter are
//!    updated; operators observe the outcome.
//! 4. **Post-operators**: e.g. fitness-proportional selection.
//! 5. **Terminate?** generation limit, stagnation, exhaustion, target
//!    fitness, time limit or cancellation.
//! 6. **Pre-operators** of the next generation (mutation, crossover,
//!    expansion, pruning), then back to 2.
//!
//! # Modules
//!
//! - [`types`]: candidates, individuals, fitness, evaluator trait
//! - [`population`]: current generation plus best-ever bookkeeping
//! - [`strategy`]: initial builders, operator lists, termination
//! - [`config`]: seed, parallelism, time limit
//! - [`runner`]: the control loop

pub mod config;
pub mod population;
pub mod runner;
pub mod strategy;
pub mod types;

pub use config::SearchConfig;
pub use population::Population;
pub use runner::{GenerationStats, SearchResult, SearchRunner};
pub use strategy::{FixedPopulation, InitialPopulation, StopReason, Strategy, Termination};
pub use types::{
    Candidate, EvaluationError, FeatureMask, FitnessEvaluator, FitnessScore, Individual,
    WeightVector, UNKNOWN_WEIGHT,
};
