//! Ready-made search methods.
//!
//! Each configuration validates its parameters and builds a
//! [`Strategy`](crate::search::Strategy) for a given feature count. All
//! parameter errors surface from [`validate`](GeneticSelectionConfig::validate)
//! or `build`, never during the search.
//!
//! | Config | Candidate | Pre-operators | Post-operators |
//! |---|---|---|---|
//! | [`GeneticSelectionConfig`] | mask | mutation, crossover | selection |
//! | [`EvolutionaryWeightingConfig`] | weights | adaptive mutation, crossover | selection |
//! | [`ForwardSelectionConfig`] | mask | keep-best, expansion, dedupe | none |
//! | [`BackwardEliminationConfig`] | mask | keep-best, shrink, dedupe | none |
//! | [`BruteForceConfig`] | mask | none | none |
//!
//! # References
//!
//! - Kohavi & John (1997), "Wrappers for feature subset selection"
//! - Yang & Honavar (1998), "Feature subset selection using a genetic
//!   algorithm"

mod brute_force;
mod evolutionary;
mod genetic;
mod greedy;

pub use brute_force::BruteForceConfig;
pub use evolutionary::EvolutionaryWeightingConfig;
pub use genetic::GeneticSelectionConfig;
pub use greedy::{BackwardEliminationConfig, ForwardSelectionConfig};

use crate::error::SearchError;
use crate::operators::CardinalityBounds;

/// Checks `[min, max]` against each other and against `feature_count`.
pub(crate) fn check_bounds(
    min_features: usize,
    max_features: Option<usize>,
    feature_count: Option<usize>,
) -> Result<CardinalityBounds, SearchError> {
    if let Some(max) = max_features {
        if max == 0 {
            return Err(SearchError::invalid("max_features must be at least 1"));
        }
        if min_features > max {
            return Err(SearchError::invalid(format!(
                "min_features ({min_features}) exceeds max_features ({max})"
            )));
        }
    }
    if let Some(n) = feature_count {
        if n == 0 {
            return Err(SearchError::invalid("feature space is empty"));
        }
        if min_features > n {
            return Err(SearchError::invalid(format!(
                "min_features ({min_features}) exceeds feature count ({n})"
            )));
        }
    }
    Ok(CardinalityBounds::new(min_features, max_features))
}

pub(crate) fn check_probability(name: &str, p: f64) -> Result<(), SearchError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(SearchError::invalid(format!("{name} must be in [0, 1], got {p}")));
    }
    Ok(())
}
