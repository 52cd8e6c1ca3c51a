//! Greedy forward selection and backward elimination.
//!
//! Both walk the inclusion lattice one feature at a time. Forward selection
//! starts from every single-feature mask and adds features; backward
//! elimination starts from the full mask and removes them. Each generation
//! only the `keep_best` fittest masks are expanded, and duplicates reached
//! through different paths are merged before evaluation.

use super::check_bounds;
use crate::error::SearchError;
use crate::operators::greedy::{
    AllFeatures, BackwardShrink, ExpansionScope, ForwardExpansion, SingleFeatures,
};
use crate::operators::pruning::{KeepBest, RemoveRedundant};
use crate::operators::PerIndividual;
use crate::search::{FeatureMask, Strategy, Termination};

/// Parameters shared by both greedy directions.
fn validate_common(
    keep_best: usize,
    scope: &ExpansionScope,
    feature_count: Option<usize>,
) -> Result<(), SearchError> {
    if keep_best == 0 {
        return Err(SearchError::invalid("keep_best must be at least 1"));
    }
    if let ExpansionScope::Restricted(indices) = scope {
        if indices.is_empty() {
            return Err(SearchError::invalid("restricted expansion scope is empty"));
        }
    }
    if let Some(n) = feature_count {
        scope.check(n).map_err(|i| {
            SearchError::invalid(format!(
                "expansion scope index {i} out of range for {n} features"
            ))
        })?;
    }
    Ok(())
}

/// Configuration for greedy forward selection.
///
/// ```
/// use u_featsel::strategies::ForwardSelectionConfig;
///
/// let strategy = ForwardSelectionConfig::default()
///     .with_keep_best(2)
///     .build(5)
///     .unwrap();
/// // Left unset, the cap lets the search reach the full mask.
/// assert_eq!(strategy.termination().max_generations, 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForwardSelectionConfig {
    /// Masks expanded per generation.
    pub keep_best: usize,

    /// Generations without improvement before stopping (0 disables).
    pub stagnation_limit: usize,

    /// Generation cap; `None` means `feature_count - 1`.
    pub max_generations: Option<usize>,

    /// Features that may be added.
    pub scope: ExpansionScope,

    /// Maximum number of active features, `None` for unbounded.
    pub max_features: Option<usize>,
}

impl Default for ForwardSelectionConfig {
    fn default() -> Self {
        Self {
            keep_best: 1,
            stagnation_limit: 1,
            max_generations: None,
            scope: ExpansionScope::All,
            max_features: None,
        }
    }
}

impl ForwardSelectionConfig {
    pub fn with_keep_best(mut self, k: usize) -> Self {
        self.keep_best = k;
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = Some(n);
        self
    }

    pub fn with_scope(mut self, scope: ExpansionScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_max_features(mut self, n: usize) -> Self {
        self.max_features = Some(n);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), SearchError> {
        validate_common(self.keep_best, &self.scope, None)?;
        check_bounds(1, self.max_features, None)?;
        Ok(())
    }

    /// Builds the strategy for `feature_count` features.
    pub fn build(&self, feature_count: usize) -> Result<Strategy<FeatureMask>, SearchError> {
        self.validate()?;
        validate_common(self.keep_best, &self.scope, Some(feature_count))?;
        let bounds = check_bounds(1, self.max_features, Some(feature_count))?;

        Ok(Strategy::new(
            "forward selection",
            feature_count,
            SingleFeatures::new(self.scope.clone()),
        )
        .with_pre(KeepBest::new(self.keep_best))
        .with_pre(PerIndividual::new(ForwardExpansion::new(self.scope.clone(), bounds)))
        .with_pre(RemoveRedundant)
        .with_termination(Termination {
            max_generations: self
                .max_generations
                .unwrap_or(feature_count.saturating_sub(1)),
            stagnation_limit: self.stagnation_limit,
            stop_when_empty: true,
            target_fitness: None,
        })
        .with_bounds(bounds))
    }
}

/// Configuration for greedy backward elimination.
///
/// ```
/// use u_featsel::strategies::BackwardEliminationConfig;
///
/// let strategy = BackwardEliminationConfig::default().build(5).unwrap();
/// assert_eq!(strategy.termination().max_generations, 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BackwardEliminationConfig {
    /// Masks shrunk per generation.
    pub keep_best: usize,

    /// Generations without improvement before stopping (0 disables).
    pub stagnation_limit: usize,

    /// Generation cap; `None` means `feature_count`.
    pub max_generations: Option<usize>,

    /// Features that may be removed.
    pub scope: ExpansionScope,

    /// Minimum number of active features.
    pub min_features: usize,
}

impl Default for BackwardEliminationConfig {
    fn default() -> Self {
        Self {
            keep_best: 1,
            stagnation_limit: 1,
            max_generations: None,
            scope: ExpansionScope::All,
            min_features: 1,
        }
    }
}

impl BackwardEliminationConfig {
    pub fn with_keep_best(mut self, k: usize) -> Self {
        self.keep_best = k;
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = Some(n);
        self
    }

    pub fn with_scope(mut self, scope: ExpansionScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_min_features(mut self, n: usize) -> Self {
        self.min_features = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), SearchError> {
        validate_common(self.keep_best, &self.scope, None)
    }

    /// Builds the strategy for `feature_count` features.
    pub fn build(&self, feature_count: usize) -> Result<Strategy<FeatureMask>, SearchError> {
        self.validate()?;
        validate_common(self.keep_best, &self.scope, Some(feature_count))?;
        let bounds = check_bounds(self.min_features, None, Some(feature_count))?;

        Ok(Strategy::new("backward elimination", feature_count, AllFeatures)
            .with_pre(KeepBest::new(self.keep_best))
            .with_pre(PerIndividual::new(BackwardShrink::new(self.scope.clone(), bounds)))
            .with_pre(RemoveRedundant)
            .with_termination(Termination {
                max_generations: self.max_generations.unwrap_or(feature_count),
                stagnation_limit: self.stagnation_limit,
                stop_when_empty: true,
                target_fitness: None,
            })
            .with_bounds(bounds))
    }
}
