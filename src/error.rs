//! Error types.
//!
//! [`SearchError`] covers strategy construction and the search loop;
//! [`SelectorError`] covers the weight-based feature selector. Per-candidate
//! evaluation failures are reported by the evaluator as
//! [`EvaluationError`](crate::search::EvaluationError) and are recovered by
//! the runner, so they never surface here directly.

/// Errors raised while building a strategy or running a search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    /// A configuration parameter is out of range or inconsistent.
    ///
    /// Always reported at construction time, never mid-search.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Every candidate was eliminated (or the initial population was empty).
    ///
    /// Distinct from a search that converged with a valid best individual.
    #[error("no viable candidates left in generation {generation}")]
    EmptyPopulation { generation: usize },

    /// The search was cancelled before any candidate had been evaluated.
    #[error("search cancelled before any candidate was evaluated")]
    Cancelled,
}

impl SearchError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SearchError::InvalidConfiguration(msg.into())
    }
}

/// Errors raised by the weight-based feature selector.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectorError {
    /// Relation parameters are malformed (e.g. a percentage outside `[0, 1]`).
    #[error("invalid relation: {0}")]
    InvalidRelation(String),

    /// A feature has an unknown weight and no unknown-weight policy is set.
    #[error("feature '{feature}' has an unknown weight and no unknown-weight policy is configured")]
    UnknownWeightWithoutDefault { feature: String },

    /// A feature name is not part of the feature space.
    #[error("unknown feature '{0}'")]
    UnknownFeature(String),

    /// A feature name occurs twice in a weight table.
    #[error("duplicate feature '{0}'")]
    DuplicateFeature(String),

    /// The weight table does not match the feature space it is applied to.
    #[error("weight vector has {actual} entries, feature space has {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_error_messages() {
        let err = SearchError::invalid("min_features (3) exceeds max_features (2)");
        assert_eq!(
            err.to_string(),
            "invalid configuration: min_features (3) exceeds max_features (2)"
        );
        let err = SearchError::EmptyPopulation { generation: 4 };
        assert_eq!(err.to_string(), "no viable candidates left in generation 4");
    }

    #[test]
    fn test_selector_error_messages() {
        let err = SelectorError::UnknownWeightWithoutDefault {
            feature: "age".into(),
        };
        assert!(err.to_string().contains("'age'"));
    }
}
