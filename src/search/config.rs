//! Run configuration.
//!
//! [`SearchConfig`] holds the parameters that are independent of the search
//! method: randomness, parallelism and wall-clock budget. Method parameters
//! live in the [`crate::strategies`] configurations.

use crate::error::SearchError;

/// Configuration of a search run.
///
/// # Examples
///
/// ```
/// use u_featsel::search::SearchConfig;
///
/// let config = SearchConfig::default()
///     .with_seed(42)
///     .with_parallel(true)
///     .with_time_limit_ms(5_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Whether to evaluate one generation in parallel using rayon.
    ///
    /// Results are merged back in population order, so a seeded run gives
    /// the same result either way as long as the evaluator is deterministic.
    pub parallel: bool,

    /// Optional wall-clock time limit in milliseconds.
    ///
    /// Checked between generations, so a run may overshoot by one
    /// generation's worth of evaluations.
    pub time_limit_ms: Option<u64>,
}

impl SearchConfig {
    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.time_limit_ms == Some(0) {
            return Err(SearchError::invalid("time_limit_ms must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.seed, None);
        assert!(!config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_time_limit_rejected() {
        let config = SearchConfig::default().with_time_limit_ms(0);
        assert!(config.validate().is_err());
    }
}
