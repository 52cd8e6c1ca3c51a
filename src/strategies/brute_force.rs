//! Exhaustive feature selection.

use crate::error::SearchError;
use crate::operators::exhaustive::{enumerate_subsets, ExhaustiveSeed, SubsetConstraint};
use crate::operators::CardinalityBounds;
use crate::search::{FeatureMask, Strategy, Termination};

/// Configuration for brute-force search.
///
/// Every mask within the cardinality constraint is evaluated exactly once,
/// in a single generation. The number of candidates grows as `2^n`; use
/// [`candidate_count`](Self::candidate_count) to check before running.
///
/// ```
/// use u_featsel::strategies::BruteForceConfig;
///
/// let config = BruteForceConfig::default().with_max_features(2);
/// assert_eq!(config.candidate_count(4).unwrap(), 4 + 6);
///
/// let exact = BruteForceConfig::default().with_exact_features(3);
/// assert_eq!(exact.candidate_count(5).unwrap(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BruteForceConfig {
    /// Minimum number of active features.
    pub min_features: usize,

    /// Maximum number of active features; 0 means unbounded.
    pub max_features: usize,

    /// If non-zero, only masks with exactly this many features.
    pub exact_features: usize,
}

impl Default for BruteForceConfig {
    fn default() -> Self {
        Self {
            min_features: 1,
            max_features: 0,
            exact_features: 0,
        }
    }
}

impl BruteForceConfig {
    pub fn with_min_features(mut self, n: usize) -> Self {
        self.min_features = n;
        self
    }

    /// Sets the maximum number of features (0 for unbounded).
    pub fn with_max_features(mut self, n: usize) -> Self {
        self.max_features = n;
        self
    }

    /// Restricts the search to masks of exactly `n` features (0 disables).
    pub fn with_exact_features(mut self, n: usize) -> Self {
        self.exact_features = n;
        self
    }

    /// The enumeration constraint these settings describe.
    pub fn constraint(&self) -> SubsetConstraint {
        if self.exact_features > 0 {
            SubsetConstraint::Exact(self.exact_features)
        } else {
            SubsetConstraint::Range {
                min: self.min_features,
                max: self.max_features,
            }
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.exact_features == 0
            && self.max_features > 0
            && self.min_features > self.max_features
        {
            return Err(SearchError::invalid(format!(
                "min_features ({}) exceeds max_features ({})",
                self.min_features, self.max_features
            )));
        }
        Ok(())
    }

    fn validate_for(&self, feature_count: usize) -> Result<(), SearchError> {
        self.validate()?;
        if feature_count == 0 {
            return Err(SearchError::invalid("feature space is empty"));
        }
        if self.exact_features > feature_count {
            return Err(SearchError::invalid(format!(
                "exact_features ({}) exceeds feature count ({feature_count})",
                self.exact_features
            )));
        }
        if self.exact_features == 0 && self.min_features > feature_count {
            return Err(SearchError::invalid(format!(
                "min_features ({}) exceeds feature count ({feature_count})",
                self.min_features
            )));
        }
        Ok(())
    }

    /// Number of masks the search will evaluate for `feature_count` features.
    ///
    /// Saturates at `u128::MAX` for spaces too large to count.
    pub fn candidate_count(&self, feature_count: usize) -> Result<u128, SearchError> {
        self.validate_for(feature_count)?;
        let (min, max) = self.constraint().limits(feature_count);
        let total = (min..=max).try_fold(0u128, |acc, k| {
            binomial(feature_count, k).and_then(|c| acc.checked_add(c))
        });
        Ok(total.unwrap_or(u128::MAX))
    }

    /// Builds the strategy for `feature_count` features.
    pub fn build(&self, feature_count: usize) -> Result<Strategy<FeatureMask>, SearchError> {
        self.validate_for(feature_count)?;
        let (min, max) = self.constraint().limits(feature_count);

        Ok(
            Strategy::new("brute force", feature_count, ExhaustiveSeed::new(self.constraint()))
                .with_termination(Termination {
                    max_generations: 0,
                    stagnation_limit: 0,
                    stop_when_empty: true,
                    target_fitness: None,
                })
                .with_bounds(CardinalityBounds::new(min, Some(max))),
        )
    }

    /// Materializes every candidate mask.
    pub fn enumerate(&self, feature_count: usize) -> Result<Vec<FeatureMask>, SearchError> {
        self.validate_for(feature_count)?;
        Ok(enumerate_subsets(feature_count, self.constraint()))
    }
}

/// `C(n, k)`, or `None` if it does not fit in a `u128`.
///
/// Each step computes `C(n, i + 1) = C(n, i) * (n - i) / (i + 1)` with the
/// common factor of `C(n, i)` and `i + 1` divided out first, so no
/// intermediate value exceeds the result.
fn binomial(n: usize, k: usize) -> Option<u128> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    (0..k).try_fold(1u128, |acc, i| {
        let divisor = (i + 1) as u128;
        let g = gcd(acc, divisor);
        let factor = (n - i) as u128 / (divisor / g);
        (acc / g).checked_mul(factor)
    })
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
