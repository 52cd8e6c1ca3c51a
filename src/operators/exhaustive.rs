//! Exhaustive subset enumeration.
//!
//! Enumerates masks recursively in feature order, deciding for each feature
//! whether it is excluded or included. A branch is cut as soon as it would
//! exceed the maximum cardinality. This is exponential in the number of
//! features: `2^n - 1` masks without constraints.

use crate::search::strategy::InitialPopulation;
use crate::search::FeatureMask;
use rand::RngCore;

/// Cardinality constraint on enumerated subsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SubsetConstraint {
    /// Between `min` and `max` features; `max == 0` means unbounded.
    Range { min: usize, max: usize },
    /// Exactly `k` features.
    Exact(usize),
}

impl Default for SubsetConstraint {
    fn default() -> Self {
        SubsetConstraint::Range { min: 1, max: 0 }
    }
}

impl SubsetConstraint {
    /// Effective `(min, max)` for `feature_count` features, `min >= 1`.
    pub fn limits(&self, feature_count: usize) -> (usize, usize) {
        match *self {
            SubsetConstraint::Range { min, max } => {
                let max = if max == 0 { feature_count } else { max.min(feature_count) };
                (min.max(1), max)
            }
            SubsetConstraint::Exact(k) => (k.max(1), k.min(feature_count)),
        }
    }
}

/// All masks over `feature_count` features satisfying `constraint`.
///
/// Masks are listed in depth-first order with "excluded" explored before
/// "included".
pub fn enumerate_subsets(feature_count: usize, constraint: SubsetConstraint) -> Vec<FeatureMask> {
    let (min, max) = constraint.limits(feature_count);
    let mut out = Vec::new();
    if min > max {
        return out;
    }
    let exact = matches!(constraint, SubsetConstraint::Exact(_));
    let mut current = FeatureMask::empty(feature_count);
    descend(&mut current, 0, 0, min, max, exact, &mut out);
    out
}

fn descend(
    current: &mut FeatureMask,
    index: usize,
    count: usize,
    min: usize,
    max: usize,
    exact: bool,
    out: &mut Vec<FeatureMask>,
) {
    if exact && count == max {
        out.push(current.clone());
        return;
    }
    if index == current.as_slice().len() {
        if count >= min && count <= max {
            out.push(current.clone());
        }
        return;
    }

    descend(current, index + 1, count, min, max, exact, out);
    if count < max {
        current.set(index, true);
        descend(current, index + 1, count + 1, min, max, exact, out);
        current.set(index, false);
    }
}

/// Initial population of every admissible subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExhaustiveSeed {
    constraint: SubsetConstraint,
}

impl ExhaustiveSeed {
    pub fn new(constraint: SubsetConstraint) -> Self {
        Self { constraint }
    }
}

impl InitialPopulation<FeatureMask> for ExhaustiveSeed {
    fn build(&self, feature_count: usize, _rng: &mut dyn RngCore) -> Vec<FeatureMask> {
        enumerate_subsets(feature_count, self.constraint)
    }
}
