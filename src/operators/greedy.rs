//! Greedy forward selection and backward elimination steps.
//!
//! Each generation keeps the best few masks (see
//! [`KeepBest`](super::pruning::KeepBest)) and replaces every survivor by all
//! its neighbours one feature away: forward expansion switches one more
//! feature on, backward shrink switches one off. Parents are not carried
//! over; the best-ever individual is tracked by the population.

use super::{CardinalityBounds, IndividualOperator};
use crate::search::strategy::InitialPopulation;
use crate::search::{Candidate, FeatureMask, Individual};
use rand::RngCore;

/// Features a greedy step may toggle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExpansionScope {
    /// Every feature.
    #[default]
    All,
    /// Only the listed feature indices.
    Restricted(Vec<usize>),
}

impl ExpansionScope {
    pub fn contains(&self, index: usize) -> bool {
        match self {
            ExpansionScope::All => true,
            ExpansionScope::Restricted(indices) => indices.contains(&index),
        }
    }

    /// Fails if a restricted index is out of range for `feature_count`.
    pub(crate) fn check(&self, feature_count: usize) -> Result<(), usize> {
        match self {
            ExpansionScope::All => Ok(()),
            ExpansionScope::Restricted(indices) => {
                match indices.iter().find(|&&i| i >= feature_count) {
                    Some(&i) => Err(i),
                    None => Ok(()),
                }
            }
        }
    }
}

/// Forward step: one child per inactive in-scope feature, with it switched on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ForwardExpansion {
    scope: ExpansionScope,
    bounds: CardinalityBounds,
}

impl ForwardExpansion {
    pub fn new(scope: ExpansionScope, bounds: CardinalityBounds) -> Self {
        Self { scope, bounds }
    }
}

impl IndividualOperator<FeatureMask> for ForwardExpansion {
    fn name(&self) -> &str {
        "forward-expansion"
    }

    fn operate(
        &mut self,
        individual: &Individual<FeatureMask>,
        _rng: &mut dyn RngCore,
    ) -> Vec<Individual<FeatureMask>> {
        let mask = individual.candidate();
        mask.inactive_indices()
            .filter(|&i| self.scope.contains(i))
            .map(|i| {
                let mut child = mask.clone();
                child.set(i, true);
                child
            })
            .filter(|child| self.bounds.admits(child))
            .map(|child| individual.derive(child))
            .collect()
    }
}

/// Backward step: one child per active in-scope feature, with it switched
/// off. Never produces an empty mask.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BackwardShrink {
    scope: ExpansionScope,
    bounds: CardinalityBounds,
}

impl BackwardShrink {
    pub fn new(scope: ExpansionScope, bounds: CardinalityBounds) -> Self {
        Self { scope, bounds }
    }
}

impl IndividualOperator<FeatureMask> for BackwardShrink {
    fn name(&self) -> &str {
        "backward-shrink"
    }

    fn operate(
        &mut self,
        individual: &Individual<FeatureMask>,
        _rng: &mut dyn RngCore,
    ) -> Vec<Individual<FeatureMask>> {
        let mask = individual.candidate();
        if mask.active_count() <= 1 {
            return Vec::new();
        }
        mask.active_indices()
            .filter(|&i| self.scope.contains(i))
            .map(|i| {
                let mut child = mask.clone();
                child.set(i, false);
                child
            })
            .filter(|child| self.bounds.admits(child))
            .map(|child| individual.derive(child))
            .collect()
    }
}

/// Initial population of every single-feature mask in scope.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SingleFeatures {
    scope: ExpansionScope,
}

impl SingleFeatures {
    pub fn new(scope: ExpansionScope) -> Self {
        Self { scope }
    }
}

impl InitialPopulation<FeatureMask> for SingleFeatures {
    fn build(&self, feature_count: usize, _rng: &mut dyn RngCore) -> Vec<FeatureMask> {
        (0..feature_count)
            .filter(|&i| self.scope.contains(i))
            .map(|i| FeatureMask::from_indices(feature_count, [i]))
            .collect()
    }
}

/// Initial population of the single full mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllFeatures;

impl InitialPopulation<FeatureMask> for AllFeatures {
    fn build(&self, feature_count: usize, _rng: &mut dyn RngCore) -> Vec<FeatureMask> {
        if feature_count == 0 {
            return Vec::new();
        }
        vec![FeatureMask::full(feature_count)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use crate::search::FitnessScore;

    #[test]
    fn test_forward_children() {
        let parent = Individual::new(FeatureMask::from_indices(4, [1]))
            .with_fitness(FitnessScore::new(0.3));
        let mut op = ForwardExpansion::default();
        let mut rng = create_rng(0);
        let out = op.operate(&parent, &mut rng);
        let masks: Vec<Vec<usize>> = out
            .iter()
            .map(|i| i.candidate().active_indices().collect())
            .collect();
        assert_eq!(masks, vec![vec![0, 1], vec![1, 2], vec![1, 3]]);
        assert!(out.iter().all(|i| i.parent_fitness() == Some(0.3)));
    }

    #[test]
    fn test_forward_respects_scope_and_max() {
        let parent = Individual::new(FeatureMask::from_indices(4, [0]));
        let mut rng = create_rng(0);
        let mut op = ForwardExpansion::new(
            ExpansionScope::Restricted(vec![0, 2]),
            CardinalityBounds::default(),
        );
        let out = op.operate(&parent, &mut rng);
        assert_eq!(out.len(), 1);
        assert!(out[0].candidate().is_active(2));

        let mut capped =
            ForwardExpansion::new(ExpansionScope::All, CardinalityBounds::new(1, Some(1)));
        assert!(capped.operate(&parent, &mut rng).is_empty());
    }

    #[test]
    fn test_backward_never_empty() {
        let mut op = BackwardShrink::default();
        let mut rng = create_rng(0);
        let single = Individual::new(FeatureMask::from_indices(3, [2]));
        assert!(op.operate(&single, &mut rng).is_empty());

        let full = Individual::new(FeatureMask::full(3));
        let out = op.operate(&full, &mut rng);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|i| i.active_count() == 2));
    }

    #[test]
    fn test_initial_builders() {
        let mut rng = create_rng(0);
        let singles = SingleFeatures::default().build(3, &mut rng);
        assert_eq!(singles.len(), 3);
        assert!(singles.iter().all(|m| m.active_count() == 1));
        assert_eq!(AllFeatures.build(3, &mut rng), vec![FeatureMask::full(3)]);
        assert!(AllFeatures.build(0, &mut rng).is_empty());
    }

    #[test]
    fn test_scope_check() {
        assert!(ExpansionScope::All.check(2).is_ok());
        assert_eq!(ExpansionScope::Restricted(vec![0, 5]).check(3), Err(5));
    }
}
