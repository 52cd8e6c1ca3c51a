//! Strategy: the data that distinguishes one search method from another.
//!
//! A [`Strategy`] is an initial-population builder, two ordered operator
//! lists and a [`Termination`] rule. The runner knows nothing else about the
//! method it executes; genetic search, evolutionary weighting, greedy search
//! and brute force only differ in what they put here (see
//! [`crate::strategies`]).

use super::types::Candidate;
use crate::operators::{CardinalityBounds, PopulationOperator};
use rand::RngCore;
use std::fmt;

/// Builds the candidates of generation 0.
pub trait InitialPopulation<C: Candidate>: Send {
    /// Candidates for a space of `feature_count` features.
    ///
    /// The runner discards candidates that violate the strategy's
    /// cardinality bounds, so builders may return inadmissible ones.
    fn build(&self, feature_count: usize, rng: &mut dyn RngCore) -> Vec<C>;
}

/// Initial population given explicitly by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedPopulation<C> {
    candidates: Vec<C>,
}

impl<C> FixedPopulation<C> {
    pub fn new(candidates: Vec<C>) -> Self {
        Self { candidates }
    }
}

impl<C: Candidate> InitialPopulation<C> for FixedPopulation<C> {
    fn build(&self, _feature_count: usize, _rng: &mut dyn RngCore) -> Vec<C> {
        self.candidates.clone()
    }
}

/// Why a search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// The generation limit was reached.
    MaxGenerations,
    /// The best-ever fitness did not improve for `stagnation_limit` generations.
    Stagnation,
    /// No individuals were left to continue with.
    Exhausted,
    /// The best-ever fitness reached the target.
    TargetReached,
    /// The wall-clock limit elapsed.
    TimeLimit,
    /// The caller raised the cancellation flag.
    Cancelled,
}

/// Termination rule evaluated after every generation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Termination {
    /// Stop once `generation >= max_generations`.
    pub max_generations: usize,

    /// Stop after this many consecutive generations without a strict
    /// improvement of the best-ever. 0 disables the rule.
    pub stagnation_limit: usize,

    /// Stop when the current generation is empty.
    pub stop_when_empty: bool,

    /// Stop once the best-ever fitness is at least this value.
    pub target_fitness: Option<f64>,
}

impl Default for Termination {
    fn default() -> Self {
        Self {
            max_generations: 100,
            stagnation_limit: 0,
            stop_when_empty: true,
            target_fitness: None,
        }
    }
}

impl Termination {
    /// Checks the rule against the state after generation `generation`.
    pub fn check(
        &self,
        generation: usize,
        without_improvement: usize,
        population_empty: bool,
        best_fitness: Option<f64>,
    ) -> Option<StopReason> {
        if let (Some(target), Some(best)) = (self.target_fitness, best_fitness) {
            if best >= target {
                return Some(StopReason::TargetReached);
            }
        }
        if self.stop_when_empty && population_empty {
            return Some(StopReason::Exhausted);
        }
        if self.stagnation_limit > 0 && without_improvement >= self.stagnation_limit {
            return Some(StopReason::Stagnation);
        }
        if generation >= self.max_generations {
            return Some(StopReason::MaxGenerations);
        }
        None
    }
}

/// A complete search method.
///
/// Per generation the runner applies the scheduled `pre` operators, evaluates
/// every unevaluated individual, then applies the `post` operators. Operator
/// order within a list is significant.
pub struct Strategy<C: Candidate> {
    name: String,
    feature_count: usize,
    initial: Box<dyn InitialPopulation<C>>,
    pre: Vec<Box<dyn PopulationOperator<C>>>,
    post: Vec<Box<dyn PopulationOperator<C>>>,
    termination: Termination,
    bounds: CardinalityBounds,
}

impl<C: Candidate> Strategy<C> {
    /// A strategy with no operators, default termination and bounds.
    pub fn new(
        name: impl Into<String>,
        feature_count: usize,
        initial: impl InitialPopulation<C> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            feature_count,
            initial: Box::new(initial),
            pre: Vec::new(),
            post: Vec::new(),
            termination: Termination::default(),
            bounds: CardinalityBounds::default(),
        }
    }

    /// Appends an operator applied before evaluation.
    pub fn with_pre(mut self, op: impl PopulationOperator<C> + 'static) -> Self {
        self.pre.push(Box::new(op));
        self
    }

    /// Appends an operator applied after evaluation.
    pub fn with_post(mut self, op: impl PopulationOperator<C> + 'static) -> Self {
        self.post.push(Box::new(op));
        self
    }

    pub fn with_termination(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }

    /// Admission bounds applied to every newly created individual.
    pub fn with_bounds(mut self, bounds: CardinalityBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of features the strategy was built for.
    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    pub fn termination(&self) -> &Termination {
        &self.termination
    }

    pub fn bounds(&self) -> &CardinalityBounds {
        &self.bounds
    }

    pub(crate) fn initial(&self) -> &dyn InitialPopulation<C> {
        self.initial.as_ref()
    }

    pub(crate) fn pre_mut(&mut self) -> &mut [Box<dyn PopulationOperator<C>>] {
        &mut self.pre
    }

    pub(crate) fn post_mut(&mut self) -> &mut [Box<dyn PopulationOperator<C>>] {
        &mut self.post
    }

    /// Names of the pre- and post-evaluation operators, in order.
    pub fn operator_names(&self) -> (Vec<&str>, Vec<&str>) {
        (
            self.pre.iter().map(|op| op.name()).collect(),
            self.post.iter().map(|op| op.name()).collect(),
        )
    }

    /// The first operator of type `T`, searching pre- then post-evaluation
    /// operators.
    ///
    /// Lets callers read adapted state after a run, e.g. the final variance
    /// of an [`AdaptiveWeightMutation`].
    ///
    /// [`AdaptiveWeightMutation`]: crate::operators::weighting::AdaptiveWeightMutation
    pub fn operator<T: 'static>(&self) -> Option<&T> {
        self.pre
            .iter()
            .chain(&self.post)
            .find_map(|op| op.as_any().downcast_ref::<T>())
    }
}

impl<C: Candidate> fmt::Debug for Strategy<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (pre, post) = self.operator_names();
        f.debug_struct("Strategy")
            .field("name", &self.name)
            .field("feature_count", &self.feature_count)
            .field("pre", &pre)
            .field("post", &post)
            .field("termination", &self.termination)
            .field("bounds", &self.bounds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::pruning::{KeepBest, RemoveRedundant};
    use crate::search::FeatureMask;

    #[test]
    fn test_termination_order() {
        let t = Termination {
            max_generations: 10,
            stagnation_limit: 3,
            stop_when_empty: true,
            target_fitness: Some(0.99),
        };
        assert_eq!(t.check(1, 0, false, Some(0.5)), None);
        assert_eq!(t.check(1, 0, false, Some(1.0)), Some(StopReason::TargetReached));
        assert_eq!(t.check(1, 0, true, Some(0.5)), Some(StopReason::Exhausted));
        assert_eq!(t.check(1, 3, false, Some(0.5)), Some(StopReason::Stagnation));
        assert_eq!(t.check(10, 0, false, Some(0.5)), Some(StopReason::MaxGenerations));
    }

    #[test]
    fn test_zero_stagnation_limit_disables() {
        let t = Termination {
            stagnation_limit: 0,
            ..Termination::default()
        };
        assert_eq!(t.check(1, 1_000, false, None), None);
    }

    #[test]
    fn test_strategy_builder() {
        let strategy = Strategy::new("forward", 4, FixedPopulation::new(vec![FeatureMask::full(4)]))
            .with_pre(KeepBest::new(2))
            .with_pre(RemoveRedundant)
            .with_termination(Termination {
                max_generations: 3,
                ..Termination::default()
            });
        let (pre, post) = strategy.operator_names();
        assert_eq!(pre, vec!["keep-best", "remove-redundant"]);
        assert!(post.is_empty());
        assert_eq!(strategy.termination().max_generations, 3);
        assert!(format!("{strategy:?}").contains("keep-best"));
    }

    #[test]
    fn test_operator_lookup() {
        let strategy = Strategy::new("forward", 4, FixedPopulation::new(vec![FeatureMask::full(4)]))
            .with_pre(RemoveRedundant)
            .with_post(KeepBest::new(2))
            .with_post(KeepBest::new(5));
        assert_eq!(strategy.operator::<KeepBest>().map(KeepBest::k), Some(2));
        assert_eq!(strategy.operator::<RemoveRedundant>(), Some(&RemoveRedundant));
        assert!(strategy.operator::<FixedPopulation<FeatureMask>>().is_none());
    }
}
