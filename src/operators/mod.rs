//! Population operators.
//!
//! Every search strategy is a list of operators applied around the
//! evaluation step. Operators come in two shapes:
//!
//! - [`PopulationOperator`]: transforms a whole [`Population`] in place
//!   (selection, pruning, crossover, adaptive mutation).
//! - [`IndividualOperator`]: maps one individual to zero, one or many
//!   individuals (mask mutation, forward expansion, backward shrink).
//!   [`PerIndividual`] lifts it to a population operator.
//!
//! [`Every`] restricts an operator to every n-th generation.
//!
//! Operators only touch the population they are given and never keep
//! references to individuals between calls.
//!
//! # Submodules
//!
//! - [`pruning`]: keep-best-k and redundancy removal
//! - [`selection`]: tournament, roulette and rank re-sampling
//! - [`crossover`]: one-point, uniform and shuffle gene swapping
//! - [`mask`]: bit-flip mutation and random initial masks
//! - [`weighting`]: Gaussian weight mutation with 1/5 success rule
//! - [`greedy`]: forward expansion and backward shrink
//! - [`exhaustive`]: brute-force subset enumeration

pub mod crossover;
pub mod exhaustive;
pub mod greedy;
pub mod mask;
pub mod pruning;
pub mod selection;
pub mod weighting;

use crate::search::{Candidate, Individual, Population};
use rand::RngCore;
use std::any::Any;

/// Admissible number of active features for a candidate.
///
/// `min` defaults to 1 so empty candidates are never admitted; `max` of
/// `None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardinalityBounds {
    pub min: usize,
    pub max: Option<usize>,
}

impl Default for CardinalityBounds {
    fn default() -> Self {
        Self { min: 1, max: None }
    }
}

impl CardinalityBounds {
    /// Bounds `[min, max]`; `min` is raised to 1.
    pub fn new(min: usize, max: Option<usize>) -> Self {
        Self {
            min: min.max(1),
            max,
        }
    }

    /// Whether `candidate` has an admissible number of active features.
    pub fn admits<C: Candidate>(&self, candidate: &C) -> bool {
        let k = candidate.active_count();
        k >= self.min && self.max.map_or(true, |max| k <= max)
    }
}

/// An in-place transformation of a population.
pub trait PopulationOperator<C: Candidate>: Send {
    /// Short name used in log output.
    fn name(&self) -> &str;

    /// The operator as [`Any`], for reading back its state after a run
    /// through [`Strategy::operator`](crate::search::Strategy::operator).
    fn as_any(&self) -> &dyn Any;

    /// Whether the operator runs in `generation`. Defaults to always.
    fn applies_at(&self, _generation: usize) -> bool {
        true
    }

    /// Transforms the population.
    fn apply(&mut self, population: &mut Population<C>, rng: &mut dyn RngCore);

    /// Called with the freshly evaluated population of every generation.
    ///
    /// Operators that adapt their own parameters (step sizes, rates) observe
    /// the outcome of their last application here. Defaults to a no-op.
    fn after_evaluation(&mut self, _population: &Population<C>) {}
}

/// A per-individual transformation.
pub trait IndividualOperator<C: Candidate>: Send {
    /// Short name used in log output.
    fn name(&self) -> &str;

    /// Produces the individuals that replace `individual`.
    ///
    /// May return nothing (e.g. every proposal was inadmissible), the
    /// original, or several derived individuals.
    fn operate(&mut self, individual: &Individual<C>, rng: &mut dyn RngCore) -> Vec<Individual<C>>;
}

/// Replaces the generation with the concatenated results of `op` on every
/// individual, in order.
pub(crate) fn apply_each<C, O>(op: &mut O, population: &mut Population<C>, rng: &mut dyn RngCore)
where
    C: Candidate,
    O: IndividualOperator<C> + ?Sized,
{
    let parents = population.take();
    let mut next = Vec::with_capacity(parents.len());
    for parent in &parents {
        next.extend(op.operate(parent, rng));
    }
    population.replace(next);
}

/// Applies an [`IndividualOperator`] to every individual and replaces the
/// generation with the concatenated results, in order.
#[derive(Debug, Clone)]
pub struct PerIndividual<O> {
    inner: O,
}

impl<O> PerIndividual<O> {
    pub fn new(inner: O) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }
}

impl<C, O> PopulationOperator<C> for PerIndividual<O>
where
    C: Candidate,
    O: IndividualOperator<C> + 'static,
{
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn apply(&mut self, population: &mut Population<C>, rng: &mut dyn RngCore) {
        apply_each(&mut self.inner, population, rng);
    }
}

/// Runs the wrapped operator only every `interval` generations.
///
/// Generation `g` is scheduled when `g % interval == 0`. Evaluation
/// observation is forwarded every generation regardless of the schedule.
#[derive(Debug, Clone)]
pub struct Every<O> {
    interval: usize,
    inner: O,
}

impl<O> Every<O> {
    /// `interval` of 0 is treated as 1.
    pub fn new(interval: usize, inner: O) -> Self {
        Self {
            interval: interval.max(1),
            inner,
        }
    }
}

impl<C, O> PopulationOperator<C> for Every<O>
where
    C: Candidate,
    O: PopulationOperator<C> + 'static,
{
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn applies_at(&self, generation: usize) -> bool {
        generation % self.interval == 0 && self.inner.applies_at(generation)
    }

    fn apply(&mut self, population: &mut Population<C>, rng: &mut dyn RngCore) {
        self.inner.apply(population, rng);
    }

    fn after_evaluation(&mut self, population: &Population<C>) {
        self.inner.after_evaluation(population);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use crate::search::FeatureMask;

    struct Duplicate;

    impl IndividualOperator<FeatureMask> for Duplicate {
        fn name(&self) -> &str {
            "duplicate"
        }

        fn operate(
            &mut self,
            individual: &Individual<FeatureMask>,
            _rng: &mut dyn RngCore,
        ) -> Vec<Individual<FeatureMask>> {
            if individual.active_count() > 1 {
                vec![individual.clone(), individual.clone_unevaluated()]
            } else {
                Vec::new()
            }
        }
    }

    struct Clear;

    impl PopulationOperator<FeatureMask> for Clear {
        fn name(&self) -> &str {
            "clear"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn apply(&mut self, population: &mut Population<FeatureMask>, _rng: &mut dyn RngCore) {
            population.take();
        }
    }

    #[test]
    fn test_per_individual_concatenates_in_order() {
        let mut pop = Population::from_individuals(vec![
            Individual::new(FeatureMask::full(3)),
            Individual::new(FeatureMask::from_indices(3, [0])),
            Individual::new(FeatureMask::from_indices(3, [0, 1])),
        ]);
        let mut op = PerIndividual::new(Duplicate);
        let mut rng = create_rng(1);
        op.apply(&mut pop, &mut rng);
        let counts: Vec<usize> = pop.individuals().iter().map(|i| i.active_count()).collect();
        assert_eq!(counts, vec![3, 3, 2, 2]);
    }

    #[test]
    fn test_cardinality_bounds() {
        let bounds = CardinalityBounds::new(0, Some(2));
        assert_eq!(bounds.min, 1);
        assert!(!bounds.admits(&FeatureMask::empty(4)));
        assert!(bounds.admits(&FeatureMask::from_indices(4, [1, 2])));
        assert!(!bounds.admits(&FeatureMask::from_indices(4, [0, 1, 2])));
        assert!(CardinalityBounds::default().admits(&FeatureMask::full(9)));
    }

    #[test]
    fn test_every_schedule() {
        let op = Every::new(3, Clear);
        let scheduled: Vec<usize> = (0..10)
            .filter(|&g| PopulationOperator::<FeatureMask>::applies_at(&op, g))
            .collect();
        assert_eq!(scheduled, vec![0, 3, 6, 9]);
    }

    #[test]
    fn test_every_zero_interval_means_always() {
        let op = Every::new(0, Clear);
        assert!((0..5).all(|g| PopulationOperator::<FeatureMask>::applies_at(&op, g)));
    }
}
