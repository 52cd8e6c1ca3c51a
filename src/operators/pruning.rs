//! Pruning operators: bound the branching of a generation.

use super::PopulationOperator;
use crate::search::{Candidate, Individual, Population};
use rand::RngCore;
use std::any::Any;
use std::collections::HashMap;

/// Retains only the `k` best individuals.
///
/// Ranking follows [`Individual::rank_cmp`]: higher fitness first, ties to
/// fewer active features and earlier generations; the sort is stable so
/// remaining ties keep their order. Unevaluated individuals rank last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepBest {
    k: usize,
}

impl KeepBest {
    pub fn new(k: usize) -> Self {
        Self { k }
    }

    pub fn k(&self) -> usize {
        self.k
    }
}

impl<C: Candidate> PopulationOperator<C> for KeepBest {
    fn name(&self) -> &str {
        "keep-best"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn apply(&mut self, population: &mut Population<C>, _rng: &mut dyn RngCore) {
        if population.len() <= self.k {
            return;
        }
        let mut individuals = population.take();
        individuals.sort_by(Individual::rank_cmp);
        individuals.truncate(self.k);
        population.replace(individuals);
    }
}

/// Drops duplicate candidates within one generation.
///
/// The first occurrence keeps its position. When a later duplicate already
/// carries a fitness and the kept one does not, the evaluated copy takes the
/// slot, so identical candidates are never evaluated twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoveRedundant;

impl<C: Candidate> PopulationOperator<C> for RemoveRedundant {
    fn name(&self) -> &str {
        "remove-redundant"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn apply(&mut self, population: &mut Population<C>, _rng: &mut dyn RngCore) {
        let individuals = population.take();
        let mut slots: HashMap<C, usize> = HashMap::with_capacity(individuals.len());
        let mut unique: Vec<Individual<C>> = Vec::with_capacity(individuals.len());

        for ind in individuals {
            match slots.get(ind.candidate()) {
                Some(&slot) => {
                    if !unique[slot].is_evaluated() && ind.is_evaluated() {
                        unique[slot] = ind;
                    }
                }
                None => {
                    slots.insert(ind.candidate().clone(), unique.len());
                    unique.push(ind);
                }
            }
        }
        population.replace(unique);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use crate::search::{FeatureMask, FitnessScore};

    fn mask(indices: &[usize]) -> FeatureMask {
        FeatureMask::from_indices(4, indices.iter().copied())
    }

    fn scored(indices: &[usize], f: f64) -> Individual<FeatureMask> {
        Individual::new(mask(indices)).with_fitness(FitnessScore::new(f))
    }

    #[test]
    fn test_keep_best_k() {
        let mut pop = Population::from_individuals(vec![
            scored(&[0], 0.1),
            scored(&[1], 0.9),
            Individual::new(mask(&[2])),
            scored(&[3], 0.5),
        ]);
        let mut rng = create_rng(0);
        KeepBest::new(2).apply(&mut pop, &mut rng);
        let kept: Vec<f64> = pop.individuals().iter().filter_map(|i| i.fitness_value()).collect();
        assert_eq!(kept, vec![0.9, 0.5]);
    }

    #[test]
    fn test_keep_best_noop_when_small() {
        let mut pop = Population::from_individuals(vec![scored(&[0], 0.1), scored(&[1], 0.2)]);
        let mut rng = create_rng(0);
        KeepBest::new(5).apply(&mut pop, &mut rng);
        assert_eq!(pop.len(), 2);
        assert_eq!(pop.individuals()[0].fitness_value(), Some(0.1));
    }

    #[test]
    fn test_remove_redundant_prefers_evaluated() {
        let mut pop = Population::from_individuals(vec![
            Individual::new(mask(&[0, 1])),
            Individual::new(mask(&[2])),
            scored(&[0, 1], 0.7),
            Individual::new(mask(&[2])),
        ]);
        let mut rng = create_rng(0);
        RemoveRedundant.apply(&mut pop, &mut rng);
        assert_eq!(pop.len(), 2);
        assert_eq!(pop.individuals()[0].fitness_value(), Some(0.7));
        assert_eq!(pop.individuals()[1].candidate(), &mask(&[2]));
    }
}
