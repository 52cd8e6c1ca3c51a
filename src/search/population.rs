//! Population of one generation plus cross-generation bookkeeping.

use super::types::{Candidate, Individual};

/// The individuals of the current generation.
///
/// Besides the current collection (replaced wholesale by operators each
/// generation) a population keeps:
///
/// - the best individual seen in any generation,
/// - the generation counter,
/// - the number of consecutive generations without a strict improvement of
///   the best-ever fitness.
#[derive(Debug, Clone)]
pub struct Population<C: Candidate> {
    individuals: Vec<Individual<C>>,
    best_ever: Option<Individual<C>>,
    generation: usize,
    without_improvement: usize,
}

impl<C: Candidate> Default for Population<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Candidate> Population<C> {
    /// An empty population in generation 0.
    pub fn new() -> Self {
        Self {
            individuals: Vec::new(),
            best_ever: None,
            generation: 0,
            without_improvement: 0,
        }
    }

    /// A generation-0 population holding `individuals`.
    pub fn from_individuals(individuals: Vec<Individual<C>>) -> Self {
        Self {
            individuals,
            ..Self::new()
        }
    }

    /// Appends an individual to the current generation.
    pub fn add(&mut self, individual: Individual<C>) {
        self.individuals.push(individual);
    }

    /// Appends several individuals to the current generation.
    pub fn extend(&mut self, individuals: impl IntoIterator<Item = Individual<C>>) {
        self.individuals.extend(individuals);
    }

    /// The current generation, in order.
    pub fn individuals(&self) -> &[Individual<C>] {
        &self.individuals
    }

    /// Removes and returns the current generation, leaving it empty.
    pub fn take(&mut self) -> Vec<Individual<C>> {
        std::mem::take(&mut self.individuals)
    }

    /// Replaces the current generation.
    pub fn replace(&mut self, individuals: Vec<Individual<C>>) {
        self.individuals = individuals;
    }

    /// Keeps only the individuals matching `keep`.
    pub fn retain(&mut self, keep: impl FnMut(&Individual<C>) -> bool) {
        self.individuals.retain(keep);
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Best individual observed across all generations so far.
    pub fn best_ever(&self) -> Option<&Individual<C>> {
        self.best_ever.as_ref()
    }

    /// Current generation number (0 = initial population).
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Consecutive generations in which the best-ever did not strictly improve.
    pub fn generations_without_improvement(&self) -> usize {
        self.without_improvement
    }

    /// Moves on to the next generation number.
    ///
    /// The collection is left as is; operators of the new generation
    /// replace it.
    pub fn advance_generation(&mut self) {
        self.generation += 1;
    }

    /// Best evaluated individual of the current generation.
    ///
    /// Ties go to fewer active features, then earlier generation, then the
    /// earlier position.
    pub fn best_current(&self) -> Option<&Individual<C>> {
        self.individuals
            .iter()
            .filter(|ind| ind.is_evaluated())
            .reduce(|best, ind| {
                if ind.rank_cmp(best).is_lt() {
                    ind
                } else {
                    best
                }
            })
    }

    /// Updates the best-ever from the current generation.
    ///
    /// Must be called once per generation, after evaluation. The best-ever is
    /// replaced only by a strictly fitter individual; ties keep the earlier
    /// one. Returns `true` on improvement, which also resets the
    /// without-improvement counter; otherwise the counter is incremented.
    pub fn record_best(&mut self) -> bool {
        let improved = match (self.best_current(), &self.best_ever) {
            (Some(current), Some(best)) => current.is_better_than(best),
            (Some(_), None) => true,
            (None, _) => false,
        };

        if improved {
            self.best_ever = self.best_current().cloned();
            self.without_improvement = 0;
        } else {
            self.without_improvement += 1;
        }
        improved
    }

    /// Mean fitness of the evaluated individuals of the current generation.
    pub fn mean_fitness(&self) -> Option<f64> {
        let (sum, count) = self
            .individuals
            .iter()
            .filter_map(Individual::fitness_value)
            .fold((0.0, 0usize), |(s, c), f| (s + f, c + 1));
        (count > 0).then(|| sum / count as f64)
    }
}
