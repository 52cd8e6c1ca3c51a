//! Gene-swapping crossover for masks and weight vectors.
//!
//! All three patterns reduce to "pick an index set, swap the genes at those
//! indices between the two parents". Because swapping is its own inverse,
//! applying the same index set twice restores both parents, and every
//! position where a child differs from its own parent lies in the index set.
//!
//! # Patterns
//!
//! - [`CrossoverPattern::OnePoint`]: swap every index at or past a random
//!   split `n ∈ [1, len-1]`
//! - [`CrossoverPattern::Uniform`]: swap each index on a fair coin
//! - [`CrossoverPattern::Shuffle`]: swap `k ∈ [1, len]` distinct random
//!   indices

use super::{CardinalityBounds, PopulationOperator};
use crate::search::{Candidate, Individual, Population};
use rand::seq::index;
use rand::{Rng, RngCore};
use std::any::Any;

/// How crossover picks the indices to swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CrossoverPattern {
    /// Swap everything from a random split point on.
    OnePoint,
    /// Swap each feature independently with probability 1/2.
    #[default]
    Uniform,
    /// Swap a random non-empty subset of features.
    Shuffle,
}

impl CrossoverPattern {
    /// Draws the indices to swap for candidates of length `len`, ascending.
    ///
    /// Returns an empty set for `len < 2` under `OnePoint` (no split exists)
    /// and for `len == 0` otherwise.
    pub fn swap_indices<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> Vec<usize> {
        match self {
            CrossoverPattern::OnePoint => {
                if len < 2 {
                    return Vec::new();
                }
                one_point_indices(len, rng.random_range(1..len))
            }
            CrossoverPattern::Uniform => (0..len).filter(|_| rng.random_bool(0.5)).collect(),
            CrossoverPattern::Shuffle => {
                if len == 0 {
                    return Vec::new();
                }
                let k = rng.random_range(1..=len);
                let mut picked = index::sample(rng, len, k).into_vec();
                picked.sort_unstable();
                picked
            }
        }
    }
}

/// Indices swapped by a one-point crossover splitting at `split`.
pub fn one_point_indices(len: usize, split: usize) -> Vec<usize> {
    (split.min(len)..len).collect()
}

/// Swaps the genes at `indices` between copies of `a` and `b`.
///
/// # Panics
/// Panics if an index is out of range for either candidate.
pub fn swap_genes<C: Candidate>(a: &C, b: &C, indices: &[usize]) -> (C, C) {
    let mut first = a.clone();
    let mut second = b.clone();
    for &i in indices {
        first.swap_gene(&mut second, i);
    }
    (first, second)
}

/// Pairwise crossover over a mating pool.
///
/// The pool holds one unevaluated copy of every current individual and is
/// consumed without replacement: two members are drawn at random, and with
/// probability `probability` they are recombined. Each child is appended to
/// the population if it satisfies `bounds`; parents stay in place, so the
/// generation grows and a later selection step restores its size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossover {
    probability: f64,
    pattern: CrossoverPattern,
    bounds: CardinalityBounds,
}

impl Crossover {
    /// `probability` is clamped to `[0, 1]`.
    pub fn new(probability: f64, pattern: CrossoverPattern, bounds: CardinalityBounds) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
            pattern,
            bounds,
        }
    }
}

impl<C: Candidate> PopulationOperator<C> for Crossover {
    fn name(&self) -> &str {
        "crossover"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn apply(&mut self, population: &mut Population<C>, rng: &mut dyn RngCore) {
        let mut pool: Vec<Individual<C>> = population
            .individuals()
            .iter()
            .map(Individual::clone_unevaluated)
            .collect();

        while pool.len() > 1 {
            let a = pool.swap_remove(rng.random_range(0..pool.len()));
            let b = pool.swap_remove(rng.random_range(0..pool.len()));
            if !rng.random_bool(self.probability) {
                continue;
            }

            let len = a.candidate().len().min(b.candidate().len());
            let indices = self.pattern.swap_indices(len, rng);
            if indices.is_empty() {
                continue;
            }
            let (c1, c2) = swap_genes(a.candidate(), b.candidate(), &indices);
            for child in [c1, c2] {
                if self.bounds.admits(&child) {
                    population.add(Individual::new(child));
                }
            }
        }
    }
}
