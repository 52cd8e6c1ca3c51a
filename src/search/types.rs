//! Core type definitions for the search engine.
//!
//! A run searches over one kind of [`Candidate`]: either a [`FeatureMask`]
//! ("which features are used") or a [`WeightVector`] ("how much each feature
//! counts"). The type parameter makes it impossible to mix both in one run.
//!
//! [`Individual`] wraps a candidate with its cached fitness. Evaluated
//! individuals are never modified; operators derive new ones instead, so a
//! cached fitness always belongs to the candidate it was computed for.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};

/// Sentinel for a weight that was never computed.
///
/// Distinct from a computed weight of `0.0`. Test with `f64::is_nan`.
pub const UNKNOWN_WEIGHT: f64 = f64::NAN;

/// A point in the search space, indexed by feature.
///
/// Implemented by [`FeatureMask`] and [`WeightVector`]. Candidates are value
/// types: cloning one and mutating the clone never affects the original.
pub trait Candidate: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// Number of features the candidate spans.
    fn len(&self) -> usize;

    /// Returns `true` if the candidate spans no features.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of features the candidate actually uses.
    fn active_count(&self) -> usize;

    /// Exchanges the gene at `index` with the one in `other`.
    ///
    /// Crossover is built on this primitive, which makes every swap pattern
    /// an involution: swapping the same index set twice restores both parents.
    fn swap_gene(&mut self, other: &mut Self, index: usize);
}

// ============================================================================
// Usage mask
// ============================================================================

/// Boolean usage mask: one entry per feature, `true` = feature is active.
///
/// # Examples
///
/// ```
/// use u_featsel::search::{Candidate, FeatureMask};
///
/// let mut mask = FeatureMask::empty(4);
/// mask.set(1, true);
/// mask.set(3, true);
/// assert_eq!(mask.active_count(), 2);
/// assert_eq!(mask.active_indices().collect::<Vec<_>>(), vec![1, 3]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureMask {
    bits: Vec<bool>,
}

impl FeatureMask {
    /// A mask of `len` features with none active.
    pub fn empty(len: usize) -> Self {
        Self {
            bits: vec![false; len],
        }
    }

    /// A mask of `len` features with all active.
    pub fn full(len: usize) -> Self {
        Self {
            bits: vec![true; len],
        }
    }

    /// Wraps an existing boolean vector.
    pub fn from_bools(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// A mask of `len` features with exactly `indices` active.
    ///
    /// Indices `>= len` are ignored.
    pub fn from_indices(len: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut mask = Self::empty(len);
        for i in indices {
            if i < len {
                mask.bits[i] = true;
            }
        }
        mask
    }

    /// Whether feature `index` is active. Out-of-range indices are inactive.
    pub fn is_active(&self, index: usize) -> bool {
        self.bits.get(index).copied().unwrap_or(false)
    }

    /// Sets feature `index` on or off.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn set(&mut self, index: usize, active: bool) {
        self.bits[index] = active;
    }

    /// Toggles feature `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn flip(&mut self, index: usize) {
        self.bits[index] = !self.bits[index];
    }

    /// Indices of active features, ascending.
    pub fn active_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, &b)| b)
            .map(|(i, _)| i)
    }

    /// Indices of inactive features, ascending.
    pub fn inactive_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, &b)| !b)
            .map(|(i, _)| i)
    }

    /// The mask as a slice.
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// Consumes the mask and returns the boolean vector.
    pub fn into_vec(self) -> Vec<bool> {
        self.bits
    }
}

impl Candidate for FeatureMask {
    fn len(&self) -> usize {
        self.bits.len()
    }

    fn active_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    fn swap_gene(&mut self, other: &mut Self, index: usize) {
        std::mem::swap(&mut self.bits[index], &mut other.bits[index]);
    }
}

impl From<Vec<bool>> for FeatureMask {
    fn from(bits: Vec<bool>) -> Self {
        Self::from_bools(bits)
    }
}

// ============================================================================
// Weight vector
// ============================================================================

/// Per-feature weights.
///
/// A weight is *used* when it is non-zero and not [`UNKNOWN_WEIGHT`].
/// Equality and hashing compare the exact bit patterns, so two vectors are
/// redundant only if they are bitwise identical (NaN equals NaN here).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightVector {
    weights: Vec<f64>,
}

impl WeightVector {
    /// Wraps an existing weight vector.
    pub fn new(weights: Vec<f64>) -> Self {
        Self { weights }
    }

    /// `len` weights all equal to `value`.
    pub fn uniform(len: usize, value: f64) -> Self {
        Self {
            weights: vec![value; len],
        }
    }

    /// `len` weights all unknown.
    pub fn unknown(len: usize) -> Self {
        Self::uniform(len, UNKNOWN_WEIGHT)
    }

    /// Weight of feature `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn get(&self, index: usize) -> f64 {
        self.weights[index]
    }

    /// Sets the weight of feature `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn set(&mut self, index: usize, weight: f64) {
        self.weights[index] = weight;
    }

    /// Whether feature `index` contributes (non-zero, known weight).
    pub fn is_used(&self, index: usize) -> bool {
        self.weights
            .get(index)
            .is_some_and(|&w| w != 0.0 && !w.is_nan())
    }

    /// Indices of used features, ascending.
    pub fn used_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.weights.len()).filter(|&i| self.is_used(i))
    }

    /// The usage mask implied by the weights.
    pub fn usage_mask(&self) -> FeatureMask {
        FeatureMask::from_bools((0..self.weights.len()).map(|i| self.is_used(i)).collect())
    }

    /// The weights as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }

    /// Consumes the vector and returns the weights.
    pub fn into_vec(self) -> Vec<f64> {
        self.weights
    }
}

impl PartialEq for WeightVector {
    fn eq(&self, other: &Self) -> bool {
        self.weights.len() == other.weights.len()
            && self
                .weights
                .iter()
                .zip(&other.weights)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl Eq for WeightVector {}

impl Hash for WeightVector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.weights.len().hash(state);
        for w in &self.weights {
            w.to_bits().hash(state);
        }
    }
}

impl Candidate for WeightVector {
    fn len(&self) -> usize {
        self.weights.len()
    }

    fn active_count(&self) -> usize {
        self.used_indices().count()
    }

    fn swap_gene(&mut self, other: &mut Self, index: usize) {
        std::mem::swap(&mut self.weights[index], &mut other.weights[index]);
    }
}

impl From<Vec<f64>> for WeightVector {
    fn from(weights: Vec<f64>) -> Self {
        Self::new(weights)
    }
}

// ============================================================================
// Fitness
// ============================================================================

/// Scalar quality of a candidate, higher is better.
///
/// Each score names the criterion it measures. Within one run every score
/// must name the same criterion; the runner rejects scores of any other
/// criterion instead of comparing them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitnessScore {
    criterion: Cow<'static, str>,
    value: f64,
}

impl FitnessScore {
    /// Criterion name used by [`FitnessScore::new`].
    pub const DEFAULT_CRITERION: &'static str = "fitness";

    /// A score of the default criterion.
    pub fn new(value: f64) -> Self {
        Self {
            criterion: Cow::Borrowed(Self::DEFAULT_CRITERION),
            value,
        }
    }

    /// A score of a named criterion, e.g. `"accuracy"`.
    pub fn named(criterion: impl Into<Cow<'static, str>>, value: f64) -> Self {
        Self {
            criterion: criterion.into(),
            value,
        }
    }

    /// The numeric value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The criterion name.
    pub fn criterion(&self) -> &str {
        &self.criterion
    }

    /// Strict comparison: `true` only if `self` is higher than `other`.
    pub fn is_better_than(&self, other: &FitnessScore) -> bool {
        self.value > other.value
    }
}

impl From<f64> for FitnessScore {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// Individual
// ============================================================================

/// One candidate solution plus its cached fitness.
///
/// Fields are private: an evaluated individual cannot be changed, only
/// replaced. [`derive`](Individual::derive) and
/// [`clone_unevaluated`](Individual::clone_unevaluated) produce copies that
/// carry no fitness, so they are evaluated again before being compared.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual<C> {
    candidate: C,
    fitness: Option<FitnessScore>,
    generation: usize,
    parent_fitness: Option<f64>,
}

impl<C: Candidate> Individual<C> {
    /// Creates an unevaluated individual in generation 0.
    pub fn new(candidate: C) -> Self {
        Self {
            candidate,
            fitness: None,
            generation: 0,
            parent_fitness: None,
        }
    }

    /// The candidate.
    pub fn candidate(&self) -> &C {
        &self.candidate
    }

    /// Consumes the individual and returns its candidate.
    pub fn into_candidate(self) -> C {
        self.candidate
    }

    /// The cached fitness, if evaluated.
    pub fn fitness(&self) -> Option<&FitnessScore> {
        self.fitness.as_ref()
    }

    /// The cached fitness value, if evaluated.
    pub fn fitness_value(&self) -> Option<f64> {
        self.fitness.as_ref().map(FitnessScore::value)
    }

    /// Whether a fitness is cached.
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Generation in which the individual was created.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Fitness of the evaluated parent this individual was derived from.
    pub fn parent_fitness(&self) -> Option<f64> {
        self.parent_fitness
    }

    /// Number of features the candidate uses.
    pub fn active_count(&self) -> usize {
        self.candidate.active_count()
    }

    /// Returns this individual with `score` attached.
    pub fn with_fitness(self, score: FitnessScore) -> Self {
        Self {
            fitness: Some(score),
            ..self
        }
    }

    /// Deep copy of the candidate without fitness or lineage.
    pub fn clone_unevaluated(&self) -> Self {
        Self {
            candidate: self.candidate.clone(),
            fitness: None,
            generation: self.generation,
            parent_fitness: None,
        }
    }

    /// A child holding `candidate` that remembers this individual's fitness.
    pub fn derive(&self, candidate: C) -> Self {
        Self {
            candidate,
            fitness: None,
            generation: self.generation,
            parent_fitness: self.fitness_value().or(self.parent_fitness),
        }
    }

    /// Records the generation of an unevaluated individual.
    pub(crate) fn stamp_generation(&mut self, generation: usize) {
        if self.fitness.is_none() {
            self.generation = generation;
        }
    }

    /// Strictly better fitness. Unevaluated individuals are never better.
    pub fn is_better_than(&self, other: &Self) -> bool {
        match (&self.fitness, &other.fitness) {
            (Some(a), Some(b)) => a.is_better_than(b),
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// Ranking order, best first.
    ///
    /// Higher fitness first; ties go to fewer active features, then to the
    /// earlier generation. Unevaluated individuals rank last.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        match (self.fitness_value(), other.fitness_value()) {
            (Some(a), Some(b)) => b
                .partial_cmp(&a)
                .unwrap_or(Ordering::Equal)
                .then_with(|| self.active_count().cmp(&other.active_count()))
                .then_with(|| self.generation.cmp(&other.generation)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

// ============================================================================
// Evaluator
// ============================================================================

/// Failure of the external evaluator for one candidate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct EvaluationError {
    message: String,
}

impl EvaluationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Computes the fitness of a candidate.
///
/// This is the single extension point through which model training and
/// performance estimation plug into the search. Implementations read only
/// the features the candidate uses (see [`FeatureMask::active_indices`] or
/// [`WeightVector::used_indices`]).
///
/// `Sync` is required because the runner may evaluate one generation in
/// parallel. Closures of the right shape implement the trait directly:
///
/// ```
/// use u_featsel::search::{EvaluationError, FeatureMask, FitnessEvaluator, FitnessScore};
///
/// let eval = |mask: &FeatureMask| -> Result<FitnessScore, EvaluationError> {
///     Ok(FitnessScore::new(mask.active_indices().count() as f64))
/// };
/// let score = eval.evaluate(&FeatureMask::full(3)).unwrap();
/// assert_eq!(score.value(), 3.0);
/// ```
pub trait FitnessEvaluator<C>: Sync {
    fn evaluate(&self, candidate: &C) -> Result<FitnessScore, EvaluationError>;
}

impl<C, F> FitnessEvaluator<C> for F
where
    F: Fn(&C) -> Result<FitnessScore, EvaluationError> + Sync,
{
    fn evaluate(&self, candidate: &C) -> Result<FitnessScore, EvaluationError> {
        self(candidate)
    }
}
