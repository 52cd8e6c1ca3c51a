//! Usage-mask operators for genetic feature selection.

use super::{CardinalityBounds, IndividualOperator};
use crate::search::strategy::InitialPopulation;
use crate::search::{Candidate, FeatureMask, Individual};
use rand::{Rng, RngCore};

/// Bit-flip mutation.
///
/// Every feature is flipped independently with probability `probability`.
/// The original individual is always kept; the mutated copy is added next to
/// it when it differs from the original and satisfies `bounds`. Mutating
/// never touches the original, so its cached fitness stays valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskMutation {
    probability: Option<f64>,
    bounds: CardinalityBounds,
}

impl MaskMutation {
    /// A negative `probability` selects `1 / feature_count` per candidate.
    /// Values above 1 are clamped.
    pub fn new(probability: f64, bounds: CardinalityBounds) -> Self {
        Self {
            probability: (probability >= 0.0).then(|| probability.min(1.0)),
            bounds,
        }
    }

    /// Flip probability for a candidate of `len` features.
    pub fn flip_probability(&self, len: usize) -> f64 {
        match self.probability {
            Some(p) => p,
            None if len == 0 => 0.0,
            None => 1.0 / len as f64,
        }
    }

    /// Flips each bit of a copy of `mask`.
    pub fn mutate<R: Rng + ?Sized>(&self, mask: &FeatureMask, rng: &mut R) -> FeatureMask {
        let p = self.flip_probability(mask.len());
        let mut child = mask.clone();
        for i in 0..child.len() {
            if rng.random_bool(p) {
                child.flip(i);
            }
        }
        child
    }
}

impl IndividualOperator<FeatureMask> for MaskMutation {
    fn name(&self) -> &str {
        "mask-mutation"
    }

    fn operate(
        &mut self,
        individual: &Individual<FeatureMask>,
        rng: &mut dyn RngCore,
    ) -> Vec<Individual<FeatureMask>> {
        let child = self.mutate(individual.candidate(), rng);
        let mut out = vec![individual.clone()];
        if &child != individual.candidate() && self.bounds.admits(&child) {
            out.push(individual.derive(child));
        }
        out
    }
}

/// Random initial masks.
///
/// Each feature is switched on with probability `p_initialize`. A mask that
/// ends up below the minimum cardinality gets random inactive features
/// switched on until it is admissible; one above the maximum loses random
/// active ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomMasks {
    size: usize,
    p_initialize: f64,
    bounds: CardinalityBounds,
}

impl RandomMasks {
    /// `p_initialize` is clamped to `[0, 1]`.
    pub fn new(size: usize, p_initialize: f64, bounds: CardinalityBounds) -> Self {
        Self {
            size,
            p_initialize: p_initialize.clamp(0.0, 1.0),
            bounds,
        }
    }

    fn build_one<R: Rng + ?Sized>(&self, feature_count: usize, rng: &mut R) -> FeatureMask {
        let mut mask = FeatureMask::from_bools(
            (0..feature_count)
                .map(|_| rng.random_bool(self.p_initialize))
                .collect(),
        );

        let min = self.bounds.min.min(feature_count);
        while mask.active_count() < min {
            let off: Vec<usize> = mask.inactive_indices().collect();
            mask.set(off[rng.random_range(0..off.len())], true);
        }
        if let Some(max) = self.bounds.max {
            while mask.active_count() > max.max(min) {
                let on: Vec<usize> = mask.active_indices().collect();
                mask.set(on[rng.random_range(0..on.len())], false);
            }
        }
        mask
    }
}

impl InitialPopulation<FeatureMask> for RandomMasks {
    fn build(&self, feature_count: usize, rng: &mut dyn RngCore) -> Vec<FeatureMask> {
        if feature_count == 0 {
            return Vec::new();
        }
        (0..self.size)
            .map(|_| self.build_one(feature_count, rng))
            .collect()
    }
}
