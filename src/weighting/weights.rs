//! Named feature weights.

use crate::error::SelectorError;
use crate::search::{Candidate, WeightVector, UNKNOWN_WEIGHT};
use crate::space::FeatureSpace;
use std::cmp::Ordering;
use std::collections::HashSet;

/// One weight per named feature, in feature order.
///
/// Weights may be [`UNKNOWN_WEIGHT`] (NaN) for features whose weight was
/// never computed; that is different from a computed weight of `0.0`.
///
/// # Examples
///
/// ```
/// use u_featsel::weighting::FeatureWeights;
///
/// let mut weights = FeatureWeights::unknown(["a", "b", "c"]).unwrap();
/// weights.set("a", 0.7).unwrap();
/// weights.set("c", -0.2).unwrap();
/// assert_eq!(weights.get("a"), Some(0.7));
/// assert_eq!(weights.known_count(), 2);
/// assert_eq!(weights.ranking(), vec![("a", 0.7), ("c", -0.2)]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureWeights {
    names: Vec<String>,
    weights: Vec<f64>,
}

impl FeatureWeights {
    /// Pairs `names` with `weights`.
    pub fn new<I, S>(names: I, weights: Vec<f64>) -> Result<Self, SelectorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.len() != weights.len() {
            return Err(SelectorError::LengthMismatch {
                expected: names.len(),
                actual: weights.len(),
            });
        }
        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(SelectorError::DuplicateFeature(name.clone()));
            }
        }
        Ok(Self { names, weights })
    }

    /// Every feature of `names` with an unknown weight.
    pub fn unknown<I, S>(names: I) -> Result<Self, SelectorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let weights = vec![UNKNOWN_WEIGHT; names.len()];
        Self::new(names, weights)
    }

    /// Names the entries of `vector` after the features of `space`.
    pub fn from_vector<S>(space: &S, vector: &WeightVector) -> Result<Self, SelectorError>
    where
        S: FeatureSpace + ?Sized,
    {
        let n = space.feature_count();
        if vector.len() != n {
            return Err(SelectorError::LengthMismatch {
                expected: n,
                actual: vector.len(),
            });
        }
        let names = (0..n)
            .map(|i| {
                space
                    .feature_name(i)
                    .map(str::to_string)
                    .ok_or_else(|| SelectorError::UnknownFeature(format!("#{i}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(names, vector.as_slice().to_vec())
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Weights in feature order.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Weight of the feature called `name`.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.position(name).map(|i| self.weights[i])
    }

    /// Sets the weight of the feature called `name`.
    pub fn set(&mut self, name: &str, weight: f64) -> Result<(), SelectorError> {
        let i = self
            .position(name)
            .ok_or_else(|| SelectorError::UnknownFeature(name.to_string()))?;
        self.weights[i] = weight;
        Ok(())
    }

    /// Whether the weight at `index` is unknown.
    pub fn is_unknown(&self, index: usize) -> bool {
        self.weights.get(index).is_some_and(|w| w.is_nan())
    }

    /// Number of features with a known weight.
    pub fn known_count(&self) -> usize {
        self.weights.iter().filter(|w| !w.is_nan()).count()
    }

    /// Known weights, highest first; equal weights keep feature order.
    pub fn ranking(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .names
            .iter()
            .zip(&self.weights)
            .filter(|(_, w)| !w.is_nan())
            .map(|(n, &w)| (n.as_str(), w))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked
    }

    /// Scales known weights so the largest absolute value is 1.
    ///
    /// Leaves the weights unchanged if every known weight is zero.
    pub fn normalize(&mut self) {
        let max = self
            .weights
            .iter()
            .filter(|w| !w.is_nan())
            .fold(0.0f64, |m, w| m.max(w.abs()));
        if max > 0.0 {
            for w in self.weights.iter_mut().filter(|w| !w.is_nan()) {
                *w /= max;
            }
        }
    }

    /// The weights as a candidate vector.
    pub fn to_vector(&self) -> WeightVector {
        WeightVector::new(self.weights.clone())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

impl FeatureSpace for FeatureWeights {
    fn feature_count(&self) -> usize {
        self.names.len()
    }

    fn feature_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.position(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::FeatureSet;

    #[test]
    fn test_new_rejects_mismatch_and_duplicates() {
        assert_eq!(
            FeatureWeights::new(["a", "b"], vec![1.0]),
            Err(SelectorError::LengthMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            FeatureWeights::new(["a", "a"], vec![1.0, 2.0]),
            Err(SelectorError::DuplicateFeature("a".into()))
        );
    }

    #[test]
    fn test_set_unknown_feature() {
        let mut w = FeatureWeights::unknown(["a"]).unwrap();
        assert_eq!(w.set("z", 1.0), Err(SelectorError::UnknownFeature("z".into())));
        assert!(w.is_unknown(0));
        assert_eq!(w.known_count(), 0);
    }

    #[test]
    fn test_from_vector() {
        let space = FeatureSet::new(["x", "y"]).unwrap();
        let w = FeatureWeights::from_vector(&space, &WeightVector::new(vec![0.2, 0.8])).unwrap();
        assert_eq!(w.get("y"), Some(0.8));
        assert_eq!(w.to_vector(), WeightVector::new(vec![0.2, 0.8]));
        assert!(FeatureWeights::from_vector(&space, &WeightVector::new(vec![0.2])).is_err());
    }

    #[test]
    fn test_ranking_is_stable() {
        let w = FeatureWeights::new(["a", "b", "c", "d"], vec![0.5, 0.9, 0.5, UNKNOWN_WEIGHT])
            .unwrap();
        assert_eq!(w.ranking(), vec![("b", 0.9), ("a", 0.5), ("c", 0.5)]);
    }

    #[test]
    fn test_ranking_ties_signed_zeros() {
        let w = FeatureWeights::new(["a", "b", "c"], vec![-0.0, 0.0, 0.5]).unwrap();
        assert_eq!(w.ranking(), vec![("c", 0.5), ("a", -0.0), ("b", 0.0)]);
    }

    #[test]
    fn test_normalize() {
        let mut w = FeatureWeights::new(["a", "b", "c"], vec![2.0, -4.0, UNKNOWN_WEIGHT]).unwrap();
        w.normalize();
        assert_eq!(&w.weights()[..2], &[0.5, -1.0]);
        assert!(w.is_unknown(2));

        let mut zeros = FeatureWeights::new(["a"], vec![0.0]).unwrap();
        zeros.normalize();
        assert_eq!(zeros.weights(), &[0.0]);
    }
}
