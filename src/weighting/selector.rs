//! Weight-based feature selection.
//!
//! Turns a weight per feature into a usage mask, either by thresholding the
//! weights or by ranking them. Typical inputs are the best vector of an
//! evolutionary weighting run or externally computed relevance scores.

use super::relation::Relation;
use super::weights::FeatureWeights;
use crate::error::SelectorError;
use crate::search::FeatureMask;
use crate::space::FeatureSpace;
use log::debug;
use std::cmp::Ordering;

/// Treatment of features whose weight is unknown.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnknownWeights {
    /// Never select them.
    Deselect,
    /// Always select them.
    Retain,
    /// Treat them as if they had this weight.
    Default(f64),
}

/// Selects features by their weights.
///
/// Unknown weights are excluded from thresholds and rankings and then
/// deselected or retained, or replaced by a default before anything else
/// happens. Without a policy, any unknown weight is an error.
///
/// # Examples
///
/// ```
/// use u_featsel::search::UNKNOWN_WEIGHT;
/// use u_featsel::weighting::{FeatureWeights, Relation, UnknownWeights, WeightSelector};
///
/// let weights = FeatureWeights::new(
///     ["A", "B", "C", "D"],
///     vec![0.9, 0.1, UNKNOWN_WEIGHT, 0.4],
/// )
/// .unwrap();
/// let selector = WeightSelector::new(Relation::TopK(2))
///     .with_unknown_weights(UnknownWeights::Deselect);
/// assert_eq!(selector.select_names(&weights).unwrap(), vec!["A", "D"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightSelector {
    relation: Relation,
    unknown: Option<UnknownWeights>,
    use_absolute_weights: bool,
}

impl WeightSelector {
    /// A selector without an unknown-weight policy, on signed weights.
    pub fn new(relation: Relation) -> Self {
        Self {
            relation,
            unknown: None,
            use_absolute_weights: false,
        }
    }

    pub fn with_unknown_weights(mut self, policy: UnknownWeights) -> Self {
        self.unknown = Some(policy);
        self
    }

    /// Compare and rank `|weight|` instead of `weight`.
    pub fn with_absolute_weights(mut self, absolute: bool) -> Self {
        self.use_absolute_weights = absolute;
        self
    }

    pub fn relation(&self) -> &Relation {
        &self.relation
    }

    /// Validates the relation and the unknown-weight policy.
    pub fn validate(&self) -> Result<(), SelectorError> {
        self.relation.validate()?;
        if let Some(UnknownWeights::Default(v)) = self.unknown {
            if v.is_nan() {
                return Err(SelectorError::InvalidRelation(
                    "default for unknown weights must be a number".into(),
                ));
            }
        }
        Ok(())
    }

    /// The usage mask of the selected features, in feature order.
    pub fn select(&self, weights: &FeatureWeights) -> Result<FeatureMask, SelectorError> {
        self.validate()?;

        let raw = weights.weights();
        if self.unknown.is_none() {
            if let Some(i) = raw.iter().position(|w| w.is_nan()) {
                return Err(SelectorError::UnknownWeightWithoutDefault {
                    feature: weights.names()[i].clone(),
                });
            }
        }

        // Keys used for comparison; None = unknown after applying the policy.
        let keys: Vec<Option<f64>> = raw
            .iter()
            .map(|&w| {
                let w = match (w.is_nan(), self.unknown) {
                    (true, Some(UnknownWeights::Default(d))) => d,
                    (true, _) => return None,
                    (false, _) => w,
                };
                Some(if self.use_absolute_weights { w.abs() } else { w })
            })
            .collect();

        let mut mask = if self.relation.is_rank() {
            self.rank(&keys)
        } else {
            FeatureMask::from_bools(
                keys.iter()
                    .map(|k| k.is_some_and(|w| self.relation.accepts(w)))
                    .collect(),
            )
        };

        if self.unknown == Some(UnknownWeights::Retain) {
            for (i, k) in keys.iter().enumerate() {
                if k.is_none() {
                    mask.set(i, true);
                }
            }
        }

        debug!(
            "weight selection '{}': {} of {} features selected",
            self.relation,
            mask.active_indices().count(),
            keys.len()
        );
        Ok(mask)
    }

    /// Names of the selected features, in feature order.
    pub fn select_names<'a>(
        &self,
        weights: &'a FeatureWeights,
    ) -> Result<Vec<&'a str>, SelectorError> {
        let mask = self.select(weights)?;
        Ok(weights.selected_names(&mask))
    }

    fn rank(&self, keys: &[Option<f64>]) -> FeatureMask {
        let known: Vec<(usize, f64)> = keys
            .iter()
            .enumerate()
            .filter_map(|(i, k)| k.map(|w| (i, w)))
            .collect();
        let n = known.len();
        let fraction = |p: f64| ((n as f64) * p).round() as usize;

        let (top, k) = match self.relation {
            Relation::TopK(k) => (true, k),
            Relation::BottomK(k) => (false, k),
            Relation::AllButTopK(k) => (false, n - k.min(n)),
            Relation::AllButBottomK(k) => (true, n - k.min(n)),
            Relation::TopPercent(p) => (true, fraction(p)),
            Relation::BottomPercent(p) => (false, fraction(p)),
            _ => (true, 0),
        };

        // Keys are never NaN here; -0.0 and 0.0 compare equal and keep
        // feature order.
        let mut order = known;
        if top {
            order.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        } else {
            order.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        }

        let mut mask = FeatureMask::empty(keys.len());
        for &(i, _) in order.iter().take(k) {
            mask.set(i, true);
        }
        mask
    }
}
