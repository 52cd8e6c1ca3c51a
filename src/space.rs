//! Feature space.
//!
//! The search core never owns or mutates the data set; it only needs the
//! number of features, their names and a stable index for each name. Any
//! table type can expose that by implementing [`FeatureSpace`].

use crate::error::SearchError;
use crate::search::FeatureMask;
use std::collections::HashMap;

/// Read-only view of an ordered set of uniquely named features.
///
/// Indices must stay stable for the duration of one search run.
pub trait FeatureSpace {
    /// Number of features.
    fn feature_count(&self) -> usize;

    /// Name of the feature at `index`, or `None` if out of range.
    fn feature_name(&self, index: usize) -> Option<&str>;

    /// Index of the feature called `name`.
    fn index_of(&self, name: &str) -> Option<usize>;

    /// Names of the features active in `mask`, in feature order.
    fn selected_names(&self, mask: &FeatureMask) -> Vec<&str> {
        mask.active_indices()
            .filter_map(|i| self.feature_name(i))
            .collect()
    }
}

/// Owned feature space backed by a name list and a name → index map.
///
/// # Examples
///
/// ```
/// use u_featsel::space::{FeatureSet, FeatureSpace};
///
/// let space = FeatureSet::new(["age", "income", "height"]).unwrap();
/// assert_eq!(space.feature_count(), 3);
/// assert_eq!(space.index_of("income"), Some(1));
/// assert_eq!(space.feature_name(2), Some("height"));
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureSet {
    names: Vec<String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    index: HashMap<String, usize>,
}

impl FeatureSet {
    /// Builds a feature space from names in order.
    ///
    /// Fails if a name occurs twice.
    pub fn new<I, S>(names: I) -> Result<Self, SearchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(SearchError::invalid(format!(
                    "duplicate feature name '{name}'"
                )));
            }
        }
        Ok(Self { names, index })
    }

    /// Builds `count` anonymous features named `f0`, `f1`, ...
    pub fn anonymous(count: usize) -> Self {
        let names: Vec<String> = (0..count).map(|i| format!("f{i}")).collect();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        Self { names, index }
    }

    /// All names in feature order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns `true` if the space has no features.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// Equality is by names only; the lookup map is derived state.
impl PartialEq for FeatureSet {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

impl Eq for FeatureSet {}

impl FeatureSpace for FeatureSet {
    fn feature_count(&self) -> usize {
        self.names.len()
    }

    fn feature_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        // The map is skipped by serde; fall back to a scan after deserializing.
        if self.index.len() == self.names.len() {
            self.index.get(name).copied()
        } else {
            self.names.iter().position(|n| n == name)
        }
    }
}
