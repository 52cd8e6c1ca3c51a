//! Post-hoc feature selection from weights.
//!
//! - [`FeatureWeights`]: named weights, possibly unknown
//! - [`Relation`]: threshold or rank criterion
//! - [`WeightSelector`]: applies a relation and an unknown-weight policy

mod relation;
mod selector;
mod weights;

pub use relation::Relation;
pub use selector::{UnknownWeights, WeightSelector};
pub use weights::FeatureWeights;
