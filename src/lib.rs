//! Population-based feature selection and feature weighting.
//!
//! Searches the space of "which features to use" (usage masks) or "how much
//! each feature counts" (weight vectors) to maximize a fitness computed by an
//! external evaluator, typically a cross-validated model score.
//!
//! - **Genetic selection**: bit-flip mutation, one-point / uniform / shuffle
//!   crossover and fitness-based re-sampling over usage masks.
//! - **Evolutionary weighting**: Gaussian weight mutation with a variance
//!   adapted by the 1/5 success rule.
//! - **Forward selection / backward elimination**: greedy walks through the
//!   inclusion lattice with keep-best-k pruning.
//! - **Brute force**: exhaustive enumeration under cardinality constraints.
//! - **Weight-based selection**: threshold and rank filters over a weight
//!   per feature.
//!
//! # Architecture
//!
//! Every method is a [`search::Strategy`]: an initial-population builder, two
//! ordered lists of [`operators`] and a termination rule. One generic
//! [`search::SearchRunner`] executes them all. The crate knows nothing about
//! models or data; the feature space is seen through [`space::FeatureSpace`]
//! and fitness comes from a [`search::FitnessEvaluator`].
//!
//! # Example
//!
//! ```
//! use u_featsel::search::{EvaluationError, FeatureMask, FitnessScore, SearchConfig, SearchRunner};
//! use u_featsel::space::FeatureSet;
//! use u_featsel::strategies::GeneticSelectionConfig;
//!
//! let space = FeatureSet::new(["age", "income", "noise_a", "noise_b"]).unwrap();
//! let eval = |m: &FeatureMask| -> Result<FitnessScore, EvaluationError> {
//!     let useful = [0, 1].iter().filter(|&&i| m.is_active(i)).count() as f64;
//!     let noise = [2, 3].iter().filter(|&&i| m.is_active(i)).count() as f64;
//!     Ok(FitnessScore::named("accuracy", 0.5 + 0.2 * useful - 0.05 * noise))
//! };
//!
//! let mut strategy = GeneticSelectionConfig::default().build(4).unwrap();
//! let config = SearchConfig::default().with_seed(42);
//! let result = SearchRunner::run(&space, &mut strategy, &eval, &config).unwrap();
//! assert_eq!(result.selected_names(&space), vec!["age", "income"]);
//! ```

pub mod error;
pub mod operators;
pub mod random;
pub mod search;
pub mod space;
pub mod strategies;
pub mod weighting;

pub use error::{SearchError, SelectorError};
