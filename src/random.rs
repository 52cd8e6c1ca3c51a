//! Seeded random number generation.
//!
//! All stochastic operators draw from a `&mut dyn RngCore` handed down by the
//! runner, so a run is reproducible for a fixed seed.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// The generator used when the runner owns the random source.
pub type SearchRng = ChaCha8Rng;

/// Creates a deterministic generator from `seed`.
pub fn create_rng(seed: u64) -> SearchRng {
    ChaCha8Rng::seed_from_u64(seed)
}
