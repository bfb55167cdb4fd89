//! Deterministic LOD subset sampling
//!
//! During active interaction only a fixed-size representative subset of the
//! dataset is drawn. The subset is generated once at startup from a seed and
//! reused across every interacting frame, so redraw cost during gestures is
//! bounded by the subset size rather than the population.

use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Draw a uniform sample of point indices without replacement
///
/// Deterministic for a given `(population_size, subset_size, seed)` triple,
/// so draw sets are reproducible in tests. `subset_size` is clamped to the
/// population; the result always has `min(subset_size, population_size)`
/// distinct indices, each `< population_size`.
pub fn sample_indices(population_size: usize, subset_size: usize, seed: u64) -> Vec<usize> {
    // Profile sampling; it runs once per dataset, not per frame
    #[cfg(feature = "profiling")]
    profiling::scope!("sampler::sample_indices");

    let amount = subset_size.min(population_size);
    let mut rng = SmallRng::seed_from_u64(seed);
    rand::seq::index::sample(&mut rng, population_size, amount).into_vec()
}
