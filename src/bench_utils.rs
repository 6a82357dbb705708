//! Benchmark utilities shared between Criterion benchmarks and integration tests.
//!
//! Deterministic synthetic predictions: hypothesis batches, labels and
//! mixture parameters drawn from seeded normal distributions, so benchmark
//! runs and cross-checks see identical inputs.

use ndarray::{Array2, Array3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::mixture::MixtureParameters;

// =============================================================================
// Generator Defaults
// =============================================================================

/// Base seed for reproducible benchmark inputs
pub const BENCH_SEED: u64 = 42;

/// Standard deviation of synthetic label positions
pub const LABEL_SCATTER: f64 = 10.0;

/// Standard deviation of hypothesis positions around their label
pub const HYPOTHESIS_SCATTER: f64 = 3.0;

// =============================================================================
// Generators
// =============================================================================

/// Generate a batch of labels, shape (B, C)
pub fn generate_labels(batch: usize, channels: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, LABEL_SCATTER).unwrap();
    Array2::from_shape_fn((batch, channels), |_| normal.sample(&mut rng))
}

/// Generate M hypothesis matrices scattered around the labels
///
/// Each hypothesis shares the label shape (B, C); positions are the label
/// plus normal noise, so winner-takes-all policies see realistic competition.
pub fn generate_hypotheses(
    labels: &Array2<f64>,
    num_hypotheses: usize,
    seed: u64,
) -> Vec<Array2<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, HYPOTHESIS_SCATTER).unwrap();
    (0..num_hypotheses)
        .map(|_| labels.mapv(|value| value + normal.sample(&mut rng)))
        .collect()
}

/// Generate M density hypotheses for planar labels, shape (B, 4) each
///
/// Channels 0..2 are predicted means scattered around the label, channels
/// 2..4 are strictly positive spreads.
pub fn generate_density_hypotheses(
    labels: &Array2<f64>,
    num_hypotheses: usize,
    seed: u64,
) -> Vec<Array2<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, HYPOTHESIS_SCATTER).unwrap();
    let batch = labels.nrows();
    (0..num_hypotheses)
        .map(|_| {
            Array2::from_shape_fn((batch, 4), |(b, c)| {
                if c < 2 {
                    labels[[b, c]] + normal.sample(&mut rng)
                } else {
                    0.5 + rng.gen_range(0.0..2.0)
                }
            })
        })
        .collect()
}

/// Generate batched mixture parameters around planar labels
///
/// Weights are positive and normalized per sample; spreads are strictly
/// positive so every density is finite.
pub fn generate_mixture(
    labels: &Array2<f64>,
    num_components: usize,
    seed: u64,
) -> MixtureParameters {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, HYPOTHESIS_SCATTER).unwrap();
    let batch = labels.nrows();

    let mut weights = Array2::from_shape_fn((batch, num_components), |_| rng.gen_range(0.5..1.5));
    for mut row in weights.rows_mut() {
        let total = row.sum();
        row.mapv_inplace(|w| w / total);
    }

    let means = Array3::from_shape_fn((batch, num_components, 2), |(b, _, c)| {
        labels[[b, c]] + normal.sample(&mut rng)
    });
    let spreads =
        Array3::from_shape_fn((batch, num_components, 2), |_| 0.5 + rng.gen_range(0.0..2.0));

    MixtureParameters::new(weights, means, spreads).expect("Failed to assemble mixture parameters")
}
