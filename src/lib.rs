/*!
# Multi-hypothesis loss engine

Training and evaluation losses for models that predict several plausible
future positions of a moving target at once, including winner-takes-all
aggregation policies and Gaussian mixture statistics.

## Features

- Elementwise loss primitives: squared, log-squared, absolute, Gaussian NLL
- Winner-takes-all policies: pure, relaxed, evolving top-k, adaptive
- Mixture-density statistics: component densities, mixture probability, NLL
- Evaluation metrics: weighted Mahalanobis distance, central-oracle loss

## Modules

- [`loss`] - Elementwise primitives and aggregation policies
- [`mixture`] - Gaussian mixture statistics and distance metrics
- [`stack`] - Hypothesis stacking and label replication
- [`errors`] - Error types shared across the crate

## Example

```rust
use multihypothesis_wta_losses_rs::loss::{wta_loss, SquaredError, WtaConfig};
use ndarray::arr2;

// Two hypotheses for one sample, two output channels
let hypotheses = vec![
    arr2(&[[0.0, 0.0]]),
    arr2(&[[3.0, 4.0]]),
];
let labels = arr2(&[[0.0, 1.0]]);

// Pure winner-takes-all over the squared error
let config = WtaConfig::default();
let loss = wta_loss(&hypotheses, 2, &labels, &SquaredError, &config).unwrap();
assert!((loss - 1.0).abs() < 1e-12);
```
*/

// ============================================================================
// Python bindings (optional)
// ============================================================================

#[cfg(feature = "python")]
pub mod python;

// ============================================================================
// Core modules
// ============================================================================

/// Loss primitives and winner-takes-all aggregation policies
///
/// This is the main module containing the training losses:
/// - Elementwise primitives: `SquaredError`, `LogSquaredError`, `AbsoluteError`, `GaussianNll`
/// - Policies: `wta_loss` (pure / relaxed / evolving top-k), `adaptive_wta_loss`
pub mod loss;

/// Gaussian mixture statistics and distance-based evaluation metrics
pub mod mixture;

/// Hypothesis stacking and label replication
pub mod stack;

/// Error types shared across the crate
pub mod errors;

/// Benchmark utilities (synthetic predictions, deterministic seeding)
pub mod bench_utils;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// Errors
pub use errors::LossError;

// Stacking
pub use stack::{broadcast_labels, stack_hypotheses};

// Elementwise primitives
pub use loss::{AbsoluteError, ElementwiseLoss, GaussianNll, LogSquaredError, SquaredError};

// Aggregation policies
pub use loss::{adaptive_wta_loss, wta_loss, WtaConfig, WtaPolicy};

// Mixture statistics
pub use mixture::{
    component_density, mixture_density_loss, mixture_nll, mixture_probability, MixtureComponent,
    MixtureParameters,
};

// Distance metrics
pub use mixture::{
    central_oracle_loss, central_oracle_loss_batched, mahalanobis_loss, mahalanobis_loss_batched,
    MahalanobisLoss,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
