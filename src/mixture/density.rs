//! Gaussian mixture probability statistics
//!
//! Batched densities for diagonal Gaussian mixtures: per-component
//! density, weighted mixture probability and the scalar negative
//! log-likelihood used to train mixture-density heads.

use ndarray::{Array1, Array2, ArrayView2, ArrayView3};
use std::f64::consts::PI;

use crate::errors::LossError;
use crate::mixture::types::MixtureParameters;

// ============================================================================
// VALIDATION
// ============================================================================

/// Check that means/spreads agree and that the labels match them
fn check_mixture_shapes(
    means: &ArrayView3<'_, f64>,
    spreads: &ArrayView3<'_, f64>,
    labels: &ArrayView2<'_, f64>,
) -> Result<(), LossError> {
    let (batch, _, channels) = means.dim();

    if spreads.dim() != means.dim() {
        return Err(LossError::DimensionMismatch {
            expected: channels,
            actual: spreads.dim().2,
            context: "mixture spreads shape".to_string(),
        });
    }
    if labels.nrows() != batch {
        return Err(LossError::DimensionMismatch {
            expected: batch,
            actual: labels.nrows(),
            context: "label batch size".to_string(),
        });
    }
    if labels.ncols() != channels {
        return Err(LossError::DimensionMismatch {
            expected: channels,
            actual: labels.ncols(),
            context: "label channels".to_string(),
        });
    }
    Ok(())
}

/// Check the weight matrix against the means
fn check_weight_shape(
    weights: &ArrayView2<'_, f64>,
    means: &ArrayView3<'_, f64>,
) -> Result<(), LossError> {
    let (batch, components, _) = means.dim();
    if weights.dim() != (batch, components) {
        return Err(LossError::DimensionMismatch {
            expected: components,
            actual: weights.ncols(),
            context: "mixture weights shape".to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// DENSITIES
// ============================================================================

/// Per-component diagonal Gaussian density of each label under each component.
///
/// For sample b and component m the density is the product over channels of
/// the univariate normal density with mean `means[b, m, c]` and standard
/// deviation `spreads[b, m, c]`, evaluated at `labels[b, c]`.
///
/// # Arguments
/// * `means` - Component means, shape (B, M, C)
/// * `spreads` - Coordinate-wise standard deviations, shape (B, M, C)
/// * `labels` - Observed targets, shape (B, C)
///
/// # Returns
/// * Density matrix of shape (B, M)
pub fn component_density(
    means: ArrayView3<'_, f64>,
    spreads: ArrayView3<'_, f64>,
    labels: ArrayView2<'_, f64>,
) -> Result<Array2<f64>, LossError> {
    check_mixture_shapes(&means, &spreads, &labels)?;

    let (batch, components, channels) = means.dim();
    let inv_sqrt_2pi = 1.0 / (2.0 * PI).sqrt();

    let mut densities = Array2::<f64>::zeros((batch, components));
    for b in 0..batch {
        for m in 0..components {
            let mut density = 1.0;
            for c in 0..channels {
                let spread = spreads[[b, m, c]];
                let z = (labels[[b, c]] - means[[b, m, c]]) / spread;
                density *= inv_sqrt_2pi * (-0.5 * z * z).exp() / spread;
            }
            densities[[b, m]] = density;
        }
    }
    Ok(densities)
}

/// Weighted mixture probability of each label.
///
/// Sums the per-component densities weighted by `weights` over the component
/// axis. The weights are used as given; callers that want a proper density
/// must pass weights summing to one per sample.
///
/// # Arguments
/// * `weights` - Component weights, shape (B, M)
/// * `means` - Component means, shape (B, M, C)
/// * `spreads` - Coordinate-wise standard deviations, shape (B, M, C)
/// * `labels` - Observed targets, shape (B, C)
///
/// # Returns
/// * Probability vector of shape (B,)
pub fn mixture_probability(
    weights: ArrayView2<'_, f64>,
    means: ArrayView3<'_, f64>,
    spreads: ArrayView3<'_, f64>,
    labels: ArrayView2<'_, f64>,
) -> Result<Array1<f64>, LossError> {
    check_weight_shape(&weights, &means)?;
    let densities = component_density(means, spreads, labels)?;
    Ok((&weights * &densities).sum_axis(ndarray::Axis(1)))
}

/// Scalar negative log-likelihood of a batch under a Gaussian mixture.
///
/// Averages `-ln(p)` of the mixture probabilities over the batch. No
/// stabilizer is added, so a vanishing probability yields an infinite loss
/// and a negative one (possible with negative weights) yields NaN; both are
/// reported through a warning rather than masked.
///
/// # Arguments
/// * `weights` - Component weights, shape (B, M)
/// * `means` - Component means, shape (B, M, C)
/// * `spreads` - Coordinate-wise standard deviations, shape (B, M, C)
/// * `labels` - Observed targets, shape (B, C)
///
/// # Returns
/// * Mean negative log-likelihood over the batch
pub fn mixture_nll(
    weights: ArrayView2<'_, f64>,
    means: ArrayView3<'_, f64>,
    spreads: ArrayView3<'_, f64>,
    labels: ArrayView2<'_, f64>,
) -> Result<f64, LossError> {
    let probabilities = mixture_probability(weights, means, spreads, labels)?;

    let degenerate = probabilities.iter().filter(|&&p| p <= 0.0).count();
    if degenerate > 0 {
        log::warn!(
            "mixture_nll: {} of {} samples have non-positive mixture probability",
            degenerate,
            probabilities.len()
        );
    }

    let batch = probabilities.len();
    Ok(probabilities.mapv(|p| -p.ln()).sum() / batch as f64)
}

/// Mixture-density training loss over batched parameters.
///
/// Thin adapter that unpacks a [`MixtureParameters`] bundle and evaluates
/// [`mixture_nll`] against the labels.
pub fn mixture_density_loss(
    params: &MixtureParameters,
    labels: ArrayView2<'_, f64>,
) -> Result<f64, LossError> {
    mixture_nll(
        params.weights.view(),
        params.means.view(),
        params.spreads.view(),
        labels,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array2, Array3};

    const EPSILON: f64 = 1e-12;

    fn unit_mixture(batch: usize, components: usize) -> (Array2<f64>, Array3<f64>, Array3<f64>) {
        let weights = Array2::from_elem((batch, components), 1.0 / components as f64);
        let means = Array3::zeros((batch, components, 2));
        let spreads = Array3::ones((batch, components, 2));
        (weights, means, spreads)
    }

    #[test]
    fn test_component_density_standard_normal_at_mean() {
        let (_, means, spreads) = unit_mixture(1, 1);
        let labels = arr2(&[[0.0, 0.0]]);

        let densities = component_density(means.view(), spreads.view(), labels.view()).unwrap();
        // Two independent standard normals at their mean: (1/sqrt(2*pi))^2
        let expected = 1.0 / (2.0 * PI);
        assert!((densities[[0, 0]] - expected).abs() < EPSILON);
    }

    #[test]
    fn test_component_density_scales_with_spread() {
        let means = Array3::zeros((1, 1, 2));
        let spreads = Array3::from_elem((1, 1, 2), 2.0);
        let labels = arr2(&[[0.0, 0.0]]);

        let densities = component_density(means.view(), spreads.view(), labels.view()).unwrap();
        // Each channel contributes 1/(2*sqrt(2*pi)) at the mean
        let expected = 1.0 / (4.0 * 2.0 * PI);
        assert!((densities[[0, 0]] - expected).abs() < EPSILON);
    }

    #[test]
    fn test_mixture_probability_weighted_sum() {
        let (_, means, spreads) = unit_mixture(1, 2);
        let weights = arr2(&[[0.3, 0.7]]);
        let labels = arr2(&[[0.0, 0.0]]);

        let probabilities =
            mixture_probability(weights.view(), means.view(), spreads.view(), labels.view())
                .unwrap();
        // Identical components, so the weighted sum equals the single density
        let expected = 1.0 / (2.0 * PI);
        assert!((probabilities[0] - expected).abs() < EPSILON);
    }

    #[test]
    fn test_mixture_probability_component_permutation() {
        let weights = arr2(&[[0.2, 0.8]]);
        let mut means = Array3::zeros((1, 2, 2));
        means[[0, 1, 0]] = 3.0;
        let spreads = Array3::ones((1, 2, 2));
        let labels = arr2(&[[1.0, -1.0]]);

        let forward =
            mixture_probability(weights.view(), means.view(), spreads.view(), labels.view())
                .unwrap();

        let weights_rev = arr2(&[[0.8, 0.2]]);
        let mut means_rev = Array3::zeros((1, 2, 2));
        means_rev[[0, 0, 0]] = 3.0;
        let reversed = mixture_probability(
            weights_rev.view(),
            means_rev.view(),
            spreads.view(),
            labels.view(),
        )
        .unwrap();

        assert!((forward[0] - reversed[0]).abs() < EPSILON);
    }

    #[test]
    fn test_mixture_nll_closed_form() {
        let (weights, means, spreads) = unit_mixture(2, 1);
        let labels = arr2(&[[0.0, 0.0], [0.0, 0.0]]);

        let nll =
            mixture_nll(weights.view(), means.view(), spreads.view(), labels.view()).unwrap();
        // -ln(1/(2*pi)) for every sample, no stabilizer
        let expected = (2.0 * PI).ln();
        assert!((nll - expected).abs() < EPSILON);
    }

    #[test]
    fn test_mixture_nll_zero_probability_is_infinite() {
        // Zero weights wipe out the mixture probability entirely
        let weights = Array2::zeros((1, 1));
        let means = Array3::zeros((1, 1, 2));
        let spreads = Array3::ones((1, 1, 2));
        let labels = arr2(&[[0.0, 0.0]]);

        let nll =
            mixture_nll(weights.view(), means.view(), spreads.view(), labels.view()).unwrap();
        assert!(nll.is_infinite() && nll > 0.0);
    }

    #[test]
    fn test_mixture_density_loss_matches_nll() {
        let (weights, means, spreads) = unit_mixture(3, 2);
        let labels = arr2(&[[0.1, 0.2], [-0.3, 0.4], [0.5, -0.6]]);

        let direct =
            mixture_nll(weights.view(), means.view(), spreads.view(), labels.view()).unwrap();
        let params = MixtureParameters::new(weights, means, spreads).unwrap();
        let adapted = mixture_density_loss(&params, labels.view()).unwrap();
        assert!((direct - adapted).abs() < EPSILON);
    }

    #[test]
    fn test_density_label_shape_errors() {
        let (_, means, spreads) = unit_mixture(2, 1);

        // Wrong batch size
        let labels = arr2(&[[0.0, 0.0]]);
        let result = component_density(means.view(), spreads.view(), labels.view());
        assert!(matches!(result, Err(LossError::DimensionMismatch { .. })));

        // Wrong channel count
        let labels = arr2(&[[0.0], [0.0]]);
        let result = component_density(means.view(), spreads.view(), labels.view());
        assert!(matches!(result, Err(LossError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_mixture_weight_shape_error() {
        let (_, means, spreads) = unit_mixture(2, 3);
        let weights = Array2::ones((2, 2));
        let labels = arr2(&[[0.0, 0.0], [0.0, 0.0]]);

        let result =
            mixture_probability(weights.view(), means.view(), spreads.view(), labels.view());
        assert!(matches!(result, Err(LossError::DimensionMismatch { .. })));
    }
}
