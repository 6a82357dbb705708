//! Distance-based mixture losses
//!
//! Geometric evaluation metrics for mixture predictions: the weighted
//! Mahalanobis distance between a label and every component, and the
//! central-oracle loss that scores only the best component.

use nalgebra::DVector;
use ndarray::{Array1, ArrayView2, ArrayView3};
use smallvec::SmallVec;

use crate::errors::LossError;
use crate::mixture::types::MixtureComponent;

// ============================================================================
// RESULTS
// ============================================================================

/// Mahalanobis evaluation of a single sample against a mixture
#[derive(Debug, Clone)]
pub struct MahalanobisLoss {
    /// Per-component distances, in component order
    pub distances: SmallVec<[f64; 8]>,
    /// Distances averaged under the normalized component weights
    pub weighted: f64,
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Check a planar (two-channel) batched mixture against its labels
fn check_planar_mixture(
    weights: &ArrayView2<'_, f64>,
    means: &ArrayView3<'_, f64>,
    spreads: &ArrayView3<'_, f64>,
    labels: &ArrayView2<'_, f64>,
) -> Result<(), LossError> {
    let (batch, components, channels) = means.dim();

    if components == 0 {
        return Err(LossError::EmptyHypothesisSet);
    }
    if channels != 2 {
        return Err(LossError::DimensionMismatch {
            expected: 2,
            actual: channels,
            context: "mixture mean channels".to_string(),
        });
    }
    if spreads.dim() != means.dim() {
        return Err(LossError::DimensionMismatch {
            expected: channels,
            actual: spreads.dim().2,
            context: "mixture spreads shape".to_string(),
        });
    }
    if weights.dim() != (batch, components) {
        return Err(LossError::DimensionMismatch {
            expected: components,
            actual: weights.ncols(),
            context: "mixture weights shape".to_string(),
        });
    }
    if labels.dim() != (batch, 2) {
        return Err(LossError::DimensionMismatch {
            expected: batch,
            actual: labels.nrows(),
            context: "label shape".to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// MAHALANOBIS DISTANCE
// ============================================================================

/// Weighted Mahalanobis distance between a planar label and a mixture.
///
/// Each component contributes `sqrt(dx^2 / s_x + dy^2 / s_y)` where the
/// divisors are the component's coordinate-wise spreads as given. The
/// weighted score averages those distances under the component weights,
/// normalized to sum to one.
///
/// # Arguments
/// * `components` - Mixture components with two-dimensional means
/// * `label` - Observed planar target
///
/// # Returns
/// * Per-component distances and the weighted average
pub fn mahalanobis_loss(
    components: &[MixtureComponent],
    label: &DVector<f64>,
) -> Result<MahalanobisLoss, LossError> {
    if components.is_empty() {
        return Err(LossError::EmptyHypothesisSet);
    }
    if label.len() != 2 {
        return Err(LossError::DimensionMismatch {
            expected: 2,
            actual: label.len(),
            context: "label dimensions".to_string(),
        });
    }
    for (index, component) in components.iter().enumerate() {
        if component.mean.len() != 2 || component.spread.len() != 2 {
            return Err(LossError::DimensionMismatch {
                expected: 2,
                actual: component.mean.len(),
                context: format!("component {} dimensions", index),
            });
        }
    }

    let weight_sum: f64 = components.iter().map(|c| c.weight).sum();

    let mut distances = SmallVec::<[f64; 8]>::with_capacity(components.len());
    let mut weighted = 0.0;
    for component in components {
        let dx = label[0] - component.mean[0];
        let dy = label[1] - component.mean[1];
        let distance = (dx * dx / component.spread[0] + dy * dy / component.spread[1]).sqrt();
        distances.push(distance);
        weighted += distance * component.weight / weight_sum;
    }

    Ok(MahalanobisLoss {
        distances,
        weighted,
    })
}

/// Batched weighted Mahalanobis distance, one score per sample.
///
/// # Arguments
/// * `weights` - Component weights, shape (B, M)
/// * `means` - Component means, shape (B, M, 2)
/// * `spreads` - Coordinate-wise spreads, shape (B, M, 2)
/// * `labels` - Observed planar targets, shape (B, 2)
///
/// # Returns
/// * Weighted distances of shape (B,)
pub fn mahalanobis_loss_batched(
    weights: ArrayView2<'_, f64>,
    means: ArrayView3<'_, f64>,
    spreads: ArrayView3<'_, f64>,
    labels: ArrayView2<'_, f64>,
) -> Result<Array1<f64>, LossError> {
    check_planar_mixture(&weights, &means, &spreads, &labels)?;

    let (batch, components, _) = means.dim();
    let mut out = Array1::<f64>::zeros(batch);
    for b in 0..batch {
        let weight_sum = weights.row(b).sum();
        let mut weighted = 0.0;
        for m in 0..components {
            let dx = labels[[b, 0]] - means[[b, m, 0]];
            let dy = labels[[b, 1]] - means[[b, m, 1]];
            let distance = (dx * dx / spreads[[b, m, 0]] + dy * dy / spreads[[b, m, 1]]).sqrt();
            weighted += distance * weights[[b, m]] / weight_sum;
        }
        out[b] = weighted;
    }
    Ok(out)
}

// ============================================================================
// CENTRAL ORACLE
// ============================================================================

/// Oracle loss: squared Euclidean distance to the closest component mean.
///
/// Ignores weights and spreads entirely; the score only reflects whether
/// any component landed near the label. Works in any dimension.
///
/// # Arguments
/// * `components` - Mixture components
/// * `label` - Observed target, matching the component dimensionality
///
/// # Returns
/// * Minimum squared distance over the components
pub fn central_oracle_loss(
    components: &[MixtureComponent],
    label: &DVector<f64>,
) -> Result<f64, LossError> {
    if components.is_empty() {
        return Err(LossError::EmptyHypothesisSet);
    }
    for (index, component) in components.iter().enumerate() {
        if component.mean.len() != label.len() {
            return Err(LossError::DimensionMismatch {
                expected: label.len(),
                actual: component.mean.len(),
                context: format!("component {} dimensions", index),
            });
        }
    }

    let best = components
        .iter()
        .map(|component| (label - &component.mean).norm_squared())
        .fold(f64::INFINITY, f64::min);
    Ok(best)
}

/// Batched central-oracle loss, one score per sample.
///
/// # Arguments
/// * `means` - Component means, shape (B, M, C)
/// * `labels` - Observed targets, shape (B, C)
///
/// # Returns
/// * Minimum squared distances of shape (B,)
pub fn central_oracle_loss_batched(
    means: ArrayView3<'_, f64>,
    labels: ArrayView2<'_, f64>,
) -> Result<Array1<f64>, LossError> {
    let (batch, components, channels) = means.dim();
    if components == 0 {
        return Err(LossError::EmptyHypothesisSet);
    }
    if labels.dim() != (batch, channels) {
        return Err(LossError::DimensionMismatch {
            expected: channels,
            actual: labels.ncols(),
            context: "label shape".to_string(),
        });
    }

    let mut out = Array1::<f64>::zeros(batch);
    for b in 0..batch {
        let mut best = f64::INFINITY;
        for m in 0..components {
            let mut squared = 0.0;
            for c in 0..channels {
                let diff = labels[[b, c]] - means[[b, m, c]];
                squared += diff * diff;
            }
            best = best.min(squared);
        }
        out[b] = best;
    }
    Ok(out)
}
