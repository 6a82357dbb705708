//! Adaptive-clustering aggregation over the hypothesis axis
//!
//! Where the winner-takes-all family rewards exactly one (or k) hypotheses
//! per sample, `adaptive_wta_loss` rewards the whole cluster of hypotheses
//! whose error lands within a data-dependent band above the per-sample
//! minimum. Finite entries outside the band contribute zero, diluting the
//! average over all M columns; a wide cluster therefore changes the
//! effective scale on purpose. Degenerate (NaN) errors survive the mask and
//! carry through to the scalar.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use crate::errors::LossError;
use crate::loss::elementwise::ElementwiseLoss;
use crate::loss::meta::{evolving_topk, row_min};
use crate::stack::{broadcast_labels, stack_hypotheses};

/// Fraction of the per-sample error range added to the minimum to form the
/// cluster threshold: `threshold = Dmin + RATIO * (Dmax - Dmin)`.
pub const ADAPTIVE_THRESHOLD_RATIO: f64 = 0.1;

/// Adaptive-clustering loss over M hypothesis batches.
///
/// Computes the (B, M) error matrix D like [`wta_loss`](crate::wta_loss),
/// then reduces it by `k_top`:
///
/// - `k_top == 1`: per sample, keep the entries within
///   `Dmin + ADAPTIVE_THRESHOLD_RATIO * (Dmax - Dmin)` of the minimum and
///   zero the rest; the scalar is the average of the M column batch-means.
/// - `k_top == 0`: same mask, but every kept entry contributes the row
///   minimum `Dmin` instead of its own error. The mask itself is still taken
///   from the original matrix.
/// - `k_top > 1`: evolving top-k, identical to the winner-takes-all family's
///   top-k branch. `k_top` must not exceed the hypothesis count.
///
/// # Arguments
/// * `hypotheses` - One (B, C) batch per hypothesis
/// * `num_hypotheses` - Declared hypothesis count; must equal `hypotheses.len()`
/// * `labels` - Ground-truth batch, shape (B, C_label)
/// * `loss` - Elementwise primitive producing the (B, M) error matrix
/// * `k_top` - Cluster selector as described above
///
/// # Returns
/// The scalar loss, or a configuration/shape error.
pub fn adaptive_wta_loss<L>(
    hypotheses: &[Array2<f64>],
    num_hypotheses: usize,
    labels: &Array2<f64>,
    loss: &L,
    k_top: usize,
) -> Result<f64, LossError>
where
    L: ElementwiseLoss + ?Sized,
{
    if num_hypotheses == 0 {
        return Err(LossError::EmptyHypothesisSet);
    }
    if k_top > num_hypotheses {
        return Err(LossError::Configuration {
            description: format!(
                "k_top={} exceeds the {} available hypotheses",
                k_top, num_hypotheses
            ),
        });
    }
    if hypotheses.len() != num_hypotheses {
        return Err(LossError::DimensionMismatch {
            expected: num_hypotheses,
            actual: hypotheses.len(),
            context: "hypothesis count".to_string(),
        });
    }

    log::trace!(
        "adaptive_wta_loss: k_top={} batch={} hypotheses={} metric={}",
        k_top,
        labels.nrows(),
        num_hypotheses,
        loss.name()
    );

    let stacked = stack_hypotheses(hypotheses)?;
    let replicated = broadcast_labels(labels, num_hypotheses)?;
    let d = loss.evaluate(stacked.view(), replicated.view())?;

    if k_top > 1 {
        return Ok(evolving_topk(d.view(), k_top));
    }
    Ok(masked_average(d.view(), k_top == 0))
}

/// Average of the M column batch-means of the thresholded matrix.
fn masked_average(d: ArrayView2<'_, f64>, replace_with_min: bool) -> f64 {
    let masked = cluster_mask(d, replace_with_min);
    let hypotheses = masked.ncols();
    let mut sum_loss = 0.0;
    for column in masked.axis_iter(Axis(1)) {
        sum_loss += column.sum() / column.len() as f64;
    }
    sum_loss / hypotheses as f64
}

/// Mask entries above the per-row cluster threshold.
///
/// The mask multiplies by a 0/1 indicator, so a degenerate (NaN) entry stays
/// NaN instead of dropping to zero; a NaN in the row also makes the
/// threshold NaN, failing every comparison. With `replace_with_min` the
/// surviving entries all take the row minimum; the threshold and mask always
/// come from the original row values.
fn cluster_mask(d: ArrayView2<'_, f64>, replace_with_min: bool) -> Array2<f64> {
    let (batch, hypotheses) = d.dim();
    let mut masked = Array2::zeros((batch, hypotheses));
    for (b, row) in d.axis_iter(Axis(0)).enumerate() {
        let dmin = row_min(row);
        let dmax = row_max(row);
        let threshold = dmin + ADAPTIVE_THRESHOLD_RATIO * (dmax - dmin);
        for (m, &value) in row.iter().enumerate() {
            let kept = if replace_with_min { dmin } else { value };
            let indicator = if value <= threshold { 1.0 } else { 0.0 };
            masked[[b, m]] = kept * indicator;
        }
    }
    masked
}

/// Row maximum with the same NaN contract as [`row_min`].
fn row_max(row: ArrayView1<'_, f64>) -> f64 {
    row.iter().copied().fold(f64::NEG_INFINITY, |acc, value| {
        if acc.is_nan() || value.is_nan() {
            f64::NAN
        } else {
            acc.max(value)
        }
    })
}
