//! Assembly of per-hypothesis batches into the stacked array form
//!
//! Aggregation policies consume a single (B, M, C) array: B samples, M
//! hypotheses, C output channels. Predictors usually emit M separate (B, C)
//! batches, one per hypothesis head; this module turns those into the
//! stacked form and replicates the ground-truth labels alongside.

use ndarray::{stack, Array2, Array3, Axis};

use crate::errors::LossError;

/// Stack M hypothesis batches of shape (B, C) into a (B, M, C) array.
///
/// Input order is preserved as the middle axis; it carries no ranking.
///
/// # Arguments
/// * `hypotheses` - One (B, C) batch per hypothesis, all with identical shape
///
/// # Returns
/// The stacked (B, M, C) array, or a shape error if the batches disagree.
pub fn stack_hypotheses(hypotheses: &[Array2<f64>]) -> Result<Array3<f64>, LossError> {
    let first = hypotheses.first().ok_or(LossError::EmptyHypothesisSet)?;
    let (batch, channels) = first.dim();

    for (index, hypothesis) in hypotheses.iter().enumerate() {
        if hypothesis.nrows() != batch {
            return Err(LossError::DimensionMismatch {
                expected: batch,
                actual: hypothesis.nrows(),
                context: format!("batch size of hypothesis {}", index),
            });
        }
        if hypothesis.ncols() != channels {
            return Err(LossError::DimensionMismatch {
                expected: channels,
                actual: hypothesis.ncols(),
                context: format!("channels of hypothesis {}", index),
            });
        }
    }

    let views: Vec<_> = hypotheses.iter().map(|h| h.view()).collect();
    stack(Axis(1), &views).map_err(|_| LossError::DimensionMismatch {
        expected: batch * channels,
        actual: 0,
        context: "stacked hypothesis array".to_string(),
    })
}

/// Replicate a (B, C) label batch across the hypothesis axis to (B, M, C).
///
/// Every hypothesis is compared against the same label, so the label batch
/// is repeated M times along the middle axis.
pub fn broadcast_labels(labels: &Array2<f64>, num_hypotheses: usize) -> Result<Array3<f64>, LossError> {
    if num_hypotheses == 0 {
        return Err(LossError::EmptyHypothesisSet);
    }
    let (batch, channels) = labels.dim();
    let expanded = labels.view().insert_axis(Axis(1));
    let replicated = expanded
        .broadcast((batch, num_hypotheses, channels))
        .ok_or_else(|| LossError::DimensionMismatch {
            expected: num_hypotheses,
            actual: 1,
            context: "label replication across hypotheses".to_string(),
        })?;
    Ok(replicated.to_owned())
}
