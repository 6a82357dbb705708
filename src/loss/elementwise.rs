//! Elementwise loss primitives
//!
//! Each primitive maps a (B, M, C) prediction array and the replicated
//! (B, M, C) label array to a (B, M) error matrix, one scalar per
//! (sample, hypothesis) pair. The aggregation policies are agnostic to which
//! primitive produced the matrix; anything implementing [`ElementwiseLoss`]
//! can be plugged in.
//!
//! The difference-based primitives divide the channel sum by the batch size
//! B. This is a scaling convention, not a mean: the division happens once
//! per call, before any cross-hypothesis reduction, and callers replicating
//! these numbers elsewhere must apply the same factor.

use ndarray::{Array2, ArrayView3, Axis};
use std::f64::consts::PI;

use crate::errors::LossError;

/// Additive stabilizer inside the log of the elementwise NLL primitive.
///
/// Keeps the log argument positive when a component assigns (numerically)
/// zero density to the label. The scalar mixture NLL deliberately carries no
/// such stabilizer; the two paths serve different regimes and stay distinct.
pub const NLL_STABILIZER: f64 = 1e-6;

/// A per-hypothesis error metric pluggable into the aggregation policies
///
/// Implementations map predictions and replicated labels, both (B, M, C), to
/// a (B, M) error matrix. The trait is object safe so callers can hold
/// primitives as trait objects.
pub trait ElementwiseLoss {
    /// Compute the (B, M) error matrix
    ///
    /// # Arguments
    /// * `predictions` - Stacked hypothesis array, shape (B, M, C)
    /// * `labels` - Label batch replicated across hypotheses, shape (B, M, C)
    fn evaluate(
        &self,
        predictions: ArrayView3<'_, f64>,
        labels: ArrayView3<'_, f64>,
    ) -> Result<Array2<f64>, LossError>;

    /// Short metric name for diagnostics
    fn name(&self) -> &'static str;
}

fn check_matching_shapes(
    predictions: &ArrayView3<'_, f64>,
    labels: &ArrayView3<'_, f64>,
) -> Result<(), LossError> {
    let (pb, pm, pc) = predictions.dim();
    let (lb, lm, lc) = labels.dim();
    if lb != pb {
        return Err(LossError::DimensionMismatch {
            expected: pb,
            actual: lb,
            context: "label batch size".to_string(),
        });
    }
    if lm != pm {
        return Err(LossError::DimensionMismatch {
            expected: pm,
            actual: lm,
            context: "label hypothesis count".to_string(),
        });
    }
    if lc != pc {
        return Err(LossError::DimensionMismatch {
            expected: pc,
            actual: lc,
            context: "label channels".to_string(),
        });
    }
    Ok(())
}

/// Squared error summed over channels, divided by batch size
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredError;

impl ElementwiseLoss for SquaredError {
    fn evaluate(
        &self,
        predictions: ArrayView3<'_, f64>,
        labels: ArrayView3<'_, f64>,
    ) -> Result<Array2<f64>, LossError> {
        check_matching_shapes(&predictions, &labels)?;
        let batch = predictions.dim().0;
        let diff = &predictions - &labels;
        Ok(diff.mapv_into(|v| v * v).sum_axis(Axis(2)) / batch as f64)
    }

    fn name(&self) -> &'static str {
        "squared-error"
    }
}

/// Squared error of the natural logs, summed over channels, divided by batch
/// size
///
/// Only defined for strictly positive predictions and labels; non-positive
/// values produce non-finite entries that propagate into the reduction.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSquaredError;

impl ElementwiseLoss for LogSquaredError {
    fn evaluate(
        &self,
        predictions: ArrayView3<'_, f64>,
        labels: ArrayView3<'_, f64>,
    ) -> Result<Array2<f64>, LossError> {
        check_matching_shapes(&predictions, &labels)?;
        let batch = predictions.dim().0;
        let diff = predictions.mapv(f64::ln) - labels.mapv(f64::ln);
        Ok(diff.mapv_into(|v| v * v).sum_axis(Axis(2)) / batch as f64)
    }

    fn name(&self) -> &'static str {
        "log-squared-error"
    }
}

/// Absolute error summed over channels, divided by batch size
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteError;

impl ElementwiseLoss for AbsoluteError {
    fn evaluate(
        &self,
        predictions: ArrayView3<'_, f64>,
        labels: ArrayView3<'_, f64>,
    ) -> Result<Array2<f64>, LossError> {
        check_matching_shapes(&predictions, &labels)?;
        let batch = predictions.dim().0;
        let diff = &predictions - &labels;
        Ok(diff.mapv_into(f64::abs).sum_axis(Axis(2)) / batch as f64)
    }

    fn name(&self) -> &'static str {
        "absolute-error"
    }
}

/// Per-hypothesis Gaussian negative log density of the label
///
/// Each hypothesis channel vector is read as a 2-D position (channels 0..2)
/// plus a 2-D spread (channels 2..4). The primitive evaluates the diagonal
/// Gaussian density of the label position under that (mean, spread) pair and
/// returns `-ln(density + NLL_STABILIZER)` per (sample, hypothesis), with no
/// batch normalization: the matrix feeds further aggregation rather than
/// being a terminal loss.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianNll;

impl ElementwiseLoss for GaussianNll {
    fn evaluate(
        &self,
        predictions: ArrayView3<'_, f64>,
        labels: ArrayView3<'_, f64>,
    ) -> Result<Array2<f64>, LossError> {
        let (pb, pm, pc) = predictions.dim();
        let (lb, lm, lc) = labels.dim();
        if pc != 4 {
            return Err(LossError::DimensionMismatch {
                expected: 4,
                actual: pc,
                context: "prediction channels (2-D mean plus 2-D spread)".to_string(),
            });
        }
        if lc != 2 {
            return Err(LossError::DimensionMismatch {
                expected: 2,
                actual: lc,
                context: "label position channels".to_string(),
            });
        }
        if lb != pb {
            return Err(LossError::DimensionMismatch {
                expected: pb,
                actual: lb,
                context: "label batch size".to_string(),
            });
        }
        if lm != pm {
            return Err(LossError::DimensionMismatch {
                expected: pm,
                actual: lm,
                context: "label hypothesis count".to_string(),
            });
        }

        let inv_sqrt_2pi = 1.0 / (2.0 * PI).sqrt();
        let mut out = Array2::zeros((pb, pm));
        for b in 0..pb {
            for m in 0..pm {
                let mut density = 1.0;
                for c in 0..2 {
                    let mean = predictions[[b, m, c]];
                    let spread = predictions[[b, m, c + 2]];
                    let z = (labels[[b, m, c]] - mean) / spread;
                    density *= inv_sqrt_2pi * (-0.5 * z * z).exp() / spread;
                }
                out[[b, m]] = -(density + NLL_STABILIZER).ln();
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "gaussian-nll"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr3, Array3};

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{} vs {}", a, b);
    }

    #[test]
    fn test_squared_error_divides_by_batch() {
        // B=2, M=1, C=2
        let predictions = arr3(&[[[3.0, 0.0]], [[0.0, 4.0]]]);
        let labels = Array3::zeros((2, 1, 2));
        let d = SquaredError
            .evaluate(predictions.view(), labels.view())
            .unwrap();

        assert_eq!(d.dim(), (2, 1));
        assert_close(d[[0, 0]], 9.0 / 2.0);
        assert_close(d[[1, 0]], 16.0 / 2.0);
    }

    #[test]
    fn test_log_squared_error() {
        let e = std::f64::consts::E;
        // ln(e^2) - ln(e) = 1 per channel, squared and summed: 2, over B=1
        let predictions = arr3(&[[[e * e, e * e]]]);
        let labels = arr3(&[[[e, e]]]);
        let d = LogSquaredError
            .evaluate(predictions.view(), labels.view())
            .unwrap();
        assert_close(d[[0, 0]], 2.0);
    }

    #[test]
    fn test_log_squared_error_nonpositive_input_is_nonfinite() {
        let predictions = arr3(&[[[-1.0]]]);
        let labels = arr3(&[[[1.0]]]);
        let d = LogSquaredError
            .evaluate(predictions.view(), labels.view())
            .unwrap();
        assert!(!d[[0, 0]].is_finite());
    }

    #[test]
    fn test_absolute_error() {
        let predictions = arr3(&[[[1.0, -2.0]], [[0.5, 0.5]]]);
        let labels = Array3::zeros((2, 1, 2));
        let d = AbsoluteError
            .evaluate(predictions.view(), labels.view())
            .unwrap();
        assert_close(d[[0, 0]], 3.0 / 2.0);
        assert_close(d[[1, 0]], 1.0 / 2.0);
    }

    #[test]
    fn test_gaussian_nll_at_mean() {
        // Label exactly at the mean with unit spread: density = 1/(2*pi)
        let predictions = arr3(&[[[1.0, 2.0, 1.0, 1.0]]]);
        let labels = arr3(&[[[1.0, 2.0]]]);
        let d = GaussianNll
            .evaluate(predictions.view(), labels.view())
            .unwrap();

        let expected = -(1.0 / (2.0 * PI) + NLL_STABILIZER).ln();
        assert_close(d[[0, 0]], expected);
    }

    #[test]
    fn test_gaussian_nll_stabilizer_bounds_far_labels() {
        // A label far from the mean saturates the density at ~0; the
        // stabilizer caps the loss at -ln(1e-6)
        let predictions = arr3(&[[[0.0, 0.0, 0.1, 0.1]]]);
        let labels = arr3(&[[[100.0, 100.0]]]);
        let d = GaussianNll
            .evaluate(predictions.view(), labels.view())
            .unwrap();
        assert_close(d[[0, 0]], -NLL_STABILIZER.ln());
    }

    #[test]
    fn test_gaussian_nll_channel_contract() {
        let predictions = Array3::zeros((1, 1, 3));
        let labels = Array3::zeros((1, 1, 2));
        assert!(matches!(
            GaussianNll.evaluate(predictions.view(), labels.view()),
            Err(LossError::DimensionMismatch { .. })
        ));

        let predictions = Array3::zeros((1, 1, 4));
        let labels = Array3::zeros((1, 1, 3));
        assert!(matches!(
            GaussianNll.evaluate(predictions.view(), labels.view()),
            Err(LossError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let predictions = Array3::zeros((2, 3, 2));
        let labels = Array3::zeros((2, 2, 2));
        assert!(matches!(
            SquaredError.evaluate(predictions.view(), labels.view()),
            Err(LossError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_names() {
        assert_eq!(SquaredError.name(), "squared-error");
        assert_eq!(LogSquaredError.name(), "log-squared-error");
        assert_eq!(AbsoluteError.name(), "absolute-error");
        assert_eq!(GaussianNll.name(), "gaussian-nll");
    }
}
