//! Mixture parameter containers
//!
//! A mixture-density predictor emits, per sample, M weighted diagonal
//! Gaussian components. Two carriers exist: [`MixtureComponent`] for the
//! single-sample statistics and [`MixtureParameters`] for whole batches.

use nalgebra::DVector;
use ndarray::{Array2, Array3};

use crate::errors::LossError;

/// One diagonal Gaussian component of a predicted mixture (single sample)
#[derive(Debug, Clone)]
pub struct MixtureComponent {
    /// Component weight (the statistics normalize where they need to)
    pub weight: f64,
    /// Component mean
    pub mean: DVector<f64>,
    /// Coordinate-wise standard deviations
    pub spread: DVector<f64>,
}

impl MixtureComponent {
    /// Create a new mixture component
    pub fn new(weight: f64, mean: DVector<f64>, spread: DVector<f64>) -> Self {
        Self {
            weight,
            mean,
            spread,
        }
    }

    /// Dimensionality of the component mean
    #[inline]
    pub fn dim(&self) -> usize {
        self.mean.len()
    }
}

/// Batched mixture parameters: weights (B, M), means and spreads (B, M, C)
///
/// The constructor checks that the three arrays agree on batch size,
/// component count and channels, so downstream statistics only validate
/// against the label batch.
#[derive(Debug, Clone)]
pub struct MixtureParameters {
    /// Component weights, shape (B, M)
    pub weights: Array2<f64>,
    /// Component means, shape (B, M, C)
    pub means: Array3<f64>,
    /// Coordinate-wise standard deviations, shape (B, M, C)
    pub spreads: Array3<f64>,
}

impl MixtureParameters {
    /// Create batched mixture parameters, checking shape coherence
    pub fn new(
        weights: Array2<f64>,
        means: Array3<f64>,
        spreads: Array3<f64>,
    ) -> Result<Self, LossError> {
        let (wb, wm) = weights.dim();
        let (mb, mm, mc) = means.dim();
        let (sb, sm, sc) = spreads.dim();

        if mb != wb {
            return Err(LossError::DimensionMismatch {
                expected: wb,
                actual: mb,
                context: "mixture means batch size".to_string(),
            });
        }
        if mm != wm {
            return Err(LossError::DimensionMismatch {
                expected: wm,
                actual: mm,
                context: "mixture means component count".to_string(),
            });
        }
        if (sb, sm, sc) != (mb, mm, mc) {
            return Err(LossError::DimensionMismatch {
                expected: mc,
                actual: sc,
                context: "mixture spreads shape".to_string(),
            });
        }
        if wm == 0 {
            return Err(LossError::EmptyHypothesisSet);
        }

        Ok(Self {
            weights,
            means,
            spreads,
        })
    }

    /// Number of samples B
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.weights.nrows()
    }

    /// Number of mixture components M
    #[inline]
    pub fn num_components(&self) -> usize {
        self.weights.ncols()
    }

    /// Number of output channels C
    #[inline]
    pub fn channels(&self) -> usize {
        self.means.dim().2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};

    #[test]
    fn test_component_dim() {
        let component = MixtureComponent::new(
            0.5,
            DVector::from_vec(vec![1.0, 2.0]),
            DVector::from_vec(vec![0.1, 0.2]),
        );
        assert_eq!(component.dim(), 2);
    }

    #[test]
    fn test_parameters_accessors() {
        let params = MixtureParameters::new(
            Array2::zeros((4, 3)),
            Array3::zeros((4, 3, 2)),
            Array3::zeros((4, 3, 2)),
        )
        .unwrap();
        assert_eq!(params.batch_size(), 4);
        assert_eq!(params.num_components(), 3);
        assert_eq!(params.channels(), 2);
    }

    #[test]
    fn test_parameters_shape_coherence() {
        // Means disagree on the component count
        let result = MixtureParameters::new(
            Array2::zeros((4, 3)),
            Array3::zeros((4, 2, 2)),
            Array3::zeros((4, 3, 2)),
        );
        assert!(matches!(result, Err(LossError::DimensionMismatch { .. })));

        // Spreads disagree on channels
        let result = MixtureParameters::new(
            Array2::zeros((4, 3)),
            Array3::zeros((4, 3, 2)),
            Array3::zeros((4, 3, 1)),
        );
        assert!(matches!(result, Err(LossError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_parameters_empty_mixture() {
        let result = MixtureParameters::new(
            Array2::zeros((4, 0)),
            Array3::zeros((4, 0, 2)),
            Array3::zeros((4, 0, 2)),
        );
        assert!(matches!(result, Err(LossError::EmptyHypothesisSet)));
    }
}
