//! Error types for the loss engine
//!
//! This module provides proper error handling instead of panics.

use std::fmt;

/// Errors that can occur while evaluating a loss
#[derive(Debug, Clone)]
pub enum LossError {
    /// Dimension mismatch between expected and actual
    DimensionMismatch {
        /// What was expected
        expected: usize,
        /// What was received
        actual: usize,
        /// Context (e.g., "hypothesis count", "label channels")
        context: String,
    },

    /// Configuration error (out-of-range or unsupported parameter combination)
    Configuration {
        /// Description of the configuration issue
        description: String,
    },

    /// The hypothesis sequence or mixture is empty
    EmptyHypothesisSet,
}

impl fmt::Display for LossError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LossError::DimensionMismatch {
                expected,
                actual,
                context,
            } => {
                write!(
                    f,
                    "Dimension mismatch for {}: expected {}, got {}",
                    context, expected, actual
                )
            }
            LossError::Configuration { description } => {
                write!(f, "Configuration error: {}", description)
            }
            LossError::EmptyHypothesisSet => write!(f, "No hypotheses or mixture components given"),
        }
    }
}

impl std::error::Error for LossError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loss_error_display() {
        let err = LossError::DimensionMismatch {
            expected: 3,
            actual: 2,
            context: "hypothesis count".to_string(),
        };
        assert!(err.to_string().contains("hypothesis count"));
        assert!(err.to_string().contains("3"));
        assert!(err.to_string().contains("2"));

        let err = LossError::Configuration {
            description: "relax must lie in [0, 1)".to_string(),
        };
        assert!(err.to_string().contains("relax"));

        let err = LossError::EmptyHypothesisSet;
        assert!(err.to_string().contains("No hypotheses"));
    }
}
