//! Configuration for the winner-takes-all loss family
//!
//! A `WtaConfig` carries the two tuning knobs (`relax`, `k_top`) and resolves
//! them into the concrete aggregation policy before any array work is done.

use serde::Serialize;

use crate::errors::LossError;

/// Tuning parameters for the winner-takes-all loss family
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WtaConfig {
    /// Blend weight for softening the winner-only signal.
    /// Must lie in [0, 1); 0 disables relaxation.
    pub relax: f64,
    /// Number of top-ranked hypotheses considered per sample.
    /// Clamped to the hypothesis count at resolution time.
    pub k_top: usize,
}

impl WtaConfig {
    /// Create a configuration from raw parameters
    pub fn new(relax: f64, k_top: usize) -> Self {
        Self { relax, k_top }
    }

    /// Pure winner-takes-all: only the best hypothesis per sample counts
    pub fn winner_takes_all() -> Self {
        Self {
            relax: 0.0,
            k_top: 1,
        }
    }

    /// Relaxed winner-takes-all with the given blend weight
    pub fn relaxed(relax: f64) -> Self {
        Self { relax, k_top: 1 }
    }

    /// Evolving winner-takes-all over the `k_top` best hypotheses
    pub fn evolving(k_top: usize) -> Self {
        Self { relax: 0.0, k_top }
    }

    /// Check parameter bounds
    ///
    /// `relax` must be finite and lie in [0, 1). `k_top` is unsigned, so the
    /// non-negativity bound holds by construction.
    pub fn validate(&self) -> Result<(), LossError> {
        if !self.relax.is_finite() || self.relax < 0.0 || self.relax >= 1.0 {
            return Err(LossError::Configuration {
                description: format!("relax must lie in [0, 1), got {}", self.relax),
            });
        }
        Ok(())
    }

    /// Resolve the configuration into a concrete policy for `num_hypotheses`.
    ///
    /// `k_top` is clamped to `min(k_top, num_hypotheses)` first. The supported
    /// combinations are mutually exclusive:
    ///
    /// - `relax == 0`, clamped `k_top == 1` → [`WtaPolicy::WinnerTakesAll`]
    /// - `relax > 0`, clamped `k_top == 1` → [`WtaPolicy::Relaxed`]
    /// - `relax == 0`, clamped `k_top > 1` → [`WtaPolicy::EvolvingTopK`]
    ///
    /// Anything else (relaxation combined with top-k, or `k_top == 0`) is an
    /// unsupported combination and fails with a configuration error.
    pub fn policy(&self, num_hypotheses: usize) -> Result<WtaPolicy, LossError> {
        self.validate()?;
        if num_hypotheses == 0 {
            return Err(LossError::EmptyHypothesisSet);
        }

        let k_top = self.k_top.min(num_hypotheses);
        match (self.relax == 0.0, k_top) {
            (true, 1) => Ok(WtaPolicy::WinnerTakesAll),
            (false, 1) => Ok(WtaPolicy::Relaxed { relax: self.relax }),
            (true, k) if k > 1 => Ok(WtaPolicy::EvolvingTopK { k_top: k }),
            _ => Err(LossError::Configuration {
                description: format!(
                    "unsupported combination relax={}, k_top={} ({} hypotheses)",
                    self.relax, self.k_top, num_hypotheses
                ),
            }),
        }
    }
}

impl Default for WtaConfig {
    fn default() -> Self {
        Self {
            relax: super::DEFAULT_RELAX,
            k_top: super::DEFAULT_K_TOP,
        }
    }
}

/// Concrete aggregation policy resolved from a [`WtaConfig`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WtaPolicy {
    /// Per sample, only the minimum-error hypothesis enters the loss
    WinnerTakesAll,
    /// Winner blended with a uniform share over all hypotheses
    Relaxed {
        /// Blend weight, in (0, 1)
        relax: f64,
    },
    /// The k smallest errors per sample share the loss equally
    EvolvingTopK {
        /// Number of hypotheses selected per sample, in [2, M]
        k_top: usize,
    },
}

impl WtaPolicy {
    /// Short policy name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            WtaPolicy::WinnerTakesAll => "winner-takes-all",
            WtaPolicy::Relaxed { .. } => "relaxed",
            WtaPolicy::EvolvingTopK { .. } => "evolving-top-k",
        }
    }
}
