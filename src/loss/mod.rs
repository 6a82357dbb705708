/*!
Winner-takes-all loss policies over multi-hypothesis predictions.

A predictor that emits M hypotheses per sample is scored by first building
a (B, M) error matrix with an elementwise loss, then collapsing it to a
scalar with an aggregation policy:

- Pure winner-takes-all: only the best hypothesis per sample is trained
- Relaxed: the best hypothesis dominates but every hypothesis receives
  a small gradient share
- Evolving top-k: the k best hypotheses per sample share the gradient
- Adaptive: a per-sample threshold clusters the competitive hypotheses
*/

pub mod adaptive;
pub mod config;
pub mod elementwise;
pub mod meta;

/// Default relaxation weight
///
/// Zero disables the relaxed blend, giving pure winner-takes-all together
/// with the default k. Can be overridden via [`WtaConfig::relaxed`].
pub const DEFAULT_RELAX: f64 = 0.0;

/// Default number of top-ranked hypotheses kept per sample
///
/// One trains only the winning hypothesis. Can be overridden via
/// [`WtaConfig::evolving`].
pub const DEFAULT_K_TOP: usize = 1;

pub use adaptive::{adaptive_wta_loss, ADAPTIVE_THRESHOLD_RATIO};
pub use config::{WtaConfig, WtaPolicy};
pub use elementwise::{
    AbsoluteError, ElementwiseLoss, GaussianNll, LogSquaredError, SquaredError, NLL_STABILIZER,
};
pub use meta::wta_loss;
