/*!
Gaussian mixture statistics for mixture-density predictions.

Probability-side statistics (component densities, mixture probability,
negative log-likelihood) live in [`density`]; geometric evaluation
metrics (Mahalanobis distance, central-oracle loss) live in [`distance`].
All mixtures are diagonal: each component carries a mean and
coordinate-wise standard deviations.
*/

pub mod density;
pub mod distance;
pub mod types;

pub use density::{component_density, mixture_density_loss, mixture_nll, mixture_probability};
pub use distance::{
    central_oracle_loss, central_oracle_loss_batched, mahalanobis_loss, mahalanobis_loss_batched,
    MahalanobisLoss,
};
pub use types::{MixtureComponent, MixtureParameters};
