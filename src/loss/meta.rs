//! Winner-takes-all aggregation over the hypothesis axis
//!
//! `wta_loss` turns M hypothesis batches and one label batch into a single
//! training scalar. An elementwise primitive first produces the (B, M) error
//! matrix D; the resolved [`WtaPolicy`] then reduces D:
//!
//! - winner-takes-all: batch-mean of the per-sample row minimum
//! - relaxed: `(1 - 2*relax)` on the winner term plus `relax/(M-1)` on every
//!   hypothesis column's batch-mean
//! - evolving top-k: batch-mean over the k smallest entries per sample,
//!   averaged across the k ranks

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use smallvec::SmallVec;

use crate::errors::LossError;
use crate::loss::config::{WtaConfig, WtaPolicy};
use crate::loss::elementwise::ElementwiseLoss;
use crate::stack::{broadcast_labels, stack_hypotheses};

/// Winner-takes-all family loss over M hypothesis batches.
///
/// Stacks the hypotheses to (B, M, C), replicates the labels, evaluates the
/// elementwise primitive and reduces the resulting error matrix under the
/// policy resolved from `config` (see [`WtaConfig::policy`]). Configuration
/// problems surface before any array is touched.
///
/// Top-k selection picks the k smallest errors per sample by value, ties
/// toward the lower hypothesis index; the scalar is unaffected by the
/// tie-break because only the selected values' sum enters it.
///
/// # Arguments
/// * `hypotheses` - One (B, C) batch per hypothesis
/// * `num_hypotheses` - Declared hypothesis count; must equal `hypotheses.len()`
/// * `labels` - Ground-truth batch, shape (B, C_label)
/// * `loss` - Elementwise primitive producing the (B, M) error matrix
/// * `config` - `relax`/`k_top` tuning parameters
///
/// # Returns
/// The scalar loss, or a configuration/shape error.
pub fn wta_loss<L>(
    hypotheses: &[Array2<f64>],
    num_hypotheses: usize,
    labels: &Array2<f64>,
    loss: &L,
    config: &WtaConfig,
) -> Result<f64, LossError>
where
    L: ElementwiseLoss + ?Sized,
{
    let policy = config.policy(num_hypotheses)?;
    if hypotheses.len() != num_hypotheses {
        return Err(LossError::DimensionMismatch {
            expected: num_hypotheses,
            actual: hypotheses.len(),
            context: "hypothesis count".to_string(),
        });
    }

    log::trace!(
        "wta_loss: policy={} batch={} hypotheses={} metric={}",
        policy.name(),
        labels.nrows(),
        num_hypotheses,
        loss.name()
    );

    let stacked = stack_hypotheses(hypotheses)?;
    let replicated = broadcast_labels(labels, num_hypotheses)?;
    let d = loss.evaluate(stacked.view(), replicated.view())?;
    Ok(reduce(d.view(), policy))
}

/// Reduce an already-computed error matrix under a resolved policy.
fn reduce(d: ArrayView2<'_, f64>, policy: WtaPolicy) -> f64 {
    match policy {
        WtaPolicy::WinnerTakesAll => batch_mean_row_min(d),
        WtaPolicy::Relaxed { relax } => {
            let hypotheses = d.ncols();
            let mut sum_loss = (1.0 - 2.0 * relax) * batch_mean_row_min(d);
            let share = relax / (hypotheses as f64 - 1.0);
            for column in d.axis_iter(Axis(1)) {
                sum_loss += share * mean(column);
            }
            sum_loss
        }
        WtaPolicy::EvolvingTopK { k_top } => evolving_topk(d, k_top),
    }
}

/// Batch-mean over the k smallest entries of each row, averaged over ranks.
///
/// Requires `1 <= k_top <= d.ncols()`; callers resolve and clamp first.
pub(crate) fn evolving_topk(d: ArrayView2<'_, f64>, k_top: usize) -> f64 {
    let batch = d.nrows();
    let mut selected_sum = 0.0;
    let mut scratch: SmallVec<[f64; 16]> = SmallVec::new();
    for row in d.axis_iter(Axis(0)) {
        scratch.clear();
        scratch.extend(row.iter().copied());
        scratch.sort_unstable_by(f64::total_cmp);
        selected_sum += scratch[..k_top].iter().sum::<f64>();
    }
    selected_sum / (k_top as f64 * batch as f64)
}

pub(crate) fn batch_mean_row_min(d: ArrayView2<'_, f64>) -> f64 {
    let total: f64 = d.axis_iter(Axis(0)).map(row_min).sum();
    total / d.nrows() as f64
}

/// Row minimum; a NaN anywhere in the row makes the result NaN, so a
/// degenerate hypothesis error is never shadowed by a finite sibling.
pub(crate) fn row_min(row: ArrayView1<'_, f64>) -> f64 {
    row.iter().copied().fold(f64::INFINITY, |acc, value| {
        if acc.is_nan() || value.is_nan() {
            f64::NAN
        } else {
            acc.min(value)
        }
    })
}

fn mean(values: ArrayView1<'_, f64>) -> f64 {
    values.sum() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loss::elementwise::SquaredError;
    use ndarray::arr2;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{} vs {}", a, b);
    }

    fn sample_matrix() -> Array2<f64> {
        arr2(&[[1.0, 5.0, 9.0], [2.0, 2.0, 8.0]])
    }

    #[test]
    fn test_winner_takes_all_reduction() {
        let d = sample_matrix();
        assert_close(reduce(d.view(), WtaPolicy::WinnerTakesAll), 1.5);
    }

    #[test]
    fn test_relaxed_reduction() {
        // 0.6*1.5 + 0.1*(1.5 + 3.5 + 8.5) = 2.25
        let d = sample_matrix();
        assert_close(reduce(d.view(), WtaPolicy::Relaxed { relax: 0.2 }), 2.25);
    }

    #[test]
    fn test_evolving_top2_reduction() {
        let d = sample_matrix();
        assert_close(reduce(d.view(), WtaPolicy::EvolvingTopK { k_top: 2 }), 2.5);
    }

    #[test]
    fn test_evolving_full_k_equals_plain_mean() {
        let d = sample_matrix();
        let full = reduce(d.view(), WtaPolicy::EvolvingTopK { k_top: 3 });
        assert_close(full, 27.0 / 6.0);
    }

    #[test]
    fn test_row_min_and_mean_helpers() {
        let d = sample_matrix();
        assert_close(row_min(d.row(0)), 1.0);
        assert_close(row_min(d.row(1)), 2.0);
        assert_close(mean(d.column(2)), 8.5);
    }

    #[test]
    fn test_row_min_keeps_nan() {
        // A finite sibling must not swallow the degenerate entry.
        let d = arr2(&[[2.0, f64::NAN, 3.0]]);
        assert!(row_min(d.row(0)).is_nan());
        assert!(reduce(d.view(), WtaPolicy::WinnerTakesAll).is_nan());
        assert!(reduce(d.view(), WtaPolicy::Relaxed { relax: 0.2 }).is_nan());
    }

    #[test]
    fn test_wta_loss_end_to_end() {
        // Two hypotheses, one channel; squared error divides by B=2.
        // D = [[(1-1)^2, (4-1)^2], [(2-2)^2, (5-2)^2]] / 2 = [[0, 4.5], [0, 4.5]]
        let hypotheses = vec![arr2(&[[1.0], [2.0]]), arr2(&[[4.0], [5.0]])];
        let labels = arr2(&[[1.0], [2.0]]);
        let value = wta_loss(
            &hypotheses,
            2,
            &labels,
            &SquaredError,
            &WtaConfig::winner_takes_all(),
        )
        .unwrap();
        assert_close(value, 0.0);

        let full = wta_loss(&hypotheses, 2, &labels, &SquaredError, &WtaConfig::evolving(2))
            .unwrap();
        assert_close(full, (0.0 + 4.5 + 0.0 + 4.5) / 4.0);
    }

    #[test]
    fn test_wta_loss_count_mismatch() {
        let hypotheses = vec![arr2(&[[1.0]])];
        let labels = arr2(&[[1.0]]);
        let result = wta_loss(
            &hypotheses,
            2,
            &labels,
            &SquaredError,
            &WtaConfig::winner_takes_all(),
        );
        assert!(matches!(result, Err(LossError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_wta_loss_rejects_unsupported_combination_before_stacking() {
        // Mismatched hypothesis shapes would fail stacking, but the
        // configuration error must win.
        let hypotheses = vec![arr2(&[[1.0]]), arr2(&[[1.0, 2.0]])];
        let labels = arr2(&[[1.0]]);
        let result = wta_loss(
            &hypotheses,
            2,
            &labels,
            &SquaredError,
            &WtaConfig::new(0.3, 2),
        );
        assert!(matches!(result, Err(LossError::Configuration { .. })));
    }
}
