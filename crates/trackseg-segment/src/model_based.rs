// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use std::borrow::Cow;
use std::time::Instant;
use trackseg_core::{
    Diagnostics, ExecutionContext, SegError, SegmentationResult, Segmenter, elapsed_ms,
};

const DEFAULT_PENALTY_FACTOR: f64 = 2.0;

/// Log-likelihood of one row under one candidate parameter.
pub trait LogLikelihood<R, P> {
    fn log_likelihood(&self, row: &R, param: &P) -> f64;
}

impl<R, P, F> LogLikelihood<R, P> for F
where
    F: Fn(&R, &P) -> f64,
{
    fn log_likelihood(&self, row: &R, param: &P) -> f64 {
        self(row, param)
    }
}

/// Configuration for [`ModelBasedSegmentation`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ModelBasedConfig {
    /// Cost `p` paid once for the first row and again at every parameter switch.
    pub penalty_factor: f64,
}

impl Default for ModelBasedConfig {
    fn default() -> Self {
        Self {
            penalty_factor: DEFAULT_PENALTY_FACTOR,
        }
    }
}

impl ModelBasedConfig {
    fn validate(&self) -> Result<(), SegError> {
        if !self.penalty_factor.is_finite() || self.penalty_factor < 0.0 {
            return Err(SegError::invalid_input(format!(
                "ModelBasedConfig.penalty_factor must be finite and >= 0.0; got {}",
                self.penalty_factor
            )));
        }
        Ok(())
    }
}

/// Penalized-likelihood segmentation over a fixed set of candidate parameters.
///
/// `dp[i][j]` is the cheapest information-criterion cost of rows `0..=i` with
/// row `i` explained by candidate `j`:
///
/// ```text
/// dp[0][j] = -2 ll(0, j) + p
/// dp[i][j] = min(dp[i-1][j], min_k dp[i-1][k] + p) - 2 ll(i, j)
/// ```
///
/// A boundary is reported at row `i` whenever the cheapest column of row `i`
/// differs from that of row `i + 1`; the last row always closes a segment.
pub struct ModelBasedSegmentation<P, E> {
    evaluator: E,
    candidates: Vec<P>,
    config: ModelBasedConfig,
}

impl<P, E> ModelBasedSegmentation<P, E> {
    pub fn new(
        evaluator: E,
        candidates: Vec<P>,
        config: ModelBasedConfig,
    ) -> Result<Self, SegError> {
        config.validate()?;
        if candidates.is_empty() {
            return Err(SegError::invalid_input(
                "model-based segmentation requires at least one candidate parameter; got 0",
            ));
        }
        Ok(Self {
            evaluator,
            candidates,
            config,
        })
    }

    pub fn candidates(&self) -> &[P] {
        &self.candidates
    }

    pub fn config(&self) -> &ModelBasedConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }
}

impl<P: std::fmt::Debug, E> std::fmt::Debug for ModelBasedSegmentation<P, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBasedSegmentation")
            .field("candidates", &self.candidates)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq)]
struct DpSweep {
    /// Cheapest column per row, first minimum on ties.
    row_argmin: Vec<usize>,
    objective: f64,
}

fn first_argmin(row: &[f64]) -> (usize, f64) {
    row.iter()
        .copied()
        .enumerate()
        .fold((0, f64::INFINITY), |(best_j, best), (j, v)| {
            if v < best { (j, v) } else { (best_j, best) }
        })
}

fn evaluate_cell<R, P, E>(
    evaluator: &E,
    row: &R,
    param: &P,
    i: usize,
    j: usize,
) -> Result<f64, SegError>
where
    E: LogLikelihood<R, P>,
{
    let ll = evaluator.log_likelihood(row, param);
    if !ll.is_finite() {
        return Err(SegError::numerical_issue(format!(
            "non-finite log-likelihood at row={i}, candidate={j}: {ll}"
        )));
    }
    Ok(-2.0 * ll)
}

fn run_dp_sweep<R, P, E>(
    evaluator: &E,
    rows: &[R],
    candidates: &[P],
    penalty: f64,
    ctx: &ExecutionContext<'_>,
) -> Result<DpSweep, SegError>
where
    E: LogLikelihood<R, P>,
{
    let m = candidates.len();
    let mut row_argmin = Vec::with_capacity(rows.len());
    let mut dp_prev = vec![f64::INFINITY; m];
    let mut dp_curr = vec![f64::INFINITY; m];
    let mut best_prev = f64::INFINITY;

    for (i, row) in rows.iter().enumerate() {
        for (j, param) in candidates.iter().enumerate() {
            let cost = evaluate_cell(evaluator, row, param, i, j)?;
            let carried = if i == 0 {
                penalty
            } else {
                dp_prev[j].min(best_prev + penalty)
            };
            let cell = carried + cost;
            if !cell.is_finite() {
                return Err(SegError::numerical_issue(format!(
                    "non-finite dp cell at row={i}, candidate={j}: {cell}"
                )));
            }
            dp_curr[j] = cell;
        }

        let (argmin, best) = first_argmin(&dp_curr);
        row_argmin.push(argmin);
        best_prev = best;
        std::mem::swap(&mut dp_prev, &mut dp_curr);
        ctx.report_progress((i + 1) as f32 / rows.len() as f32);
    }

    Ok(DpSweep {
        row_argmin,
        objective: if rows.is_empty() { 0.0 } else { best_prev },
    })
}

/// Boundaries in ascending order, each paired with the column that closed it.
fn backtrack(row_argmin: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let mut boundaries = Vec::new();
    let mut labels = Vec::new();
    for (i, &col) in row_argmin.iter().enumerate() {
        let closes = row_argmin.get(i + 1).is_none_or(|&next| next != col);
        if closes {
            boundaries.push(i);
            labels.push(col);
        }
    }
    (boundaries, labels)
}

impl<R, P, E> Segmenter<R> for ModelBasedSegmentation<P, E>
where
    E: LogLikelihood<R, P>,
{
    fn segment(
        &self,
        rows: &[R],
        ctx: &ExecutionContext<'_>,
    ) -> Result<SegmentationResult, SegError> {
        self.config.validate()?;
        let n = rows.len();
        let m = self.candidates.len();
        let cells = n.checked_mul(m).ok_or_else(|| {
            SegError::resource_limit(format!("dp table size overflow: rows={n}, candidates={m}"))
        })?;

        let started_at = Instant::now();
        let sweep = run_dp_sweep(
            &self.evaluator,
            rows,
            &self.candidates,
            self.config.penalty_factor,
            ctx,
        )?;
        let (boundaries, labels) = backtrack(&sweep.row_argmin);

        let runtime_ms = elapsed_ms(started_at);
        ctx.record_scalar("segment.model_based.cells", cells as f64);
        ctx.record_scalar("segment.model_based.segments", boundaries.len() as f64);
        ctx.record_scalar("segment.model_based.runtime_ms", runtime_ms as f64);
        ctx.report_progress(1.0);

        log::debug!(
            "model-based segmentation: rows={n}, candidates={m}, penalty={}, segments={}, objective={}",
            self.config.penalty_factor,
            boundaries.len(),
            sweep.objective
        );

        let diagnostics = Diagnostics {
            n,
            runtime_ms: Some(runtime_ms),
            notes: vec![
                format!(
                    "candidates={m}, penalty_factor={}",
                    self.config.penalty_factor
                ),
                format!("final_objective={}", sweep.objective),
            ],
            algorithm: Cow::Borrowed("model_based"),
            criterion: Cow::Borrowed("information_criterion"),
            evaluations: Some(cells),
            ..Diagnostics::default()
        };

        #[cfg(feature = "serde")]
        let diagnostics = diagnostics.with_params(&self.config);

        SegmentationResult::new(n, boundaries, diagnostics)?.with_labels(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::{LogLikelihood, ModelBasedConfig, ModelBasedSegmentation, backtrack, first_argmin};
    use trackseg_core::{ExecutionContext, SegError, Segmenter};

    const LOG_TWO_PI: f64 = 1.837877066409345;

    fn gaussian_ll(d2: &f64, sigma2: &f64) -> f64 {
        -LOG_TWO_PI - sigma2.ln() - d2 / (2.0 * sigma2)
    }

    fn two_regime_rows() -> Vec<f64> {
        let mut rows = vec![1.0; 20];
        rows.extend(std::iter::repeat_n(100.0, 20));
        rows
    }

    #[test]
    fn config_defaults_and_validation() {
        assert_eq!(ModelBasedConfig::default().penalty_factor, 2.0);
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let err = ModelBasedSegmentation::new(
                gaussian_ll,
                vec![1.0],
                ModelBasedConfig {
                    penalty_factor: bad,
                },
            )
            .expect_err("invalid penalty");
            assert!(matches!(err, SegError::InvalidInput(_)));
        }
    }

    #[test]
    fn zero_candidates_are_rejected() {
        let err = ModelBasedSegmentation::new(
            gaussian_ll,
            Vec::<f64>::new(),
            ModelBasedConfig::default(),
        )
        .expect_err("no candidates");
        assert!(matches!(err, SegError::InvalidInput(_)));
    }

    #[test]
    fn recovers_single_change_between_regimes() {
        let rows = two_regime_rows();
        for penalty_factor in [10.0, (rows.len() as f64).ln()] {
            let driver = ModelBasedSegmentation::new(
                gaussian_ll,
                vec![0.5, 5.0, 50.0, 500.0, 5000.0],
                ModelBasedConfig { penalty_factor },
            )
            .expect("valid config");
            let result = driver
                .segment(&rows, &ExecutionContext::new())
                .expect("segment should succeed");
            assert_eq!(result.boundaries, vec![19, 39]);
            assert_eq!(result.change_points, vec![20]);
            assert_eq!(result.labels, Some(vec![0, 2]));
            assert_eq!(result.diagnostics.evaluations, Some(200));
        }
    }

    #[test]
    fn single_candidate_yields_one_segment() {
        let driver =
            ModelBasedSegmentation::new(gaussian_ll, vec![3.0], ModelBasedConfig::default())
                .expect("valid config");
        for n in 1..12 {
            let rows: Vec<f64> = (0..n).map(|i| f64::from(i * i)).collect();
            let result = driver
                .segment(&rows, &ExecutionContext::new())
                .expect("segment should succeed");
            assert_eq!(result.boundaries, vec![rows.len() - 1]);
        }
    }

    #[test]
    fn empty_rows_yield_empty_result() {
        let driver = ModelBasedSegmentation::new(
            gaussian_ll,
            vec![1.0, 2.0],
            ModelBasedConfig::default(),
        )
        .expect("valid config");
        let result = driver
            .segment(&[] as &[f64], &ExecutionContext::new())
            .expect("empty input is defined");
        assert!(result.is_empty());
        assert_eq!(result.labels, Some(vec![]));
    }

    #[test]
    fn non_finite_log_likelihood_is_a_numerical_issue() {
        let driver = ModelBasedSegmentation::new(
            |row: &f64, _param: &f64| if *row > 1.0 { f64::NAN } else { 0.0 },
            vec![1.0],
            ModelBasedConfig::default(),
        )
        .expect("valid config");
        let err = driver
            .segment(&[0.0, 2.0], &ExecutionContext::new())
            .expect_err("NaN log-likelihood");
        assert!(matches!(err, SegError::NumericalIssue(_)));
    }

    #[test]
    fn struct_evaluators_are_supported() {
        struct Table(Vec<Vec<f64>>);
        impl LogLikelihood<usize, usize> for Table {
            fn log_likelihood(&self, row: &usize, param: &usize) -> f64 {
                self.0[*row][*param]
            }
        }
        let table = Table(vec![
            vec![0.0, -50.0],
            vec![0.0, -50.0],
            vec![-50.0, 0.0],
            vec![-50.0, 0.0],
        ]);
        let driver = ModelBasedSegmentation::new(table, vec![0, 1], ModelBasedConfig::default())
            .expect("valid config");
        let result = driver
            .segment(&[0, 1, 2, 3], &ExecutionContext::new())
            .expect("segment should succeed");
        assert_eq!(result.boundaries, vec![1, 3]);
    }

    #[test]
    fn ties_pick_first_column_and_backtrack_is_ascending() {
        assert_eq!(first_argmin(&[2.0, 1.0, 1.0]), (1, 1.0));
        let (boundaries, labels) = backtrack(&[0, 0, 1, 1, 1, 0]);
        assert_eq!(boundaries, vec![1, 4, 5]);
        assert_eq!(labels, vec![0, 1, 0]);
    }
}
