// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::legs::{BridgeLeg, Fix, PlanarFix, build_legs_planar, project_fixes};
use crate::likelihood::BridgeLogLikelihood;
use crate::mle::{BridgeVarianceEstimator, MleConfig};
use crate::selector::select_candidates;
use crate::window::estimate_window_variances;
use std::borrow::Cow;
use std::time::Instant;
use trackseg_core::{
    Diagnostics, ExecutionContext, PlanarProjection, SegError, SegmentationResult, Segmenter,
    elapsed_ms,
};
use trackseg_segment::{
    ModelBasedConfig, ModelBasedSegmentation, SegmentIdCursor, StartStopDiagram,
};

const DEFAULT_CANDIDATE_COUNT: usize = 5;
const DEFAULT_WINDOW: usize = 1;

/// Penalty paid per parameter switch by the model-based stage.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Penalty {
    Manual(f64),
    /// `ln(rows)`.
    Bic,
}

impl Penalty {
    pub fn parse(raw: &str) -> Result<Self, SegError> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("bic") {
            return Ok(Self::Bic);
        }
        let value: f64 = trimmed.parse().map_err(|_| {
            SegError::invalid_input(format!(
                "penalty must be 'bic' or a number; got '{trimmed}'"
            ))
        })?;
        let penalty = Self::Manual(value);
        penalty.validate()?;
        Ok(penalty)
    }

    fn validate(&self) -> Result<(), SegError> {
        if let Self::Manual(value) = self
            && (!value.is_finite() || *value < 0.0)
        {
            return Err(SegError::invalid_input(format!(
                "manual penalty must be finite and >= 0.0; got {value}"
            )));
        }
        Ok(())
    }

    /// Penalty value for a table with `rows` rows.
    pub fn resolve(&self, rows: usize) -> f64 {
        match self {
            Self::Manual(value) => *value,
            Self::Bic => (rows.max(1) as f64).ln(),
        }
    }
}

/// Configuration for [`BbmmSegmentation`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct BbmmConfig {
    /// Number of candidate variances offered to the model-based stage;
    /// clamped to the number of legs.
    pub candidate_count: usize,
    pub penalty: Penalty,
    /// Legs per variance-estimation window.
    pub window: usize,
    pub mle: MleConfig,
}

impl Default for BbmmConfig {
    fn default() -> Self {
        Self {
            candidate_count: DEFAULT_CANDIDATE_COUNT,
            penalty: Penalty::Bic,
            window: DEFAULT_WINDOW,
            mle: MleConfig::default(),
        }
    }
}

impl BbmmConfig {
    fn validate(&self) -> Result<(), SegError> {
        if self.candidate_count == 0 {
            return Err(SegError::invalid_input(
                "BbmmConfig.candidate_count must be >= 1; got 0",
            ));
        }
        if self.window == 0 {
            return Err(SegError::invalid_input(
                "BbmmConfig.window must be >= 1; got 0",
            ));
        }
        self.penalty.validate()?;
        // Surface MLE misconfiguration at construction time.
        BridgeVarianceEstimator::new(self.mle.clone())?;
        Ok(())
    }
}

/// Everything the pipeline produced for one trajectory.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct BbmmOutcome {
    /// Legs with their estimated variances.
    pub legs: Vec<BridgeLeg>,
    /// Candidate variances, indexed by the labels of `leg_result`.
    pub candidates: Vec<f64>,
    /// Segmentation over legs; one label (candidate index) per segment.
    pub leg_result: SegmentationResult,
    /// Half-open fix-index range covered by every segment.
    pub fix_ranges: Vec<(usize, usize)>,
    /// Segment id of every fix.
    pub fix_segment_ids: Vec<usize>,
}

impl BbmmOutcome {
    fn empty(diagnostics: Diagnostics) -> Result<Self, SegError> {
        Ok(Self {
            legs: vec![],
            candidates: vec![],
            leg_result: SegmentationResult::new(0, vec![], diagnostics)?.with_labels(vec![])?,
            fix_ranges: vec![],
            fix_segment_ids: vec![],
        })
    }

    /// Estimated variance of every segment.
    pub fn segment_variances(&self) -> Vec<f64> {
        self.leg_result
            .labels
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|&label| self.candidates[label])
            .collect()
    }
}

/// End-to-end Brownian-bridge segmentation: fixes to legs, per-window
/// variance estimates, candidate selection, then model-based segmentation of
/// the legs under the bridge log-likelihood.
#[derive(Debug)]
pub struct BbmmSegmentation {
    config: BbmmConfig,
}

impl BbmmSegmentation {
    pub fn new(config: BbmmConfig) -> Result<Self, SegError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BbmmConfig {
        &self.config
    }

    /// Runs the pipeline on geographic fixes projected around the first fix.
    pub fn segment_fixes<P: PlanarProjection>(
        &self,
        fixes: &[Fix],
        ctx: &ExecutionContext<'_>,
    ) -> Result<BbmmOutcome, SegError> {
        self.segment_planar(&project_fixes::<P>(fixes)?, ctx)
    }

    /// Runs the pipeline on fixes already in a planar frame.
    pub fn segment_planar(
        &self,
        fixes: &[PlanarFix],
        ctx: &ExecutionContext<'_>,
    ) -> Result<BbmmOutcome, SegError> {
        let started_at = Instant::now();
        let n = fixes.len();
        let mut legs = build_legs_planar(fixes)?;
        if legs.is_empty() {
            return BbmmOutcome::empty(self.diagnostics(0, 0, started_at, vec![], vec![]));
        }
        ctx.report_progress(0.1);

        // One estimator per call keeps the pipeline shareable across threads.
        let mut estimator = BridgeVarianceEstimator::new(self.config.mle.clone())?;
        let stats = estimate_window_variances(&mut legs, self.config.window, &mut estimator)?;
        ctx.record_scalar("bbmm.mle.windows", stats.windows as f64);
        ctx.record_scalar("bbmm.mle.iterations", stats.iterations as f64);
        ctx.report_progress(0.5);

        let mut warnings = vec![];
        if stats.unconverged > 0 {
            warnings.push(format!(
                "{} of {} variance windows hit max_iter={} before converging",
                stats.unconverged, stats.windows, self.config.mle.max_iter
            ));
        }
        let k = self.config.candidate_count.min(legs.len());
        if k < self.config.candidate_count {
            warnings.push(format!(
                "candidate_count={} reduced to {k} (number of legs)",
                self.config.candidate_count
            ));
        }
        let variances: Vec<f64> = legs.iter().map(|leg| leg.variance).collect();
        let candidates = select_candidates(&variances, k)?;

        let penalty_factor = self.config.penalty.resolve(legs.len());
        let driver = ModelBasedSegmentation::new(
            BridgeLogLikelihood,
            candidates.clone(),
            ModelBasedConfig { penalty_factor },
        )?;
        let leg_result = driver.segment(&legs, &ctx.without_progress())?;

        let (fix_ranges, fix_segment_ids) = map_to_fixes(n, &legs, &leg_result.boundaries)?;
        let notes = vec![
            format!(
                "legs={}, window={}, candidates={candidates:?}",
                legs.len(),
                self.config.window
            ),
            format!(
                "penalty={:?}, penalty_factor={penalty_factor}",
                self.config.penalty
            ),
        ];
        log::debug!(
            "bbmm segmentation: fixes={n}, legs={}, segments={}, penalty_factor={penalty_factor}",
            legs.len(),
            leg_result.boundaries.len()
        );

        let mut leg_result = leg_result;
        leg_result.diagnostics = self.diagnostics(
            n,
            legs.len().saturating_mul(k),
            started_at,
            notes,
            warnings,
        );
        ctx.report_progress(1.0);

        Ok(BbmmOutcome {
            legs,
            candidates,
            leg_result,
            fix_ranges,
            fix_segment_ids,
        })
    }

    fn diagnostics(
        &self,
        n: usize,
        evaluations: usize,
        started_at: Instant,
        notes: Vec<String>,
        warnings: Vec<String>,
    ) -> Diagnostics {
        let diagnostics = Diagnostics {
            n,
            runtime_ms: Some(elapsed_ms(started_at)),
            notes,
            warnings,
            algorithm: Cow::Borrowed("bbmm"),
            criterion: Cow::Borrowed("bridge_log_likelihood"),
            evaluations: Some(evaluations),
            ..Diagnostics::default()
        };
        #[cfg(feature = "serde")]
        let diagnostics = diagnostics.with_params(&self.config);
        diagnostics
    }
}

/// Maps segment boundaries over legs to fix ranges and per-fix segment ids.
///
/// Each fix takes the id of the leg whose range covers it; the final fix,
/// which no range covers, takes the id of the last leg.
fn map_to_fixes(
    n: usize,
    legs: &[BridgeLeg],
    leg_boundaries: &[usize],
) -> Result<(Vec<(usize, usize)>, Vec<usize>), SegError> {
    let mut cursor = SegmentIdCursor::new(leg_boundaries)?;
    let mut ids = vec![0usize; n];
    for (leg_idx, leg) in legs.iter().enumerate() {
        let id = cursor.segment_id(leg_idx);
        for slot in &mut ids[leg.begin..leg.end] {
            *slot = id;
        }
    }
    if let Some(last) = ids.last_mut() {
        *last = cursor.segment_id(legs.len().saturating_sub(1));
    }

    let ranges = StartStopDiagram::from_segment_ids(ids.iter().copied()).segment_ranges();
    Ok((ranges, ids))
}

impl Segmenter<PlanarFix> for BbmmSegmentation {
    /// Segmentation over fixes; labels are candidate indices.
    fn segment(
        &self,
        values: &[PlanarFix],
        ctx: &ExecutionContext<'_>,
    ) -> Result<SegmentationResult, SegError> {
        let outcome = self.segment_planar(values, ctx)?;
        let boundaries: Vec<usize> = outcome.fix_ranges.iter().map(|&(_, end)| end - 1).collect();
        let labels = outcome.leg_result.labels.clone().unwrap_or_default();
        let mut diagnostics = outcome.leg_result.diagnostics;
        diagnostics.n = values.len();
        SegmentationResult::new(values.len(), boundaries, diagnostics)?.with_labels(labels)
    }
}
