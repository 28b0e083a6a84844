// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::monotone::{MonotoneSegmentation, MonotoneSegmentationConfig};
use crate::ssd::StartStopDiagram;
use std::borrow::Cow;
use std::time::Instant;
use trackseg_core::{
    Diagnostics, ExecutionContext, SegError, SegmentationResult, Segmenter, elapsed_ms,
};
use trackseg_criteria::RangePredicate;

/// How per-criterion segmentations are merged.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombineMode {
    /// Every criterion must hold inside a segment (conjunction).
    All,
    /// Any one criterion may hold inside a segment (disjunction).
    Any,
}

impl CombineMode {
    pub fn parse(raw: &str) -> Result<Self, SegError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "and" | "all" | "conjunction" => Ok(Self::All),
            "or" | "any" | "disjunction" => Ok(Self::Any),
            other => Err(SegError::invalid_input(format!(
                "unsupported combine mode '{other}'; expected and|or"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "and",
            Self::Any => "or",
        }
    }
}

/// Folds diagrams left to right with the operator selected by `mode`.
pub fn combine_diagrams(
    diagrams: &[StartStopDiagram],
    mode: CombineMode,
) -> Result<StartStopDiagram, SegError> {
    let (first, rest) = diagrams.split_first().ok_or_else(|| {
        SegError::invalid_input("combine_diagrams requires at least one diagram")
    })?;
    rest.iter().try_fold(first.clone(), |acc, next| match mode {
        CombineMode::All => acc.conjunction(next),
        CombineMode::Any => acc.disjunction(next),
    })
}

/// Per-criterion diagrams of one sequence and their combination.
#[derive(Clone, Debug, PartialEq)]
pub struct CombinedDiagrams {
    /// One diagram per criterion, in criterion order.
    pub per_criterion: Vec<StartStopDiagram>,
    /// Predicate evaluations spent on each criterion.
    pub evaluations: Vec<usize>,
    pub combined: StartStopDiagram,
}

impl CombinedDiagrams {
    pub fn total_evaluations(&self) -> usize {
        self.evaluations
            .iter()
            .copied()
            .fold(0usize, usize::saturating_add)
    }
}

/// Monotone segmentation of one sequence under several criteria, merged into
/// a single segmentation through the start-stop algebra.
#[derive(Debug)]
pub struct CombinedSegmentation<P> {
    drivers: Vec<MonotoneSegmentation<P>>,
    mode: CombineMode,
}

impl<P> CombinedSegmentation<P> {
    pub fn new(
        predicates: Vec<P>,
        mode: CombineMode,
        config: MonotoneSegmentationConfig,
    ) -> Result<Self, SegError> {
        if predicates.is_empty() {
            return Err(SegError::invalid_input(
                "combined segmentation requires at least one criterion; got 0",
            ));
        }
        let drivers = predicates
            .into_iter()
            .map(|predicate| MonotoneSegmentation::new(predicate, config.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { drivers, mode })
    }

    pub fn mode(&self) -> CombineMode {
        self.mode
    }

    pub fn drivers(&self) -> &[MonotoneSegmentation<P>] {
        &self.drivers
    }

    /// Per-criterion diagrams followed by their combination.
    ///
    /// Touches no execution context; callers own progress and telemetry.
    pub fn diagrams<T>(&self, values: &[T]) -> Result<CombinedDiagrams, SegError>
    where
        P: RangePredicate<T>,
    {
        let n = values.len();
        let mut evaluations = Vec::with_capacity(self.drivers.len());
        let mut per_criterion = Vec::with_capacity(self.drivers.len());
        for driver in &self.drivers {
            let mut boundaries = Vec::new();
            evaluations.push(driver.for_each_boundary(values, |b| boundaries.push(b)));
            per_criterion.push(StartStopDiagram::from_boundaries(n, &boundaries)?);
        }
        let combined = combine_diagrams(&per_criterion, self.mode)?;
        Ok(CombinedDiagrams {
            per_criterion,
            evaluations,
            combined,
        })
    }
}

impl<T, P> Segmenter<T> for CombinedSegmentation<P>
where
    P: RangePredicate<T>,
{
    fn segment(
        &self,
        values: &[T],
        ctx: &ExecutionContext<'_>,
    ) -> Result<SegmentationResult, SegError> {
        let n = values.len();
        let started_at = Instant::now();
        let diagrams = self.diagrams(values)?;
        let evaluations = diagrams.total_evaluations();
        let boundaries = diagrams.combined.boundaries();

        let runtime_ms = elapsed_ms(started_at);
        ctx.record_scalar("segment.combined.predicate_evals", evaluations as f64);
        ctx.record_scalar("segment.combined.segments", boundaries.len() as f64);
        ctx.report_progress(1.0);

        let mut notes = vec![format!(
            "mode={}, criteria={}",
            self.mode.as_str(),
            self.drivers.len()
        )];
        for (driver, diagram) in self.drivers.iter().zip(&diagrams.per_criterion) {
            let predicate = driver.predicate();
            notes.push(format!(
                "{}(threshold={}): segments={}",
                predicate.name(),
                predicate.threshold(),
                diagram.boundaries().len()
            ));
        }
        log::debug!(
            "combined segmentation: mode={}, n={n}, segments={}",
            self.mode.as_str(),
            boundaries.len()
        );

        let diagnostics = Diagnostics {
            n,
            runtime_ms: Some(runtime_ms),
            notes,
            algorithm: Cow::Borrowed("monotone_combined"),
            criterion: Cow::Borrowed(self.mode.as_str()),
            evaluations: Some(evaluations),
            ..Diagnostics::default()
        };

        SegmentationResult::new(n, boundaries, diagnostics)
    }
}
