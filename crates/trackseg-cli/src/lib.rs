// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use serde::Serialize;
use std::borrow::Cow;
use std::time::Instant;
use trackseg_bbmm::{BbmmConfig, BbmmOutcome, BbmmSegmentation, Fix};
use trackseg_core::{
    Diagnostics, ExecutionContext, LocalCoordinateReference, Point2, SegError, SegmentationResult,
    elapsed_ms,
};
use trackseg_criteria::{
    EnclosingBallRadius, RangePredicate, ScalarCriterionKind, ScalarPredicate,
};
use trackseg_segment::{
    CombineMode, CombinedSegmentation, MonotoneSegmentationConfig, StartStopDiagram,
    combine_diagrams,
};

/// Row-major numeric table loaded from CSV.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub values: Vec<f64>,
    pub rows: usize,
    pub cols: usize,
}

impl Table {
    pub fn new(values: Vec<f64>, rows: usize, cols: usize) -> Result<Self, SegError> {
        let expected = rows.checked_mul(cols).ok_or_else(|| {
            SegError::resource_limit(format!("table shape overflows: rows={rows}, cols={cols}"))
        })?;
        if values.len() != expected {
            return Err(SegError::invalid_input(format!(
                "table holds {} values but shape is {rows}x{cols}",
                values.len()
            )));
        }
        Ok(Self { values, rows, cols })
    }

    pub fn column(&self, col: usize) -> Result<Vec<f64>, SegError> {
        if col >= self.cols {
            return Err(SegError::invalid_input(format!(
                "column {col} out of range; table has {} columns",
                self.cols
            )));
        }
        Ok(self
            .values
            .chunks_exact(self.cols)
            .map(|row| row[col])
            .collect())
    }

    /// Points built from columns `col` and `col + 1`.
    pub fn points(&self, col: usize) -> Result<Vec<Point2>, SegError> {
        let xs = self.column(col)?;
        let ys = self.column(col + 1).map_err(|_| {
            SegError::invalid_input(format!(
                "meb criterion reads columns {col} and {}; table has {} columns",
                col + 1,
                self.cols
            ))
        })?;
        Ok(xs
            .into_iter()
            .zip(ys)
            .map(|(x, y)| Point2::new(x, y))
            .collect())
    }

    /// Fixes from the first three columns as `lat, lon, time`.
    pub fn fixes(&self) -> Result<Vec<Fix>, SegError> {
        if self.cols < 3 {
            return Err(SegError::invalid_input(format!(
                "bbmm input needs lat,lon,time columns; got {} columns",
                self.cols
            )));
        }
        Ok(self
            .values
            .chunks_exact(self.cols)
            .map(|row| Fix {
                lat: row[0],
                lon: row[1],
                time: row[2],
            })
            .collect())
    }
}

/// One criterion requested on the command line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CriterionSpec {
    Scalar(ScalarPredicate),
    EnclosingBall(EnclosingBallRadius),
}

impl CriterionSpec {
    pub fn parse(name: &str, threshold: f64) -> Result<Self, SegError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "meb" | "enclosing_ball" | "enclosing_ball_radius" => Ok(Self::EnclosingBall(
                EnclosingBallRadius::new(threshold)?,
            )),
            other => {
                let kind = ScalarCriterionKind::parse(other).map_err(|_| {
                    SegError::invalid_input(format!(
                        "unsupported criterion '{name}'; expected one of difference|ratio|range|meb"
                    ))
                })?;
                Ok(Self::Scalar(ScalarPredicate::new(kind, threshold)?))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Scalar(predicate) => predicate.name(),
            Self::EnclosingBall(predicate) => predicate.name(),
        }
    }

    pub fn threshold(&self) -> f64 {
        match self {
            Self::Scalar(predicate) => predicate.threshold(),
            Self::EnclosingBall(predicate) => predicate.threshold(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SegmentRequest {
    pub column: usize,
    pub criteria: Vec<CriterionSpec>,
    pub mode: CombineMode,
    pub config: MonotoneSegmentationConfig,
}

#[derive(Clone, Debug, Serialize)]
pub struct CriterionReport {
    pub criterion: &'static str,
    pub threshold: f64,
    pub boundaries: Vec<usize>,
    pub evaluations: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct SegmentReport {
    pub mode: &'static str,
    pub criteria: Vec<CriterionReport>,
    pub result: SegmentationResult,
    pub segment_ranges: Vec<(usize, usize)>,
    pub segment_ids: Vec<usize>,
}

/// Segments one table column under every requested criterion and merges the
/// per-criterion segmentations with the requested mode.
///
/// Scalar criteria read column `column`; enclosing-ball criteria read the
/// points in columns `column` and `column + 1`. Each input kind runs as one
/// [`CombinedSegmentation`] and the two combined diagrams are merged with the
/// same mode.
pub fn run_segment(
    table: &Table,
    request: &SegmentRequest,
    ctx: &ExecutionContext<'_>,
) -> Result<SegmentReport, SegError> {
    if request.criteria.is_empty() {
        return Err(SegError::invalid_input(
            "segment requires at least one --criterion",
        ));
    }
    let started_at = Instant::now();
    let n = table.rows;

    let mut scalar = Vec::new();
    let mut balls = Vec::new();
    for (idx, spec) in request.criteria.iter().enumerate() {
        match spec {
            CriterionSpec::Scalar(predicate) => scalar.push((idx, *predicate)),
            CriterionSpec::EnclosingBall(predicate) => balls.push((idx, *predicate)),
        }
    }
    let groups = usize::from(!scalar.is_empty()) + usize::from(!balls.is_empty());

    let mut slots: Vec<Option<CriterionReport>> = vec![None; request.criteria.len()];
    let mut group_diagrams = Vec::with_capacity(groups);
    if !scalar.is_empty() {
        let values = table.column(request.column)?;
        group_diagrams.push(run_group(scalar, &values, request, &mut slots)?);
        ctx.report_progress(group_diagrams.len() as f32 / groups as f32);
    }
    if !balls.is_empty() {
        let points = table.points(request.column)?;
        group_diagrams.push(run_group(balls, &points, request, &mut slots)?);
        ctx.report_progress(group_diagrams.len() as f32 / groups as f32);
    }
    let combined = combine_diagrams(&group_diagrams, request.mode)?;
    let reports: Vec<CriterionReport> = slots.into_iter().flatten().collect();

    let evaluations = reports
        .iter()
        .map(|report| report.evaluations)
        .fold(0usize, usize::saturating_add);
    let boundaries = combined.boundaries();
    let runtime_ms = elapsed_ms(started_at);
    ctx.record_scalar("segment.combined.predicate_evals", evaluations as f64);
    ctx.record_scalar("segment.combined.segments", boundaries.len() as f64);
    ctx.report_progress(1.0);

    let names: Vec<&str> = reports.iter().map(|report| report.criterion).collect();
    let mut notes = vec![format!(
        "mode={}, criteria={}",
        request.mode.as_str(),
        names.join(",")
    )];
    notes.extend(reports.iter().map(|report| {
        format!(
            "{}(threshold={}): segments={}, predicate_evals={}",
            report.criterion,
            report.threshold,
            report.boundaries.len(),
            report.evaluations
        )
    }));
    let algorithm = if reports.len() == 1 {
        "monotone"
    } else {
        "monotone_combined"
    };
    let diagnostics = Diagnostics {
        n,
        runtime_ms: Some(runtime_ms),
        notes,
        algorithm: Cow::Borrowed(algorithm),
        criterion: Cow::Owned(names.join("+")),
        evaluations: Some(evaluations),
        ..Diagnostics::default()
    }
    .with_params(&request.config);
    let result = SegmentationResult::new(n, boundaries, diagnostics)?;

    log::debug!(
        "segment command: n={n}, criteria={}, mode={}, segments={}",
        reports.len(),
        request.mode.as_str(),
        result.boundaries.len()
    );

    Ok(SegmentReport {
        mode: request.mode.as_str(),
        criteria: reports,
        segment_ranges: combined.segment_ranges(),
        segment_ids: combined.segment_ids(),
        result,
    })
}

/// Runs the criteria that share one input kind and files their reports under
/// their request positions.
fn run_group<T, P>(
    criteria: Vec<(usize, P)>,
    values: &[T],
    request: &SegmentRequest,
    slots: &mut [Option<CriterionReport>],
) -> Result<StartStopDiagram, SegError>
where
    P: RangePredicate<T>,
{
    let (positions, predicates): (Vec<usize>, Vec<P>) = criteria.into_iter().unzip();
    let segmentation =
        CombinedSegmentation::new(predicates, request.mode, request.config.clone())?;
    let diagrams = segmentation.diagrams(values)?;
    let runs = segmentation
        .drivers()
        .iter()
        .zip(&diagrams.per_criterion)
        .zip(&diagrams.evaluations);
    for (&position, ((driver, diagram), &evaluations)) in positions.iter().zip(runs) {
        let predicate = driver.predicate();
        slots[position] = Some(CriterionReport {
            criterion: predicate.name(),
            threshold: predicate.threshold(),
            boundaries: diagram.boundaries(),
            evaluations,
        });
    }
    Ok(diagrams.combined)
}

/// Runs the Brownian-bridge pipeline on geographic fixes.
pub fn run_bbmm(
    fixes: &[Fix],
    config: BbmmConfig,
    ctx: &ExecutionContext<'_>,
) -> Result<BbmmOutcome, SegError> {
    BbmmSegmentation::new(config)?.segment_fixes::<LocalCoordinateReference>(fixes, ctx)
}

/// CLI namespace.
pub fn crate_name() -> &'static str {
    let _ = (
        trackseg_core::crate_name(),
        trackseg_segment::crate_name(),
        trackseg_bbmm::crate_name(),
    );
    "trackseg-cli"
}
