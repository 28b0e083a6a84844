// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

#[cfg(feature = "rayon")]
use rayon::prelude::*;
use trackseg_core::{ExecutionContext, SegError, SegmentationResult, Segmenter};

/// Segments independent trajectories with one shared driver.
///
/// Results are returned in input order and each trajectory fails on its own.
/// Per-trajectory telemetry goes to `ctx`; progress is reported per finished
/// trajectory. With the `rayon` feature and `parallel` set, trajectories are
/// processed on the global rayon pool.
pub fn segment_batch<T, V, S>(
    segmenter: &S,
    trajectories: &[V],
    parallel: bool,
    ctx: &ExecutionContext<'_>,
) -> Vec<Result<SegmentationResult, SegError>>
where
    S: Segmenter<T> + Sync + ?Sized,
    V: AsRef<[T]> + Sync,
    T: Sync,
{
    let inner = ExecutionContext {
        progress: None,
        telemetry: ctx.telemetry,
    };
    let total = trajectories.len();

    #[cfg(feature = "rayon")]
    if parallel {
        log::debug!(
            "batch segmentation: trajectories={total}, threads={}",
            rayon::current_num_threads()
        );
        let results: Vec<_> = trajectories
            .par_iter()
            .map(|trajectory| segmenter.segment(trajectory.as_ref(), &inner))
            .collect();
        ctx.record_scalar("segment.batch.trajectories", total as f64);
        ctx.report_progress(1.0);
        return results;
    }

    #[cfg(not(feature = "rayon"))]
    if parallel {
        log::debug!("batch segmentation: rayon feature disabled, running sequentially");
    }

    let mut results = Vec::with_capacity(total);
    for (idx, trajectory) in trajectories.iter().enumerate() {
        results.push(segmenter.segment(trajectory.as_ref(), &inner));
        ctx.report_progress((idx + 1) as f32 / total as f32);
    }
    ctx.record_scalar("segment.batch.trajectories", total as f64);
    ctx.report_progress(1.0);
    results
}
