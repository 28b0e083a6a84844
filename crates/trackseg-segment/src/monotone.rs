// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::boundary_search::last_true_length;
use std::borrow::Cow;
use std::time::Instant;
use trackseg_core::{
    Diagnostics, ExecutionContext, SegError, SegmentationResult, Segmenter, elapsed_ms,
};
use trackseg_criteria::RangePredicate;

const DEFAULT_MIN_SEGMENT_LEN: usize = 2;

/// Configuration for [`MonotoneSegmentation`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonotoneSegmentationConfig {
    /// Refined segment lengths shorter than this are raised to
    /// `min(min_segment_len, remainder)`. A predicate that already fails on
    /// two elements would otherwise yield a run of single-element segments.
    pub min_segment_len: usize,
}

impl Default for MonotoneSegmentationConfig {
    fn default() -> Self {
        Self {
            min_segment_len: DEFAULT_MIN_SEGMENT_LEN,
        }
    }
}

impl MonotoneSegmentationConfig {
    fn validate(&self) -> Result<(), SegError> {
        if self.min_segment_len == 0 {
            return Err(SegError::invalid_input(
                "MonotoneSegmentationConfig.min_segment_len must be >= 1; got 0",
            ));
        }
        Ok(())
    }
}

/// Galloping-then-bisecting segmentation under a monotone range predicate.
///
/// From each segment start the candidate length doubles while the predicate
/// holds, then [`last_true_length`] pins the exact boundary inside the last
/// doubling step. Segments tile the input and the predicate is evaluated
/// `O(n log n)` times overall.
#[derive(Debug)]
pub struct MonotoneSegmentation<P> {
    predicate: P,
    config: MonotoneSegmentationConfig,
}

impl<P> MonotoneSegmentation<P> {
    pub fn new(predicate: P, config: MonotoneSegmentationConfig) -> Result<Self, SegError> {
        config.validate()?;
        Ok(Self { predicate, config })
    }

    pub fn predicate(&self) -> &P {
        &self.predicate
    }

    pub fn config(&self) -> &MonotoneSegmentationConfig {
        &self.config
    }

    /// Streams the last index of every segment to `sink` in increasing order.
    ///
    /// Returns the number of predicate evaluations performed.
    pub fn for_each_boundary<T, F>(&self, values: &[T], mut sink: F) -> usize
    where
        P: RangePredicate<T>,
        F: FnMut(usize),
    {
        let n = values.len();
        let mut evaluations = 0usize;
        let mut start = 0usize;

        while start < n {
            let remainder = n - start;
            let mut holds = |len: usize| {
                evaluations = evaluations.saturating_add(1);
                self.predicate.holds(&values[start..start + len])
            };
            let len = next_segment_len(remainder, self.config.min_segment_len, &mut holds);
            start += len;
            sink(start - 1);
        }

        evaluations
    }

    /// Collects the boundaries produced by [`Self::for_each_boundary`].
    pub fn boundaries<T>(&self, values: &[T]) -> Vec<usize>
    where
        P: RangePredicate<T>,
    {
        let mut out = Vec::new();
        self.for_each_boundary(values, |b| out.push(b));
        out
    }
}

/// Length of the segment that starts with `remainder` elements left.
///
/// Always in `1..=remainder`.
fn next_segment_len<F>(remainder: usize, min_segment_len: usize, holds: &mut F) -> usize
where
    F: FnMut(usize) -> bool,
{
    debug_assert!(remainder > 0);
    let floor_len = min_segment_len.min(remainder);
    let cap = remainder.ilog2();
    let mut step = 1u32;
    let mut candidate = 2usize;

    while step <= cap {
        if holds(candidate) {
            candidate *= 2;
            step += 1;
        } else {
            let refined = last_true_length(candidate / 2, candidate, &mut *holds);
            return refined.max(floor_len);
        }
    }

    // Doubling overshot the tail: `candidate / 2 <= remainder < candidate`.
    if holds(remainder) {
        return remainder;
    }
    last_true_length(candidate / 2, remainder, &mut *holds).max(floor_len)
}

impl<T, P> Segmenter<T> for MonotoneSegmentation<P>
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
        let mut boundaries = Vec::new();

        let evaluations = self.for_each_boundary(values, |boundary| {
            boundaries.push(boundary);
            ctx.report_progress((boundary + 1) as f32 / n as f32);
        });

        let runtime_ms = elapsed_ms(started_at);
        ctx.record_scalar("segment.monotone.predicate_evals", evaluations as f64);
        ctx.record_scalar("segment.monotone.segments", boundaries.len() as f64);
        ctx.record_scalar("segment.monotone.runtime_ms", runtime_ms as f64);
        ctx.report_progress(1.0);

        log::debug!(
            "monotone segmentation: criterion={}, threshold={}, n={n}, segments={}, predicate_evals={evaluations}",
            self.predicate.name(),
            self.predicate.threshold(),
            boundaries.len()
        );

        let diagnostics = Diagnostics {
            n,
            runtime_ms: Some(runtime_ms),
            notes: vec![
                format!(
                    "threshold={}, min_segment_len={}",
                    self.predicate.threshold(),
                    self.config.min_segment_len
                ),
                format!("predicate_evals={evaluations}"),
            ],
            algorithm: Cow::Borrowed("monotone"),
            criterion: Cow::Borrowed(self.predicate.name()),
            evaluations: Some(evaluations),
            ..Diagnostics::default()
        };

        #[cfg(feature = "serde")]
        let diagnostics = diagnostics.with_params(&self.config);

        SegmentationResult::new(n, boundaries, diagnostics)
    }
}
