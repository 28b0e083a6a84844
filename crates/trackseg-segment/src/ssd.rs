// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::segment_ids::SegmentIdCursor;
use trackseg_core::{SegError, validate_boundaries};

/// Run-length view of a segmentation.
///
/// Entry `i` is the 1-based position of element `i` inside its segment: it is
/// `1` exactly where a new segment starts and the previous entry plus one
/// everywhere else.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StartStopDiagram {
    runs: Vec<usize>,
}

/// Checks that `runs` is a well-formed run-position sequence.
pub fn validate_runs(runs: &[usize]) -> Result<(), SegError> {
    let mut prev: Option<usize> = None;
    for (idx, &run) in runs.iter().enumerate() {
        let ok = match prev {
            None => run == 1,
            Some(p) => run == 1 || Some(run) == p.checked_add(1),
        };
        if !ok {
            return Err(SegError::invalid_input(format!(
                "run position at index {idx} must be 1 or previous+1; got run={run}, previous={prev:?}"
            )));
        }
        prev = Some(run);
    }
    Ok(())
}

/// Tracks whether one input keeps counting up inside the current output run.
///
/// A run entered at value `v0` and continued to `v` has summed
/// `v(v+1)/2 - v0(v0-1)/2`; any reset breaks that identity.
#[derive(Clone, Copy, Debug, Default)]
struct TriangularTracker {
    acc: u128,
    offset: u128,
}

fn triangular(v: usize) -> u128 {
    let v = v as u128;
    v * (v + 1) / 2
}

impl TriangularTracker {
    fn anchored_at(value: usize) -> Self {
        Self {
            acc: value as u128,
            offset: triangular(value.saturating_sub(1)),
        }
    }

    /// Folds in the next value; true iff it continues the tracked run.
    fn advance(&mut self, value: usize) -> bool {
        self.acc += value as u128;
        triangular(value).checked_sub(self.offset) == Some(self.acc)
    }
}

impl StartStopDiagram {
    /// Builds the diagram of a segmentation of `0..n` given by boundary
    /// positions (last index of each segment).
    pub fn from_boundaries(n: usize, boundaries: &[usize]) -> Result<Self, SegError> {
        validate_boundaries(n, boundaries)?;
        let mut cursor = SegmentIdCursor::new(boundaries)?;
        Ok(Self::from_segment_ids((0..n).map(|i| cursor.segment_id(i))))
    }

    /// Builds the diagram of a per-element label sequence; a new run starts
    /// wherever the label changes.
    pub fn from_labels<L: PartialEq>(labels: &[L]) -> Self {
        let mut runs = Vec::with_capacity(labels.len());
        let mut prev: Option<(&L, usize)> = None;
        for label in labels {
            let run = match prev {
                Some((p, run)) if p == label => run + 1,
                _ => 1,
            };
            runs.push(run);
            prev = Some((label, run));
        }
        Self { runs }
    }

    /// Builds the diagram of a stream of segment ids.
    pub fn from_segment_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let ids: Vec<usize> = ids.into_iter().collect();
        Self::from_labels(&ids)
    }

    /// Wraps raw run positions after validating them.
    pub fn from_runs(runs: Vec<usize>) -> Result<Self, SegError> {
        validate_runs(&runs)?;
        Ok(Self { runs })
    }

    pub fn runs(&self) -> &[usize] {
        &self.runs
    }

    pub fn into_runs(self) -> Vec<usize> {
        self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn validate(&self) -> Result<(), SegError> {
        validate_runs(&self.runs)
    }

    /// True iff a new segment starts at `index`.
    pub fn starts_segment(&self, index: usize) -> bool {
        self.runs.get(index) == Some(&1)
    }

    /// Index of the last element of every segment.
    pub fn boundaries(&self) -> Vec<usize> {
        let n = self.runs.len();
        (0..n)
            .filter(|&i| i + 1 == n || self.runs[i + 1] == 1)
            .collect()
    }

    /// Half-open `[start, end)` range of every segment.
    pub fn segment_ranges(&self) -> Vec<(usize, usize)> {
        self.boundaries()
            .into_iter()
            .map(|last| (last + 1 - self.runs[last], last + 1))
            .collect()
    }

    /// Segment id of every element.
    pub fn segment_ids(&self) -> Vec<usize> {
        let mut id = 0usize;
        self.runs
            .iter()
            .enumerate()
            .map(|(i, &run)| {
                if i > 0 && run == 1 {
                    id += 1;
                }
                id
            })
            .collect()
    }

    /// Refinement of both inputs: a run breaks wherever either input breaks.
    ///
    /// Combines criteria that must hold simultaneously.
    pub fn conjunction(&self, other: &Self) -> Result<Self, SegError> {
        check_same_len(self, other, "conjunction")?;
        let mut runs = Vec::with_capacity(self.len());
        let mut trackers: Option<(TriangularTracker, TriangularTracker)> = None;

        for (&a, &b) in self.runs.iter().zip(&other.runs) {
            let run = match (trackers.as_mut(), runs.last()) {
                (Some((ta, tb)), Some(&prev)) => {
                    // Evaluate both so each tracker sees every value.
                    let a_continues = ta.advance(a);
                    let b_continues = tb.advance(b);
                    if a_continues && b_continues {
                        prev + 1
                    } else {
                        1
                    }
                }
                _ => 1,
            };
            if run == 1 {
                trackers = Some((
                    TriangularTracker::anchored_at(a),
                    TriangularTracker::anchored_at(b),
                ));
            }
            runs.push(run);
        }

        Ok(Self { runs })
    }

    /// Coarsening of both inputs: a run breaks only where both inputs break
    /// at the same index.
    ///
    /// Combines alternative criteria, any one of which may hold.
    pub fn disjunction(&self, other: &Self) -> Result<Self, SegError> {
        check_same_len(self, other, "disjunction")?;
        let mut runs = Vec::with_capacity(self.len());
        let mut trackers: Option<(TriangularTracker, TriangularTracker)> = None;

        for (&a, &b) in self.runs.iter().zip(&other.runs) {
            let run = match (trackers.as_mut(), runs.last()) {
                (Some((ta, tb)), Some(&prev)) => {
                    let a_breaks = !ta.advance(a);
                    if a_breaks {
                        *ta = TriangularTracker::anchored_at(a);
                    }
                    let b_breaks = !tb.advance(b);
                    if b_breaks {
                        *tb = TriangularTracker::anchored_at(b);
                    }
                    if a_breaks && b_breaks { 1 } else { prev + 1 }
                }
                _ => {
                    trackers = Some((
                        TriangularTracker::anchored_at(a),
                        TriangularTracker::anchored_at(b),
                    ));
                    1
                }
            };
            runs.push(run);
        }

        Ok(Self { runs })
    }
}

fn check_same_len(
    a: &StartStopDiagram,
    b: &StartStopDiagram,
    operation: &str,
) -> Result<(), SegError> {
    if a.len() != b.len() {
        return Err(SegError::invalid_input(format!(
            "start-stop {operation} requires equal lengths; got left={}, right={}",
            a.len(),
            b.len()
        )));
    }
    Ok(())
}
