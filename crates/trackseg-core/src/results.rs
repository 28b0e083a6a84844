// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::{Diagnostics, SegError};

/// Structured result returned by every segmentation driver.
///
/// `boundaries` holds the index of the last element of each segment, so the
/// final entry is always `n - 1` for non-empty input. `change_points` holds the
/// first index of every segment after the first one.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentationResult {
    pub boundaries: Vec<usize>,
    pub change_points: Vec<usize>,
    /// Optional per-segment label, e.g. the selected model parameter column.
    pub labels: Option<Vec<usize>>,
    pub diagnostics: Diagnostics,
}

fn derive_change_points(n: usize, boundaries: &[usize]) -> Vec<usize> {
    boundaries
        .iter()
        .map(|&b| b + 1)
        .filter(|&start| start < n)
        .collect()
}

/// Validates the boundary conventions shared by all drivers.
pub fn validate_boundaries(n: usize, boundaries: &[usize]) -> Result<(), SegError> {
    if n == 0 {
        if boundaries.is_empty() {
            return Ok(());
        }
        return Err(SegError::invalid_input(format!(
            "boundaries must be empty when n=0; got boundaries={boundaries:?}"
        )));
    }

    let Some(&last) = boundaries.last() else {
        return Err(SegError::invalid_input(format!(
            "boundaries must be non-empty and end with n-1={} when n={n}",
            n - 1
        )));
    };

    let mut prev: Option<usize> = None;
    for (idx, &b) in boundaries.iter().enumerate() {
        if b >= n {
            return Err(SegError::invalid_input(format!(
                "boundaries[{idx}] must be < n; got boundary={b}, n={n}"
            )));
        }
        if let Some(prev_b) = prev
            && b <= prev_b
        {
            return Err(SegError::invalid_input(format!(
                "boundaries must be strictly increasing: boundaries[{idx}]={b}, previous={prev_b}"
            )));
        }
        prev = Some(b);
    }

    if last != n - 1 {
        return Err(SegError::invalid_input(format!(
            "boundaries must end with the last index: last={last}, n={n}"
        )));
    }

    Ok(())
}

/// Converts validated boundaries into contiguous half-open `[start, end)` ranges.
pub fn segments_from_boundaries(n: usize, boundaries: &[usize]) -> Vec<(usize, usize)> {
    debug_assert!(
        validate_boundaries(n, boundaries).is_ok(),
        "segments_from_boundaries expects validated boundaries"
    );

    let mut segments = Vec::with_capacity(boundaries.len());
    let mut start = 0usize;
    for &last in boundaries {
        segments.push((start, last + 1));
        start = last + 1;
    }
    segments
}

impl SegmentationResult {
    /// Constructs a result and derives `change_points` from boundaries.
    pub fn new(
        n: usize,
        boundaries: Vec<usize>,
        diagnostics: Diagnostics,
    ) -> Result<Self, SegError> {
        validate_boundaries(n, &boundaries)?;
        Ok(Self {
            change_points: derive_change_points(n, &boundaries),
            boundaries,
            labels: None,
            diagnostics,
        })
    }

    /// Attaches one label per segment after validating shape.
    pub fn with_labels(mut self, labels: Vec<usize>) -> Result<Self, SegError> {
        if labels.len() != self.boundaries.len() {
            return Err(SegError::invalid_input(format!(
                "labels length must equal boundaries length; got labels={}, boundaries={}",
                labels.len(),
                self.boundaries.len()
            )));
        }
        self.labels = Some(labels);
        Ok(self)
    }

    /// Number of measurements covered by the result.
    pub fn len(&self) -> usize {
        self.boundaries.last().map_or(0, |&last| last + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Half-open `[start, end)` range of every segment.
    pub fn segments(&self) -> Vec<(usize, usize)> {
        segments_from_boundaries(self.len(), &self.boundaries)
    }
}
