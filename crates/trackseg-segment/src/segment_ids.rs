// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use trackseg_core::SegError;

/// Stateful mapping from element index to segment id.
///
/// The id of element `i` is the number of boundaries strictly less than `i`,
/// so a boundary element still belongs to the segment it closes. Queries with
/// non-decreasing indices cost amortized `O(1)`; a query behind the cursor
/// rewinds it transparently.
#[derive(Clone, Debug)]
pub struct SegmentIdCursor<'a> {
    boundaries: &'a [usize],
    passed: usize,
}

impl<'a> SegmentIdCursor<'a> {
    /// Creates a cursor over strictly increasing boundary positions.
    pub fn new(boundaries: &'a [usize]) -> Result<Self, SegError> {
        if let Some(idx) = boundaries.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(SegError::invalid_input(format!(
                "boundaries must be strictly increasing: boundaries[{}]={}, boundaries[{}]={}",
                idx,
                boundaries[idx],
                idx + 1,
                boundaries[idx + 1]
            )));
        }
        Ok(Self {
            boundaries,
            passed: 0,
        })
    }

    pub fn boundaries(&self) -> &'a [usize] {
        self.boundaries
    }

    /// Segment id of element `index`.
    pub fn segment_id(&mut self, index: usize) -> usize {
        if self.passed > 0 && self.boundaries[self.passed - 1] >= index {
            self.reset();
        }
        while self
            .boundaries
            .get(self.passed)
            .is_some_and(|&boundary| boundary < index)
        {
            self.passed += 1;
        }
        self.passed
    }

    /// Restarts the cursor for a fresh pass.
    pub fn reset(&mut self) {
        self.passed = 0;
    }
}

/// Segment id of every element in `0..n`.
pub fn segment_ids(n: usize, boundaries: &[usize]) -> Result<Vec<usize>, SegError> {
    let mut cursor = SegmentIdCursor::new(boundaries)?;
    Ok((0..n).map(|i| cursor.segment_id(i)).collect())
}
