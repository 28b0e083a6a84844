// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::predicate::{RangePredicate, min_max};
use trackseg_core::{SegError, validate_positive_threshold};

/// Holds while `max - min` of the window stays strictly below the threshold.
///
/// Typical use: speed-homogeneous segments, where the spread of observed speeds
/// inside one segment is bounded. NaN readings are skipped.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMaxDifference {
    threshold: f64,
}

impl MinMaxDifference {
    pub fn new(threshold: f64) -> Result<Self, SegError> {
        validate_positive_threshold(threshold, "MinMaxDifference")?;
        Ok(Self { threshold })
    }
}

impl RangePredicate<f64> for MinMaxDifference {
    fn name(&self) -> &'static str {
        "min_max_difference"
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn holds(&self, window: &[f64]) -> bool {
        match min_max(window) {
            Some((lo, hi)) => hi - lo < self.threshold,
            None => true,
        }
    }
}
