// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::predicate::{RangePredicate, min_max, min_non_zero};
use trackseg_core::{SegError, validate_positive_threshold};

/// Holds while `max / min` of the window stays strictly below the threshold.
///
/// Zero values carry no signal: the denominator is the smallest non-zero value,
/// and a window of only zeros always holds. NaN readings are skipped like zeros.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMaxRatio {
    threshold: f64,
}

impl MinMaxRatio {
    pub fn new(threshold: f64) -> Result<Self, SegError> {
        validate_positive_threshold(threshold, "MinMaxRatio")?;
        Ok(Self { threshold })
    }
}

impl RangePredicate<f64> for MinMaxRatio {
    fn name(&self) -> &'static str {
        "min_max_ratio"
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn holds(&self, window: &[f64]) -> bool {
        let Some(min) = min_non_zero(window) else {
            return true;
        };
        let Some((_, max)) = min_max(window) else {
            return true;
        };
        max / min < self.threshold
    }
}
