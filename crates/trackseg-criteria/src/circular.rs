// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::predicate::{RangePredicate, is_reading, min_non_zero};
use trackseg_core::{SegError, validate_positive_threshold};

/// Holds while every non-zero value lies in `[lb, lb + threshold]`, where `lb`
/// is the smallest non-zero value of the window.
///
/// Intended for headings in degrees with a threshold in `(0, 360)`; the upper
/// bound of that range is left to the caller. Zeros and NaN are treated as
/// missing.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircularRange {
    threshold: f64,
}

impl CircularRange {
    pub fn new(threshold: f64) -> Result<Self, SegError> {
        validate_positive_threshold(threshold, "CircularRange")?;
        Ok(Self { threshold })
    }
}

impl RangePredicate<f64> for CircularRange {
    fn name(&self) -> &'static str {
        "circular_range"
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn holds(&self, window: &[f64]) -> bool {
        let Some(lb) = min_non_zero(window) else {
            return true;
        };
        let ub = lb + self.threshold;
        window
            .iter()
            .filter(|&&v| is_reading(v))
            .all(|&v| (lb..=ub).contains(&v))
    }
}

#[cfg(test)]
mod tests {
    use super::CircularRange;
    use crate::RangePredicate;

    #[test]
    fn values_within_closed_band_hold() {
        let pred = CircularRange::new(90.0).expect("valid threshold");
        assert!(pred.holds(&[10.0, 15.0, 20.0, 95.0, 100.0]));
        assert!(!pred.holds(&[10.0, 15.0, 20.0, 95.0, 100.5]));
    }

    #[test]
    fn zeros_are_skipped() {
        let pred = CircularRange::new(45.0).expect("valid threshold");
        assert!(pred.holds(&[0.0, 200.0, 0.0, 230.0]));
        assert!(pred.holds(&[0.0, 0.0]));
        assert!(!pred.holds(&[0.0, 200.0, 250.0]));
    }

    #[test]
    fn nan_readings_are_skipped() {
        let pred = CircularRange::new(45.0).expect("valid threshold");
        assert!(pred.holds(&[f64::NAN]));
        assert!(pred.holds(&[f64::NAN, 200.0, f64::NAN, 230.0]));
        assert!(!pred.holds(&[f64::NAN, 200.0, 250.0]));
    }
}
