// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::predicate::RangePredicate;
use trackseg_core::{Point2, SegError, minimum_enclosing_ball, validate_positive_threshold};

/// Holds while the minimum enclosing ball of the window's points has a radius
/// strictly below the threshold. Used to find stay regions.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnclosingBallRadius {
    threshold: f64,
}

impl EnclosingBallRadius {
    pub fn new(threshold: f64) -> Result<Self, SegError> {
        validate_positive_threshold(threshold, "EnclosingBallRadius")?;
        Ok(Self { threshold })
    }
}

impl RangePredicate<Point2> for EnclosingBallRadius {
    fn name(&self) -> &'static str {
        "enclosing_ball_radius"
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn holds(&self, window: &[Point2]) -> bool {
        // Empty windows are vacuous; drivers never query them.
        minimum_enclosing_ball(window).is_none_or(|ball| ball.radius < self.threshold)
    }
}
