// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod circular;
pub mod difference;
pub mod enclosing;
pub mod predicate;
pub mod ratio;
pub mod scalar;

pub use circular::CircularRange;
pub use difference::MinMaxDifference;
pub use enclosing::EnclosingBallRadius;
pub use predicate::RangePredicate;
pub use ratio::MinMaxRatio;
pub use scalar::{ScalarCriterionKind, ScalarPredicate};

/// Built-in homogeneity criteria namespace.
pub fn crate_name() -> &'static str {
    let _ = trackseg_core::crate_name();
    "trackseg-criteria"
}
