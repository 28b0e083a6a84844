// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::circular::CircularRange;
use crate::difference::MinMaxDifference;
use crate::predicate::RangePredicate;
use crate::ratio::MinMaxRatio;
use trackseg_core::SegError;

/// Scalar criterion kinds selectable by name.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarCriterionKind {
    Difference,
    Ratio,
    Circular,
}

impl ScalarCriterionKind {
    pub const ALL: [ScalarCriterionKind; 3] = [Self::Difference, Self::Ratio, Self::Circular];

    pub fn parse(raw: &str) -> Result<Self, SegError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "difference" | "diff" | "min_max_difference" => Ok(Self::Difference),
            "ratio" | "min_max_ratio" => Ok(Self::Ratio),
            "circular" | "range" | "heading" | "circular_range" => Ok(Self::Circular),
            other => Err(SegError::invalid_input(format!(
                "unsupported criterion '{other}'; expected one of difference|ratio|circular"
            ))),
        }
    }
}

/// A scalar predicate chosen at runtime.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScalarPredicate {
    Difference(MinMaxDifference),
    Ratio(MinMaxRatio),
    Circular(CircularRange),
}

impl ScalarPredicate {
    pub fn new(kind: ScalarCriterionKind, threshold: f64) -> Result<Self, SegError> {
        Ok(match kind {
            ScalarCriterionKind::Difference => Self::Difference(MinMaxDifference::new(threshold)?),
            ScalarCriterionKind::Ratio => Self::Ratio(MinMaxRatio::new(threshold)?),
            ScalarCriterionKind::Circular => Self::Circular(CircularRange::new(threshold)?),
        })
    }

    pub fn kind(&self) -> ScalarCriterionKind {
        match self {
            Self::Difference(_) => ScalarCriterionKind::Difference,
            Self::Ratio(_) => ScalarCriterionKind::Ratio,
            Self::Circular(_) => ScalarCriterionKind::Circular,
        }
    }

    fn inner(&self) -> &dyn RangePredicate<f64> {
        match self {
            Self::Difference(p) => p,
            Self::Ratio(p) => p,
            Self::Circular(p) => p,
        }
    }
}

impl RangePredicate<f64> for ScalarPredicate {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn threshold(&self) -> f64 {
        self.inner().threshold()
    }

    fn holds(&self, window: &[f64]) -> bool {
        self.inner().holds(window)
    }
}
