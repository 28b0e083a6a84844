// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// A homogeneity criterion over a contiguous window of measurements.
///
/// Implementations must be monotone in window length: for a fixed start, once
/// `holds` returns false for some length it stays false for every longer
/// window. The segmentation drivers rely on this to bisect for boundaries.
pub trait RangePredicate<T> {
    /// Stable identifier used in diagnostics.
    fn name(&self) -> &'static str;

    fn threshold(&self) -> f64;

    /// Returns true iff `window` satisfies the criterion.
    fn holds(&self, window: &[T]) -> bool;
}

impl<T, P> RangePredicate<T> for &P
where
    P: RangePredicate<T> + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn threshold(&self) -> f64 {
        (**self).threshold()
    }

    fn holds(&self, window: &[T]) -> bool {
        (**self).holds(window)
    }
}

/// False for zeros and NaN, the markers of a missing reading.
pub(crate) fn is_reading(v: f64) -> bool {
    v != 0.0 && !v.is_nan()
}

/// Smallest reading of `window`.
pub(crate) fn min_non_zero(window: &[f64]) -> Option<f64> {
    window
        .iter()
        .copied()
        .filter(|&v| is_reading(v))
        .reduce(f64::min)
}

/// Extremes of the non-NaN values of `window`.
pub(crate) fn min_max(window: &[f64]) -> Option<(f64, f64)> {
    window
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            None => Some((v, v)),
        })
}
