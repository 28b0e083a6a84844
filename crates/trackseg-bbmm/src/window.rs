// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::legs::BridgeLeg;
use crate::mle::BridgeVarianceEstimator;
use trackseg_core::SegError;

/// Totals from a per-window estimation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowEstimationStats {
    pub windows: usize,
    pub iterations: usize,
    pub unconverged: usize,
}

/// Range of the `window` legs centred on leg `i`, shifted to stay in bounds.
fn centered_window(i: usize, window: usize, len: usize) -> (usize, usize) {
    let start = i.saturating_sub(window / 2).min(len - window);
    (start, start + window)
}

/// Estimates the bridge variance of every leg from the window of legs
/// centred on it and stores it in `leg.variance`.
///
/// `window` is clamped to the number of legs; `window == 1` estimates each
/// leg on its own.
pub fn estimate_window_variances(
    legs: &mut [BridgeLeg],
    window: usize,
    estimator: &mut BridgeVarianceEstimator,
) -> Result<WindowEstimationStats, SegError> {
    if window == 0 {
        return Err(SegError::invalid_input(
            "variance window must be >= 1; got 0",
        ));
    }
    let len = legs.len();
    if len == 0 {
        return Ok(WindowEstimationStats::default());
    }
    let window = window.min(len);

    let mut stats = WindowEstimationStats::default();
    let mut variances = Vec::with_capacity(len);
    for i in 0..len {
        let (start, end) = centered_window(i, window, len);
        let estimate = estimator.estimate(&legs[start..end])?;
        stats.windows += 1;
        stats.iterations = stats.iterations.saturating_add(estimate.iterations);
        if !estimate.converged {
            stats.unconverged += 1;
        }
        variances.push(estimate.sigma2);
    }

    for (leg, sigma2) in legs.iter_mut().zip(variances) {
        leg.variance = sigma2;
    }
    Ok(stats)
}
