// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::legs::BridgeLeg;
use trackseg_core::SegError;
use trackseg_segment::LogLikelihood;

/// `ln(2π)`.
pub const LOG_TWO_PI: f64 = 1.837877066409345;

/// Log-likelihood of a squared displacement `d2` under bridge variance `sigma2`.
#[inline]
pub fn log_likelihood_d2(d2: f64, sigma2: f64) -> f64 {
    -LOG_TWO_PI - sigma2.ln() - d2 / (2.0 * sigma2)
}

/// Log-likelihood of one leg under bridge variance `sigma2`.
pub fn log_likelihood(leg: &BridgeLeg, sigma2: f64) -> f64 {
    log_likelihood_d2(leg.squared_displacement(), sigma2)
}

/// Writes the log-likelihood of `leg` under every candidate variance into `out`.
pub fn log_likelihoods_into(
    leg: &BridgeLeg,
    candidates: &[f64],
    out: &mut [f64],
) -> Result<(), SegError> {
    if out.len() != candidates.len() {
        return Err(SegError::invalid_input(format!(
            "output length must equal candidate count; got out={}, candidates={}",
            out.len(),
            candidates.len()
        )));
    }
    let d2 = leg.squared_displacement();
    for (slot, &sigma2) in out.iter_mut().zip(candidates) {
        *slot = log_likelihood_d2(d2, sigma2);
    }
    Ok(())
}

/// Summed log-likelihood of `legs` under a shared variance.
pub fn total_log_likelihood(legs: &[BridgeLeg], sigma2: f64) -> f64 {
    legs.iter().map(|leg| log_likelihood(leg, sigma2)).sum()
}

/// Leg log-likelihood as a model-based segmentation evaluator over candidate
/// variances.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BridgeLogLikelihood;

impl LogLikelihood<BridgeLeg, f64> for BridgeLogLikelihood {
    fn log_likelihood(&self, row: &BridgeLeg, param: &f64) -> f64 {
        log_likelihood(row, *param)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        BridgeLogLikelihood, LOG_TWO_PI, log_likelihood, log_likelihood_d2, log_likelihoods_into,
        total_log_likelihood,
    };
    use crate::legs::BridgeLeg;
    use trackseg_core::{Point2, SegError};
    use trackseg_segment::LogLikelihood;

    fn leg(dx: f64, dy: f64) -> BridgeLeg {
        BridgeLeg {
            observed: Point2::new(dx, dy),
            mean: Point2::new(0.0, 0.0),
            variance: 0.0,
            begin: 0,
            end: 2,
        }
    }

    #[test]
    fn matches_closed_form() {
        assert!((LOG_TWO_PI - (2.0 * std::f64::consts::PI).ln()).abs() < 1e-15);
        let value = log_likelihood(&leg(3.0, 4.0), 2.0);
        let expected = -LOG_TWO_PI - 2.0f64.ln() - 25.0 / 4.0;
        assert!((value - expected).abs() < 1e-12);
    }

    #[test]
    fn maximized_at_half_squared_displacement() {
        let d2 = 18.0;
        let at_optimum = log_likelihood_d2(d2, d2 / 2.0);
        for sigma2 in [1.0, 5.0, 8.0, 10.0, 20.0] {
            assert!(log_likelihood_d2(d2, sigma2) < at_optimum, "sigma2={sigma2}");
        }
    }

    #[test]
    fn batch_form_matches_single_values() {
        let l = leg(1.0, 1.0);
        let candidates = [0.5, 1.0, 4.0];
        let mut out = [0.0; 3];
        log_likelihoods_into(&l, &candidates, &mut out).expect("matching lengths");
        for (value, sigma2) in out.iter().zip(candidates) {
            assert_eq!(*value, log_likelihood(&l, sigma2));
            assert_eq!(*value, BridgeLogLikelihood.log_likelihood(&l, &sigma2));
        }

        let mut short = [0.0; 2];
        let err = log_likelihoods_into(&l, &candidates, &mut short).expect_err("length mismatch");
        assert!(matches!(err, SegError::InvalidInput(_)));
    }

    #[test]
    fn total_is_sum_of_legs() {
        let legs = [leg(1.0, 0.0), leg(0.0, 2.0)];
        let total = total_log_likelihood(&legs, 3.0);
        let expected = log_likelihood(&legs[0], 3.0) + log_likelihood(&legs[1], 3.0);
        assert!((total - expected).abs() < 1e-12);
        assert_eq!(total_log_likelihood(&[], 3.0), 0.0);
    }
}
