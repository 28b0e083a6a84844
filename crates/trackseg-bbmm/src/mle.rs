// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::legs::BridgeLeg;
use crate::likelihood::{LOG_TWO_PI, total_log_likelihood};
use trackseg_core::SegError;

const DEFAULT_EPSILON: f64 = 1e-5;
const DEFAULT_TOLERANCE: f64 = 1e-5;
const DEFAULT_MAX_ITER: usize = 100;
/// `(3 - sqrt(5)) / 2`.
const GOLDEN_SECTION: f64 = 0.381_966_011_250_105_1;

/// Configuration for [`BridgeVarianceEstimator`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct MleConfig {
    /// Lower end of the search bracket and the floor returned for degenerate input.
    pub epsilon: f64,
    /// Bracket width at which the search stops.
    pub tolerance: f64,
    pub max_iter: usize,
}

impl Default for MleConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            tolerance: DEFAULT_TOLERANCE,
            max_iter: DEFAULT_MAX_ITER,
        }
    }
}

impl MleConfig {
    fn validate(&self) -> Result<(), SegError> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(SegError::invalid_input(format!(
                "MleConfig.epsilon must be finite and > 0.0; got {}",
                self.epsilon
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(SegError::invalid_input(format!(
                "MleConfig.tolerance must be finite and > 0.0; got {}",
                self.tolerance
            )));
        }
        if self.max_iter == 0 {
            return Err(SegError::invalid_input(
                "MleConfig.max_iter must be >= 1; got 0",
            ));
        }
        Ok(())
    }
}

/// Outcome of one variance estimate.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MleEstimate {
    pub sigma2: f64,
    /// Golden-section iterations spent; zero when the search was skipped.
    pub iterations: usize,
    /// False when `max_iter` ran out before the bracket shrank below tolerance.
    pub converged: bool,
    /// Summed log-likelihood of the legs at `sigma2`.
    pub log_likelihood: f64,
}

/// Bracketing state of the golden-section minimizer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct GoldenSectionWorkspace {
    lower: f64,
    upper: f64,
    x: f64,
    f_x: f64,
}

impl GoldenSectionWorkspace {
    fn set(&mut self, lower: f64, guess: f64, upper: f64, f_guess: f64) {
        *self = Self {
            lower,
            upper,
            x: guess,
            f_x: f_guess,
        };
    }

    fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Shrinks the bracket by one golden-section step on its larger side.
    fn iterate<F: Fn(f64) -> f64>(&mut self, f: &F) {
        let left = self.x - self.lower;
        let right = self.upper - self.x;
        let u = if left > right {
            self.x - GOLDEN_SECTION * left
        } else {
            self.x + GOLDEN_SECTION * right
        };
        let f_u = f(u);
        if f_u < self.f_x {
            if u < self.x {
                self.upper = self.x;
            } else {
                self.lower = self.x;
            }
            self.x = u;
            self.f_x = f_u;
        } else if u < self.x {
            self.lower = u;
        } else {
            self.upper = u;
        }
    }
}

/// Maximum-likelihood estimator of a shared bridge variance.
///
/// Holds its minimizer workspace, so one instance serves one caller at a
/// time; `estimate` takes `&mut self` for that reason.
#[derive(Debug)]
pub struct BridgeVarianceEstimator {
    config: MleConfig,
    workspace: GoldenSectionWorkspace,
}

impl BridgeVarianceEstimator {
    pub fn new(config: MleConfig) -> Result<Self, SegError> {
        config.validate()?;
        Ok(Self {
            config,
            workspace: GoldenSectionWorkspace::default(),
        })
    }

    pub fn config(&self) -> &MleConfig {
        &self.config
    }

    /// Estimates the variance that maximizes the summed log-likelihood of `legs`.
    ///
    /// The search runs on `[epsilon, max d²]` starting from `Σd² / 2n`, the
    /// analytic optimum. Input without usable spread returns `epsilon`.
    pub fn estimate(&mut self, legs: &[BridgeLeg]) -> Result<MleEstimate, SegError> {
        let eps = self.config.epsilon;
        if legs.is_empty() {
            return Err(SegError::invalid_input(
                "variance estimation requires at least one leg; got 0",
            ));
        }

        let mut sum_d2 = 0.0;
        let mut max_d2 = 0.0f64;
        for (idx, leg) in legs.iter().enumerate() {
            let d2 = leg.squared_displacement();
            if !d2.is_finite() {
                return Err(SegError::numerical_issue(format!(
                    "non-finite squared displacement at leg {idx}: {d2}"
                )));
            }
            sum_d2 += d2;
            max_d2 = max_d2.max(d2);
        }

        let floor = |iterations| MleEstimate {
            sigma2: eps,
            iterations,
            converged: true,
            log_likelihood: total_log_likelihood(legs, eps),
        };

        // No bracket exists; this includes a single leg below epsilon.
        if max_d2 <= eps {
            return Ok(floor(0));
        }

        let n = legs.len() as f64;
        let guess = sum_d2 / (2.0 * n);
        if guess <= eps {
            return Ok(floor(0));
        }

        // Negative summed log-likelihood, unimodal in sigma2.
        let objective = |sigma2: f64| n * (LOG_TWO_PI + sigma2.ln()) + sum_d2 / (2.0 * sigma2);

        // sum_d2 / 2n is at most max_d2 / 2.
        let (lower, upper) = (eps, max_d2);
        debug_assert!(lower < guess && guess < upper);
        self.workspace.set(lower, guess, upper, objective(guess));

        let mut iterations = 0usize;
        while self.workspace.width() >= self.config.tolerance
            && iterations < self.config.max_iter
        {
            self.workspace.iterate(&objective);
            iterations += 1;
        }
        let converged = self.workspace.width() < self.config.tolerance;
        if !converged {
            log::debug!(
                "golden-section search hit max_iter={} with bracket width {}",
                self.config.max_iter,
                self.workspace.width()
            );
        }

        let sigma2 = self.workspace.x;
        Ok(MleEstimate {
            sigma2,
            iterations,
            converged,
            log_likelihood: -self.workspace.f_x,
        })
    }
}
