// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod legs;
pub mod likelihood;
pub mod mle;
pub mod pipeline;
pub mod selector;
pub mod window;

pub use legs::{BridgeLeg, Fix, PlanarFix, build_legs, build_legs_planar, project_fixes};
pub use likelihood::{
    BridgeLogLikelihood, LOG_TWO_PI, log_likelihood, log_likelihood_d2, log_likelihoods_into,
    total_log_likelihood,
};
pub use mle::{BridgeVarianceEstimator, MleConfig, MleEstimate};
pub use pipeline::{BbmmConfig, BbmmOutcome, BbmmSegmentation, Penalty};
pub use selector::select_candidates;
pub use window::{WindowEstimationStats, estimate_window_variances};

/// Brownian-bridge movement model namespace.
pub fn crate_name() -> &'static str {
    let _ = (trackseg_core::crate_name(), trackseg_segment::crate_name());
    "trackseg-bbmm"
}
