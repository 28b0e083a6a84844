// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use std::borrow::Cow;
use std::time::Instant;

/// Diagnostics schema version for segmentation run metadata.
pub const DIAGNOSTICS_SCHEMA_VERSION: u32 = 1;

/// Run metadata attached to every [`SegmentationResult`](crate::SegmentationResult).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostics {
    /// Number of measurements the driver consumed.
    pub n: usize,
    pub schema_version: u32,
    pub engine_version: Option<String>,
    pub runtime_ms: Option<u64>,
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
    /// Driver that produced the result, e.g. `monotone` or `bbmm`.
    pub algorithm: Cow<'static, str>,
    /// Predicate or likelihood the driver evaluated.
    pub criterion: Cow<'static, str>,
    /// Predicate or log-likelihood evaluations performed by the run.
    pub evaluations: Option<usize>,
    /// Driver configuration as JSON.
    #[cfg(feature = "serde")]
    pub params_json: Option<serde_json::Value>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            n: 0,
            schema_version: DIAGNOSTICS_SCHEMA_VERSION,
            engine_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            runtime_ms: None,
            notes: vec![],
            warnings: vec![],
            algorithm: Cow::Borrowed(""),
            criterion: Cow::Borrowed(""),
            evaluations: None,
            #[cfg(feature = "serde")]
            params_json: None,
        }
    }
}

impl Diagnostics {
    /// Records the driver configuration; unserializable input leaves it unset.
    #[cfg(feature = "serde")]
    pub fn with_params<T: serde::Serialize>(mut self, params: &T) -> Self {
        self.params_json = serde_json::to_value(params).ok();
        self
    }
}

/// Wall-clock milliseconds since `started_at`, saturating at `u64::MAX`.
pub fn elapsed_ms(started_at: Instant) -> u64 {
    u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX)
}
