// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use std::fmt;

/// Error type shared by every trackseg crate.
///
/// All failures surfaced by the segmentation core are caller-contract
/// violations or numerical breakdowns; none of them are transient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SegError {
    InvalidInput(String),
    NumericalIssue(String),
    NotSupported(String),
    ResourceLimit(String),
}

impl SegError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn numerical_issue(msg: impl Into<String>) -> Self {
        Self::NumericalIssue(msg.into())
    }

    pub fn not_supported(msg: impl Into<String>) -> Self {
        Self::NotSupported(msg.into())
    }

    pub fn resource_limit(msg: impl Into<String>) -> Self {
        Self::ResourceLimit(msg.into())
    }

    /// Stable machine-readable code for structured error output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NumericalIssue(_) => "numerical_issue",
            Self::NotSupported(_) => "not_supported",
            Self::ResourceLimit(_) => "resource_limit",
        }
    }
}

impl fmt::Display for SegError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::NumericalIssue(msg) => write!(f, "numerical issue: {msg}"),
            Self::NotSupported(msg) => write!(f, "not supported: {msg}"),
            Self::ResourceLimit(msg) => write!(f, "resource limit: {msg}"),
        }
    }
}

impl std::error::Error for SegError {}

/// Rejects thresholds that are non-finite or not strictly positive.
pub fn validate_positive_threshold(threshold: f64, context: &str) -> Result<(), SegError> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(SegError::invalid_input(format!(
            "{context} threshold must be finite and > 0.0; got {threshold}"
        )));
    }
    Ok(())
}
