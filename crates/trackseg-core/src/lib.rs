// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod diagnostics;
pub mod enclosing_ball;
pub mod error;
pub mod execution_context;
pub mod geometry;
pub mod observability;
pub mod projection;
pub mod results;
pub mod segmenter;

pub use diagnostics::{DIAGNOSTICS_SCHEMA_VERSION, Diagnostics, elapsed_ms};
pub use enclosing_ball::{EnclosingBall, minimum_enclosing_ball};
pub use error::{SegError, validate_positive_threshold};
pub use execution_context::ExecutionContext;
pub use geometry::{Point2, Vector2, squared_distance};
pub use observability::{ProgressSink, TelemetrySink};
pub use projection::{LocalCoordinateReference, PlanarProjection};
pub use results::{SegmentationResult, segments_from_boundaries, validate_boundaries};
pub use segmenter::Segmenter;

/// Core shared types and traits for trackseg.
pub fn crate_name() -> &'static str {
    "trackseg-core"
}
