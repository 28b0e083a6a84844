// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod batch;
pub mod boundary_search;
pub mod combine;
pub mod model_based;
pub mod monotone;
pub mod segment_ids;
pub mod ssd;

pub use batch::segment_batch;
pub use boundary_search::last_true_length;
pub use combine::{CombineMode, CombinedDiagrams, CombinedSegmentation, combine_diagrams};
pub use model_based::{LogLikelihood, ModelBasedConfig, ModelBasedSegmentation};
pub use monotone::{MonotoneSegmentation, MonotoneSegmentationConfig};
pub use segment_ids::{SegmentIdCursor, segment_ids};
pub use ssd::{StartStopDiagram, validate_runs};

/// Segmentation driver namespace.
pub fn crate_name() -> &'static str {
    let _ = (trackseg_core::crate_name(), trackseg_criteria::crate_name());
    "trackseg-segment"
}
