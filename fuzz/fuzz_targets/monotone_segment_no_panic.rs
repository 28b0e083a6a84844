// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

#[path = "common.rs"]
mod common;

use libfuzzer_sys::fuzz_target;
use trackseg_core::{ExecutionContext, Segmenter, validate_boundaries};
use trackseg_criteria::{ScalarCriterionKind, ScalarPredicate};
use trackseg_segment::{MonotoneSegmentation, MonotoneSegmentationConfig};

fuzz_target!(|data: &[u8]| {
    let mut cursor = common::ByteCursor::new(data);
    let kind = ScalarCriterionKind::ALL[usize::from(cursor.next_u8()) % 3];
    let threshold = cursor.next_f64();
    let min_segment_len = common::bounded(cursor.next_u8(), 0, 8);

    let Ok(predicate) = ScalarPredicate::new(kind, threshold) else {
        return;
    };
    let Ok(driver) = MonotoneSegmentation::new(
        predicate,
        MonotoneSegmentationConfig { min_segment_len },
    ) else {
        return;
    };

    let n = common::bounded(cursor.next_u8(), 0, 255);
    let values: Vec<f64> = (0..n)
        .map(|_| match cursor.next_u8() % 8 {
            0 => f64::NAN,
            1 => f64::INFINITY,
            2 => 0.0,
            _ => f64::from(cursor.next_i16()) / 8.0,
        })
        .collect();

    let result = driver
        .segment(&values, &ExecutionContext::new())
        .expect("monotone segmentation is total");
    assert!(validate_boundaries(n, &result.boundaries).is_ok());
});
