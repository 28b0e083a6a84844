// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

#[path = "common.rs"]
mod common;

use libfuzzer_sys::fuzz_target;
use trackseg_segment::{CombineMode, StartStopDiagram, combine_diagrams};

fn build_diagram(cursor: &mut common::ByteCursor<'_>, n: usize) -> StartStopDiagram {
    let labels: Vec<u8> = (0..n).map(|_| cursor.next_u8() % 4).collect();
    StartStopDiagram::from_labels(&labels)
}

fuzz_target!(|data: &[u8]| {
    let mut cursor = common::ByteCursor::new(data);
    let n = common::bounded(cursor.next_u8(), 0, 200);
    let count = common::bounded(cursor.next_u8(), 1, 4);
    let mode = if cursor.next_u8() & 1 == 0 {
        CombineMode::All
    } else {
        CombineMode::Any
    };

    let diagrams: Vec<StartStopDiagram> = (0..count)
        .map(|_| build_diagram(&mut cursor, n))
        .collect();
    let combined = combine_diagrams(&diagrams, mode).expect("equal-length diagrams combine");

    assert_eq!(combined.len(), n);
    assert!(combined.validate().is_ok());
    let ranges = combined.segment_ranges();
    let mut next = 0usize;
    for (begin, end) in ranges {
        assert_eq!(begin, next);
        assert!(end > begin);
        next = end;
    }
    assert_eq!(next, n);

    // Every combined break lines up with the inputs.
    for idx in 1..n {
        let starts: Vec<bool> = diagrams.iter().map(|d| d.starts_segment(idx)).collect();
        let expected = match mode {
            CombineMode::All => starts.iter().any(|&s| s),
            CombineMode::Any => starts.iter().all(|&s| s),
        };
        assert_eq!(combined.starts_segment(idx), expected);
    }

    // Mismatched lengths are an error, never a panic.
    if n > 0 {
        let shorter = StartStopDiagram::from_labels(&vec![0u8; n - 1]);
        assert!(diagrams[0].conjunction(&shorter).is_err());
        assert!(diagrams[0].disjunction(&shorter).is_err());
    }
});
