// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use trackseg_core::{ExecutionContext, Segmenter};
use trackseg_criteria::{CircularRange, MinMaxDifference, MinMaxRatio};
use trackseg_segment::{
    CombineMode, ModelBasedConfig, ModelBasedSegmentation, MonotoneSegmentation,
    MonotoneSegmentationConfig, StartStopDiagram, combine_diagrams,
};

const LOG_TWO_PI: f64 = 1.837877066409345;

fn bridge_ll(d2: &f64, sigma2: &f64) -> f64 {
    -LOG_TWO_PI - sigma2.ln() - d2 / (2.0 * sigma2)
}

#[test]
fn heading_scenario_with_threshold_ninety_keeps_one_segment() {
    // lb = 10 and ub = 100 cover every heading, including the closed upper end.
    let headings = [10.0, 15.0, 20.0, 95.0, 100.0];
    let driver = MonotoneSegmentation::new(
        CircularRange::new(90.0).expect("valid threshold"),
        MonotoneSegmentationConfig::default(),
    )
    .expect("valid config");
    assert_eq!(driver.boundaries(&headings), vec![4]);
}

#[test]
fn heading_scenario_splits_at_the_turn() {
    let headings = [10.0, 15.0, 20.0, 95.0, 100.0];
    for threshold in [45.0, 80.0] {
        let driver = MonotoneSegmentation::new(
            CircularRange::new(threshold).expect("valid threshold"),
            MonotoneSegmentationConfig::default(),
        )
        .expect("valid config");
        let result = driver
            .segment(&headings, &ExecutionContext::new())
            .expect("segmentation should succeed");
        assert_eq!(result.boundaries, vec![2, 4], "threshold={threshold}");
        assert_eq!(result.change_points, vec![3]);
    }
}

#[test]
fn speed_scenario_splits_at_the_jump() {
    let speeds = [10.0, 12.0, 11.0, 50.0, 51.0];
    let driver = MonotoneSegmentation::new(
        MinMaxDifference::new(5.0).expect("valid threshold"),
        MonotoneSegmentationConfig::default(),
    )
    .expect("valid config");
    assert_eq!(driver.boundaries(&speeds), vec![2, 4]);
}

#[test]
fn two_regime_rows_recover_change_at_row_twenty() {
    let mut rows = vec![1.0; 20];
    rows.extend(std::iter::repeat_n(100.0, 20));
    let candidates = vec![0.5, 5.0, 50.0, 500.0, 5000.0];
    let driver = ModelBasedSegmentation::new(
        bridge_ll,
        candidates,
        ModelBasedConfig {
            penalty_factor: (rows.len() as f64).ln(),
        },
    )
    .expect("valid config");

    let result = driver
        .segment(&rows, &ExecutionContext::new())
        .expect("segmentation should succeed");
    assert_eq!(result.change_points, vec![20]);
    assert_eq!(result.boundaries, vec![19, 39]);
}

#[test]
fn strict_predicate_segments_are_raised_to_two_elements() {
    // Every adjacent pair violates the criterion. Without the minimum length
    // each element would be its own segment.
    let values = [1.0, 9.0, 1.0, 9.0, 1.0, 9.0, 1.0];
    let bumped = MonotoneSegmentation::new(
        MinMaxRatio::new(2.0).expect("valid threshold"),
        MonotoneSegmentationConfig::default(),
    )
    .expect("valid config");
    assert_eq!(bumped.boundaries(&values), vec![1, 3, 5, 6]);

    let exact = MonotoneSegmentation::new(
        MinMaxRatio::new(2.0).expect("valid threshold"),
        MonotoneSegmentationConfig { min_segment_len: 1 },
    )
    .expect("valid config");
    assert_eq!(exact.boundaries(&values), vec![0, 1, 2, 3, 4, 5, 6]);
}

#[test]
fn speed_and_heading_combine_through_the_diagram_algebra() {
    let speeds = [10.0, 11.0, 12.0, 11.0, 30.0, 31.0, 30.0, 29.0];
    let headings = [90.0, 92.0, 180.0, 181.0, 182.0, 183.0, 184.0, 185.0];
    let n = speeds.len();

    let speed_driver = MonotoneSegmentation::new(
        MinMaxDifference::new(5.0).expect("valid threshold"),
        MonotoneSegmentationConfig::default(),
    )
    .expect("valid config");
    let heading_driver = MonotoneSegmentation::new(
        CircularRange::new(30.0).expect("valid threshold"),
        MonotoneSegmentationConfig::default(),
    )
    .expect("valid config");

    let speed_ssd = StartStopDiagram::from_boundaries(n, &speed_driver.boundaries(&speeds))
        .expect("valid segmentation");
    let heading_ssd =
        StartStopDiagram::from_boundaries(n, &heading_driver.boundaries(&headings))
            .expect("valid segmentation");
    assert_eq!(speed_ssd.boundaries(), vec![3, 7]);
    assert_eq!(heading_ssd.boundaries(), vec![1, 7]);

    let both = combine_diagrams(&[speed_ssd.clone(), heading_ssd.clone()], CombineMode::All)
        .expect("equal lengths");
    assert_eq!(both.boundaries(), vec![1, 3, 7]);
    assert_eq!(both.runs(), &[1, 2, 1, 2, 1, 2, 3, 4]);

    let either = combine_diagrams(&[speed_ssd, heading_ssd], CombineMode::Any)
        .expect("equal lengths");
    assert_eq!(either.boundaries(), vec![7]);
}
