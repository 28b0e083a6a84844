// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use trackseg_core::{PlanarProjection, Point2, SegError, squared_distance};

/// Geographic fix: latitude and longitude in degrees, time in seconds.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fix {
    pub lat: f64,
    pub lon: f64,
    pub time: f64,
}

/// Fix already expressed in a local metric frame.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanarFix {
    pub point: Point2,
    pub time: f64,
}

impl PlanarFix {
    pub const fn new(x: f64, y: f64, time: f64) -> Self {
        Self {
            point: Point2::new(x, y),
            time,
        }
    }
}

/// One Brownian-bridge observation: the middle fix of a triple against the
/// bridge mean interpolated between its outer fixes.
///
/// `begin..end` is the range of fix indices the leg stands for. Consecutive
/// legs tile `0..n-1`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BridgeLeg {
    pub observed: Point2,
    pub mean: Point2,
    /// Bridge variance; zero until estimated.
    pub variance: f64,
    pub begin: usize,
    pub end: usize,
}

impl BridgeLeg {
    /// `‖observed - mean‖²`.
    pub fn squared_displacement(&self) -> f64 {
        squared_distance(self.observed, self.mean)
    }
}

fn validate_fixes(fixes: &[PlanarFix]) -> Result<(), SegError> {
    let mut prev_time = f64::NEG_INFINITY;
    for (idx, fix) in fixes.iter().enumerate() {
        if !fix.point.is_finite() || !fix.time.is_finite() {
            return Err(SegError::invalid_input(format!(
                "fix {idx} must have finite coordinates and time; got {fix:?}"
            )));
        }
        if fix.time < prev_time {
            return Err(SegError::invalid_input(format!(
                "fixes must be sorted by time: fix {idx} at t={} precedes t={prev_time}",
                fix.time
            )));
        }
        prev_time = fix.time;
    }
    Ok(())
}

/// Fraction of the way from the first to the last fix at which the middle
/// fix was observed. Coincident outer timestamps fall back to the midpoint.
fn bridge_alpha(t1: f64, t2: f64, t3: f64) -> f64 {
    let span = t3 - t1;
    if span > 0.0 { (t3 - t2) / span } else { 0.5 }
}

/// Builds bridge legs from fixes in a planar frame.
///
/// Triples `(p0, p1, p2)`, `(p2, p3, p4)`, ... each give a leg over
/// `[index(p0), index(p2))`. When `n - 1` is odd the last two fixes form a
/// remainder leg whose observation is their midpoint. A single fix yields one
/// empty leg at that fix; no fixes yield no legs.
pub fn build_legs_planar(fixes: &[PlanarFix]) -> Result<Vec<BridgeLeg>, SegError> {
    validate_fixes(fixes)?;
    let n = fixes.len();
    if n == 0 {
        return Ok(vec![]);
    }
    if n == 1 {
        let p = fixes[0].point;
        return Ok(vec![BridgeLeg {
            observed: p,
            mean: p,
            variance: 0.0,
            begin: 0,
            end: 0,
        }]);
    }

    let mut legs = Vec::with_capacity(n / 2);
    let mut begin = 0usize;
    while begin + 2 < n {
        let [first, middle, last] = [fixes[begin], fixes[begin + 1], fixes[begin + 2]];
        let alpha = bridge_alpha(first.time, middle.time, last.time);
        legs.push(BridgeLeg {
            observed: middle.point,
            mean: first.point.lerp(last.point, alpha),
            variance: 0.0,
            begin,
            end: begin + 2,
        });
        begin += 2;
    }

    if begin + 1 < n {
        let mean = fixes[begin].point.lerp(fixes[begin + 1].point, 0.5);
        legs.push(BridgeLeg {
            observed: mean,
            mean,
            variance: 0.0,
            begin,
            end: begin + 1,
        });
    }

    Ok(legs)
}

/// Projects geographic fixes into a frame anchored at the first fix and
/// builds bridge legs there.
pub fn build_legs<P: PlanarProjection>(fixes: &[Fix]) -> Result<Vec<BridgeLeg>, SegError> {
    build_legs_planar(&project_fixes::<P>(fixes)?)
}

/// Projects fixes into a planar frame anchored at the first fix.
pub fn project_fixes<P: PlanarProjection>(fixes: &[Fix]) -> Result<Vec<PlanarFix>, SegError> {
    let Some(first) = fixes.first() else {
        return Ok(vec![]);
    };
    let projection = P::anchored_at(first.lat, first.lon)?;
    Ok(fixes
        .iter()
        .map(|fix| PlanarFix {
            point: projection.project(fix.lat, fix.lon),
            time: fix.time,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{BridgeLeg, Fix, PlanarFix, build_legs, build_legs_planar};
    use trackseg_core::{LocalCoordinateReference, Point2, SegError};

    fn assert_point_close(actual: Point2, expected: Point2) {
        assert!(
            (actual.x - expected.x).abs() < 1e-9 && (actual.y - expected.y).abs() < 1e-9,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn triple_mean_interpolates_by_time() {
        let fixes = [
            PlanarFix::new(0.0, 0.0, 0.0),
            PlanarFix::new(3.0, 4.0, 1.0),
            PlanarFix::new(10.0, 0.0, 4.0),
        ];
        let legs = build_legs_planar(&fixes).expect("valid fixes");
        assert_eq!(legs.len(), 1);
        // alpha = (4 - 1) / (4 - 0)
        assert_point_close(legs[0].mean, Point2::new(7.5, 0.0));
        assert_eq!(legs[0].observed, Point2::new(3.0, 4.0));
        assert_eq!((legs[0].begin, legs[0].end), (0, 2));
        assert_eq!(legs[0].variance, 0.0);
        assert!((legs[0].squared_displacement() - (4.5 * 4.5 + 16.0)).abs() < 1e-9);
    }

    #[test]
    fn leg_ranges_tile_all_but_the_last_fix() {
        for n in 2..12 {
            let fixes: Vec<PlanarFix> = (0..n)
                .map(|i| PlanarFix::new(f64::from(i), 0.0, f64::from(i)))
                .collect();
            let legs = build_legs_planar(&fixes).expect("valid fixes");
            let n = fixes.len();
            assert_eq!(legs.len(), (n - 1) / 2 + (n - 1) % 2, "n={n}");
            assert_eq!(legs[0].begin, 0);
            assert_eq!(legs.last().map(|l| l.end), Some(n - 1));
            assert!(legs.windows(2).all(|w| w[0].end == w[1].begin));
        }
    }

    #[test]
    fn remainder_leg_sits_on_the_midpoint() {
        let fixes = [
            PlanarFix::new(0.0, 0.0, 0.0),
            PlanarFix::new(1.0, 0.0, 1.0),
            PlanarFix::new(2.0, 0.0, 2.0),
            PlanarFix::new(4.0, 2.0, 3.0),
        ];
        let legs = build_legs_planar(&fixes).expect("valid fixes");
        assert_eq!(legs.len(), 2);
        let tail: BridgeLeg = legs[1];
        assert_eq!(tail.mean, Point2::new(3.0, 1.0));
        assert_eq!(tail.observed, tail.mean);
        assert_eq!((tail.begin, tail.end), (2, 3));
        assert_eq!(tail.squared_displacement(), 0.0);
    }

    #[test]
    fn degenerate_inputs() {
        assert!(build_legs_planar(&[]).expect("empty").is_empty());
        let legs = build_legs_planar(&[PlanarFix::new(5.0, 6.0, 0.0)]).expect("single");
        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0].observed, legs[0].mean);
        assert_eq!((legs[0].begin, legs[0].end), (0, 0));
    }

    #[test]
    fn coincident_outer_timestamps_use_midpoint() {
        let fixes = [
            PlanarFix::new(0.0, 0.0, 5.0),
            PlanarFix::new(1.0, 1.0, 5.0),
            PlanarFix::new(2.0, 0.0, 5.0),
        ];
        let legs = build_legs_planar(&fixes).expect("valid fixes");
        assert_point_close(legs[0].mean, Point2::new(1.0, 0.0));
    }

    #[test]
    fn unsorted_or_non_finite_fixes_are_rejected() {
        let unsorted = [PlanarFix::new(0.0, 0.0, 2.0), PlanarFix::new(1.0, 0.0, 1.0)];
        assert!(matches!(
            build_legs_planar(&unsorted),
            Err(SegError::InvalidInput(_))
        ));
        let nan = [PlanarFix::new(f64::NAN, 0.0, 0.0)];
        assert!(matches!(
            build_legs_planar(&nan),
            Err(SegError::InvalidInput(_))
        ));
    }

    #[test]
    fn geographic_fixes_are_projected_from_the_first_fix() {
        let fixes = [
            Fix {
                lat: 52.0,
                lon: 5.0,
                time: 0.0,
            },
            Fix {
                lat: 52.001,
                lon: 5.001,
                time: 10.0,
            },
            Fix {
                lat: 52.002,
                lon: 5.0,
                time: 20.0,
            },
        ];
        let legs = build_legs::<LocalCoordinateReference>(&fixes).expect("valid fixes");
        assert_eq!(legs.len(), 1);
        // The mean lies halfway between the outer fixes, due north of the origin.
        assert!(legs[0].mean.x.abs() < 1e-6);
        assert!((legs[0].mean.y - 111.25).abs() < 1.0, "{:?}", legs[0].mean);
        assert!(legs[0].observed.x > 60.0 && legs[0].observed.x < 75.0);
    }
}
