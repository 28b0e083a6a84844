// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::geometry::{Point2, squared_distance};

const CONTAINMENT_REL_TOL: f64 = 1e-12;
const SHUFFLE_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Smallest disc containing a point set.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnclosingBall {
    pub center: Point2,
    pub radius: f64,
}

impl EnclosingBall {
    fn from_point(p: Point2) -> Self {
        Self {
            center: p,
            radius: 0.0,
        }
    }

    fn from_pair(a: Point2, b: Point2) -> Self {
        Self {
            center: a.lerp(b, 0.5),
            radius: squared_distance(a, b).sqrt() / 2.0,
        }
    }

    fn from_triple(a: Point2, b: Point2, c: Point2) -> Self {
        let bx = b.x - a.x;
        let by = b.y - a.y;
        let cx = c.x - a.x;
        let cy = c.y - a.y;
        let d = 2.0 * (bx * cy - by * cx);
        if d == 0.0 || !d.is_finite() {
            // Collinear: the widest pair spans the other point.
            let candidates = [
                Self::from_pair(a, b),
                Self::from_pair(a, c),
                Self::from_pair(b, c),
            ];
            return candidates
                .into_iter()
                .fold(Self::from_pair(a, b), |best, ball| {
                    if ball.radius > best.radius { ball } else { best }
                });
        }
        let b2 = bx * bx + by * by;
        let c2 = cx * cx + cy * cy;
        let ux = (cy * b2 - by * c2) / d;
        let uy = (bx * c2 - cx * b2) / d;
        let center = Point2::new(a.x + ux, a.y + uy);
        Self {
            center,
            radius: (ux * ux + uy * uy).sqrt(),
        }
    }

    /// Containment test with a small relative tolerance for round-off.
    pub fn contains(&self, p: Point2) -> bool {
        let dist = squared_distance(self.center, p).sqrt();
        dist <= self.radius + CONTAINMENT_REL_TOL * self.radius.max(1.0)
    }
}

/// Computes the minimum enclosing ball of `points` with Welzl's incremental
/// scheme.
///
/// Points are visited in a pseudo-random order fixed by a constant seed, so
/// the result depends only on the input while ordered trajectory windows
/// still get expected linear time. Returns `None` for an empty slice.
pub fn minimum_enclosing_ball(points: &[Point2]) -> Option<EnclosingBall> {
    let points = shuffled(points);
    let (&first, rest) = points.split_first()?;
    let mut ball = EnclosingBall::from_point(first);

    for (i, &p) in rest.iter().enumerate() {
        if ball.contains(p) {
            continue;
        }
        // Points visited before `p`: points[0..=i].
        ball = EnclosingBall::from_point(p);
        for j in 0..=i {
            let q = points[j];
            if ball.contains(q) {
                continue;
            }
            ball = EnclosingBall::from_pair(p, q);
            for &r in &points[..j] {
                if !ball.contains(r) {
                    ball = EnclosingBall::from_triple(p, q, r);
                }
            }
        }
    }

    Some(ball)
}

/// Fisher-Yates shuffle driven by a fixed-seed LCG.
fn shuffled(points: &[Point2]) -> Vec<Point2> {
    let mut out = points.to_vec();
    let mut state = SHUFFLE_SEED;
    for i in (1..out.len()).rev() {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let j = ((state >> 33) % (i as u64 + 1)) as usize;
        out.swap(i, j);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{EnclosingBall, minimum_enclosing_ball, shuffled};
    use crate::geometry::Point2;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn empty_input_has_no_ball() {
        assert!(minimum_enclosing_ball(&[]).is_none());
    }

    #[test]
    fn single_point_has_zero_radius() {
        let ball = minimum_enclosing_ball(&[Point2::new(3.0, -1.0)]).expect("ball");
        assert_eq!(ball.center, Point2::new(3.0, -1.0));
        assert_eq!(ball.radius, 0.0);
    }

    #[test]
    fn pair_is_spanned_by_its_diameter() {
        let ball = minimum_enclosing_ball(&[Point2::new(0.0, 0.0), Point2::new(4.0, 0.0)])
            .expect("ball");
        assert_close(ball.radius, 2.0);
        assert_eq!(ball.center, Point2::new(2.0, 0.0));
    }

    #[test]
    fn square_corners_give_half_diagonal() {
        let points = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
            Point2::new(1.0, 1.0),
        ];
        let ball = minimum_enclosing_ball(&points).expect("ball");
        assert_close(ball.radius, 2.0_f64.sqrt());
        assert_close(ball.center.x, 1.0);
        assert_close(ball.center.y, 1.0);
        assert!(points.iter().all(|&p| ball.contains(p)));
    }

    #[test]
    fn collinear_triple_uses_widest_pair() {
        let ball = EnclosingBall::from_triple(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(5.0, 0.0),
        );
        assert_close(ball.radius, 2.5);
        assert_close(ball.center.x, 2.5);
    }

    #[test]
    fn obtuse_triangle_ball_is_spanned_by_longest_edge() {
        let points = [
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(5.0, 1.0),
        ];
        let ball = minimum_enclosing_ball(&points).expect("ball");
        assert_close(ball.radius, 5.0);
        assert!(points.iter().all(|&p| ball.contains(p)));
    }

    fn lcg_unit(state: &mut u64) -> f64 {
        *state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (*state >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Smallest ball through two or three input points that covers them all.
    fn exhaustive_radius(points: &[Point2]) -> f64 {
        if points.len() == 1 {
            return 0.0;
        }
        let mut best = f64::INFINITY;
        let mut consider = |ball: EnclosingBall| {
            if points.iter().all(|&p| ball.contains(p)) {
                best = best.min(ball.radius);
            }
        };
        for a in 0..points.len() {
            for b in a + 1..points.len() {
                consider(EnclosingBall::from_pair(points[a], points[b]));
                for c in b + 1..points.len() {
                    consider(EnclosingBall::from_triple(points[a], points[b], points[c]));
                }
            }
        }
        best
    }

    #[test]
    fn shuffle_is_a_fixed_permutation() {
        let points: Vec<Point2> = (0..50).map(|i| Point2::new(i as f64, 0.0)).collect();
        let once = shuffled(&points);
        assert_eq!(once, shuffled(&points));
        assert_ne!(once, points);
        let mut xs: Vec<f64> = once.iter().map(|p| p.x).collect();
        xs.sort_by(f64::total_cmp);
        assert_eq!(xs, points.iter().map(|p| p.x).collect::<Vec<_>>());
    }

    #[test]
    fn ordered_paths_match_exhaustive_search() {
        let mut state = 7u64;
        for len in 1..=12 {
            // A forward-moving track with lateral jitter, fed in travel order.
            let mut x = 0.0;
            let points: Vec<Point2> = (0..len)
                .map(|_| {
                    x += 0.1 + lcg_unit(&mut state);
                    Point2::new(x, lcg_unit(&mut state) - 0.5)
                })
                .collect();
            let ball = minimum_enclosing_ball(&points).expect("ball");
            assert!((ball.radius - exhaustive_radius(&points)).abs() < 1e-9);
            assert!(points.iter().all(|&p| ball.contains(p)));
        }
    }

    #[test]
    fn radius_does_not_depend_on_input_order() {
        let points: Vec<Point2> = (0..2_000)
            .map(|i| {
                let t = i as f64 * 0.01;
                Point2::new(t, t * t)
            })
            .collect();
        let mut reversed = points.clone();
        reversed.reverse();
        let forward = minimum_enclosing_ball(&points).expect("ball");
        let backward = minimum_enclosing_ball(&reversed).expect("ball");
        assert!((forward.radius - backward.radius).abs() < 1e-7 * forward.radius);
        assert!(points.iter().all(|&p| forward.contains(p)));
    }
}
