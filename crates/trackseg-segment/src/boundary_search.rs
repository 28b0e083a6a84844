// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Bisects `(left, right)` for the largest window length at which `holds`
/// is still true.
///
/// `holds(left)` is assumed true and `holds(right)` false; neither end is
/// evaluated. `holds` must be a monotone step over lengths: true for short
/// windows, false from some length on. Uses `O(log(right - left))` calls.
/// Returns `left` when the interval contains no interior length.
pub fn last_true_length<F>(mut left: usize, mut right: usize, mut holds: F) -> usize
where
    F: FnMut(usize) -> bool,
{
    while right > left + 1 {
        let mid = left + (right - left) / 2;
        if holds(mid) {
            left = mid;
        } else {
            right = mid;
        }
    }
    left
}

#[cfg(test)]
mod tests {
    use super::last_true_length;

    #[test]
    fn finds_exact_flip_point() {
        for flip in 3..=16 {
            let found = last_true_length(2, 17, |len| len < flip);
            assert_eq!(found, flip - 1, "flip at {flip}");
        }
    }

    #[test]
    fn adjacent_bounds_return_left_without_evaluating() {
        let mut calls = 0;
        let found = last_true_length(4, 5, |_| {
            calls += 1;
            true
        });
        assert_eq!(found, 4);
        assert_eq!(calls, 0);
    }

    #[test]
    fn evaluation_count_is_logarithmic() {
        let mut calls = 0usize;
        let found = last_true_length(1 << 10, 1 << 11, |len| {
            calls += 1;
            len < 1500
        });
        assert_eq!(found, 1499);
        assert!(calls <= 11, "calls={calls}");
    }
}
