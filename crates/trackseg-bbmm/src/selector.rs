// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use trackseg_core::SegError;

/// Picks `k` candidate values spread over the empirical distribution of
/// `values`: after sorting, the middle element of each of `k` equal strata.
pub fn select_candidates(values: &[f64], k: usize) -> Result<Vec<f64>, SegError> {
    if k == 0 {
        return Err(SegError::invalid_input(
            "candidate count must be >= 1; got 0",
        ));
    }
    if values.len() < k {
        return Err(SegError::invalid_input(format!(
            "candidate count must not exceed the number of values; got k={k}, values={}",
            values.len()
        )));
    }
    if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
        return Err(SegError::numerical_issue(format!(
            "candidate source value {idx} is not finite: {}",
            values[idx]
        )));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let interval = sorted.len() / k;
    Ok((0..k)
        .map(|i| sorted[interval / 2 + interval * i])
        .collect())
}
