//! Churn series, OLS slope, coefficient of variation, and the
//! deterministic trajectory classifier (spec 4.5).

use serde::{Deserialize, Serialize};

use super::commit::Commit;

const WINDOW_SECONDS: i64 = 4 * 7 * 24 * 3600;
const TRAJECTORY_EPSILON: f64 = 0.1;
const TRAJECTORY_CV_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Trajectory {
    Dormant,
    Stabilizing,
    Stable,
    Churning,
    Spiking,
}

impl std::fmt::Display for Trajectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Buckets commit timestamps touching a file into 4-week windows relative
/// to the earliest commit in the whole repository (`epoch`), so all files'
/// series align on the same window boundaries.
pub fn changes_per_window(touch_timestamps: &[i64], epoch: i64) -> Vec<usize> {
    if touch_timestamps.is_empty() {
        return Vec::new();
    }
    let max_ts = touch_timestamps.iter().copied().max().unwrap();
    let num_windows = ((max_ts - epoch) / WINDOW_SECONDS + 1).max(1) as usize;
    let mut windows = vec![0usize; num_windows];
    for &ts in touch_timestamps {
        let idx = (((ts - epoch) / WINDOW_SECONDS).max(0) as usize).min(num_windows - 1);
        windows[idx] += 1;
    }
    windows
}

/// OLS slope of `t -> changes_per_window[t]`.
pub fn ols_slope(series: &[usize]) -> f64 {
    let n = series.len();
    if n < 2 {
        return 0.0;
    }
    let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let ys: Vec<f64> = series.iter().map(|&c| c as f64).collect();
    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;
    let numerator: f64 = xs.iter().zip(ys.iter()).map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();
    let denominator: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// `cv = sigma / mu`; `0` when the mean is `0` (no activity, no variation).
pub fn coefficient_of_variation(series: &[usize]) -> f64 {
    let n = series.len();
    if n == 0 {
        return 0.0;
    }
    let mean = series.iter().sum::<usize>() as f64 / n as f64;
    if mean == 0.0 {
        return 0.0;
    }
    let variance = series.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / n as f64;
    variance.sqrt() / mean
}

/// Deterministic classifier (spec 4.5): dormant files never churn, a
/// negative slope with low variance is cooling off, a positive slope with
/// high variance is a spike in progress, high variance alone without a
/// clear direction is just noisy churn, and everything else is stable.
pub fn classify_trajectory(total_changes: usize, slope: f64, cv: f64) -> Trajectory {
    if total_changes <= 1 {
        return Trajectory::Dormant;
    }
    if slope < -TRAJECTORY_EPSILON && cv < TRAJECTORY_CV_THRESHOLD {
        return Trajectory::Stabilizing;
    }
    if slope > TRAJECTORY_EPSILON && cv > TRAJECTORY_CV_THRESHOLD {
        return Trajectory::Spiking;
    }
    if cv > TRAJECTORY_CV_THRESHOLD {
        return Trajectory::Churning;
    }
    Trajectory::Stable
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spiking_trajectory_matches_scenario_s8() {
        let series = vec![2, 5, 3, 8, 12, 4, 15, 20];
        let slope = ols_slope(&series);
        let cv = coefficient_of_variation(&series);
        assert!((slope - 2.18).abs() < 0.1, "slope was {slope}");
        assert!((cv - 0.70).abs() < 0.05, "cv was {cv}");
        assert_eq!(classify_trajectory(58, slope, cv), Trajectory::Spiking);
    }

    #[test]
    fn stable_trajectory_matches_scenario_s8() {
        let series = vec![5, 6, 5, 5, 6, 5, 6, 5];
        let slope = ols_slope(&series);
        let cv = coefficient_of_variation(&series);
        assert!(slope.abs() < 0.15, "slope was {slope}");
        assert!((cv - 0.08).abs() < 0.05, "cv was {cv}");
        assert_eq!(classify_trajectory(43, slope, cv), Trajectory::Stable);
    }

    #[test]
    fn dormant_when_total_changes_at_most_one() {
        assert_eq!(classify_trajectory(1, 0.0, 0.0), Trajectory::Dormant);
        assert_eq!(classify_trajectory(0, 5.0, 5.0), Trajectory::Dormant);
    }

    #[test]
    fn empty_series_has_zero_cv_and_slope() {
        assert_eq!(ols_slope(&[]), 0.0);
        assert_eq!(coefficient_of_variation(&[]), 0.0);
    }
}
