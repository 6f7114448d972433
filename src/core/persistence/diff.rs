//! Signal time-series diffing and finding lifecycle classification between
//! two or more snapshots (spec 4.10).

use std::collections::{HashMap, HashSet};

use crate::core::blackboard::Polarity;
use crate::core::temporal::churn::Trajectory;

const TRAJECTORY_EPSILON: f64 = 0.1;
const TRAJECTORY_CV_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Improving,
    Worsening,
    Steady,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalDiff {
    pub delta: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub trajectory: Trajectory,
    pub volatility: f64,
    pub trend: Trend,
}

fn ols_slope(series: &[f64]) -> f64 {
    let n = series.len();
    if n < 2 {
        return 0.0;
    }
    let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = series.iter().sum::<f64>() / n as f64;
    let numerator: f64 = xs.iter().zip(series).map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();
    let denominator: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn coefficient_of_variation(series: &[f64]) -> f64 {
    let n = series.len();
    if n == 0 {
        return 0.0;
    }
    let mean = series.iter().sum::<f64>() / n as f64;
    if mean == 0.0 {
        return 0.0;
    }
    let variance = series.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    variance.sqrt() / mean
}

fn classify_series_trajectory(slope: f64, cv: f64) -> Trajectory {
    if slope < -TRAJECTORY_EPSILON && cv < TRAJECTORY_CV_THRESHOLD {
        Trajectory::Stabilizing
    } else if slope > TRAJECTORY_EPSILON && cv > TRAJECTORY_CV_THRESHOLD {
        Trajectory::Spiking
    } else if cv > TRAJECTORY_CV_THRESHOLD {
        Trajectory::Churning
    } else {
        Trajectory::Stable
    }
}

fn rolling_mean(series: &[f64], window: usize) -> Vec<f64> {
    if series.len() < window {
        return vec![];
    }
    (0..=series.len() - window).map(|i| series[i..i + window].iter().sum::<f64>() / window as f64).collect()
}

/// Diffs a single signal's value series (oldest first, ending at the
/// current snapshot) between two snapshots (spec 4.10).
pub fn diff_signal_series(series: &[f64], polarity: Polarity) -> Option<SignalDiff> {
    if series.len() < 2 {
        return None;
    }
    let delta = series[series.len() - 1] - series[series.len() - 2];
    let older_half = &series[..series.len() / 2.max(1)];
    let recent_half = &series[series.len() / 2..];
    let velocity_older = ols_slope(older_half);
    let velocity_recent = ols_slope(recent_half);
    let acceleration = velocity_recent - velocity_older;
    let cv = coefficient_of_variation(series);
    let trajectory = classify_series_trajectory(velocity_recent, cv);
    let volatility = cv;

    let means = rolling_mean(series, 3.min(series.len()));
    let rolling_delta = if means.len() >= 2 { means[means.len() - 1] - means[0] } else { delta };
    let trend = if rolling_delta.abs() < 1e-9 {
        Trend::Steady
    } else {
        let improving = match polarity {
            Polarity::HighIsGood => rolling_delta > 0.0,
            Polarity::HighIsBad => rolling_delta < 0.0,
            Polarity::Neutral => return Some(SignalDiff { delta, velocity: velocity_recent, acceleration, trajectory, volatility, trend: Trend::Steady }),
        };
        if improving { Trend::Improving } else { Trend::Worsening }
    };

    Some(SignalDiff { delta, velocity: velocity_recent, acceleration, trajectory, volatility, trend })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingLifecycleStatus {
    New,
    Persisting,
    Resolved,
    Regression,
}

/// Classifies every finding identity key's lifecycle status given the
/// previous snapshot's open ids, the union of ids ever seen before that,
/// and the current snapshot's ids (spec 4.10, invariant 12). Rename-aware
/// remapping of ids across renamed files must happen in the caller before
/// these sets are built.
pub fn diff_findings(
    previous_snapshot_ids: &HashSet<String>,
    ever_seen_ids: &HashSet<String>,
    current_ids: &HashSet<String>,
) -> HashMap<String, FindingLifecycleStatus> {
    let mut result = HashMap::new();
    for id in current_ids {
        let status = if previous_snapshot_ids.contains(id) {
            FindingLifecycleStatus::Persisting
        } else if ever_seen_ids.contains(id) {
            FindingLifecycleStatus::Regression
        } else {
            FindingLifecycleStatus::New
        };
        result.insert(id.clone(), status);
    }
    for id in previous_snapshot_ids.difference(current_ids) {
        result.insert(id.clone(), FindingLifecycleStatus::Resolved);
    }
    result
}
