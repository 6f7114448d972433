//! Percentile tiering (spec 4.7): which normalization a signal gets
//! depends on how many files survived collection, not on any per-signal
//! choice.

use crate::core::config::TierCutoffs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Absolute,
    Bayesian,
    Full,
}

pub fn tier_for(file_count: usize, cutoffs: &TierCutoffs) -> Tier {
    if file_count < cutoffs.absolute_max_files {
        Tier::Absolute
    } else if file_count < cutoffs.bayesian_max_files {
        Tier::Bayesian
    } else {
        Tier::Full
    }
}

/// `pctl(v) = (alpha + rank(v)) / (alpha + beta + n)` with a flat `alpha =
/// beta = 1` prior, where `rank(v)` counts values strictly less than `v`.
pub fn bayesian_percentile(values: &[f64], v: f64) -> f64 {
    let n = values.len() as f64;
    let rank = values.iter().filter(|&&u| u < v).count() as f64;
    (1.0 + rank) / (2.0 + n)
}

/// `pctl(v) = |{u : s(u) <= s(v)}| / n`.
pub fn full_percentile(values: &[f64], v: f64) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    let count = values.iter().filter(|&&u| u <= v).count();
    count as f64 / n as f64
}

/// Dispatches to the percentile formula for `tier`, or returns the raw
/// value unchanged for `Absolute` (spec: "no percentiles" in that tier).
pub fn percentile(tier: Tier, values: &[f64], v: f64) -> f64 {
    match tier {
        Tier::Absolute => v,
        Tier::Bayesian => bayesian_percentile(values, v),
        Tier::Full => full_percentile(values, v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_count_below_absolute_cutoff_is_absolute_tier() {
        let cutoffs = TierCutoffs { absolute_max_files: 15, bayesian_max_files: 50 };
        assert_eq!(tier_for(10, &cutoffs), Tier::Absolute);
        assert_eq!(tier_for(20, &cutoffs), Tier::Bayesian);
        assert_eq!(tier_for(60, &cutoffs), Tier::Full);
    }

    #[test]
    fn full_percentile_of_max_value_is_one() {
        let values = vec![1.0, 5.0, 3.0, 9.0];
        assert_eq!(full_percentile(&values, 9.0), 1.0);
    }

    #[test]
    fn bayesian_percentile_never_hits_zero_or_one() {
        let values = vec![1.0, 2.0, 3.0];
        let p = bayesian_percentile(&values, 1.0);
        assert!(p > 0.0 && p < 1.0);
    }
}
