//! Engine configuration: thresholds, tier cutoffs, stage budgets, fail-on
//! policy. A plain serde-derived struct with a `Default` impl and an
//! optional on-disk TOML override rather than a builder.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{InsightError, Result};

/// `--fail-on` policy (spec 6.6): `none` never fails, `any` fails on any
/// finding, `high` fails only when a finding's severity >= 0.8.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailOn {
    #[default]
    None,
    Any,
    High,
}

impl FailOn {
    pub fn threshold(self) -> Option<f64> {
        match self {
            FailOn::None => None,
            FailOn::Any => Some(0.0),
            FailOn::High => Some(0.8),
        }
    }
}

/// File-count tier cutoffs (spec 4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierCutoffs {
    /// Below this, tier = ABSOLUTE.
    pub absolute_max_files: usize,
    /// Below this (and >= absolute_max_files), tier = BAYESIAN.
    pub bayesian_max_files: usize,
}

impl Default for TierCutoffs {
    fn default() -> Self {
        Self {
            absolute_max_files: 15,
            bayesian_max_files: 50,
        }
    }
}

/// Per-stage wall-clock budgets in milliseconds (spec 5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageBudgets {
    /// Collect budget per 10k files, in ms.
    pub collect_per_10k_files_ms: u64,
    pub derive_ms: u64,
    pub detect_ms: u64,
}

impl Default for StageBudgets {
    fn default() -> Self {
        Self {
            collect_per_10k_files_ms: 120_000,
            derive_ms: 60_000,
            detect_ms: 30_000,
        }
    }
}

/// Detection thresholds referenced by finders and derivers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    pub max_nesting_warn: usize,
    pub ncd_clone_threshold: f64,
    pub minhash_corpus_threshold: usize,
    pub betweenness_sampling_threshold: usize,
    pub betweenness_sample_k: usize,
    pub trajectory_epsilon: f64,
    pub trajectory_cv_threshold: f64,
    pub max_files_per_commit: usize,
    pub weak_link_laplacian: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_nesting_warn: 5,
            ncd_clone_threshold: 0.3,
            minhash_corpus_threshold: 1000,
            betweenness_sampling_threshold: 5000,
            betweenness_sample_k: 500,
            trajectory_epsilon: 0.1,
            trajectory_cv_threshold: 0.5,
            max_files_per_commit: 64,
            weak_link_laplacian: 0.4,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub fail_on: FailOn,
    #[serde(default)]
    pub tiers: TierCutoffs,
    #[serde(default)]
    pub budgets: StageBudgets,
    #[serde(default)]
    pub thresholds: Thresholds,
    /// Ignore globs layered on top of the collector's default exclusions.
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl Config {
    /// Load from a TOML file, falling back to `Default` for any absent keys.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&text)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tiers.absolute_max_files >= self.tiers.bayesian_max_files {
            return Err(InsightError::invalid_config(
                "tiers.absolute_max_files must be < tiers.bayesian_max_files",
            ));
        }
        if !(0.0..=1.0).contains(&self.thresholds.ncd_clone_threshold) {
            return Err(InsightError::invalid_config(
                "thresholds.ncd_clone_threshold must be in [0, 1]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn fail_on_high_threshold() {
        assert_eq!(FailOn::High.threshold(), Some(0.8));
        assert_eq!(FailOn::None.threshold(), None);
    }

    #[test]
    fn rejects_inverted_tier_cutoffs() {
        let mut config = Config::default();
        config.tiers.absolute_max_files = 60;
        config.tiers.bayesian_max_files = 50;
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_partial_toml_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "fail_on = \"high\"\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.fail_on, FailOn::High);
        assert_eq!(config.tiers.absolute_max_files, 15);
    }
}
