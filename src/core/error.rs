//! Error types for the analysis engine.
//!
//! Structured with `thiserror`. Only input and configuration errors are
//! fatal (spec taxonomy); parse, resolver, temporal and persistence
//! degradation are recovered locally via `FactStore::mark_unavailable` and
//! never surface as an `InsightError`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias used throughout the engine.
pub type Result<T> = std::result::Result<T, InsightError>;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid root path: {path}")]
    InvalidRoot { path: PathBuf },

    #[error("empty repository: no source files found under {path}")]
    EmptyRepository { path: PathBuf },

    #[error("polarity mismatch for finder `{finder}`: signal `{signal}` is {polarity} but condition uses `{op}`")]
    PolarityMismatch {
        finder: String,
        signal: String,
        polarity: String,
        op: String,
    },

    #[error("composite `{composite}` weights sum to {sum}, expected 1.0 +/- 1e-6")]
    WeightsNotNormalized { composite: String, sum: f64 },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("unsupported snapshot schema version: got {got}, supported up to {max_supported}")]
    UnsupportedSnapshotVersion { got: u32, max_supported: u32 },

    #[error("stage `{stage}` exceeded its budget of {budget_ms}ms")]
    StageBudgetExceeded { stage: String, budget_ms: u64 },

    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<InsightError>,
    },
}

impl InsightError {
    pub fn with_context(self, context: impl Into<String>) -> Self {
        InsightError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        InsightError::InvalidConfig {
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        InsightError::Persistence(message.into())
    }
}

/// Extension trait for adding context to a `Result`.
pub trait ResultExt<T> {
    fn context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_path() {
        let err = InsightError::InvalidRoot {
            path: PathBuf::from("/tmp/missing"),
        };
        assert!(err.to_string().contains("/tmp/missing"));
    }

    #[test]
    fn with_context_chains_source() {
        let inner = InsightError::invalid_config("bad threshold");
        let outer = inner.with_context("loading config");
        if let InsightError::WithContext { context, source } = &outer {
            assert_eq!(context, "loading config");
            assert!(matches!(**source, InsightError::InvalidConfig { .. }));
        } else {
            panic!("expected WithContext");
        }
    }

    #[test]
    fn result_ext_passthrough_on_ok() {
        let result: Result<i32> = Ok(42);
        assert_eq!(result.context("unused").unwrap(), 42);
    }

    #[test]
    fn polarity_mismatch_message() {
        let err = InsightError::PolarityMismatch {
            finder: "GOD_FILE".into(),
            signal: "bus_factor".into(),
            polarity: "HIGH_IS_GOOD".into(),
            op: ">".into(),
        };
        assert!(err.to_string().contains("GOD_FILE"));
        assert!(err.to_string().contains("bus_factor"));
    }

    #[test]
    fn unsupported_snapshot_version_message() {
        let err = InsightError::UnsupportedSnapshotVersion {
            got: 7,
            max_supported: 3,
        };
        assert!(err.to_string().contains('7'));
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn weights_not_normalized_message() {
        let err = InsightError::WeightsNotNormalized {
            composite: "risk_score".into(),
            sum: 0.97,
        };
        assert!(err.to_string().contains("risk_score"));
    }
}
