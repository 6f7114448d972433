//! shannon-insight - static + temporal codebase quality analyzer (Rust engine)
//!
//! This library provides the core analysis engine: a typed fact store (the
//! blackboard), graph/spectral/information/temporal derivers, a fusion layer
//! that turns raw signals into composite health scores, and a registry-driven
//! finder + ranker that emits evidence-backed findings.
//!
//! It is designed to be consumed by:
//! - The CLI binary (`src/bin/shannon_insight.rs`)
//! - Any embedder wanting programmatic access to `core::pipeline::Orchestrator`
//!
//! # Architecture
//!
//! This crate follows the "library-first" pattern: `lib.rs` and `core/` are
//! pure logic with no CLI concerns; `src/bin/` holds a thin wrapper. Source
//! parsing, the git log driver, and output formatting are external
//! collaborators, specified only by the traits in `core::collectors`.

pub mod core;

pub use crate::core::{
    AnalysisResult, Config, Entity, EntityId, EntityKind, FactStore, Finding, FindingId,
    InsightError, Orchestrator, Relation, RelationKind, Result, Scope, Signal, SignalId,
    SignalRegistry, Value,
};

/// Returns the version of the shannon-insight engine.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_matches_cargo() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
    }
}
