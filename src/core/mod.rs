//! Core analysis engine.
//!
//! Modules are layered leaves-first, mirroring the pipeline's dependency
//! order: the blackboard has no dependents below it; graph/spectral/
//! information/temporal/architecture derive signals onto it; fusion turns
//! raw signals into composites; finders+rank turn composites into findings;
//! persistence diffs findings across snapshots; pipeline sequences all of
//! the above; collectors are the external-facing seams.
//!
//! - `config`: thresholds, tier cutoffs, stage budgets, fail-on policy
//! - `error`: structured error types
//! - `blackboard`: entities, the 62-signal registry, the typed fact store
//! - `graph`: CSR graph + PageRank, betweenness, Tarjan, blast radius, Louvain
//! - `spectral`: sparse Laplacian + Lanczos top-k eigenpairs
//! - `information`: compression ratio, NCD, TF-IDF, concept extraction
//! - `temporal`: churn/trajectory/bus-factor/co-change over a commit stream
//! - `architecture`: module detection, Martin metrics, layer inference
//! - `fusion`: tiering, percentile normalization, composite scores, Δh
//! - `finders`: the 22 finder predicates + registry
//! - `rank`: scoring, dedup, CHRONIC amplification
//! - `persistence`: embedded snapshot store + signal/finding diffing
//! - `pipeline`: the seven-stage orchestrator
//! - `collectors`: external parser/resolver interfaces + reference adapters

pub mod architecture;
pub mod blackboard;
pub mod collectors;
pub mod config;
pub mod error;
pub mod finders;
pub mod fusion;
pub mod graph;
pub mod information;
pub mod persistence;
pub mod pipeline;
pub mod rank;
pub mod spectral;
pub mod temporal;

pub use blackboard::{Entity, EntityId, EntityKind, FactStore, Relation, RelationKind, Signal, SignalId, SignalRegistry, Value};
pub use config::Config;
pub use error::{InsightError, Result};
pub use finders::{Finding, FindingId, Scope};
pub use pipeline::{AnalysisResult, Orchestrator};
