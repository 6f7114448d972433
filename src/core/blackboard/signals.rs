//! The 62-signal registry (spec 3.2). `Signal` is modeled as a compile-time
//! enum rather than a dynamically-typed slot object: the fact store indexes
//! values by `SignalId`, not by name, so a typo in a signal name is a
//! compile error rather than a silent no-op.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Dimension {
    Size,
    Shape,
    Naming,
    Reference,
    Information,
    Change,
    Authorship,
    Intent,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Float,
    Bool,
    Enum,
}

/// Drives trend classification and percentile inversion in composites
/// (spec 3.2 invariant d).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Polarity {
    HighIsBad,
    HighIsGood,
    Neutral,
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Pipeline phase at which a signal first becomes available; used to gate
/// finders so they never query a slot before its deriver has run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Collect,
    Model,
    Derive,
    Fusion,
}

/// Every signal in the registry, per-file first, then per-module, then
/// global, in the same order as spec 3.2.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SignalId {
    // per-file (36)
    Lines,
    FunctionCount,
    ClassCount,
    MaxNesting,
    ImplGini,
    StubRatio,
    ImportCount,
    Role,
    ConceptCount,
    ConceptEntropy,
    NamingDrift,
    TodoDensity,
    DocstringCoverage,
    PageRank,
    Betweenness,
    InDegree,
    OutDegree,
    BlastRadiusSize,
    Depth,
    IsOrphan,
    PhantomImportCount,
    BrokenCallCount,
    Community,
    CompressionRatio,
    SemanticCoherence,
    CognitiveLoad,
    TotalChanges,
    ChurnTrajectory,
    ChurnSlope,
    ChurnCv,
    BusFactor,
    AuthorEntropy,
    FixRatio,
    RefactorRatio,
    RiskScore,
    WiringQuality,
    // per-module (15)
    Cohesion,
    Coupling,
    Instability,
    Abstractness,
    MainSeqDistance,
    BoundaryAlignment,
    LayerViolationCount,
    RoleConsistency,
    Velocity,
    CoordinationCost,
    KnowledgeGini,
    ModuleBusFactor,
    MeanCognitiveLoad,
    FileCount,
    HealthScore,
    // global (11)
    Modularity,
    FiedlerValue,
    SpectralGap,
    CycleCount,
    CentralityGini,
    OrphanRatio,
    PhantomRatio,
    GlueDeficit,
    WiringScore,
    ArchitectureHealth,
    CodebaseHealth,
}

#[derive(Debug, Clone, Copy)]
pub struct SignalMeta {
    pub id: SignalId,
    pub name: &'static str,
    pub dimension: Dimension,
    pub value_type: ValueType,
    pub polarity: Polarity,
    pub percentileable: bool,
    pub phase: Phase,
}

macro_rules! signal {
    ($id:expr, $name:expr, $dim:expr, $vt:expr, $pol:expr, $pctl:expr, $phase:expr) => {
        SignalMeta {
            id: $id,
            name: $name,
            dimension: $dim,
            value_type: $vt,
            polarity: $pol,
            percentileable: $pctl,
            phase: $phase,
        }
    };
}

lazy_static! {
    static ref REGISTRY: Vec<SignalMeta> = {
        use Dimension::*;
        use Phase::*;
        use Polarity::*;
        use SignalId::*;
        use ValueType::*;
        vec![
            signal!(Lines, "lines", Size, Int, Neutral, true, Collect),
            signal!(FunctionCount, "function_count", Size, Int, Neutral, true, Collect),
            signal!(ClassCount, "class_count", Size, Int, Neutral, true, Collect),
            signal!(MaxNesting, "max_nesting", Shape, Int, HighIsBad, true, Collect),
            signal!(ImplGini, "impl_gini", Shape, Float, HighIsBad, true, Derive),
            signal!(StubRatio, "stub_ratio", Shape, Float, HighIsBad, true, Collect),
            signal!(ImportCount, "import_count", Reference, Int, Neutral, true, Collect),
            signal!(Role, "role", Naming, Enum, Neutral, false, Model),
            signal!(ConceptCount, "concept_count", Information, Int, Neutral, true, Derive),
            signal!(ConceptEntropy, "concept_entropy", Information, Float, Neutral, true, Derive),
            signal!(NamingDrift, "naming_drift", Naming, Float, HighIsBad, true, Derive),
            signal!(TodoDensity, "todo_density", Intent, Float, HighIsBad, true, Collect),
            signal!(DocstringCoverage, "docstring_coverage", Shape, Float, HighIsGood, true, Collect),
            signal!(PageRank, "pagerank", Reference, Float, Neutral, true, Derive),
            signal!(Betweenness, "betweenness", Reference, Float, Neutral, true, Derive),
            signal!(InDegree, "in_degree", Reference, Int, Neutral, true, Model),
            signal!(OutDegree, "out_degree", Reference, Int, Neutral, true, Model),
            signal!(BlastRadiusSize, "blast_radius_size", Reference, Int, HighIsBad, true, Derive),
            signal!(Depth, "depth", Reference, Int, Neutral, true, Derive),
            signal!(IsOrphan, "is_orphan", Reference, Bool, HighIsBad, false, Derive),
            signal!(PhantomImportCount, "phantom_import_count", Reference, Int, HighIsBad, true, Model),
            signal!(BrokenCallCount, "broken_call_count", Reference, Int, HighIsBad, true, Model),
            signal!(Community, "community", Reference, Int, Neutral, false, Derive),
            signal!(CompressionRatio, "compression_ratio", Information, Float, Neutral, true, Collect),
            signal!(SemanticCoherence, "semantic_coherence", Information, Float, HighIsGood, true, Derive),
            signal!(CognitiveLoad, "cognitive_load", Shape, Float, HighIsBad, true, Derive),
            signal!(TotalChanges, "total_changes", Change, Int, Neutral, true, Collect),
            signal!(ChurnTrajectory, "churn_trajectory", Change, Enum, Neutral, false, Derive),
            signal!(ChurnSlope, "churn_slope", Change, Float, Neutral, true, Derive),
            signal!(ChurnCv, "churn_cv", Change, Float, HighIsBad, true, Derive),
            signal!(BusFactor, "bus_factor", Authorship, Float, HighIsGood, true, Derive),
            signal!(AuthorEntropy, "author_entropy", Authorship, Float, HighIsGood, true, Derive),
            signal!(FixRatio, "fix_ratio", Intent, Float, HighIsBad, true, Derive),
            signal!(RefactorRatio, "refactor_ratio", Intent, Float, Neutral, true, Derive),
            signal!(RiskScore, "risk_score", Reference, Float, HighIsBad, false, Fusion),
            signal!(WiringQuality, "wiring_quality", Reference, Float, HighIsGood, false, Fusion),
            signal!(Cohesion, "cohesion", Reference, Float, HighIsGood, true, Derive),
            signal!(Coupling, "coupling", Reference, Float, HighIsBad, true, Derive),
            signal!(Instability, "instability", Reference, Float, Neutral, true, Derive),
            signal!(Abstractness, "abstractness", Reference, Float, Neutral, true, Derive),
            signal!(MainSeqDistance, "main_seq_distance", Reference, Float, HighIsBad, true, Derive),
            signal!(BoundaryAlignment, "boundary_alignment", Reference, Float, HighIsGood, true, Derive),
            signal!(LayerViolationCount, "layer_violation_count", Reference, Int, HighIsBad, true, Derive),
            signal!(RoleConsistency, "role_consistency", Naming, Float, HighIsGood, true, Derive),
            signal!(Velocity, "velocity", Change, Float, Neutral, true, Derive),
            signal!(CoordinationCost, "coordination_cost", Change, Float, HighIsBad, true, Derive),
            signal!(KnowledgeGini, "knowledge_gini", Authorship, Float, HighIsBad, true, Derive),
            signal!(ModuleBusFactor, "module_bus_factor", Authorship, Float, HighIsGood, true, Derive),
            signal!(MeanCognitiveLoad, "mean_cognitive_load", Shape, Float, HighIsBad, true, Derive),
            signal!(FileCount, "file_count", Size, Int, Neutral, true, Model),
            signal!(HealthScore, "health_score", Reference, Float, HighIsGood, false, Fusion),
            signal!(Modularity, "modularity", Reference, Float, HighIsGood, false, Derive),
            signal!(FiedlerValue, "fiedler_value", Reference, Float, Neutral, false, Derive),
            signal!(SpectralGap, "spectral_gap", Reference, Float, Neutral, false, Derive),
            signal!(CycleCount, "cycle_count", Reference, Int, HighIsBad, false, Derive),
            signal!(CentralityGini, "centrality_gini", Reference, Float, Neutral, false, Derive),
            signal!(OrphanRatio, "orphan_ratio", Reference, Float, HighIsBad, false, Derive),
            signal!(PhantomRatio, "phantom_ratio", Reference, Float, HighIsBad, false, Derive),
            signal!(GlueDeficit, "glue_deficit", Reference, Float, HighIsBad, false, Derive),
            signal!(WiringScore, "wiring_score", Reference, Float, HighIsGood, false, Fusion),
            signal!(ArchitectureHealth, "architecture_health", Reference, Float, HighIsGood, false, Fusion),
            signal!(CodebaseHealth, "codebase_health", Reference, Float, HighIsGood, false, Fusion),
        ]
    };
    static ref BY_ID: HashMap<SignalId, SignalMeta> =
        REGISTRY.iter().map(|m| (m.id, *m)).collect();
}

/// Builds (memoizes) the full 62-signal registry.
pub fn build_signal_registry() -> &'static [SignalMeta] {
    &REGISTRY
}

pub struct SignalRegistry;

impl SignalRegistry {
    pub fn meta(id: SignalId) -> SignalMeta {
        *BY_ID
            .get(&id)
            .expect("every SignalId variant has a registry entry")
    }

    pub fn all() -> &'static [SignalMeta] {
        &REGISTRY
    }
}
