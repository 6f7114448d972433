//! Fusion: turns raw signals into the percentile field and the six
//! composites (spec 4.7). `analyze` is the seam that reads the FactStore
//! and writes composites + percentile-adjacent signals back in.

pub mod composites;
pub mod health_laplacian;
pub mod tier;

pub use composites::{
    architecture_health, codebase_health, health_score, risk_score, to_display_scale,
    wiring_quality, wiring_score, ArchitectureHealthInputs, CodebaseHealthInputs,
    HealthScoreInputs, RiskScoreInputs, WiringQualityInputs, WiringScoreInputs,
};
pub use health_laplacian::{health_laplacian, raw_risk, RawRiskInputs, RawRiskMaxima};
pub use tier::{percentile, tier_for, Tier};

use std::collections::HashMap;

use crate::core::blackboard::{EntityId, FactStore, RelationKind, SignalId, Value};
use crate::core::config::Config;

/// Runs fusion over every file in `store`, writing `risk_score` and
/// `wiring_quality` per file and the global composites on the codebase
/// entity. Module-level `health_score` is left to callers with module
/// membership data (spec 4.6's module detection is a separate pass);
/// this computes the signals §4.7 defines purely in terms of file-level
/// and global inputs.
pub fn analyze(store: &mut FactStore, config: &Config) {
    let files: Vec<String> = store.files().map(|s| s.to_string()).collect();
    if files.is_empty() {
        return;
    }
    let tier = tier_for(files.len(), &config.tiers);

    let pageranks: Vec<f64> = signal_values(store, &files, SignalId::PageRank);
    let blast_radii: Vec<f64> = signal_values(store, &files, SignalId::BlastRadiusSize);
    let cognitive_loads: Vec<f64> = signal_values(store, &files, SignalId::CognitiveLoad);
    let bus_factors: Vec<f64> = signal_values(store, &files, SignalId::BusFactor);
    let max_bus_factor = bus_factors.iter().cloned().fold(0.0_f64, f64::max);

    for file in &files {
        let entity = EntityId::file(file);
        let pagerank = store.get_f64(&entity, SignalId::PageRank).unwrap_or(0.0);
        let blast = store.get_f64(&entity, SignalId::BlastRadiusSize).unwrap_or(0.0);
        let cognitive_load = store.get_f64(&entity, SignalId::CognitiveLoad).unwrap_or(0.0);
        let trajectory = store
            .get(&entity, SignalId::ChurnTrajectory)
            .and_then(Value::as_enum)
            .map(|s| s.to_string());
        let instability_factor = match trajectory.as_deref() {
            Some("Churning") | Some("Spiking") => 1.0,
            _ => 0.3,
        };
        let bus_factor = store.get_f64(&entity, SignalId::BusFactor).unwrap_or(0.0);

        let inputs = RiskScoreInputs {
            pctl_pagerank: percentile(tier, &pageranks, pagerank),
            pctl_blast_radius: percentile(tier, &blast_radii, blast),
            pctl_cognitive_load: percentile(tier, &cognitive_loads, cognitive_load),
            instability_factor,
            bus_factor,
            max_bus_factor,
        };
        store.set(&entity, SignalId::RiskScore, Value::Float(risk_score(&inputs)));

        let is_orphan = store.get(&entity, SignalId::IsOrphan).and_then(Value::as_bool).unwrap_or(false);
        let stub_ratio = store.get_f64(&entity, SignalId::StubRatio).unwrap_or(0.0);
        let phantom = store.get_f64(&entity, SignalId::PhantomImportCount).unwrap_or(0.0);
        let imports = store.get_f64(&entity, SignalId::ImportCount).unwrap_or(0.0);
        let broken = store.get_f64(&entity, SignalId::BrokenCallCount).unwrap_or(0.0);

        let wiring_inputs = WiringQualityInputs {
            is_orphan,
            stub_ratio,
            phantom_import_count: phantom,
            import_count: imports,
            broken_call_count: broken,
            // Total call sites are not separately tracked; imports is the
            // closest available denominator for the broken-call ratio.
            total_calls: imports,
        };
        store.set(&entity, SignalId::WiringQuality, Value::Float(wiring_quality(&wiring_inputs)));
    }

    analyze_global(store, &files);
}

fn signal_values(store: &FactStore, files: &[String], signal: SignalId) -> Vec<f64> {
    files
        .iter()
        .filter_map(|f| store.get_f64(&EntityId::file(f), signal))
        .collect()
}

fn analyze_global(store: &mut FactStore, files: &[String]) {
    let n = files.len() as f64;
    let orphan_ratio = files
        .iter()
        .filter(|f| {
            store
                .get(&EntityId::file(f), SignalId::IsOrphan)
                .and_then(Value::as_bool)
                .unwrap_or(false)
        })
        .count() as f64
        / n;
    let phantom_total: f64 = files
        .iter()
        .filter_map(|f| store.get_f64(&EntityId::file(f), SignalId::PhantomImportCount))
        .sum();
    let import_total: f64 = files
        .iter()
        .filter_map(|f| store.get_f64(&EntityId::file(f), SignalId::ImportCount))
        .sum();
    let phantom_ratio = if import_total <= 0.0 { 0.0 } else { phantom_total / import_total };
    let mean_stub = mean_of(store, files, SignalId::StubRatio);

    let wiring_inputs = WiringScoreInputs {
        orphan_ratio,
        phantom_ratio,
        glue_deficit: orphan_ratio, // no separate glue-deficit signal yet; orphan ratio is its dominant driver
        mean_stub,
        clone_ratio: 0.0,
    };
    let wiring = wiring_score(&wiring_inputs);
    store.set(&EntityId::codebase(""), SignalId::WiringScore, Value::Float(wiring));
    store.set(&EntityId::codebase(""), SignalId::OrphanRatio, Value::Float(orphan_ratio));
    store.set(&EntityId::codebase(""), SignalId::PhantomRatio, Value::Float(phantom_ratio));
    store.set(&EntityId::codebase(""), SignalId::GlueDeficit, Value::Float(orphan_ratio));

    let violation_count = store
        .get_f64(&EntityId::codebase(""), SignalId::LayerViolationCount)
        .unwrap_or(0.0);
    let module_count = store.modules().count().max(1) as f64;
    let violation_rate = (violation_count / module_count).min(1.0);

    let mean_coupling = mean_of_modules(store, SignalId::Coupling);
    let mean_main_seq = mean_of_modules(store, SignalId::MainSeqDistance);
    let mean_boundary = mean_of_modules(store, SignalId::BoundaryAlignment);
    let mean_cohesion = mean_of_modules(store, SignalId::Cohesion);

    let arch_inputs = ArchitectureHealthInputs {
        violation_rate,
        mean_cohesion,
        mean_coupling,
        mean_main_seq_distance: mean_main_seq,
        mean_boundary_alignment: mean_boundary,
    };
    let arch_health = architecture_health(&arch_inputs);
    store.set(&EntityId::codebase(""), SignalId::ArchitectureHealth, Value::Float(arch_health));

    let authors: Vec<String> = store.authors().map(|s| s.to_string()).collect();
    let team_size = authors.len().max(1) as f64;
    let global_bus_factor = store
        .get_f64(&EntityId::codebase(""), SignalId::BusFactor)
        .unwrap_or(team_size);
    let modularity = store
        .get_f64(&EntityId::codebase(""), SignalId::Modularity)
        .unwrap_or(0.0);

    let health_inputs = CodebaseHealthInputs {
        architecture_health: arch_health,
        wiring_score: wiring,
        global_bus_factor,
        team_size,
        modularity,
    };
    store.set(
        &EntityId::codebase(""),
        SignalId::CodebaseHealth,
        Value::Float(codebase_health(&health_inputs)),
    );
}

fn mean_of(store: &FactStore, files: &[String], signal: SignalId) -> f64 {
    let values: Vec<f64> = files.iter().filter_map(|f| store.get_f64(&EntityId::file(f), signal)).collect();
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn mean_of_modules(store: &FactStore, signal: SignalId) -> f64 {
    let modules: Vec<String> = store.modules().map(|s| s.to_string()).collect();
    let values: Vec<f64> =
        modules.iter().filter_map(|m| store.get_f64(&EntityId::module(m), signal)).collect();
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Builds the undirected IMPORTS neighborhood map the Health Laplacian
/// needs, once per analysis (spec 4.7: `N(f)` is the undirected union of
/// IMPORTS in/out neighbors).
pub fn imports_neighborhoods(store: &FactStore, files: &[String]) -> HashMap<String, Vec<String>> {
    let mut neighbors: HashMap<String, Vec<String>> = HashMap::new();
    for file in files {
        let entity = EntityId::file(file);
        let mut set: Vec<String> = store
            .outgoing(&entity, RelationKind::Imports)
            .into_iter()
            .map(|r| r.to.key().to_string())
            .chain(store.incoming(&entity, RelationKind::Imports).into_iter().map(|r| r.from.key().to_string()))
            .collect();
        set.sort();
        set.dedup();
        neighbors.insert(file.clone(), set);
    }
    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::blackboard::Entity;

    #[test]
    fn analyze_writes_risk_score_for_every_file() {
        let mut store = FactStore::new();
        for f in ["a.rs", "b.rs"] {
            store.add_entity(Entity::new(EntityId::file(f), None));
            store.set(&EntityId::file(f), SignalId::PageRank, Value::Float(0.5));
        }
        let config = Config::default();
        analyze(&mut store, &config);
        assert!(store.has_value(&EntityId::file("a.rs"), SignalId::RiskScore));
    }

    #[test]
    fn analyze_on_empty_store_is_a_noop() {
        let mut store = FactStore::new();
        let config = Config::default();
        analyze(&mut store, &config);
        assert!(!store.has_value(&EntityId::codebase(""), SignalId::CodebaseHealth));
    }

    #[test]
    fn imports_neighborhoods_are_undirected() {
        let mut store = FactStore::new();
        store.relations_mut(RelationKind::Imports).add(
            EntityId::file("a.rs"),
            EntityId::file("b.rs"),
            RelationKind::Imports,
            1.0,
        );
        let files = vec!["a.rs".to_string(), "b.rs".to_string()];
        let neighbors = imports_neighborhoods(&store, &files);
        assert!(neighbors["a.rs"].contains(&"b.rs".to_string()));
        assert!(neighbors["b.rs"].contains(&"a.rs".to_string()));
    }
}
