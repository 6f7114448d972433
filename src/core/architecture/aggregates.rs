//! Module-level aggregates that need both structural and temporal signals
//! already in place (spec 4.7's `health_score` row, plus the rest of the
//! per-module signal list that spec 3.1 names but doesn't give a formula
//! for: `role_consistency`, `velocity`, `coordination_cost`,
//! `knowledge_gini`, `module_bus_factor`, `mean_cognitive_load`). Run this
//! after [`super::analyze`], [`crate::core::temporal::analyze`], and the
//! per-file `CognitiveLoad`/`StubRatio` signals have been written.

use std::collections::HashMap;

use crate::core::blackboard::{EntityId, FactStore, RelationKind, SignalId, Value};
use crate::core::fusion::{health_score, HealthScoreInputs};
use crate::core::information::gini;
use crate::core::temporal::{author_entropy, bus_factor, Commit};

/// Module name -> its member file paths, read back from the `InModule`
/// relations [`super::analyze`] materialized.
pub fn module_members(store: &FactStore) -> HashMap<String, Vec<String>> {
    let mut members: HashMap<String, Vec<String>> = HashMap::new();
    for module in store.modules() {
        let module_id = EntityId::module(module);
        let mut files: Vec<String> = store
            .incoming(&module_id, RelationKind::InModule)
            .into_iter()
            .map(|rel| rel.from.key().to_string())
            .collect();
        files.sort();
        members.insert(module.to_string(), files);
    }
    members
}

pub fn annotate_module_aggregates(store: &mut FactStore, commits: &[Commit]) {
    let members = module_members(store);
    if members.is_empty() {
        return;
    }

    let module_of: HashMap<&str, &str> = members
        .iter()
        .flat_map(|(module, files)| files.iter().map(move |f| (f.as_str(), module.as_str())))
        .collect();

    let author_counts_by_module = module_author_commit_counts(commits, &module_of);

    for (module, files) in &members {
        if files.is_empty() {
            continue;
        }
        let module_id = EntityId::module(module.clone());

        let cohesion = cohesion_for(store, files);
        store.set(&module_id, SignalId::Cohesion, Value::Float(cohesion));

        let role_consistency = role_consistency_for(store, files);
        store.set(&module_id, SignalId::RoleConsistency, Value::Float(role_consistency));

        let velocity = mean_signal(store, files, SignalId::ChurnSlope);
        store.set(&module_id, SignalId::Velocity, Value::Float(velocity));

        let mean_cognitive_load = mean_signal(store, files, SignalId::CognitiveLoad);
        store.set(&module_id, SignalId::MeanCognitiveLoad, Value::Float(mean_cognitive_load));

        let mean_stub = mean_signal(store, files, SignalId::StubRatio);

        let coordination_cost = coordination_cost_for(store, files, &module_of, module);
        store.set(&module_id, SignalId::CoordinationCost, Value::Float(coordination_cost));

        if let Some(counts) = author_counts_by_module.get(module.as_str()) {
            let values: Vec<f64> = counts.values().map(|&c| c as f64).collect();
            store.set(&module_id, SignalId::KnowledgeGini, Value::Float(gini(&values)));
            let h = author_entropy(counts);
            store.set(&module_id, SignalId::ModuleBusFactor, Value::Float(bus_factor(h)));
        }

        let coupling = store.get_f64(&module_id, SignalId::Coupling).unwrap_or(0.0);
        let main_seq_distance = store.get_f64(&module_id, SignalId::MainSeqDistance);
        let boundary_alignment = store.get_f64(&module_id, SignalId::BoundaryAlignment).unwrap_or(0.0);

        let inputs = HealthScoreInputs {
            cohesion,
            coupling,
            main_seq_distance,
            boundary_alignment,
            role_consistency,
            mean_stub,
        };
        store.set(&module_id, SignalId::HealthScore, Value::Float(health_score(&inputs)));
    }
}

/// Directed edge density among a module's own files: intra-module
/// `IMPORTS` edges over the maximum possible directed pairs.
fn cohesion_for(store: &FactStore, files: &[String]) -> f64 {
    let n = files.len();
    if n < 2 {
        return 1.0;
    }
    let file_set: std::collections::HashSet<&str> = files.iter().map(|f| f.as_str()).collect();
    let intra: usize = files
        .iter()
        .map(|f| {
            store
                .outgoing(&EntityId::file(f), RelationKind::Imports)
                .into_iter()
                .filter(|rel| file_set.contains(rel.to.key()))
                .count()
        })
        .sum();
    let possible = (n * (n - 1)) as f64;
    (intra as f64 / possible).min(1.0)
}

/// Fraction of a module's files whose `Role` matches the module's modal
/// role tag.
fn role_consistency_for(store: &FactStore, files: &[String]) -> f64 {
    let roles: Vec<String> = files
        .iter()
        .filter_map(|f| store.get(&EntityId::file(f), SignalId::Role).and_then(Value::as_enum).map(str::to_string))
        .collect();
    if roles.is_empty() {
        return 1.0;
    }
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in &roles {
        *counts.entry(r.as_str()).or_insert(0) += 1;
    }
    let modal = counts.values().copied().max().unwrap_or(0);
    modal as f64 / roles.len() as f64
}

fn mean_signal(store: &FactStore, files: &[String], signal: SignalId) -> f64 {
    let values: Vec<f64> = files.iter().filter_map(|f| store.get_f64(&EntityId::file(f), signal)).collect();
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Fraction of `CoChangesWith` weight touching this module's files that
/// crosses into another module: the recurring cost of coordinating a
/// change across a module boundary.
fn coordination_cost_for(
    store: &FactStore,
    files: &[String],
    module_of: &HashMap<&str, &str>,
    module: &str,
) -> f64 {
    let mut total = 0.0;
    let mut cross = 0.0;
    for f in files {
        let entity = EntityId::file(f);
        for rel in store
            .outgoing(&entity, RelationKind::CoChangesWith)
            .into_iter()
            .chain(store.incoming(&entity, RelationKind::CoChangesWith))
        {
            let other = if rel.from.key() == f.as_str() { rel.to.key() } else { rel.from.key() };
            total += rel.weight;
            if module_of.get(other).copied() != Some(module) {
                cross += rel.weight;
            }
        }
    }
    if total <= 0.0 {
        0.0
    } else {
        (cross / total).clamp(0.0, 1.0)
    }
}

fn module_author_commit_counts<'a>(
    commits: &[Commit],
    module_of: &HashMap<&'a str, &'a str>,
) -> HashMap<String, HashMap<String, usize>> {
    let mut result: HashMap<String, HashMap<String, usize>> = HashMap::new();
    for commit in commits {
        for file in &commit.files {
            let Some(&module) = module_of.get(file.as_str()) else { continue };
            *result
                .entry(module.to_string())
                .or_default()
                .entry(commit.author_email.clone())
                .or_insert(0) += 1;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::blackboard::Entity;

    fn commit(email: &str, files: &[&str]) -> Commit {
        Commit {
            sha: "x".to_string(),
            author_email: email.to_string(),
            timestamp_unix: 0,
            message: "x".to_string(),
            files: files.iter().map(|s| s.to_string()).collect(),
            renames: Vec::new(),
        }
    }

    fn store_with_module() -> FactStore {
        let mut store = FactStore::new();
        for f in ["src/a.rs", "src/b.rs"] {
            store.add_entity(Entity::new(EntityId::file(f), None));
        }
        store.add_entity(Entity::new(EntityId::module("src"), None));
        for f in ["src/a.rs", "src/b.rs"] {
            store.relations_mut(RelationKind::InModule).add(
                EntityId::file(f),
                EntityId::module("src"),
                RelationKind::InModule,
                1.0,
            );
        }
        store
    }

    #[test]
    fn annotate_writes_health_score_for_every_module() {
        let mut store = store_with_module();
        annotate_module_aggregates(&mut store, &[]);
        assert!(store.has_value(&EntityId::module("src"), SignalId::HealthScore));
    }

    #[test]
    fn cohesion_reflects_intra_module_edges() {
        let mut store = store_with_module();
        store.relations_mut(RelationKind::Imports).add(
            EntityId::file("src/a.rs"),
            EntityId::file("src/b.rs"),
            RelationKind::Imports,
            1.0,
        );
        annotate_module_aggregates(&mut store, &[]);
        let cohesion = store.get_f64(&EntityId::module("src"), SignalId::Cohesion).unwrap();
        assert!(cohesion > 0.0);
    }

    #[test]
    fn module_bus_factor_reflects_author_spread() {
        let mut store = store_with_module();
        let commits = vec![
            commit("alice@x.com", &["src/a.rs"]),
            commit("bob@x.com", &["src/b.rs"]),
        ];
        annotate_module_aggregates(&mut store, &commits);
        let bf = store.get_f64(&EntityId::module("src"), SignalId::ModuleBusFactor).unwrap();
        assert!((bf - 2.0).abs() < 1e-9);
    }

    #[test]
    fn empty_store_is_a_noop() {
        let mut store = FactStore::new();
        annotate_module_aggregates(&mut store, &[]);
        assert_eq!(store.modules().count(), 0);
    }
}
