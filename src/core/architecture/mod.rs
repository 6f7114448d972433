//! Architecture deriver (spec 4.6): module detection, Martin metrics,
//! layer inference, and boundary alignment. Each piece is a pure function
//! over explicit inputs; `analyze` is the seam that reads structural
//! signals/relations out of the `FactStore` and writes module-level
//! signals back in.

pub mod aggregates;
pub mod boundary;
pub mod layers;
pub mod martin;
pub mod modules;

pub use aggregates::annotate_module_aggregates;
pub use boundary::boundary_alignment;
pub use layers::{infer_layers, is_violation, LayerAssignment};
pub use martin::{martin_metrics, MartinMetrics};
pub use modules::{detect_modules, detect_modules_via_communities};

use std::collections::HashMap;

use crate::core::blackboard::{Entity, EntityId, FactStore, RelationKind, SignalId, Value};
use crate::core::graph::{louvain, Csr};

/// Runs module detection, Martin metrics, layer inference, and boundary
/// alignment over every file currently in `store`, registering `Module`
/// entities and `InModule` relations along the way.
pub fn analyze(store: &mut FactStore) {
    let files: Vec<String> = store.files().map(|s| s.to_string()).collect();
    if files.is_empty() {
        return;
    }

    let mut assignment = detect_modules(&files);
    if assignment.is_empty() {
        let index: HashMap<&str, usize> =
            files.iter().enumerate().map(|(i, f)| (f.as_str(), i)).collect();
        let edges: Vec<(usize, usize, f64)> = files
            .iter()
            .enumerate()
            .flat_map(|(i, f)| {
                store
                    .outgoing(&EntityId::file(f), RelationKind::Imports)
                    .into_iter()
                    .filter_map(move |rel| {
                        index.get(rel.to.key()).map(|&j| (i, j, rel.weight))
                    })
            })
            .collect();
        assignment = detect_modules_via_communities(&files, &edges);
    }

    let mut module_files: HashMap<String, Vec<String>> = HashMap::new();
    for (file, module) in &assignment {
        module_files.entry(module.clone()).or_default().push(file.clone());
        let module_id = EntityId::module(module.clone());
        store.add_entity(Entity::new(module_id.clone(), None));
        store.relations_mut(RelationKind::InModule).add(
            EntityId::file(file),
            module_id,
            RelationKind::InModule,
            1.0,
        );
    }
    store.set(
        &EntityId::codebase(""),
        SignalId::FileCount,
        Value::Int(files.len() as i64),
    );

    annotate_martin_metrics(store, &module_files, &assignment);
    annotate_layers_and_boundary(store, &module_files, &assignment);
}

fn annotate_martin_metrics(
    store: &mut FactStore,
    module_files: &HashMap<String, Vec<String>>,
    assignment: &HashMap<String, String>,
) {
    for (module, files) in module_files {
        let file_set: std::collections::HashSet<&str> =
            files.iter().map(|f| f.as_str()).collect();
        let mut afferent = 0usize;
        let mut efferent = 0usize;
        for file in files {
            for rel in store.outgoing(&EntityId::file(file), RelationKind::Imports) {
                if !file_set.contains(rel.to.key()) {
                    efferent += 1;
                }
            }
            for rel in store.incoming(&EntityId::file(file), RelationKind::Imports) {
                let from_key = rel.from.key();
                if !file_set.contains(from_key)
                    && assignment.get(from_key).map(|m| m != module).unwrap_or(true)
                {
                    afferent += 1;
                }
            }
        }
        let metrics = martin_metrics(afferent, efferent, 0, 0);
        let module_id = EntityId::module(module.clone());
        if let Some(instability) = metrics.instability {
            store.set(&module_id, SignalId::Instability, Value::Float(instability));
        }
        if let Some(d) = metrics.main_seq_distance {
            store.set(&module_id, SignalId::MainSeqDistance, Value::Float(d));
        }
        store.set(&module_id, SignalId::Abstractness, Value::Float(metrics.abstractness));
        // Coupling density: external edges relative to the module's own
        // size, bounded to [0, 1) so health_score's `1 - coupling` term
        // stays sane regardless of module size.
        let coupling = (afferent + efferent) as f64 / (afferent + efferent + files.len()) as f64;
        store.set(&module_id, SignalId::Coupling, Value::Float(coupling));
    }
}

fn annotate_layers_and_boundary(
    store: &mut FactStore,
    module_files: &HashMap<String, Vec<String>>,
    assignment: &HashMap<String, String>,
) {
    let modules: Vec<String> = {
        let mut m: Vec<String> = module_files.keys().cloned().collect();
        m.sort();
        m
    };
    let module_index: HashMap<&str, usize> =
        modules.iter().enumerate().map(|(i, m)| (m.as_str(), i)).collect();

    let mut edge_weight: HashMap<(usize, usize), f64> = HashMap::new();
    for (file, module) in assignment {
        let Some(&from_idx) = module_index.get(module.as_str()) else { continue };
        for rel in store.outgoing(&EntityId::file(file), RelationKind::Imports) {
            if let Some(target_module) = assignment.get(rel.to.key()) {
                if target_module == module {
                    continue;
                }
                if let Some(&to_idx) = module_index.get(target_module.as_str()) {
                    *edge_weight.entry((from_idx, to_idx)).or_insert(0.0) += rel.weight;
                }
            }
        }
    }
    let edges: Vec<(usize, usize, f64)> =
        edge_weight.into_iter().map(|((a, b), w)| (a, b, w)).collect();
    let layering = infer_layers(modules.len(), &edges);

    let mut violation_count = 0i64;
    for &(from_idx, to_idx, _) in &edges {
        if is_violation(layering.layer_of[from_idx], layering.layer_of[to_idx]) {
            violation_count += 1;
        }
    }

    let file_communities = file_louvain_communities(store, &assignment.keys().cloned().collect::<Vec<_>>());

    for (i, module) in modules.iter().enumerate() {
        let module_id = EntityId::module(module.clone());
        store.set(&module_id, SignalId::Depth, Value::Int(layering.layer_of[i]));
        if let Some(files) = module_files.get(module) {
            let communities: Vec<usize> = files
                .iter()
                .filter_map(|f| file_communities.get(f).copied())
                .collect();
            if let Some(alignment) = boundary_alignment(&communities) {
                store.set(&module_id, SignalId::BoundaryAlignment, Value::Float(alignment));
            }
        }
    }
    store.set(
        &EntityId::codebase(""),
        SignalId::LayerViolationCount,
        Value::Int(violation_count),
    );
}

fn file_louvain_communities(store: &FactStore, files: &[String]) -> HashMap<String, usize> {
    let mut unique: Vec<String> = files.to_vec();
    unique.sort();
    unique.dedup();
    if unique.is_empty() {
        return HashMap::new();
    }
    let index: HashMap<&str, usize> =
        unique.iter().enumerate().map(|(i, f)| (f.as_str(), i)).collect();
    let edges: Vec<(usize, usize, f64)> = unique
        .iter()
        .enumerate()
        .flat_map(|(i, f)| {
            store
                .outgoing(&EntityId::file(f), RelationKind::Imports)
                .into_iter()
                .filter_map(move |rel| index.get(rel.to.key()).map(|&j| (i, j, rel.weight)))
        })
        .collect();
    let csr = Csr::build(unique.len(), &edges);
    let communities = louvain(&csr);
    unique.into_iter().enumerate().map(|(i, f)| (f, communities[i])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_registers_modules_for_nested_files() {
        let mut store = FactStore::new();
        for f in ["src/core/a.rs", "src/core/b.rs", "src/core/c.rs"] {
            store.add_entity(Entity::new(EntityId::file(f), None));
        }
        analyze(&mut store);
        assert!(store.modules().count() >= 1);
    }

    #[test]
    fn analyze_on_empty_store_is_a_noop() {
        let mut store = FactStore::new();
        analyze(&mut store);
        assert_eq!(store.modules().count(), 0);
    }

    #[test]
    fn flat_project_falls_back_to_community_modules() {
        let mut store = FactStore::new();
        for f in ["a.rs", "b.rs", "c.rs"] {
            store.add_entity(Entity::new(EntityId::file(f), None));
        }
        store.relations_mut(RelationKind::Imports).add(
            EntityId::file("a.rs"),
            EntityId::file("b.rs"),
            RelationKind::Imports,
            1.0,
        );
        analyze(&mut store);
        assert!(store.modules().count() >= 1);
    }
}
