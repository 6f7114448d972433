//! Derive stage (spec 4.2-4.4): graph centrality/community/spectral
//! signals over the `IMPORTS` graph, plus the per-file information-layer
//! signals (compression-derived clone pairs, TF-IDF coherence, concept
//! extraction, cognitive load, naming drift). Architecture and temporal
//! have their own `analyze` entry points and run around this one; see
//! [`super::Orchestrator::run`] for the exact sequencing.

use std::collections::HashMap;

use crate::core::blackboard::{EntityId, FactStore, RelationKind, SignalId, Value};
use crate::core::graph::{
    betweenness, blast_radius, connected_component_count, dag_depth, louvain, modularity, pagerank,
    tarjan_scc, with_zero_indegree_entries, BetweennessConfig, Csr,
};
use crate::core::information::{find_clone_pairs, gini, semantic_coherence, DocumentFrequencies};
use crate::core::information::extract_concepts;
use crate::core::spectral;

use super::model::IngestedFile;

/// Builds the file-index `IMPORTS` graph in the same order as `paths`.
fn build_graph(store: &FactStore, paths: &[String]) -> (Csr, HashMap<&str, usize>) {
    let index: HashMap<&str, usize> = paths.iter().enumerate().map(|(i, p)| (p.as_str(), i)).collect();
    let edges: Vec<(usize, usize, f64)> = paths
        .iter()
        .enumerate()
        .flat_map(|(i, p)| {
            store
                .outgoing(&EntityId::file(p), RelationKind::Imports)
                .into_iter()
                .filter_map(move |rel| index.get(rel.to.key()).map(|&j| (i, j, rel.weight)))
        })
        .collect();
    (Csr::build(paths.len(), &edges), index)
}

/// Runs every graph/spectral deriver over the `IMPORTS` graph and writes
/// per-file and global signals.
pub fn annotate_graph_signals(store: &mut FactStore, paths: &[String], betweenness_config: &BetweennessConfig) {
    if paths.is_empty() {
        return;
    }
    let (graph, _index) = build_graph(store, paths);

    let pr = pagerank(&graph);
    let bc = betweenness(&graph, betweenness_config);
    let blast = blast_radius(&graph);
    let tarjan = tarjan_scc(&graph);
    let communities = louvain(&graph);

    let role_entries: Vec<usize> = paths
        .iter()
        .enumerate()
        .filter(|(_, p)| {
            matches!(
                store.get(&EntityId::file(p.as_str()), SignalId::Role).and_then(Value::as_enum),
                Some("EntryPoint") | Some("Test")
            )
        })
        .map(|(i, _)| i)
        .collect();
    let entries = with_zero_indegree_entries(&graph, &role_entries);
    let depth = dag_depth(&graph, &entries);

    for (i, path) in paths.iter().enumerate() {
        let entity = EntityId::file(path);
        store.set(&entity, SignalId::PageRank, Value::Float(pr[i]));
        store.set(&entity, SignalId::Betweenness, Value::Float(bc[i]));
        store.set(&entity, SignalId::BlastRadiusSize, Value::Int(blast[i] as i64));
        store.set(&entity, SignalId::Depth, Value::Int(depth[i]));
        store.set(&entity, SignalId::Community, Value::Int(communities[i] as i64));

        let role = store.get(&entity, SignalId::Role).and_then(Value::as_enum).unwrap_or("");
        let is_orphan = graph.in_degree(i) == 0 && !matches!(role, "EntryPoint" | "Test");
        store.set(&entity, SignalId::IsOrphan, Value::Bool(is_orphan));
    }

    let codebase = EntityId::codebase("");
    store.set(&codebase, SignalId::CycleCount, Value::Int(tarjan.cycle_count() as i64));
    store.set(&codebase, SignalId::Modularity, Value::Float(modularity(&graph, &communities)));
    store.set(&codebase, SignalId::CentralityGini, Value::Float(gini(&pr)));

    let spectral_summary = spectral::analyze(&graph);
    store.set(&codebase, SignalId::FiedlerValue, Value::Float(spectral_summary.fiedler_value));
    store.set(&codebase, SignalId::SpectralGap, Value::Float(spectral_summary.spectral_gap));
    let _ = connected_component_count(&graph);
}

/// Per-file information-layer signals that only need the parsed syntax
/// tree and raw bytes, not the rest of the graph: `impl_gini`,
/// `concept_count`/`concept_entropy`, `cognitive_load`, `naming_drift`.
/// Also builds the corpus-wide TF-IDF model for `semantic_coherence` and
/// runs the NCD clone search, returning clone pairs as file path pairs
/// for the Detect stage's [`crate::core::finders::DetectionContext`].
pub fn annotate_information_signals(store: &mut FactStore, files: &[IngestedFile]) -> Vec<(String, String, f64)> {
    if files.is_empty() {
        return Vec::new();
    }

    let all_function_bodies: Vec<Vec<String>> = files
        .iter()
        .flat_map(|f| functions_of(&f.syntax).into_iter().map(|func| func.body_tokens.clone()))
        .collect();
    let df = DocumentFrequencies::build(&all_function_bodies);

    for file in files {
        let entity = EntityId::file(&file.path);
        let functions = functions_of(&file.syntax);
        let bodies: Vec<Vec<String>> = functions.iter().map(|f| f.body_tokens.clone()).collect();

        let token_counts: Vec<f64> = functions.iter().map(|f| f.body_tokens.len() as f64).collect();
        store.set(&entity, SignalId::ImplGini, Value::Float(gini(&token_counts)));

        let role = store.get(&entity, SignalId::Role).and_then(Value::as_enum).unwrap_or("Module").to_string();
        let concepts = extract_concepts(&bodies, &role);
        store.set(&entity, SignalId::ConceptCount, Value::Int(concepts.concept_count as i64));
        store.set(&entity, SignalId::ConceptEntropy, Value::Float(concepts.concept_entropy));

        let vectors: Vec<_> = bodies.iter().map(|tokens| df.vectorize(tokens)).collect();
        if let Some(coherence) = semantic_coherence(&vectors) {
            store.set(&entity, SignalId::SemanticCoherence, Value::Float(coherence));
        }

        store.set(&entity, SignalId::CognitiveLoad, Value::Float(cognitive_load(&file.syntax, &token_counts)));
        store.set(&entity, SignalId::NamingDrift, Value::Float(naming_drift(&functions)));
    }

    let corpus: Vec<Vec<u8>> = files.iter().map(|f| f.source.clone()).collect();
    find_clone_pairs(&corpus)
        .into_iter()
        .map(|(a, b, score)| (files[a].path.clone(), files[b].path.clone(), score))
        .collect()
}

fn functions_of(syntax: &shannon_ast::FileSyntax) -> Vec<&shannon_ast::FunctionDef> {
    syntax.functions.iter().chain(syntax.classes.iter().flat_map(|c| c.methods.iter())).collect()
}

/// A file's mental load: deep nesting, uneven function complexity
/// (`impl_gini`), and sheer function count each make a file harder to
/// hold in working memory. Weighted blend, clamped to `[0, 1]`.
fn cognitive_load(syntax: &shannon_ast::FileSyntax, token_counts: &[f64]) -> f64 {
    let nesting_term = (syntax.max_nesting as f64 / 10.0).min(1.0);
    let impl_gini_term = gini(token_counts);
    let count_term = (token_counts.len() as f64 / 50.0).min(1.0);
    (0.4 * nesting_term + 0.3 * impl_gini_term + 0.3 * count_term).clamp(0.0, 1.0)
}

/// How erratic a file's identifier lengths are, as a stand-in for naming
/// drift: a file whose names swing between cryptic and verbose reads as
/// inconsistently named. Coefficient of variation of name lengths,
/// clamped to `[0, 1]`.
fn naming_drift(functions: &[&shannon_ast::FunctionDef]) -> f64 {
    if functions.len() < 2 {
        return 0.0;
    }
    let lengths: Vec<f64> = functions.iter().map(|f| f.name.len() as f64).collect();
    let mean = lengths.iter().sum::<f64>() / lengths.len() as f64;
    if mean <= 0.0 {
        return 0.0;
    }
    let variance = lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / lengths.len() as f64;
    (variance.sqrt() / mean).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::blackboard::Entity;

    #[test]
    fn annotate_graph_signals_writes_pagerank_for_every_file() {
        let mut store = FactStore::new();
        for f in ["a.rs", "b.rs"] {
            store.add_entity(Entity::new(EntityId::file(f), None));
        }
        store.relations_mut(RelationKind::Imports).add(
            EntityId::file("a.rs"),
            EntityId::file("b.rs"),
            RelationKind::Imports,
            1.0,
        );
        let paths = vec!["a.rs".to_string(), "b.rs".to_string()];
        annotate_graph_signals(&mut store, &paths, &BetweennessConfig::default());
        assert!(store.has_value(&EntityId::file("a.rs"), SignalId::PageRank));
        assert!(store.has_value(&EntityId::codebase(""), SignalId::CentralityGini));
    }

    #[test]
    fn orphan_file_with_no_incoming_edges_is_flagged() {
        let mut store = FactStore::new();
        for f in ["a.rs", "b.rs"] {
            store.add_entity(Entity::new(EntityId::file(f), None));
            store.set(&EntityId::file(f), SignalId::Role, Value::Enum("Module".to_string()));
        }
        let paths = vec!["a.rs".to_string(), "b.rs".to_string()];
        annotate_graph_signals(&mut store, &paths, &BetweennessConfig::default());
        assert_eq!(
            store.get(&EntityId::file("a.rs"), SignalId::IsOrphan).and_then(Value::as_bool),
            Some(true)
        );
    }

    #[test]
    fn empty_paths_is_a_noop() {
        let mut store = FactStore::new();
        annotate_graph_signals(&mut store, &[], &BetweennessConfig::default());
        assert!(!store.has_value(&EntityId::codebase(""), SignalId::CentralityGini));
    }
}
