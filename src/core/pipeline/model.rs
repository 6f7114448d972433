//! Model stage (spec 5): turns walked file paths into `FactStore`
//! entities, Collect/Model-phase file signals, and the `IMPORTS` relation
//! graph. The structural half of the two spines that join here; the
//! temporal half is [`crate::core::temporal::analyze`].

use std::collections::HashSet;
use std::path::Path;

use shannon_ast::{FileSyntax, FunctionDef, ImportKind};

use crate::core::blackboard::{Entity, EntityId, FactStore, RelationKind, SignalId, Value};
use crate::core::collectors::{resolve_imports, Parser, Resolver};
use crate::core::error::Result;
use crate::core::information::compression_ratio;

/// One file's parsed syntax plus its raw bytes, kept around so the Derive
/// stage (NCD clone search, TF-IDF, concept extraction) doesn't re-read or
/// re-parse anything.
pub struct IngestedFile {
    pub path: String,
    pub source: Vec<u8>,
    pub syntax: FileSyntax,
}

/// Reads, parses, resolves, and registers every file in `paths`. Returns
/// the parsed files in the same order for the Derive stage to consume.
pub fn ingest(
    store: &mut FactStore,
    root: &Path,
    paths: &[String],
    parser: &dyn Parser,
    resolver: &dyn Resolver,
) -> Result<Vec<IngestedFile>> {
    let known: HashSet<String> = paths.iter().cloned().collect();
    let mut ingested = Vec::with_capacity(paths.len());

    for path in paths {
        let bytes = std::fs::read(root.join(path))?;
        let source_text = String::from_utf8_lossy(&bytes).into_owned();
        let (metrics, mut syntax) = parser.parse(path, &source_text);
        resolve_imports(&mut syntax, resolver, root);

        let entity = EntityId::file(path.clone());
        store.add_entity(Entity::new(entity.clone(), None));

        store.set(&entity, SignalId::Lines, Value::Int(metrics.lines as i64));
        store.set(&entity, SignalId::FunctionCount, Value::Int(syntax.function_count() as i64));
        store.set(&entity, SignalId::ClassCount, Value::Int(metrics.class_count as i64));
        store.set(&entity, SignalId::MaxNesting, Value::Int(syntax.max_nesting as i64));
        store.set(&entity, SignalId::ImportCount, Value::Int(metrics.import_count as i64));
        store.set(&entity, SignalId::TodoDensity, Value::Float(todo_density(&syntax, metrics.lines)));
        store.set(&entity, SignalId::DocstringCoverage, Value::Float(syntax.docstring_coverage()));
        store.set(&entity, SignalId::StubRatio, Value::Float(stub_ratio(&syntax)));
        store.set(&entity, SignalId::CompressionRatio, Value::Float(compression_ratio(&bytes)));
        store.set(&entity, SignalId::Role, Value::Enum(infer_role(path, &syntax)));

        let phantom_count = syntax.imports.iter().filter(|i| i.is_phantom()).count();
        store.set(&entity, SignalId::PhantomImportCount, Value::Int(phantom_count as i64));
        // No call-graph front end is wired into the reference parser, so
        // broken-call detection never fires (Open Question 3).
        store.set(&entity, SignalId::BrokenCallCount, Value::Int(0));

        for import in &syntax.imports {
            if import.kind != ImportKind::Internal {
                continue;
            }
            if let Some(target) = &import.resolved_path {
                if known.contains(target) {
                    store.relations_mut(RelationKind::Imports).add(
                        entity.clone(),
                        EntityId::file(target.clone()),
                        RelationKind::Imports,
                        1.0,
                    );
                }
            }
        }

        ingested.push(IngestedFile { path: path.clone(), source: bytes, syntax });
    }

    annotate_degrees(store, paths);
    Ok(ingested)
}

fn todo_density(syntax: &FileSyntax, lines: usize) -> f64 {
    if lines == 0 {
        0.0
    } else {
        syntax.todo_count as f64 / lines as f64
    }
}

fn all_functions(syntax: &FileSyntax) -> Vec<&FunctionDef> {
    syntax.functions.iter().chain(syntax.classes.iter().flat_map(|c| c.methods.iter())).collect()
}

fn stub_ratio(syntax: &FileSyntax) -> f64 {
    let fns = all_functions(syntax);
    if fns.is_empty() {
        return 0.0;
    }
    let stubs = fns.iter().filter(|f| f.resolve_is_stub(None)).count();
    stubs as f64 / fns.len() as f64
}

/// Heuristic role tag (spec 3.1 `Role`): `EntryPoint` for files with a
/// `main`-style guard or a CLI/bin path, `Test` for test-looking paths,
/// `Utility` for helper-looking paths, `Module` otherwise.
fn infer_role(path: &str, syntax: &FileSyntax) -> String {
    let lower = path.to_lowercase();
    if syntax.has_main_guard || lower.ends_with("main.rs") || lower.contains("/bin/") || lower.contains("/cli") {
        return "EntryPoint".to_string();
    }
    if lower.contains("test") || lower.contains("spec") {
        return "Test".to_string();
    }
    if lower.contains("util") || lower.contains("helper") || lower.contains("common") {
        return "Utility".to_string();
    }
    "Module".to_string()
}

fn annotate_degrees(store: &mut FactStore, paths: &[String]) {
    for path in paths {
        let entity = EntityId::file(path.clone());
        let in_deg = store.incoming(&entity, RelationKind::Imports).len();
        let out_deg = store.outgoing(&entity, RelationKind::Imports).len();
        store.set(&entity, SignalId::InDegree, Value::Int(in_deg as i64));
        store.set(&entity, SignalId::OutDegree, Value::Int(out_deg as i64));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collectors::{HeuristicParser, PathResolver};
    use std::fs;

    #[test]
    fn ingest_registers_files_and_import_edges() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "mod b;\nfn f() {}\n").unwrap();
        fs::write(dir.path().join("b.rs"), "fn g() {}\n").unwrap();
        let paths = vec!["a.rs".to_string(), "b.rs".to_string()];
        let known: HashSet<String> = paths.iter().cloned().collect();
        let resolver = PathResolver::new(&known);
        let parser = HeuristicParser::new();
        let mut store = FactStore::new();
        ingest(&mut store, dir.path(), &paths, &parser, &resolver).unwrap();
        assert_eq!(store.files().count(), 2);
        assert!(store.has_value(&EntityId::file("a.rs"), SignalId::Lines));
    }

    #[test]
    fn entry_point_role_detected_from_main_guard() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.rs"), "fn main() {}\n").unwrap();
        let paths = vec!["main.rs".to_string()];
        let known: HashSet<String> = paths.iter().cloned().collect();
        let resolver = PathResolver::new(&known);
        let parser = HeuristicParser::new();
        let mut store = FactStore::new();
        ingest(&mut store, dir.path(), &paths, &parser, &resolver).unwrap();
        let role = store.get(&EntityId::file("main.rs"), SignalId::Role).and_then(Value::as_enum);
        assert_eq!(role, Some("EntryPoint"));
    }
}
