//! Module detection (spec 4.6): pick the directory depth that best
//! partitions the tree into modules of a healthy size, falling back to
//! Louvain communities when the project is too flat for directories to
//! carry that signal.

use std::collections::HashMap;

use crate::core::graph::{louvain, Csr};

const MIN_MODULE_FILES: usize = 3;
const MAX_MODULE_FILES: usize = 15;

/// Maps each file path to its module name. `depth` counts path separators
/// from the root, so depth 1 means "group by top-level directory".
pub fn detect_modules(file_paths: &[String]) -> HashMap<String, String> {
    if file_paths.is_empty() {
        return HashMap::new();
    }
    let max_depth = file_paths
        .iter()
        .map(|p| p.matches('/').count())
        .max()
        .unwrap_or(0);

    if max_depth == 0 {
        return HashMap::new(); // caller falls back to Louvain communities
    }

    let mut best_depth = 1;
    let mut best_fraction = -1.0;
    for depth in 1..=max_depth {
        let groups = group_by_depth(file_paths, depth);
        if groups.is_empty() {
            continue;
        }
        let healthy = groups
            .values()
            .filter(|files| files.len() >= MIN_MODULE_FILES && files.len() <= MAX_MODULE_FILES)
            .count();
        let fraction = healthy as f64 / groups.len() as f64;
        // Ties prefer the shallower depth, so only a strictly better
        // fraction displaces the current best.
        if fraction > best_fraction {
            best_fraction = fraction;
            best_depth = depth;
        }
    }

    let groups = group_by_depth(file_paths, best_depth);
    let mut assignment = HashMap::new();
    for (module, files) in groups {
        for file in files {
            assignment.insert(file, module.clone());
        }
    }
    assignment
}

fn group_by_depth(file_paths: &[String], depth: usize) -> HashMap<String, Vec<String>> {
    let mut groups: HashMap<String, Vec<String>> = HashMap::new();
    for path in file_paths {
        let prefix = path_prefix(path, depth);
        groups.entry(prefix).or_default().push(path.clone());
    }
    groups
}

fn path_prefix(path: &str, depth: usize) -> String {
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() <= 1 {
        return "root".to_string();
    }
    let take = depth.min(parts.len() - 1).max(1);
    parts[..take].join("/")
}

/// Louvain fallback for a flat project: every file becomes a graph node
/// and an `Imports` edge list (0-indexed, matching `file_paths`' order)
/// is condensed into communities, each community becoming a synthetic
/// module `module-N`.
pub fn detect_modules_via_communities(
    file_paths: &[String],
    edges: &[(usize, usize, f64)],
) -> HashMap<String, String> {
    if file_paths.is_empty() {
        return HashMap::new();
    }
    let csr = Csr::build(file_paths.len(), edges);
    let communities = louvain(&csr);
    file_paths
        .iter()
        .enumerate()
        .map(|(i, path)| (path.clone(), format!("module-{}", communities[i])))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_by_top_level_directory_when_healthy() {
        let files: Vec<String> = (0..5).map(|i| format!("src/core/f{i}.rs")).collect();
        let assignment = detect_modules(&files);
        assert_eq!(assignment.get("src/core/f0.rs").unwrap(), "src/core");
    }

    #[test]
    fn flat_project_returns_empty_for_louvain_fallback() {
        let files = vec!["a.rs".to_string(), "b.rs".to_string()];
        assert!(detect_modules(&files).is_empty());
    }

    #[test]
    fn community_fallback_assigns_every_file() {
        let files = vec!["a.rs".to_string(), "b.rs".to_string(), "c.rs".to_string()];
        let edges = vec![(0, 1, 1.0), (1, 2, 1.0)];
        let assignment = detect_modules_via_communities(&files, &edges);
        assert_eq!(assignment.len(), 3);
    }
}
