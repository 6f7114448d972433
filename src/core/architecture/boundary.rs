//! Boundary alignment (spec 4.6): how well a module's directory grouping
//! agrees with its files' Louvain communities.

use std::collections::HashMap;

/// Fraction of `module`'s files whose community equals the module's modal
/// (most common) community. `None` when the module has no files.
pub fn boundary_alignment(file_communities: &[usize]) -> Option<f64> {
    if file_communities.is_empty() {
        return None;
    }
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for &c in file_communities {
        *counts.entry(c).or_insert(0) += 1;
    }
    let modal = *counts.values().max().unwrap();
    Some(modal as f64 / file_communities.len() as f64)
}
