//! Author entropy and bus factor (spec 4.5, GLOSSARY).

use std::collections::HashMap;

/// `H = -sum p(a) log2 p(a)` over the per-author commit-count distribution.
pub fn author_entropy(commit_counts_by_author: &HashMap<String, usize>) -> f64 {
    let total: usize = commit_counts_by_author.values().sum();
    if total == 0 {
        return 0.0;
    }
    -commit_counts_by_author
        .values()
        .map(|&c| {
            let p = c as f64 / total as f64;
            if p > 0.0 {
                p * p.log2()
            } else {
                0.0
            }
        })
        .sum::<f64>()
}

/// `bus_factor = 2^H`: the effective number of authors needed for
/// continuity.
pub fn bus_factor(entropy: f64) -> f64 {
    2.0_f64.powf(entropy)
}
