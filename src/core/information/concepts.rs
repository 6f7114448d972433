//! Tiered concept extraction (spec 4.4). A file's `concept_count` and
//! `concept_entropy` are derived differently depending on how much source
//! material is available to reason over: a near-empty file gets a single
//! concept from its role, a small file gets keyword-frequency buckets, and
//! anything larger gets full co-occurrence-graph clustering.

use std::collections::HashMap;

use crate::core::graph::{louvain, Csr};

#[derive(Debug, Clone, Copy)]
pub struct ConceptSummary {
    pub concept_count: usize,
    pub concept_entropy: f64,
}

const TIER2_MAX_FUNCTIONS: usize = 9;
const TIER1_MAX_FUNCTIONS: usize = 2;
const TIER2_TOP_K: usize = 5;

pub fn extract_concepts(function_bodies: &[Vec<String>], role: &str) -> ConceptSummary {
    if function_bodies.len() <= TIER1_MAX_FUNCTIONS {
        return tier1(role);
    }
    if function_bodies.len() <= TIER2_MAX_FUNCTIONS {
        return tier2(function_bodies);
    }
    tier3(function_bodies)
}

fn tier1(_role: &str) -> ConceptSummary {
    ConceptSummary {
        concept_count: 1,
        concept_entropy: 0.0,
    }
}

fn tier2(function_bodies: &[Vec<String>]) -> ConceptSummary {
    let mut freq: HashMap<&str, usize> = HashMap::new();
    for body in function_bodies {
        for token in body {
            *freq.entry(token.as_str()).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = freq.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    ranked.truncate(TIER2_TOP_K);
    let total: usize = ranked.iter().map(|&(_, c)| c).sum();
    if total == 0 || ranked.is_empty() {
        return ConceptSummary {
            concept_count: 0,
            concept_entropy: 0.0,
        };
    }
    let entropy = shannon_entropy(ranked.iter().map(|&(_, c)| c as f64 / total as f64));
    ConceptSummary {
        concept_count: ranked.len(),
        concept_entropy: entropy,
    }
}

fn tier3(function_bodies: &[Vec<String>]) -> ConceptSummary {
    let mut token_index: HashMap<&str, usize> = HashMap::new();
    let mut next_id = 0usize;
    let mut token_freq: HashMap<usize, usize> = HashMap::new();
    let mut edges: HashMap<(usize, usize), f64> = HashMap::new();

    for body in function_bodies {
        let mut local_ids = Vec::with_capacity(body.len());
        for token in body {
            let id = *token_index.entry(token.as_str()).or_insert_with(|| {
                let id = next_id;
                next_id += 1;
                id
            });
            *token_freq.entry(id).or_insert(0) += 1;
            local_ids.push(id);
        }
        local_ids.sort_unstable();
        local_ids.dedup();
        for i in 0..local_ids.len() {
            for j in (i + 1)..local_ids.len() {
                *edges.entry((local_ids[i], local_ids[j])).or_insert(0.0) += 1.0;
            }
        }
    }

    if next_id == 0 {
        return ConceptSummary {
            concept_count: 0,
            concept_entropy: 0.0,
        };
    }

    let edge_list: Vec<(usize, usize, f64)> = edges.into_iter().map(|((a, b), w)| (a, b, w)).collect();
    let csr = Csr::build(next_id, &edge_list);
    let communities = louvain(&csr);

    let mut community_mass: HashMap<usize, usize> = HashMap::new();
    for (token_id, &freq) in &token_freq {
        let comm = communities[*token_id];
        *community_mass.entry(comm).or_insert(0) += freq;
    }
    let total_mass: usize = community_mass.values().sum();
    let concept_count = community_mass.len();
    let concept_entropy = if total_mass == 0 {
        0.0
    } else {
        shannon_entropy(community_mass.values().map(|&m| m as f64 / total_mass as f64))
    };

    ConceptSummary {
        concept_count,
        concept_entropy,
    }
}

fn shannon_entropy(weights: impl Iterator<Item = f64>) -> f64 {
    -weights
        .filter(|&w| w > 0.0)
        .map(|w| w * w.log2())
        .sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_file_gets_single_role_concept() {
        let summary = extract_concepts(&[], "UTILITY");
        assert_eq!(summary.concept_count, 1);
        assert_eq!(summary.concept_entropy, 0.0);
    }

    #[test]
    fn tier2_keyword_frequency_caps_at_top_k() {
        let bodies: Vec<Vec<String>> = (0..5)
            .map(|_| tokens(&["alpha", "alpha", "beta", "gamma", "delta", "epsilon", "zeta"]))
            .collect();
        let summary = extract_concepts(&bodies, "LOGIC");
        assert!(summary.concept_count <= TIER2_TOP_K);
    }

    #[test]
    fn tier3_uses_cooccurrence_clustering() {
        let bodies: Vec<Vec<String>> = (0..12)
            .map(|i| {
                if i % 2 == 0 {
                    tokens(&["parse", "token", "lexer"])
                } else {
                    tokens(&["render", "pixel", "canvas"])
                }
            })
            .collect();
        let summary = extract_concepts(&bodies, "LOGIC");
        assert!(summary.concept_count >= 1);
    }
}
