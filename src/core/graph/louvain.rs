//! Two-phase Louvain modularity maximization (spec 4.2), over the
//! undirected symmetrization of the graph. Deterministic: nodes are visited
//! in sorted key order each pass, and gain ties are broken by preferring
//! the lower community id.

use std::collections::HashMap;

use super::csr::Csr;

const MAX_PASSES: usize = 20;

struct UndirectedGraph {
    n: usize,
    neighbors: Vec<Vec<(usize, f64)>>,
    degree: Vec<f64>,
    total_weight: f64,
}

fn symmetrize(graph: &Csr) -> UndirectedGraph {
    let n = graph.node_count();
    let mut weight_map: Vec<HashMap<usize, f64>> = vec![HashMap::new(); n];
    for v in 0..n {
        for (i, &u) in graph.out_neighbors(v).iter().enumerate() {
            let w = graph.out_weights(v)[i];
            *weight_map[v].entry(u).or_insert(0.0) += w;
            *weight_map[u].entry(v).or_insert(0.0) += w;
        }
    }
    let neighbors: Vec<Vec<(usize, f64)>> = weight_map
        .into_iter()
        .map(|m| {
            let mut v: Vec<(usize, f64)> = m.into_iter().collect();
            v.sort_by_key(|&(k, _)| k);
            v
        })
        .collect();
    let degree: Vec<f64> = neighbors
        .iter()
        .map(|adj| adj.iter().map(|&(_, w)| w).sum())
        .collect();
    let total_weight = degree.iter().sum::<f64>() / 2.0;
    UndirectedGraph {
        n,
        neighbors,
        degree,
        total_weight,
    }
}

/// Runs Louvain to convergence (node-level, phase 1 only applied
/// repeatedly against the folded graph) and returns a community id per
/// original node index.
pub fn louvain(graph: &Csr) -> Vec<usize> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }
    let ug = symmetrize(graph);
    if ug.total_weight == 0.0 {
        return (0..n).collect();
    }

    let mut community: Vec<usize> = (0..n).collect();
    let mut community_of_original: Vec<usize> = (0..n).collect();

    let mut current = ug;
    let mut level_assignment: Vec<usize> = (0..n).collect();

    for _pass in 0..MAX_PASSES {
        let assignment = local_move_phase(&current);
        let moved = assignment.iter().enumerate().any(|(i, &c)| c != i && c != community[i]);
        community = assignment.clone();

        for slot in level_assignment.iter_mut() {
            *slot = assignment[*slot];
        }
        community_of_original = level_assignment.clone();

        if !moved {
            break;
        }
        current = fold_communities(&current, &assignment);
        community = (0..current.n).collect();
    }

    // Renumber to a dense 0..k range in sorted order for determinism.
    let mut unique: Vec<usize> = community_of_original.clone();
    unique.sort_unstable();
    unique.dedup();
    let renumber: HashMap<usize, usize> = unique
        .into_iter()
        .enumerate()
        .map(|(new_id, old_id)| (old_id, new_id))
        .collect();
    community_of_original
        .into_iter()
        .map(|c| renumber[&c])
        .collect()
}

/// Modularity `Q` of a fixed partition (spec GLOSSARY): the fraction of
/// edge weight falling inside communities minus the expected fraction
/// under a random graph with the same degree sequence. `0` for an
/// edgeless graph.
pub fn modularity(graph: &Csr, communities: &[usize]) -> f64 {
    let ug = symmetrize(graph);
    if ug.total_weight == 0.0 {
        return 0.0;
    }
    let m2 = 2.0 * ug.total_weight;
    let mut intra = 0.0;
    let mut degree_sum_by_comm: HashMap<usize, f64> = HashMap::new();
    for v in 0..ug.n {
        degree_sum_by_comm.entry(communities[v]).and_modify(|d| *d += ug.degree[v]).or_insert(ug.degree[v]);
        for &(u, w) in &ug.neighbors[v] {
            if communities[u] == communities[v] {
                intra += w;
            }
        }
    }
    let expected: f64 = degree_sum_by_comm.values().map(|&d| (d / m2).powi(2)).sum();
    intra / m2 - expected
}

/// One Louvain "local moving" phase: repeatedly scan nodes in sorted order,
/// moving each to the neighboring community that yields the highest
/// positive `ΔQ`, until no node moves in a full scan.
fn local_move_phase(graph: &UndirectedGraph) -> Vec<usize> {
    let n = graph.n;
    let mut community: Vec<usize> = (0..n).collect();
    let m2 = 2.0 * graph.total_weight;
    if m2 == 0.0 {
        return community;
    }
    let mut sigma_tot: Vec<f64> = graph.degree.clone();

    for _ in 0..MAX_PASSES {
        let mut any_move = false;
        for v in 0..n {
            let current_comm = community[v];
            let k_i = graph.degree[v];

            // Remove v from its current community.
            sigma_tot[current_comm] -= k_i;

            let mut k_i_in_by_comm: HashMap<usize, f64> = HashMap::new();
            for &(u, w) in &graph.neighbors[v] {
                if u == v {
                    continue;
                }
                *k_i_in_by_comm.entry(community[u]).or_insert(0.0) += w;
            }

            let mut best_comm = current_comm;
            let mut best_gain = 0.0_f64;
            let mut candidates: Vec<usize> = k_i_in_by_comm.keys().copied().collect();
            candidates.push(current_comm);
            candidates.sort_unstable();
            candidates.dedup();

            for &cand in &candidates {
                let k_i_in = *k_i_in_by_comm.get(&cand).unwrap_or(&0.0);
                let sigma = sigma_tot[cand];
                let gain = k_i_in / m2 - (sigma * k_i) / (m2 * m2 / 2.0);
                if gain > best_gain || (gain == best_gain && cand < best_comm) {
                    best_gain = gain;
                    best_comm = cand;
                }
            }

            sigma_tot[best_comm] += k_i;
            if best_comm != current_comm {
                any_move = true;
            }
            community[v] = best_comm;
        }
        if !any_move {
            break;
        }
    }
    community
}

/// Folds each community into a single super-node for the next Louvain
/// level; edge weights between communities are summed, self-loops capture
/// intra-community weight.
fn fold_communities(graph: &UndirectedGraph, assignment: &[usize]) -> UndirectedGraph {
    let mut unique: Vec<usize> = assignment.to_vec();
    unique.sort_unstable();
    unique.dedup();
    let renumber: HashMap<usize, usize> = unique
        .iter()
        .enumerate()
        .map(|(new_id, &old_id)| (old_id, new_id))
        .collect();
    let k = unique.len();

    let mut weight_map: Vec<HashMap<usize, f64>> = vec![HashMap::new(); k];
    for v in 0..graph.n {
        let cv = renumber[&assignment[v]];
        for &(u, w) in &graph.neighbors[v] {
            let cu = renumber[&assignment[u]];
            *weight_map[cv].entry(cu).or_insert(0.0) += w / 2.0;
        }
    }
    let neighbors: Vec<Vec<(usize, f64)>> = weight_map
        .into_iter()
        .map(|m| {
            let mut v: Vec<(usize, f64)> = m.into_iter().collect();
            v.sort_by_key(|&(key, _)| key);
            v
        })
        .collect();
    let degree: Vec<f64> = neighbors
        .iter()
        .map(|adj| adj.iter().map(|&(_, w)| w).sum())
        .collect();
    let total_weight = degree.iter().sum::<f64>() / 2.0;
    UndirectedGraph {
        n: k,
        neighbors,
        degree,
        total_weight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_disjoint_triangles_form_two_communities() {
        let csr = Csr::build(
            6,
            &[
                (0, 1, 1.0),
                (1, 2, 1.0),
                (2, 0, 1.0),
                (3, 4, 1.0),
                (4, 5, 1.0),
                (5, 3, 1.0),
            ],
        );
        let communities = louvain(&csr);
        assert_eq!(communities[0], communities[1]);
        assert_eq!(communities[1], communities[2]);
        assert_eq!(communities[3], communities[4]);
        assert_eq!(communities[4], communities[5]);
        assert_ne!(communities[0], communities[3]);
    }

    #[test]
    fn empty_graph_has_no_communities() {
        let csr = Csr::build(0, &[]);
        assert!(louvain(&csr).is_empty());
    }

    #[test]
    fn isolated_nodes_get_distinct_communities() {
        let csr = Csr::build(3, &[]);
        let communities = louvain(&csr);
        let mut sorted = communities.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 3);
    }

    #[test]
    fn two_disjoint_triangles_have_positive_modularity() {
        let csr = Csr::build(
            6,
            &[(0, 1, 1.0), (1, 2, 1.0), (2, 0, 1.0), (3, 4, 1.0), (4, 5, 1.0), (5, 3, 1.0)],
        );
        let communities = louvain(&csr);
        assert!(modularity(&csr, &communities) > 0.3);
    }

    #[test]
    fn edgeless_graph_has_zero_modularity() {
        let csr = Csr::build(3, &[]);
        assert_eq!(modularity(&csr, &[0, 1, 2]), 0.0);
    }
}
