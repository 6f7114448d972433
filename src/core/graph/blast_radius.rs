//! Blast radius (spec 4.2): per node, how many other nodes depend on it
//! transitively. Computed by reverse BFS; memoized via the SCC condensation
//! so shared suffixes of the dependency DAG are only walked once.

use std::collections::VecDeque;

use super::csr::Csr;
use super::tarjan::{tarjan_scc, TarjanResult};

/// `blast_radius_size(v) = |reachable via reverse edges| - 1` (excludes `v`
/// itself). Nodes inside the same SCC as `v` count toward its blast radius
/// too, since a cycle means each member transitively depends on every
/// other member.
pub fn blast_radius(graph: &Csr) -> Vec<usize> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }
    let scc = tarjan_scc(graph);
    let condensed_reach = condensation_reachability(graph, &scc);

    let mut result = vec![0usize; n];
    for v in 0..n {
        let comp = scc.component_of[v];
        let mut total = 0usize;
        for &reached_comp in &condensed_reach[comp] {
            total += scc.components[reached_comp].len();
        }
        // condensed_reach includes v's own component; subtract v itself.
        result[v] = total.saturating_sub(1);
    }
    result
}

/// For each SCC (by index), the set of SCC indices reachable via reverse
/// edges, including itself. Computed once per component and reused by every
/// member node (the "DAG condensation memoization" in spec 4.2).
fn condensation_reachability(graph: &Csr, scc: &TarjanResult) -> Vec<Vec<usize>> {
    let num_components = scc.components.len();
    let mut comp_rev_edges: Vec<Vec<usize>> = vec![Vec::new(); num_components];
    for v in 0..graph.node_count() {
        let cv = scc.component_of[v];
        for &u in graph.in_neighbors(v) {
            let cu = scc.component_of[u];
            if cu != cv {
                comp_rev_edges[cv].push(cu);
            }
        }
    }
    for edges in comp_rev_edges.iter_mut() {
        edges.sort_unstable();
        edges.dedup();
    }

    let mut memo: Vec<Option<Vec<usize>>> = vec![None; num_components];
    // Process in reverse topological-ish order by repeated BFS; since the
    // condensation is a DAG we can just BFS fresh per component — components
    // are typically few relative to nodes, so this stays cheap.
    for start in 0..num_components {
        if memo[start].is_some() {
            continue;
        }
        let mut visited = vec![false; num_components];
        let mut queue = VecDeque::new();
        queue.push_back(start);
        visited[start] = true;
        let mut reached = Vec::new();
        while let Some(c) = queue.pop_front() {
            reached.push(c);
            for &next in &comp_rev_edges[c] {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
        reached.sort_unstable();
        memo[start] = Some(reached);
    }
    memo.into_iter().map(|r| r.unwrap()).collect()
}
