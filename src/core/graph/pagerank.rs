//! PageRank via power iteration (spec 4.2). Computed per weakly-connected
//! component and normalized within each, so an isolated cluster does not
//! get diluted by the rest of the graph's node count.

use super::csr::Csr;
use super::components::weak_components;

pub const DAMPING: f64 = 0.85;
const MAX_ITERATIONS: usize = 50;
const CONVERGENCE_EPS: f64 = 1e-6;

pub fn pagerank(graph: &Csr) -> Vec<f64> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }
    let components = weak_components(graph);
    let mut result = vec![0.0; n];

    for component in &components {
        let m = component.len();
        if m == 0 {
            continue;
        }
        let local_index: std::collections::HashMap<usize, usize> = component
            .iter()
            .enumerate()
            .map(|(i, &v)| (v, i))
            .collect();
        let mut rank = vec![1.0 / m as f64; m];

        for _ in 0..MAX_ITERATIONS {
            let mut next = vec![(1.0 - DAMPING) / m as f64; m];
            for &v in component {
                let i = local_index[&v];
                let out_deg = graph.out_degree(v);
                if out_deg == 0 {
                    // Dangling mass redistributed evenly within the component.
                    let share = DAMPING * rank[i] / m as f64;
                    for slot in next.iter_mut() {
                        *slot += share;
                    }
                    continue;
                }
                let share = DAMPING * rank[i] / out_deg as f64;
                for &u in graph.out_neighbors(v) {
                    if let Some(&j) = local_index.get(&u) {
                        next[j] += share;
                    }
                }
            }
            let max_delta = next
                .iter()
                .zip(rank.iter())
                .map(|(a, b)| (a - b).abs())
                .fold(0.0_f64, f64::max);
            rank = next;
            if max_delta < CONVERGENCE_EPS {
                break;
            }
        }

        for (i, &v) in component.iter().enumerate() {
            result[v] = rank[i];
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn three_cycle_matches_expected_ordering() {
        // A -> B, A -> C, B -> C, C -> A (spec S2)
        let csr = Csr::build(3, &[(0, 1, 1.0), (0, 2, 1.0), (1, 2, 1.0), (2, 0, 1.0)]);
        let pr = pagerank(&csr);
        assert!(pr[2] > pr[0]);
        assert!(pr[0] > pr[1]);
        assert_abs_diff_eq!(pr[2], 0.43, epsilon = 0.02);
        assert_abs_diff_eq!(pr[0], 0.39, epsilon = 0.02);
        assert_abs_diff_eq!(pr[1], 0.18, epsilon = 0.02);
    }

    #[test]
    fn connected_graph_pagerank_sums_to_one() {
        let csr = Csr::build(4, &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 0, 1.0)]);
        let pr = pagerank(&csr);
        let sum: f64 = pr.iter().sum();
        assert!((sum - 1.0).abs() < 1e-3);
    }

    #[test]
    fn disconnected_components_each_normalize() {
        let csr = Csr::build(4, &[(0, 1, 1.0), (1, 0, 1.0), (2, 3, 1.0), (3, 2, 1.0)]);
        let pr = pagerank(&csr);
        assert!((pr[0] + pr[1] - 1.0).abs() < 1e-3);
        assert!((pr[2] + pr[3] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn empty_graph_returns_empty() {
        let csr = Csr::build(0, &[]);
        assert!(pagerank(&csr).is_empty());
    }
}
