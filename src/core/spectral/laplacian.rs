//! Sparse combinatorial Laplacian `L = D - A` (spec 4.3) over the
//! undirected symmetrization of the dependency graph. Kept as an adjacency
//! list rather than a dense matrix so `L*v` stays `O(E)`.

use crate::core::graph::Csr;

pub struct SparseLaplacian {
    n: usize,
    degree: Vec<f64>,
    neighbors: Vec<Vec<(usize, f64)>>,
}

impl SparseLaplacian {
    pub fn from_graph(graph: &Csr) -> Self {
        let n = graph.node_count();
        let mut neighbors: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        let mut weight_sum = vec![0.0_f64; n];
        for v in 0..n {
            for &u in &graph.undirected_neighbors(v) {
                // weight is 1.0 for a plain adjacency symmetrization; callers
                // that need weighted edges can extend this later.
                neighbors[v].push((u, 1.0));
                weight_sum[v] += 1.0;
            }
        }
        Self {
            n,
            degree: weight_sum,
            neighbors,
        }
    }

    pub fn node_count(&self) -> usize {
        self.n
    }

    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(|n| n.len()).sum::<usize>() / 2
    }

    /// `(L*v)_i = degree_i * v_i - sum_{j in N(i)} v_j`.
    pub fn apply(&self, v: &[f64], out: &mut [f64]) {
        for i in 0..self.n {
            let mut acc = self.degree[i] * v[i];
            for &(j, w) in &self.neighbors[i] {
                acc -= w * v[j];
            }
            out[i] = acc;
        }
    }

    pub fn gershgorin_bounds(&self) -> (f64, f64) {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for i in 0..self.n {
            let radius: f64 = self.neighbors[i].iter().map(|&(_, w)| w.abs()).sum();
            lo = lo.min(self.degree[i] - radius);
            hi = hi.max(self.degree[i] + radius);
        }
        if self.n == 0 {
            (0.0, 0.0)
        } else {
            (lo, hi)
        }
    }
}
