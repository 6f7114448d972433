//! Compact CSR (compressed sparse row) graph representation, plus its
//! reverse. Nodes are referenced by dense `usize` index, never by pointer,
//! so SCCs and communities can be plain arrays of indices (spec 9: avoids
//! reference cycles entirely).

#[derive(Debug, Clone, Default)]
pub struct Csr {
    n: usize,
    /// `row_start[v]..row_start[v+1]` indexes into `targets`/`weights`.
    row_start: Vec<usize>,
    targets: Vec<usize>,
    weights: Vec<f64>,
    /// Reverse adjacency, built alongside the forward one.
    rev_row_start: Vec<usize>,
    rev_sources: Vec<usize>,
    rev_weights: Vec<f64>,
}

impl Csr {
    /// Builds from an edge list `(from, to, weight)` over `n` nodes. Multi-
    /// edges between the same ordered pair are summed (mirrors the
    /// relation-index collapsing rule).
    pub fn build(n: usize, edges: &[(usize, usize, f64)]) -> Self {
        let mut merged: std::collections::HashMap<(usize, usize), f64> =
            std::collections::HashMap::new();
        for &(from, to, w) in edges {
            if from == to {
                continue;
            }
            *merged.entry((from, to)).or_insert(0.0) += w;
        }
        let mut sorted: Vec<((usize, usize), f64)> = merged.into_iter().collect();
        sorted.sort_by_key(|&((f, t), _)| (f, t));

        let mut row_start = vec![0usize; n + 1];
        for &((from, _), _) in &sorted {
            row_start[from + 1] += 1;
        }
        for i in 0..n {
            row_start[i + 1] += row_start[i];
        }
        let mut targets = vec![0usize; sorted.len()];
        let mut weights = vec![0.0f64; sorted.len()];
        let mut cursor = row_start.clone();
        for &((from, to), w) in &sorted {
            let pos = cursor[from];
            targets[pos] = to;
            weights[pos] = w;
            cursor[from] += 1;
        }

        let mut rev_sorted = sorted.clone();
        rev_sorted.sort_by_key(|&((f, t), _)| (t, f));
        let mut rev_row_start = vec![0usize; n + 1];
        for &((_, to), _) in &rev_sorted {
            rev_row_start[to + 1] += 1;
        }
        for i in 0..n {
            rev_row_start[i + 1] += rev_row_start[i];
        }
        let mut rev_sources = vec![0usize; rev_sorted.len()];
        let mut rev_weights = vec![0.0f64; rev_sorted.len()];
        let mut rev_cursor = rev_row_start.clone();
        for &((from, to), w) in &rev_sorted {
            let pos = rev_cursor[to];
            rev_sources[pos] = from;
            rev_weights[pos] = w;
            rev_cursor[to] += 1;
        }

        Self {
            n,
            row_start,
            targets,
            weights,
            rev_row_start,
            rev_sources,
            rev_weights,
        }
    }

    pub fn node_count(&self) -> usize {
        self.n
    }

    pub fn edge_count(&self) -> usize {
        self.targets.len()
    }

    pub fn out_neighbors(&self, v: usize) -> &[usize] {
        &self.targets[self.row_start[v]..self.row_start[v + 1]]
    }

    pub fn out_weights(&self, v: usize) -> &[f64] {
        &self.weights[self.row_start[v]..self.row_start[v + 1]]
    }

    pub fn out_degree(&self, v: usize) -> usize {
        self.row_start[v + 1] - self.row_start[v]
    }

    pub fn in_neighbors(&self, v: usize) -> &[usize] {
        &self.rev_sources[self.rev_row_start[v]..self.rev_row_start[v + 1]]
    }

    pub fn in_weights(&self, v: usize) -> &[f64] {
        &self.rev_weights[self.rev_row_start[v]..self.rev_row_start[v + 1]]
    }

    pub fn in_degree(&self, v: usize) -> usize {
        self.rev_row_start[v + 1] - self.rev_row_start[v]
    }

    /// Symmetrized undirected neighbor set (union of in and out), used by
    /// Louvain and the spectral Laplacian.
    pub fn undirected_neighbors(&self, v: usize) -> Vec<usize> {
        let mut set: Vec<usize> = self
            .out_neighbors(v)
            .iter()
            .chain(self.in_neighbors(v).iter())
            .copied()
            .collect();
        set.sort_unstable();
        set.dedup();
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_edges_are_summed() {
        let csr = Csr::build(2, &[(0, 1, 1.0), (0, 1, 2.0)]);
        assert_eq!(csr.out_neighbors(0), &[1]);
        assert_eq!(csr.out_weights(0), &[3.0]);
    }

    #[test]
    fn self_loops_are_dropped() {
        let csr = Csr::build(1, &[(0, 0, 1.0)]);
        assert_eq!(csr.edge_count(), 0);
    }

    #[test]
    fn reverse_adjacency_is_consistent() {
        let csr = Csr::build(3, &[(0, 1, 1.0), (2, 1, 1.0)]);
        assert_eq!(csr.in_degree(1), 2);
        let mut sources = csr.in_neighbors(1).to_vec();
        sources.sort_unstable();
        assert_eq!(sources, vec![0, 2]);
    }
}
