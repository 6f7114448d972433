//! Spectral analysis (spec 4.3): combinatorial Laplacian + Lanczos top-k
//! eigenpairs, Fiedler value, spectral gap.

pub mod laplacian;
pub mod lanczos;

pub use laplacian::SparseLaplacian;
pub use lanczos::smallest_eigenvalues_of;

use crate::core::graph::{connected_component_count, Csr};

const TOP_K: usize = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct SpectralSummary {
    pub fiedler_value: f64,
    pub spectral_gap: f64,
    pub connected_component_count: usize,
}

/// Skips (returns a zeroed summary) when `|V| < 3` or the graph has no
/// edges, per spec 4.3.
pub fn analyze(graph: &Csr) -> SpectralSummary {
    let n = graph.node_count();
    if n < 3 || graph.edge_count() == 0 {
        return SpectralSummary {
            fiedler_value: 0.0,
            spectral_gap: 0.0,
            connected_component_count: connected_component_count(graph),
        };
    }
    let laplacian = SparseLaplacian::from_graph(graph);
    let k = TOP_K.min(n - 1).max(3);
    let eigs = smallest_eigenvalues_of(&laplacian, k);

    let fiedler_value = eigs.get(1).copied().unwrap_or(0.0);
    let lambda3 = eigs.get(2).copied().unwrap_or(0.0);
    let spectral_gap = if lambda3 > 1e-9 {
        fiedler_value / lambda3
    } else {
        0.0
    };

    SpectralSummary {
        fiedler_value,
        spectral_gap,
        connected_component_count: connected_component_count(graph),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_graph_skips_with_zero_values() {
        let csr = Csr::build(2, &[(0, 1, 1.0)]);
        let summary = analyze(&csr);
        assert_eq!(summary.fiedler_value, 0.0);
        assert_eq!(summary.spectral_gap, 0.0);
    }

    #[test]
    fn disconnected_graph_has_zero_fiedler_value_and_two_components() {
        let csr = Csr::build(4, &[(0, 1, 1.0), (2, 3, 1.0)]);
        let summary = analyze(&csr);
        assert_eq!(summary.fiedler_value, 0.0);
        assert_eq!(summary.connected_component_count, 2);
    }
}
