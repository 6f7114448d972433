//! Lanczos tridiagonalization for the smallest eigenpairs of a sparse
//! symmetric operator, plus a Sturm-sequence bisection solver for the
//! resulting tridiagonal matrix's eigenvalues.

use super::laplacian::SparseLaplacian;

const MAX_BISECTION_ITERS: usize = 100;
const BISECTION_TOL: f64 = 1e-9;

/// Runs `steps` iterations of Lanczos with full reorthogonalization,
/// returning the tridiagonal `(alpha, beta)` coefficients. `beta[0]` is
/// unused filler; `beta[i]` for `i >= 1` is the subdiagonal entry between
/// Lanczos vectors `i-1` and `i`.
fn lanczos_tridiagonal(laplacian: &SparseLaplacian, steps: usize) -> (Vec<f64>, Vec<f64>) {
    let n = laplacian.node_count();
    let mut vectors: Vec<Vec<f64>> = Vec::with_capacity(steps);
    let mut alpha = Vec::with_capacity(steps);
    let mut beta = vec![0.0_f64];

    // Deterministic starting vector: all-ones, normalized. Avoids any
    // dependency on a RNG so results are bit-identical across runs.
    let mut v_prev = vec![0.0_f64; n];
    let mut v_curr = vec![1.0_f64 / (n as f64).sqrt(); n];
    let mut beta_prev = 0.0_f64;

    for _ in 0..steps {
        let mut w = vec![0.0_f64; n];
        laplacian.apply(&v_curr, &mut w);
        for i in 0..n {
            w[i] -= beta_prev * v_prev[i];
        }
        let a = dot(&w, &v_curr);
        for i in 0..n {
            w[i] -= a * v_curr[i];
        }
        // Full reorthogonalization against all previous Lanczos vectors to
        // counter floating-point drift, which otherwise corrupts smallest
        // eigenvalue estimates after a handful of steps.
        for prior in &vectors {
            let proj = dot(&w, prior);
            for i in 0..n {
                w[i] -= proj * prior[i];
            }
        }
        let b = norm(&w);
        alpha.push(a);
        vectors.push(v_curr.clone());

        if b < 1e-12 {
            break;
        }
        beta.push(b);
        v_prev = v_curr;
        v_curr = w.iter().map(|x| x / b).collect();
        beta_prev = b;
    }

    (alpha, beta)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// Counts eigenvalues of the tridiagonal `(diag, subdiag)` strictly less
/// than `x`, via the standard Sturm-sequence ratio recurrence.
fn sturm_count(diag: &[f64], subdiag: &[f64], x: f64) -> usize {
    let m = diag.len();
    if m == 0 {
        return 0;
    }
    let mut count = 0usize;
    let mut q = diag[0] - x;
    if q < 0.0 {
        count += 1;
    }
    for i in 1..m {
        if q.abs() < 1e-300 {
            q = 1e-300;
        }
        let e = subdiag[i];
        q = (diag[i] - x) - (e * e) / q;
        if q < 0.0 {
            count += 1;
        }
    }
    count
}

/// Returns the `k` smallest eigenvalues of a symmetric tridiagonal matrix,
/// ascending, via bisection on the Sturm count.
fn smallest_eigenvalues(diag: &[f64], subdiag: &[f64], k: usize) -> Vec<f64> {
    let m = diag.len();
    if m == 0 {
        return Vec::new();
    }
    let radius: f64 = (0..m)
        .map(|i| subdiag.get(i).copied().unwrap_or(0.0).abs() + subdiag.get(i + 1).copied().unwrap_or(0.0).abs())
        .fold(0.0, f64::max);
    let max_diag = diag.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min_diag = diag.iter().cloned().fold(f64::INFINITY, f64::min);
    let mut lo_bound = min_diag - radius - 1.0;
    let hi_bound = max_diag + radius + 1.0;

    let mut results = Vec::with_capacity(k.min(m));
    for j in 0..k.min(m) {
        let mut lo = lo_bound;
        let mut hi = hi_bound;
        for _ in 0..MAX_BISECTION_ITERS {
            if hi - lo < BISECTION_TOL {
                break;
            }
            let mid = 0.5 * (lo + hi);
            if sturm_count(diag, subdiag, mid) > j {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        results.push(0.5 * (lo + hi));
        lo_bound = results[j];
    }
    results
}

/// Computes the `k = min(k, n-1)` smallest eigenvalues of the Laplacian.
/// Skips (returns all-zero) for `n < 3` or an edgeless graph, per spec 4.3.
pub fn smallest_eigenvalues_of(laplacian: &SparseLaplacian, k: usize) -> Vec<f64> {
    let n = laplacian.node_count();
    if n < 3 || laplacian.edge_count() == 0 {
        return vec![0.0; k.min(n.max(1))];
    }
    let steps = n.min((2 * k + 10).max(k + 1));
    let (alpha, beta) = lanczos_tridiagonal(laplacian, steps);
    let mut eigs = smallest_eigenvalues(&alpha, &beta, k.min(alpha.len()));
    // Numerical noise can push the theoretically-zero smallest eigenvalue
    // slightly negative; clamp since a Laplacian is positive semi-definite.
    for e in eigs.iter_mut() {
        if *e < 0.0 && *e > -1e-6 {
            *e = 0.0;
        }
    }
    eigs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::Csr;

    #[test]
    fn disconnected_graph_has_zero_fiedler_value() {
        let csr = Csr::build(4, &[(0, 1, 1.0), (2, 3, 1.0)]);
        let laplacian = SparseLaplacian::from_graph(&csr);
        let eigs = smallest_eigenvalues_of(&laplacian, 3);
        assert!(eigs[0] < 1e-6);
        assert!(eigs[1] < 1e-6, "two components => two zero eigenvalues");
    }

    #[test]
    fn below_three_nodes_skips() {
        let csr = Csr::build(2, &[(0, 1, 1.0)]);
        let laplacian = SparseLaplacian::from_graph(&csr);
        let eigs = smallest_eigenvalues_of(&laplacian, 2);
        assert!(eigs.iter().all(|&e| e == 0.0));
    }

    #[test]
    fn connected_path_graph_has_positive_fiedler_value() {
        let csr = Csr::build(4, &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0)]);
        let laplacian = SparseLaplacian::from_graph(&csr);
        let eigs = smallest_eigenvalues_of(&laplacian, 4);
        assert!(eigs[0] < 1e-6);
        assert!(eigs[1] > 1e-6);
    }
}
