//! Gini coefficient (GLOSSARY): inequality of a distribution, used for
//! `impl_gini`, `knowledge_gini`, and `centrality_gini`.

/// `G = (2 * sum(i * x_i)) / (n * sum(x_i)) - (n + 1) / n` over `values`
/// sorted ascending, `i` 1-indexed. `0` for fewer than two non-negative
/// values or an all-zero distribution.
pub fn gini(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let total: f64 = sorted.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let weighted_sum: f64 = sorted
        .iter()
        .enumerate()
        .map(|(idx, &x)| (idx + 1) as f64 * x)
        .sum();
    let n_f = n as f64;
    let g = (2.0 * weighted_sum) / (n_f * total) - (n_f + 1.0) / n_f;
    g.clamp(0.0, (n_f - 1.0) / n_f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn scenario_s4_skewed_distribution() {
        let g = gini(&[2.0, 3.0, 5.0, 115.0, 120.0]);
        assert_abs_diff_eq!(g, 0.568, epsilon = 0.01);
    }

    #[test]
    fn uniform_distribution_has_zero_gini() {
        let g = gini(&[50.0, 50.0, 50.0, 50.0, 50.0]);
        assert_eq!(g, 0.0);
    }

    #[test]
    fn gini_is_scale_invariant() {
        let a = gini(&[2.0, 3.0, 5.0, 115.0, 120.0]);
        let b = gini(&[20.0, 30.0, 50.0, 1150.0, 1200.0]);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn bounds_hold_for_maximally_unequal_distribution() {
        let n = 5.0;
        let g = gini(&[0.0, 0.0, 0.0, 0.0, 100.0]);
        assert!(g <= (n - 1.0) / n + 1e-9);
        assert!(g >= 0.0);
    }

    #[test]
    fn fewer_than_two_values_is_zero() {
        assert_eq!(gini(&[]), 0.0);
        assert_eq!(gini(&[42.0]), 0.0);
    }
}
