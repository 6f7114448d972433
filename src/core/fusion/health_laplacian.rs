//! Health Laplacian `Δh` (spec 4.7): a discrete Laplacian over *raw*,
//! pre-percentile risk so local maxima survive percentile normalization's
//! flattening effect.

use std::collections::HashMap;

/// `raw_risk(f) = sum_i weight_i * (raw_i(f) / max_i)`, the same weights
/// as `risk_score` but applied to un-normalized signal values divided by
/// their population max (so each term is in roughly [0, 1] without a
/// percentile rank).
pub struct RawRiskInputs {
    pub pagerank: f64,
    pub blast_radius: f64,
    pub cognitive_load: f64,
    pub instability_factor: f64,
    pub bus_factor_term: f64,
}

pub fn raw_risk(inputs: &RawRiskInputs, maxima: &RawRiskMaxima) -> f64 {
    let term = |v: f64, max: f64| if max <= 0.0 { 0.0 } else { v / max };
    0.25 * term(inputs.pagerank, maxima.pagerank)
        + 0.20 * term(inputs.blast_radius, maxima.blast_radius)
        + 0.20 * term(inputs.cognitive_load, maxima.cognitive_load)
        + 0.20 * inputs.instability_factor
        + 0.15 * inputs.bus_factor_term
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RawRiskMaxima {
    pub pagerank: f64,
    pub blast_radius: f64,
    pub cognitive_load: f64,
}

/// `Δh(f) = raw_risk(f) - mean_{u in N(f)} raw_risk(u)`, `0` when `f` has
/// no undirected IMPORTS neighbors.
pub fn health_laplacian(
    file: &str,
    neighbors: &HashMap<String, Vec<String>>,
    raw_risk_by_file: &HashMap<String, f64>,
) -> f64 {
    let Some(own) = raw_risk_by_file.get(file) else { return 0.0 };
    let Some(ns) = neighbors.get(file) else { return 0.0 };
    if ns.is_empty() {
        return 0.0;
    }
    let sum: f64 = ns.iter().filter_map(|n| raw_risk_by_file.get(n)).sum();
    let count = ns.len() as f64;
    own - sum / count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolated_file_has_zero_laplacian() {
        let neighbors = HashMap::new();
        let risks = HashMap::from([("a.rs".to_string(), 0.8)]);
        assert_eq!(health_laplacian("a.rs", &neighbors, &risks), 0.0);
    }

    #[test]
    fn local_maximum_has_positive_laplacian() {
        let neighbors = HashMap::from([("hub.rs".to_string(), vec!["a.rs".to_string(), "b.rs".to_string()])]);
        let risks = HashMap::from([
            ("hub.rs".to_string(), 0.9),
            ("a.rs".to_string(), 0.1),
            ("b.rs".to_string(), 0.1),
        ]);
        assert!(health_laplacian("hub.rs", &neighbors, &risks) > 0.0);
    }

    #[test]
    fn raw_risk_is_zero_when_all_maxima_are_zero() {
        let inputs = RawRiskInputs {
            pagerank: 1.0,
            blast_radius: 1.0,
            cognitive_load: 1.0,
            instability_factor: 0.0,
            bus_factor_term: 0.0,
        };
        assert_eq!(raw_risk(&inputs, &RawRiskMaxima::default()), 0.0);
    }
}
