//! The six composite formulas (spec 4.7). Each takes its already-resolved
//! component values (percentiles, ratios) rather than reaching into the
//! `FactStore` itself, so the arithmetic is independently testable; `mod.rs`
//! is the seam that resolves components from stored signals.

pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// `round(10*x, 1)` with a display floor of `1.0` (spec 4.7): composites
/// are reported on a 1-10 scale, never 0, even when the raw score is 0.
pub fn to_display_scale(x: f64) -> f64 {
    let scaled = (10.0 * clamp01(x) * 10.0).round() / 10.0;
    scaled.max(1.0)
}

fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    numerator / denominator.max(1.0)
}

pub struct RiskScoreInputs {
    pub pctl_pagerank: f64,
    pub pctl_blast_radius: f64,
    pub pctl_cognitive_load: f64,
    /// `1.0` if trajectory in {CHURNING, SPIKING}, else `0.3`.
    pub instability_factor: f64,
    pub bus_factor: f64,
    pub max_bus_factor: f64,
}

pub fn risk_score(inputs: &RiskScoreInputs) -> f64 {
    let bus_factor_term = if inputs.max_bus_factor <= 0.0 {
        0.0
    } else {
        1.0 - inputs.bus_factor / inputs.max_bus_factor
    };
    clamp01(
        0.25 * inputs.pctl_pagerank
            + 0.20 * inputs.pctl_blast_radius
            + 0.20 * inputs.pctl_cognitive_load
            + 0.20 * inputs.instability_factor
            + 0.15 * bus_factor_term,
    )
}

pub struct WiringQualityInputs {
    pub is_orphan: bool,
    pub stub_ratio: f64,
    pub phantom_import_count: f64,
    pub import_count: f64,
    pub broken_call_count: f64,
    pub total_calls: f64,
}

pub fn wiring_quality(inputs: &WiringQualityInputs) -> f64 {
    let orphan = if inputs.is_orphan { 1.0 } else { 0.0 };
    let phantom_ratio = guarded_ratio(inputs.phantom_import_count, inputs.import_count);
    let broken_ratio = guarded_ratio(inputs.broken_call_count, inputs.total_calls);
    clamp01(
        1.0 - (0.30 * orphan
            + 0.25 * inputs.stub_ratio
            + 0.25 * phantom_ratio
            + 0.20 * broken_ratio),
    )
}

pub struct HealthScoreInputs {
    pub cohesion: f64,
    pub coupling: f64,
    /// `None` when the module's Martin `I` is null.
    pub main_seq_distance: Option<f64>,
    pub boundary_alignment: f64,
    pub role_consistency: f64,
    pub mean_stub: f64,
}

/// Base weights when every term is present; the `main_seq_distance` term's
/// 0.20 is redistributed proportionally across the rest when it is null.
const HEALTH_WEIGHTS: [f64; 6] = [0.20, 0.20, 0.20, 0.15, 0.15, 0.10];

pub fn health_score(inputs: &HealthScoreInputs) -> f64 {
    let terms = [
        inputs.cohesion,
        1.0 - inputs.coupling,
        inputs.main_seq_distance.map(|d| 1.0 - d).unwrap_or(0.0),
        inputs.boundary_alignment,
        inputs.role_consistency,
        1.0 - inputs.mean_stub,
    ];
    let mut weights = HEALTH_WEIGHTS;
    if inputs.main_seq_distance.is_none() {
        let dropped = weights[2];
        weights[2] = 0.0;
        let remaining: f64 = weights.iter().enumerate().filter(|&(i, _)| i != 2).map(|(_, w)| w).sum();
        for (i, w) in weights.iter_mut().enumerate() {
            if i != 2 && remaining > 0.0 {
                *w += dropped * (*w / remaining);
            }
        }
    }
    clamp01(terms.iter().zip(weights.iter()).map(|(t, w)| t * w).sum())
}

pub struct WiringScoreInputs {
    pub orphan_ratio: f64,
    pub phantom_ratio: f64,
    pub glue_deficit: f64,
    pub mean_stub: f64,
    pub clone_ratio: f64,
}

pub fn wiring_score(inputs: &WiringScoreInputs) -> f64 {
    clamp01(
        1.0 - (0.25 * inputs.orphan_ratio
            + 0.25 * inputs.phantom_ratio
            + 0.20 * inputs.glue_deficit
            + 0.15 * inputs.mean_stub
            + 0.15 * inputs.clone_ratio),
    )
}

pub struct ArchitectureHealthInputs {
    pub violation_rate: f64,
    pub mean_cohesion: f64,
    pub mean_coupling: f64,
    pub mean_main_seq_distance: f64,
    pub mean_boundary_alignment: f64,
}

pub fn architecture_health(inputs: &ArchitectureHealthInputs) -> f64 {
    clamp01(
        0.2 * (1.0 - inputs.violation_rate)
            + 0.2 * inputs.mean_cohesion
            + 0.2 * (1.0 - inputs.mean_coupling)
            + 0.2 * (1.0 - inputs.mean_main_seq_distance)
            + 0.2 * inputs.mean_boundary_alignment,
    )
}

pub struct CodebaseHealthInputs {
    pub architecture_health: f64,
    pub wiring_score: f64,
    pub global_bus_factor: f64,
    pub team_size: f64,
    pub modularity: f64,
}

pub fn codebase_health(inputs: &CodebaseHealthInputs) -> f64 {
    let bus_factor_term = if inputs.team_size <= 0.0 {
        0.0
    } else {
        (inputs.global_bus_factor / inputs.team_size).min(1.0)
    };
    clamp01(
        0.30 * inputs.architecture_health
            + 0.30 * inputs.wiring_score
            + 0.20 * bus_factor_term
            + 0.20 * inputs.modularity,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_score_is_bounded_and_weighted() {
        let inputs = RiskScoreInputs {
            pctl_pagerank: 1.0,
            pctl_blast_radius: 1.0,
            pctl_cognitive_load: 1.0,
            instability_factor: 1.0,
            bus_factor: 1.0,
            max_bus_factor: 5.0,
        };
        let score = risk_score(&inputs);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn wiring_quality_penalizes_orphans_and_phantoms() {
        let inputs = WiringQualityInputs {
            is_orphan: true,
            stub_ratio: 0.0,
            phantom_import_count: 2.0,
            import_count: 4.0,
            broken_call_count: 0.0,
            total_calls: 10.0,
        };
        let score = wiring_quality(&inputs);
        assert!(score < 1.0 - 0.30);
    }

    #[test]
    fn health_score_redistributes_dropped_main_sequence_weight() {
        let with_d = HealthScoreInputs {
            cohesion: 0.5,
            coupling: 0.5,
            main_seq_distance: Some(0.5),
            boundary_alignment: 0.5,
            role_consistency: 0.5,
            mean_stub: 0.5,
        };
        let without_d = HealthScoreInputs { main_seq_distance: None, ..with_d_clone(&with_d) };
        let a = health_score(&with_d);
        let b = health_score(&without_d);
        assert!(a > 0.0 && b > 0.0);
    }

    fn with_d_clone(i: &HealthScoreInputs) -> HealthScoreInputs {
        HealthScoreInputs {
            cohesion: i.cohesion,
            coupling: i.coupling,
            main_seq_distance: i.main_seq_distance,
            boundary_alignment: i.boundary_alignment,
            role_consistency: i.role_consistency,
            mean_stub: i.mean_stub,
        }
    }

    #[test]
    fn display_scale_floors_at_one() {
        assert_eq!(to_display_scale(0.0), 1.0);
        assert_eq!(to_display_scale(1.0), 10.0);
    }

    #[test]
    fn codebase_health_caps_bus_factor_term_at_team_size() {
        let inputs = CodebaseHealthInputs {
            architecture_health: 1.0,
            wiring_score: 1.0,
            global_bus_factor: 10.0,
            team_size: 2.0,
            modularity: 1.0,
        };
        assert!((codebase_health(&inputs) - 1.0).abs() < 1e-9);
    }
}
