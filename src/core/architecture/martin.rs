//! Martin's instability/abstractness metrics per module (spec 4.6).

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MartinMetrics {
    pub efferent: usize,
    pub afferent: usize,
    /// `I = Ce / (Ca + Ce)`; `None` when the module has no external edges.
    pub instability: Option<f64>,
    pub abstractness: f64,
    /// `D = |A + I - 1|`; `None` when `instability` is `None`.
    pub main_seq_distance: Option<f64>,
}

pub fn martin_metrics(
    afferent: usize,
    efferent: usize,
    abstract_symbols: usize,
    total_symbols: usize,
) -> MartinMetrics {
    let denom = afferent + efferent;
    let instability = if denom == 0 {
        None
    } else {
        Some(efferent as f64 / denom as f64)
    };
    let abstractness = if total_symbols == 0 {
        0.0
    } else {
        abstract_symbols as f64 / total_symbols as f64
    };
    let main_seq_distance = instability.map(|i| (abstractness + i - 1.0).abs());
    MartinMetrics {
        efferent,
        afferent,
        instability,
        abstractness,
        main_seq_distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_main_sequence_has_zero_distance() {
        let m = martin_metrics(5, 5, 5, 10); // I=0.5, A=0.5
        assert!((m.main_seq_distance.unwrap()).abs() < 1e-9);
    }

    #[test]
    fn no_external_edges_has_no_instability() {
        let m = martin_metrics(0, 0, 0, 0);
        assert!(m.instability.is_none());
        assert!(m.main_seq_distance.is_none());
    }

    #[test]
    fn zone_of_pain_is_low_abstractness_high_instability_complement() {
        // I close to 0 (stable) but A also near 0: zone of pain.
        let m = martin_metrics(10, 1, 0, 20);
        assert!(m.instability.unwrap() < 0.2);
        assert!(m.abstractness < 0.1);
        assert!(m.main_seq_distance.unwrap() > 0.7);
    }
}
