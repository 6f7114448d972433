//! Finding/atom/scope vocabulary (spec 4.8) shared by every finder.

use serde::{Deserialize, Serialize};

use crate::core::blackboard::{EntityId, Polarity, SignalId, SignalRegistry};
use crate::core::error::{InsightError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    File,
    FilePair,
    Module,
    ModulePair,
    Codebase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingId {
    HighRiskHub,
    HiddenCoupling,
    GodFile,
    UnstableFile,
    BoundaryMismatch,
    DeadDependency,
    ChronicProblem,
    OrphanCode,
    HollowCode,
    PhantomImports,
    CopyPasteClone,
    FlatArchitecture,
    NamingDrift,
    KnowledgeSilo,
    ConwayViolation,
    ReviewBlindspot,
    LayerViolation,
    ZoneOfPain,
    ArchitectureErosion,
    WeakLink,
    BugAttractor,
    AccidentalCoupling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Gt,
    Lt,
}

/// A condition a finder checks before it can fire: a registered signal
/// compared against a fixed threshold, validated against that signal's
/// polarity at registration time (spec 4.8).
#[derive(Debug, Clone, Copy)]
pub struct AtomSpec {
    pub signal: SignalId,
    pub op: Op,
    pub threshold: f64,
}

impl AtomSpec {
    pub const fn gt(signal: SignalId, threshold: f64) -> Self {
        Self { signal, op: Op::Gt, threshold }
    }

    pub const fn lt(signal: SignalId, threshold: f64) -> Self {
        Self { signal, op: Op::Lt, threshold }
    }

    pub fn holds(&self, actual: f64) -> bool {
        match self.op {
            Op::Gt => actual > self.threshold,
            Op::Lt => actual < self.threshold,
        }
    }

    /// Normalized margin (spec 4.8), clamped to `[0, 1]`.
    pub fn margin(&self, actual: f64) -> f64 {
        const EPS: f64 = 1e-9;
        let meta = SignalRegistry::meta(self.signal);
        let m = match meta.polarity {
            Polarity::HighIsGood => (self.threshold - actual) / self.threshold.max(EPS),
            _ => (actual - self.threshold) / (1.0 - self.threshold).max(EPS),
        };
        m.clamp(0.0, 1.0)
    }
}

/// Rejects a condition whose operator is incompatible with its signal's
/// polarity: `>` requires HIGH_IS_BAD or neutral, `<` requires
/// HIGH_IS_GOOD or neutral.
pub fn validate_atom(finder: &str, atom: &AtomSpec) -> Result<()> {
    let meta = SignalRegistry::meta(atom.signal);
    let ok = match atom.op {
        Op::Gt => !matches!(meta.polarity, Polarity::HighIsGood),
        Op::Lt => !matches!(meta.polarity, Polarity::HighIsBad),
    };
    if !ok {
        return Err(InsightError::PolarityMismatch {
            finder: finder.to_string(),
            signal: meta.name.to_string(),
            polarity: meta.polarity.to_string(),
            op: match atom.op {
                Op::Gt => ">".to_string(),
                Op::Lt => "<".to_string(),
            },
        });
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct TriggeredAtom {
    pub signal: SignalId,
    pub threshold: f64,
    pub actual: f64,
}

#[derive(Debug, Clone)]
pub struct Finding {
    pub kind: FindingId,
    pub scope: Scope,
    pub targets: Vec<EntityId>,
    pub severity: f64,
    pub confidence: f64,
    pub rationale: String,
    pub evidence: Vec<TriggeredAtom>,
}

impl Finding {
    /// Dedup key (spec 4.9): finder type + sorted target set.
    pub fn identity_key(&self) -> String {
        let mut keys: Vec<String> = self.targets.iter().map(|t| t.key().to_string()).collect();
        keys.sort();
        format!("{:?}:{}", self.kind, keys.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gt_atom_holds_above_threshold() {
        let atom = AtomSpec::gt(SignalId::RiskScore, 0.5);
        assert!(atom.holds(0.6));
        assert!(!atom.holds(0.4));
    }

    #[test]
    fn margin_is_clamped_to_unit_interval() {
        let atom = AtomSpec::gt(SignalId::RiskScore, 0.5);
        assert!(atom.margin(10.0) <= 1.0);
        assert!(atom.margin(-10.0) >= 0.0);
    }

    #[test]
    fn gt_on_high_is_good_signal_is_rejected() {
        let atom = AtomSpec::gt(SignalId::BusFactor, 0.5);
        assert!(validate_atom("TEST", &atom).is_err());
    }

    #[test]
    fn lt_on_high_is_bad_signal_is_rejected() {
        let atom = AtomSpec::lt(SignalId::RiskScore, 0.5);
        assert!(validate_atom("TEST", &atom).is_err());
    }

    #[test]
    fn neutral_signal_accepts_either_operator() {
        let gt = AtomSpec::gt(SignalId::ChurnSlope, 0.0);
        let lt = AtomSpec::lt(SignalId::ChurnSlope, 0.0);
        assert!(validate_atom("TEST", &gt).is_ok());
        assert!(validate_atom("TEST", &lt).is_ok());
    }
}
