//! File-scope finders (spec 4.8).

use crate::core::blackboard::{EntityId, RelationKind, SignalId};

use super::common::evaluate_all;
use super::context::DetectionContext;
use super::registry::Finder;
use super::types::{AtomSpec, Finding, FindingId, Scope};

const WEAK_LINK_THRESHOLD: f64 = 0.4;

pub struct HighRiskHub;
impl Finder for HighRiskHub {
    fn id(&self) -> FindingId {
        FindingId::HighRiskHub
    }
    fn scope(&self) -> Scope {
        Scope::File
    }
    fn requires(&self) -> &'static [SignalId] {
        &[SignalId::RiskScore, SignalId::PageRank]
    }
    fn hotspot_filtered(&self) -> bool {
        true
    }
    fn base_severity(&self) -> f64 {
        0.9
    }
    fn atoms(&self) -> &'static [AtomSpec] {
        &[AtomSpec::gt(SignalId::RiskScore, 0.75), AtomSpec::gt(SignalId::PageRank, 0.6)]
    }
    fn run(&self, ctx: &DetectionContext) -> Vec<Finding> {
        run_per_file(self, ctx)
    }
}

pub struct GodFile;
impl Finder for GodFile {
    fn id(&self) -> FindingId {
        FindingId::GodFile
    }
    fn scope(&self) -> Scope {
        Scope::File
    }
    fn requires(&self) -> &'static [SignalId] {
        &[SignalId::Lines, SignalId::CognitiveLoad]
    }
    fn base_severity(&self) -> f64 {
        0.7
    }
    fn atoms(&self) -> &'static [AtomSpec] {
        &[AtomSpec::gt(SignalId::Lines, 500.0), AtomSpec::gt(SignalId::CognitiveLoad, 0.7)]
    }
    fn run(&self, ctx: &DetectionContext) -> Vec<Finding> {
        run_per_file(self, ctx)
    }
}

pub struct UnstableFile;
impl Finder for UnstableFile {
    fn id(&self) -> FindingId {
        FindingId::UnstableFile
    }
    fn scope(&self) -> Scope {
        Scope::File
    }
    fn requires(&self) -> &'static [SignalId] {
        &[SignalId::ChurnCv, SignalId::ChurnTrajectory]
    }
    fn hotspot_filtered(&self) -> bool {
        true
    }
    fn base_severity(&self) -> f64 {
        0.6
    }
    fn atoms(&self) -> &'static [AtomSpec] {
        &[AtomSpec::gt(SignalId::ChurnCv, 0.5)]
    }
    fn run(&self, ctx: &DetectionContext) -> Vec<Finding> {
        ctx.store
            .files()
            .filter_map(|file| {
                let entity = EntityId::file(file);
                let trajectory = ctx.store.get(&entity, SignalId::ChurnTrajectory)?.as_enum()?.to_string();
                if !matches!(trajectory.as_str(), "Churning" | "Spiking") {
                    return None;
                }
                if self.hotspot_filtered() && !ctx.is_hotspot(&entity) {
                    return None;
                }
                let (evidence, confidence) = evaluate_all(self.atoms(), ctx.store, &entity)?;
                Some(Finding {
                    kind: self.id(),
                    scope: self.scope(),
                    targets: vec![entity],
                    severity: self.base_severity(),
                    confidence,
                    rationale: format!("churn trajectory is {trajectory} with high variance"),
                    evidence,
                })
            })
            .collect()
    }
}

pub struct OrphanCode;
impl Finder for OrphanCode {
    fn id(&self) -> FindingId {
        FindingId::OrphanCode
    }
    fn scope(&self) -> Scope {
        Scope::File
    }
    fn requires(&self) -> &'static [SignalId] {
        &[SignalId::IsOrphan]
    }
    fn base_severity(&self) -> f64 {
        0.4
    }
    fn atoms(&self) -> &'static [AtomSpec] {
        &[AtomSpec::gt(SignalId::IsOrphan, 0.5)]
    }
    fn run(&self, ctx: &DetectionContext) -> Vec<Finding> {
        ctx.store
            .files()
            .filter_map(|file| {
                let entity = EntityId::file(file);
                let role = ctx.store.get(&entity, SignalId::Role).and_then(|v| v.as_enum()).unwrap_or("");
                if matches!(role, "EntryPoint" | "Test") {
                    return None;
                }
                let (evidence, confidence) = evaluate_all(self.atoms(), ctx.store, &entity)?;
                Some(Finding {
                    kind: self.id(),
                    scope: self.scope(),
                    targets: vec![entity],
                    severity: self.base_severity(),
                    confidence,
                    rationale: "file has no incoming references and is not an entry point or test".to_string(),
                    evidence,
                })
            })
            .collect()
    }
}

pub struct HollowCode;
impl Finder for HollowCode {
    fn id(&self) -> FindingId {
        FindingId::HollowCode
    }
    fn scope(&self) -> Scope {
        Scope::File
    }
    fn requires(&self) -> &'static [SignalId] {
        &[SignalId::StubRatio]
    }
    fn base_severity(&self) -> f64 {
        0.5
    }
    fn atoms(&self) -> &'static [AtomSpec] {
        &[AtomSpec::gt(SignalId::StubRatio, 0.6)]
    }
    fn run(&self, ctx: &DetectionContext) -> Vec<Finding> {
        run_per_file(self, ctx)
    }
}

pub struct PhantomImports;
impl Finder for PhantomImports {
    fn id(&self) -> FindingId {
        FindingId::PhantomImports
    }
    fn scope(&self) -> Scope {
        Scope::File
    }
    fn requires(&self) -> &'static [SignalId] {
        &[SignalId::PhantomImportCount]
    }
    fn base_severity(&self) -> f64 {
        0.6
    }
    fn atoms(&self) -> &'static [AtomSpec] {
        &[AtomSpec::gt(SignalId::PhantomImportCount, 0.0)]
    }
    fn run(&self, ctx: &DetectionContext) -> Vec<Finding> {
        run_per_file(self, ctx)
    }
}

pub struct NamingDrift;
impl Finder for NamingDrift {
    fn id(&self) -> FindingId {
        FindingId::NamingDrift
    }
    fn scope(&self) -> Scope {
        Scope::File
    }
    fn requires(&self) -> &'static [SignalId] {
        &[SignalId::NamingDrift]
    }
    fn base_severity(&self) -> f64 {
        0.4
    }
    fn atoms(&self) -> &'static [AtomSpec] {
        &[AtomSpec::gt(SignalId::NamingDrift, 0.5)]
    }
    fn run(&self, ctx: &DetectionContext) -> Vec<Finding> {
        run_per_file(self, ctx)
    }
}

pub struct BugAttractor;
impl Finder for BugAttractor {
    fn id(&self) -> FindingId {
        FindingId::BugAttractor
    }
    fn scope(&self) -> Scope {
        Scope::File
    }
    fn requires(&self) -> &'static [SignalId] {
        &[SignalId::FixRatio]
    }
    fn hotspot_filtered(&self) -> bool {
        true
    }
    fn base_severity(&self) -> f64 {
        0.7
    }
    fn atoms(&self) -> &'static [AtomSpec] {
        &[AtomSpec::gt(SignalId::FixRatio, 0.5)]
    }
    fn run(&self, ctx: &DetectionContext) -> Vec<Finding> {
        run_per_file(self, ctx)
    }
}

pub struct WeakLink;
impl Finder for WeakLink {
    fn id(&self) -> FindingId {
        FindingId::WeakLink
    }
    fn scope(&self) -> Scope {
        Scope::File
    }
    fn requires(&self) -> &'static [SignalId] {
        &[SignalId::RiskScore]
    }
    fn base_severity(&self) -> f64 {
        0.8
    }
    fn atoms(&self) -> &'static [AtomSpec] {
        &[]
    }
    fn run(&self, ctx: &DetectionContext) -> Vec<Finding> {
        ctx.health_laplacian
            .iter()
            .filter(|&(_, &delta)| delta > WEAK_LINK_THRESHOLD)
            .map(|(file, &delta)| Finding {
                kind: self.id(),
                scope: self.scope(),
                targets: vec![EntityId::file(file)],
                severity: self.base_severity(),
                confidence: ((delta - WEAK_LINK_THRESHOLD) / (1.0 - WEAK_LINK_THRESHOLD).max(1e-9))
                    .clamp(0.0, 1.0),
                rationale: format!(
                    "risk is {delta:.2} above its import neighborhood's mean (weak link in an otherwise healthy area)"
                ),
                evidence: vec![],
            })
            .collect()
    }
}

pub struct DeadDependency;
impl Finder for DeadDependency {
    fn id(&self) -> FindingId {
        FindingId::DeadDependency
    }
    fn scope(&self) -> Scope {
        Scope::File
    }
    fn requires(&self) -> &'static [SignalId] {
        &[SignalId::ChurnTrajectory, SignalId::TotalChanges]
    }
    fn base_severity(&self) -> f64 {
        0.5
    }
    fn atoms(&self) -> &'static [AtomSpec] {
        &[]
    }
    fn run(&self, ctx: &DetectionContext) -> Vec<Finding> {
        ctx.store
            .files()
            .filter_map(|file| {
                let entity = EntityId::file(file);
                let targets: Vec<_> = ctx.store.outgoing(&entity, RelationKind::Imports);
                let dormant_target = targets.iter().find(|rel| {
                    let trajectory = ctx
                        .store
                        .get(&rel.to, SignalId::ChurnTrajectory)
                        .and_then(|v| v.as_enum());
                    let changes = ctx.store.get_f64(&rel.to, SignalId::TotalChanges).unwrap_or(0.0);
                    trajectory == Some("Dormant") && changes <= 1.0
                })?;
                Some(Finding {
                    kind: self.id(),
                    scope: self.scope(),
                    targets: vec![entity.clone(), dormant_target.to.clone()],
                    severity: self.base_severity(),
                    confidence: 0.5,
                    rationale: format!(
                        "{} depends on {}, which has seen no meaningful activity",
                        entity.key(),
                        dormant_target.to.key()
                    ),
                    evidence: vec![],
                })
            })
            .collect()
    }
}

pub struct ReviewBlindspot;
impl Finder for ReviewBlindspot {
    fn id(&self) -> FindingId {
        FindingId::ReviewBlindspot
    }
    fn scope(&self) -> Scope {
        Scope::File
    }
    fn requires(&self) -> &'static [SignalId] {
        &[SignalId::BusFactor, SignalId::RiskScore]
    }
    fn hotspot_filtered(&self) -> bool {
        true
    }
    fn base_severity(&self) -> f64 {
        0.6
    }
    fn atoms(&self) -> &'static [AtomSpec] {
        &[AtomSpec::lt(SignalId::BusFactor, 1.5), AtomSpec::gt(SignalId::RiskScore, 0.4)]
    }
    fn run(&self, ctx: &DetectionContext) -> Vec<Finding> {
        run_per_file(self, ctx)
    }
}

/// Shared run loop for finders whose predicate is the plain conjunction
/// of their declared atoms, with no extra per-finder logic.
fn run_per_file(finder: &(impl Finder + ?Sized), ctx: &DetectionContext) -> Vec<Finding> {
    ctx.store
        .files()
        .filter_map(|file| {
            let entity = EntityId::file(file);
            if finder.hotspot_filtered() && !ctx.is_hotspot(&entity) {
                return None;
            }
            let (evidence, confidence) = evaluate_all(finder.atoms(), ctx.store, &entity)?;
            Some(Finding {
                kind: finder.id(),
                scope: finder.scope(),
                targets: vec![entity],
                severity: finder.base_severity(),
                confidence,
                rationale: format!("{:?} condition triggered", finder.id()),
                evidence,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::blackboard::{Entity, FactStore, Value};

    #[test]
    fn orphan_code_skips_entry_points() {
        let mut store = FactStore::new();
        let entity = EntityId::file("main.rs");
        store.add_entity(Entity::new(entity.clone(), None));
        store.set(&entity, SignalId::IsOrphan, Value::Bool(true));
        store.set(&entity, SignalId::Role, Value::Enum("EntryPoint".to_string()));
        let ctx = DetectionContext::new(&store, Vec::new());
        assert!(OrphanCode.run(&ctx).is_empty());
    }

    #[test]
    fn orphan_code_fires_for_ordinary_unreferenced_file() {
        let mut store = FactStore::new();
        let entity = EntityId::file("util.rs");
        store.add_entity(Entity::new(entity.clone(), None));
        store.set(&entity, SignalId::IsOrphan, Value::Bool(true));
        store.set(&entity, SignalId::Role, Value::Enum("Utility".to_string()));
        let ctx = DetectionContext::new(&store, Vec::new());
        let findings = OrphanCode.run(&ctx);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingId::OrphanCode);
    }

    #[test]
    fn weak_link_fires_above_threshold() {
        let store = FactStore::new();
        let mut laplacian = std::collections::HashMap::new();
        laplacian.insert("hub.rs".to_string(), 0.555);
        let ctx = DetectionContext::with_health_laplacian(&store, Vec::new(), laplacian);
        let findings = WeakLink.run(&ctx);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn high_risk_hub_requires_hotspot_status() {
        let mut store = FactStore::new();
        let entity = EntityId::file("hub.rs");
        store.add_entity(Entity::new(entity.clone(), None));
        store.set(&entity, SignalId::RiskScore, Value::Float(0.9));
        store.set(&entity, SignalId::PageRank, Value::Float(0.9));
        store.set(&entity, SignalId::TotalChanges, Value::Int(0));
        let ctx = DetectionContext::new(&store, Vec::new());
        assert!(HighRiskHub.run(&ctx).is_empty());
    }
}
