//! Codebase-scope finders (spec 4.8).

use crate::core::blackboard::{EntityId, SignalId};

use super::common::evaluate_all;
use super::context::DetectionContext;
use super::registry::Finder;
use super::types::{AtomSpec, Finding, FindingId, Scope};

pub struct FlatArchitecture;
impl Finder for FlatArchitecture {
    fn id(&self) -> FindingId {
        FindingId::FlatArchitecture
    }
    fn scope(&self) -> Scope {
        Scope::Codebase
    }
    fn requires(&self) -> &'static [SignalId] {
        &[SignalId::Modularity, SignalId::FileCount]
    }
    fn base_severity(&self) -> f64 {
        0.5
    }
    fn atoms(&self) -> &'static [AtomSpec] {
        &[AtomSpec::lt(SignalId::Modularity, 0.2), AtomSpec::gt(SignalId::FileCount, 30.0)]
    }
    fn run(&self, ctx: &DetectionContext) -> Vec<Finding> {
        run_codebase(self, ctx, "no meaningful module structure was detected despite the codebase's size")
    }
}

pub struct ArchitectureErosion;
impl Finder for ArchitectureErosion {
    fn id(&self) -> FindingId {
        FindingId::ArchitectureErosion
    }
    fn scope(&self) -> Scope {
        Scope::Codebase
    }
    fn requires(&self) -> &'static [SignalId] {
        &[SignalId::ArchitectureHealth]
    }
    fn base_severity(&self) -> f64 {
        0.8
    }
    fn atoms(&self) -> &'static [AtomSpec] {
        &[AtomSpec::lt(SignalId::ArchitectureHealth, 0.4)]
    }
    fn run(&self, ctx: &DetectionContext) -> Vec<Finding> {
        run_codebase(self, ctx, "architecture health has degraded across the codebase")
    }
}

fn run_codebase(finder: &(impl Finder + ?Sized), ctx: &DetectionContext, rationale: &str) -> Vec<Finding> {
    let codebase = EntityId::codebase("");
    match evaluate_all(finder.atoms(), ctx.store, &codebase) {
        Some((evidence, confidence)) => vec![Finding {
            kind: finder.id(),
            scope: finder.scope(),
            targets: vec![codebase],
            severity: finder.base_severity(),
            confidence,
            rationale: rationale.to_string(),
            evidence,
        }],
        None => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::blackboard::{Entity, FactStore, Value};

    #[test]
    fn flat_architecture_fires_for_large_unmodularized_codebase() {
        let mut store = FactStore::new();
        let codebase = EntityId::codebase("");
        store.add_entity(Entity::new(codebase.clone(), None));
        store.set(&codebase, SignalId::Modularity, Value::Float(0.1));
        store.set(&codebase, SignalId::FileCount, Value::Int(120));
        let ctx = DetectionContext::new(&store, Vec::new());
        assert_eq!(FlatArchitecture.run(&ctx).len(), 1);
    }

    #[test]
    fn architecture_erosion_requires_signal_presence() {
        let store = FactStore::new();
        let ctx = DetectionContext::new(&store, Vec::new());
        assert!(ArchitectureErosion.run(&ctx).is_empty());
    }
}
