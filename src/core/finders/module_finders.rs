//! Module-scope finders (spec 4.8).

use crate::core::blackboard::SignalId;

use super::common::evaluate_all;
use super::context::DetectionContext;
use super::registry::Finder;
use super::types::{AtomSpec, Finding, FindingId, Scope};

pub struct KnowledgeSilo;
impl Finder for KnowledgeSilo {
    fn id(&self) -> FindingId {
        FindingId::KnowledgeSilo
    }
    fn scope(&self) -> Scope {
        Scope::Module
    }
    fn requires(&self) -> &'static [SignalId] {
        &[SignalId::BusFactor]
    }
    fn base_severity(&self) -> f64 {
        0.6
    }
    fn atoms(&self) -> &'static [AtomSpec] {
        &[AtomSpec::lt(SignalId::BusFactor, 1.5)]
    }
    fn run(&self, ctx: &DetectionContext) -> Vec<Finding> {
        run_per_module(self, ctx)
    }
}

/// Zone of Pain (spec S7): a module that is both concrete and stable —
/// high cost to change, low payoff for abstracting over it.
pub struct ZoneOfPain;
impl Finder for ZoneOfPain {
    fn id(&self) -> FindingId {
        FindingId::ZoneOfPain
    }
    fn scope(&self) -> Scope {
        Scope::Module
    }
    fn requires(&self) -> &'static [SignalId] {
        &[SignalId::Instability, SignalId::Abstractness]
    }
    fn base_severity(&self) -> f64 {
        0.7
    }
    fn atoms(&self) -> &'static [AtomSpec] {
        &[AtomSpec::lt(SignalId::Instability, 0.3), AtomSpec::lt(SignalId::Abstractness, 0.3)]
    }
    fn run(&self, ctx: &DetectionContext) -> Vec<Finding> {
        // Instability is null when Ca+Ce=0 (no coupling at all); the
        // finder must skip rather than treat the missing value as 0.
        ctx.store
            .modules()
            .filter_map(|module| {
                let entity = crate::core::blackboard::EntityId::module(module);
                if !ctx.store.has_value(&entity, SignalId::Instability) {
                    return None;
                }
                let (evidence, confidence) = evaluate_all(self.atoms(), ctx.store, &entity)?;
                Some(Finding {
                    kind: self.id(),
                    scope: self.scope(),
                    targets: vec![entity],
                    severity: self.base_severity(),
                    confidence,
                    rationale: "module is both stable and concrete (zone of pain)".to_string(),
                    evidence,
                })
            })
            .collect()
    }
}

pub struct BoundaryMismatch;
impl Finder for BoundaryMismatch {
    fn id(&self) -> FindingId {
        FindingId::BoundaryMismatch
    }
    fn scope(&self) -> Scope {
        Scope::Module
    }
    fn requires(&self) -> &'static [SignalId] {
        &[SignalId::BoundaryAlignment]
    }
    fn base_severity(&self) -> f64 {
        0.5
    }
    fn atoms(&self) -> &'static [AtomSpec] {
        &[AtomSpec::lt(SignalId::BoundaryAlignment, 0.5)]
    }
    fn run(&self, ctx: &DetectionContext) -> Vec<Finding> {
        run_per_module(self, ctx)
    }
}

pub struct LayerViolation;
impl Finder for LayerViolation {
    fn id(&self) -> FindingId {
        FindingId::LayerViolation
    }
    fn scope(&self) -> Scope {
        Scope::Module
    }
    fn requires(&self) -> &'static [SignalId] {
        &[SignalId::LayerViolationCount]
    }
    fn base_severity(&self) -> f64 {
        0.6
    }
    fn atoms(&self) -> &'static [AtomSpec] {
        &[AtomSpec::gt(SignalId::LayerViolationCount, 0.0)]
    }
    fn run(&self, ctx: &DetectionContext) -> Vec<Finding> {
        let codebase = crate::core::blackboard::EntityId::codebase("");
        match evaluate_all(self.atoms(), ctx.store, &codebase) {
            Some((evidence, confidence)) => vec![Finding {
                kind: self.id(),
                scope: self.scope(),
                targets: vec![codebase],
                severity: self.base_severity(),
                confidence,
                rationale: "dependency edges cross two or more architectural layers".to_string(),
                evidence,
            }],
            None => vec![],
        }
    }
}

/// Conway Violation: a module whose ownership is split across many
/// authors despite low internal cohesion, suggesting the team boundary
/// doesn't match the module boundary (spec's Conway's Law finder).
pub struct ConwayViolation;
impl Finder for ConwayViolation {
    fn id(&self) -> FindingId {
        FindingId::ConwayViolation
    }
    fn scope(&self) -> Scope {
        Scope::Module
    }
    fn requires(&self) -> &'static [SignalId] {
        &[SignalId::Cohesion, SignalId::BusFactor]
    }
    fn base_severity(&self) -> f64 {
        0.5
    }
    fn atoms(&self) -> &'static [AtomSpec] {
        &[AtomSpec::lt(SignalId::Cohesion, 0.4), AtomSpec::gt(SignalId::BusFactor, 3.0)]
    }
    fn run(&self, ctx: &DetectionContext) -> Vec<Finding> {
        run_per_module(self, ctx)
    }
}

fn run_per_module(finder: &(impl Finder + ?Sized), ctx: &DetectionContext) -> Vec<Finding> {
    ctx.store
        .modules()
        .filter_map(|module| {
            let entity = crate::core::blackboard::EntityId::module(module);
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
