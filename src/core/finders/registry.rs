//! The `Finder` trait and the registry of the 21 predicate-based finders
//! (spec 4.8). `CHRONIC_PROBLEM`, the 22nd named type, is a post-rank
//! severity amplifier rather than a predicate and lives in `core::rank`.

use crate::core::blackboard::SignalId;
use crate::core::error::Result;

use super::context::DetectionContext;
use super::types::{validate_atom, AtomSpec, Finding, FindingId, Scope};

pub trait Finder: Send + Sync {
    fn id(&self) -> FindingId;
    fn scope(&self) -> Scope;
    fn requires(&self) -> &'static [SignalId];
    fn hotspot_filtered(&self) -> bool {
        false
    }
    fn base_severity(&self) -> f64;
    fn atoms(&self) -> &'static [AtomSpec];
    fn run(&self, ctx: &DetectionContext) -> Vec<Finding>;
}

/// Tier gate (spec 4.8): a finder may run only if every required signal
/// has at least one value anywhere in the store.
pub fn is_available(finder: &dyn Finder, ctx: &DetectionContext) -> bool {
    finder.requires().iter().all(|&s| ctx.store.has(s))
}

pub fn build_finder_registry() -> Result<Vec<Box<dyn Finder>>> {
    let finders: Vec<Box<dyn Finder>> = vec![
        Box::new(super::file_finders::HighRiskHub),
        Box::new(super::file_finders::GodFile),
        Box::new(super::file_finders::UnstableFile),
        Box::new(super::file_finders::OrphanCode),
        Box::new(super::file_finders::HollowCode),
        Box::new(super::file_finders::PhantomImports),
        Box::new(super::file_finders::NamingDrift),
        Box::new(super::file_finders::BugAttractor),
        Box::new(super::file_finders::WeakLink),
        Box::new(super::file_finders::DeadDependency),
        Box::new(super::file_finders::ReviewBlindspot),
        Box::new(super::module_finders::KnowledgeSilo),
        Box::new(super::module_finders::ZoneOfPain),
        Box::new(super::module_finders::BoundaryMismatch),
        Box::new(super::module_finders::LayerViolation),
        Box::new(super::module_finders::ConwayViolation),
        Box::new(super::pair_finders::HiddenCoupling),
        Box::new(super::pair_finders::CopyPasteClone),
        Box::new(super::pair_finders::AccidentalCoupling),
        Box::new(super::global_finders::FlatArchitecture),
        Box::new(super::global_finders::ArchitectureErosion),
    ];
    for finder in &finders {
        for atom in finder.atoms() {
            validate_atom(&format!("{:?}", finder.id()), atom)?;
        }
    }
    Ok(finders)
}

/// Runs every available (tier-gated) finder in the registry and returns
/// every finding any of them produced.
pub fn run_all(registry: &[Box<dyn Finder>], ctx: &DetectionContext) -> Vec<Finding> {
    registry
        .iter()
        .filter(|f| is_available(f.as_ref(), ctx))
        .flat_map(|f| f.run(ctx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_builds_without_polarity_errors() {
        let registry = build_finder_registry().unwrap();
        assert_eq!(registry.len(), 21);
    }

    #[test]
    fn empty_store_produces_no_findings() {
        use crate::core::blackboard::FactStore;
        let store = FactStore::new();
        let ctx = DetectionContext::new(&store, Vec::new());
        let registry = build_finder_registry().unwrap();
        assert!(run_all(&registry, &ctx).is_empty());
    }
}
