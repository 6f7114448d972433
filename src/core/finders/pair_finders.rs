//! File-pair-scope finders (spec 4.8).

use crate::core::blackboard::{EntityId, RelationKind, SignalId};

use super::context::DetectionContext;
use super::registry::Finder;
use super::types::{AtomSpec, Finding, FindingId, Scope};

/// Hidden Coupling (spec S5): files that co-change with high lift but
/// share no declared IMPORTS edge in either direction.
pub struct HiddenCoupling;
impl Finder for HiddenCoupling {
    fn id(&self) -> FindingId {
        FindingId::HiddenCoupling
    }
    fn scope(&self) -> Scope {
        Scope::FilePair
    }
    fn requires(&self) -> &'static [SignalId] {
        &[]
    }
    fn base_severity(&self) -> f64 {
        0.9
    }
    fn atoms(&self) -> &'static [AtomSpec] {
        &[]
    }
    fn run(&self, ctx: &DetectionContext) -> Vec<Finding> {
        let imports = match ctx.store.relation_index(RelationKind::Imports) {
            Some(idx) => idx,
            None => return vec![],
        };
        let cochange = match ctx.store.relation_index(RelationKind::CoChangesWith) {
            Some(idx) => idx,
            None => return vec![],
        };
        cochange
            .all()
            .iter()
            .filter(|rel| {
                !imports.outgoing(&rel.from).iter().any(|e| e.to == rel.to)
                    && !imports.outgoing(&rel.to).iter().any(|e| e.to == rel.from)
            })
            .map(|rel| Finding {
                kind: self.id(),
                scope: self.scope(),
                targets: vec![rel.from.clone(), rel.to.clone()],
                severity: self.base_severity(),
                confidence: 0.5,
                rationale: format!(
                    "{} and {} co-change frequently (lift {:.2}) with no import relationship",
                    rel.from.key(),
                    rel.to.key(),
                    rel.weight
                ),
                evidence: vec![],
            })
            .collect()
    }
}

/// Copy-Paste Clone: near-duplicate files surfaced by the information
/// layer's NCD/MinHash search, not by a FactStore signal.
pub struct CopyPasteClone;
impl Finder for CopyPasteClone {
    fn id(&self) -> FindingId {
        FindingId::CopyPasteClone
    }
    fn scope(&self) -> Scope {
        Scope::FilePair
    }
    fn requires(&self) -> &'static [SignalId] {
        &[]
    }
    fn base_severity(&self) -> f64 {
        0.6
    }
    fn atoms(&self) -> &'static [AtomSpec] {
        &[]
    }
    fn run(&self, ctx: &DetectionContext) -> Vec<Finding> {
        const SIMILARITY_THRESHOLD: f64 = 0.85;
        ctx.clone_pairs
            .iter()
            .filter(|(_, _, similarity)| *similarity > SIMILARITY_THRESHOLD)
            .map(|(a, b, similarity)| Finding {
                kind: self.id(),
                scope: self.scope(),
                targets: vec![EntityId::file(a), EntityId::file(b)],
                severity: self.base_severity(),
                confidence: ((similarity - SIMILARITY_THRESHOLD) / (1.0 - SIMILARITY_THRESHOLD).max(1e-9))
                    .clamp(0.0, 1.0),
                rationale: format!("{a} and {b} are near-duplicates ({similarity:.2} similarity)"),
                evidence: vec![],
            })
            .collect()
    }
}

/// Accidental Coupling: files that share an IMPORTS edge across module
/// boundaries with no corresponding module-level dependency, i.e. a
/// one-off leak rather than an intentional architectural link.
pub struct AccidentalCoupling;
impl Finder for AccidentalCoupling {
    fn id(&self) -> FindingId {
        FindingId::AccidentalCoupling
    }
    fn scope(&self) -> Scope {
        Scope::FilePair
    }
    fn requires(&self) -> &'static [SignalId] {
        &[]
    }
    fn base_severity(&self) -> f64 {
        0.4
    }
    fn atoms(&self) -> &'static [AtomSpec] {
        &[]
    }
    fn run(&self, ctx: &DetectionContext) -> Vec<Finding> {
        let imports = match ctx.store.relation_index(RelationKind::Imports) {
            Some(idx) => idx,
            None => return vec![],
        };
        let in_module = match ctx.store.relation_index(RelationKind::InModule) {
            Some(idx) => idx,
            None => return vec![],
        };
        let module_of = |file: &EntityId| in_module.outgoing(file).first().map(|r| r.to.clone());
        let depends_on = match ctx.store.relation_index(RelationKind::DependsOn) {
            Some(idx) => idx,
            None => return vec![],
        };
        imports
            .all()
            .iter()
            .filter_map(|rel| {
                let source_module = module_of(&rel.from)?;
                let target_module = module_of(&rel.to)?;
                if source_module == target_module {
                    return None;
                }
                let declared = depends_on.outgoing(&source_module).iter().any(|d| d.to == target_module);
                if declared {
                    return None;
                }
                Some(Finding {
                    kind: self.id(),
                    scope: self.scope(),
                    targets: vec![rel.from.clone(), rel.to.clone()],
                    severity: self.base_severity(),
                    confidence: 0.4,
                    rationale: format!(
                        "{} imports {} across an undeclared module boundary",
                        rel.from.key(),
                        rel.to.key()
                    ),
                    evidence: vec![],
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::blackboard::{Entity, FactStore, RelationKind};

    #[test]
    fn hidden_coupling_fires_when_no_import_edge_exists() {
        let mut store = FactStore::new();
        let a = EntityId::file("a.rs");
        let b = EntityId::file("b.rs");
        store.add_entity(Entity::new(a.clone(), None));
        store.add_entity(Entity::new(b.clone(), None));
        store.relations_mut(RelationKind::CoChangesWith).add(a.clone(), b.clone(), RelationKind::CoChangesWith, 6.25);
        let ctx = DetectionContext::new(&store, Vec::new());
        let findings = HiddenCoupling.run(&ctx);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn hidden_coupling_skips_when_import_edge_exists() {
        let mut store = FactStore::new();
        let a = EntityId::file("a.rs");
        let b = EntityId::file("b.rs");
        store.add_entity(Entity::new(a.clone(), None));
        store.add_entity(Entity::new(b.clone(), None));
        store.relations_mut(RelationKind::Imports).add(a.clone(), b.clone(), RelationKind::Imports, 1.0);
        store.relations_mut(RelationKind::CoChangesWith).add(a.clone(), b.clone(), RelationKind::CoChangesWith, 6.25);
        let ctx = DetectionContext::new(&store, Vec::new());
        assert!(HiddenCoupling.run(&ctx).is_empty());
    }

    #[test]
    fn copy_paste_clone_fires_above_similarity_threshold() {
        let store = FactStore::new();
        let ctx = DetectionContext::new(&store, vec![("a.rs".to_string(), "b.rs".to_string(), 0.95)]);
        assert_eq!(CopyPasteClone.run(&ctx).len(), 1);
    }
}
