//! The typed multigraph over entities (spec 3.3). Forward/reverse adjacency
//! indices are built once at the end of Collect and are read-only
//! thereafter, matching the concurrency model's "relation indices are
//! read-only after Collect" guarantee.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::entities::EntityId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RelationKind {
    Imports,
    CoChangesWith,
    AuthoredBy,
    InModule,
    DependsOn,
    Calls,
    TypeFlow,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Relation {
    pub from: EntityId,
    pub to: EntityId,
    pub kind: RelationKind,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UnresolvedKind {
    PhantomImport,
    BrokenCall,
}

/// A reference that appeared project-internal but failed to resolve.
/// External-package imports never produce one of these; they are filtered
/// before reaching the relation graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnresolvedEdge {
    pub source: EntityId,
    pub target_ref: String,
    pub kind: UnresolvedKind,
    pub context: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelationIndex {
    edges: Vec<Relation>,
    forward: HashMap<EntityId, Vec<usize>>,
    reverse: HashMap<EntityId, Vec<usize>>,
}

impl RelationIndex {
    /// Adds an edge, collapsing duplicates between the same `(from, to)`
    /// pair of the same kind by summing weights (spec 3.3 invariant).
    /// Self-loops are rejected silently (invariant: no self-loops).
    pub fn add(&mut self, from: EntityId, to: EntityId, kind: RelationKind, weight: f64) {
        if from == to {
            return;
        }
        if let Some(existing_idx) = self.forward.get(&from).and_then(|idxs| {
            idxs.iter()
                .copied()
                .find(|&i| self.edges[i].to == to && self.edges[i].kind == kind)
        }) {
            self.edges[existing_idx].weight += weight;
            return;
        }
        let idx = self.edges.len();
        self.edges.push(Relation {
            from: from.clone(),
            to: to.clone(),
            kind,
            weight,
        });
        self.forward.entry(from).or_default().push(idx);
        self.reverse.entry(to).or_default().push(idx);
    }

    pub fn outgoing(&self, entity: &EntityId) -> Vec<&Relation> {
        self.forward
            .get(entity)
            .map(|idxs| idxs.iter().map(|&i| &self.edges[i]).collect())
            .unwrap_or_default()
    }

    pub fn incoming(&self, entity: &EntityId) -> Vec<&Relation> {
        self.reverse
            .get(entity)
            .map(|idxs| idxs.iter().map(|&i| &self.edges[i]).collect())
            .unwrap_or_default()
    }

    pub fn all(&self) -> &[Relation] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_edges_of_same_kind_sum_weight() {
        let mut idx = RelationIndex::default();
        let a = EntityId::file("a.rs");
        let b = EntityId::file("b.rs");
        idx.add(a.clone(), b.clone(), RelationKind::Imports, 2.0);
        idx.add(a.clone(), b.clone(), RelationKind::Imports, 3.0);
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.outgoing(&a)[0].weight, 5.0);
    }

    #[test]
    fn self_loops_are_rejected() {
        let mut idx = RelationIndex::default();
        let a = EntityId::file("a.rs");
        idx.add(a.clone(), a.clone(), RelationKind::Imports, 1.0);
        assert!(idx.is_empty());
    }

    #[test]
    fn incoming_and_outgoing_are_consistent() {
        let mut idx = RelationIndex::default();
        let a = EntityId::file("a.rs");
        let b = EntityId::file("b.rs");
        idx.add(a.clone(), b.clone(), RelationKind::Imports, 1.0);
        assert_eq!(idx.outgoing(&a).len(), 1);
        assert_eq!(idx.incoming(&b).len(), 1);
        assert!(idx.incoming(&a).is_empty());
    }
}
