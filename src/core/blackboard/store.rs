//! The FactStore: the blackboard (spec 4.1). A typed container for
//! entities, signal slots, and relations. Presence is first-class: a slot
//! is either populated, explicitly marked unavailable, or simply absent
//! (not yet computed); only the first two are ever observed by a well-
//! behaved deriver or finder.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::entities::{Entity, EntityId, EntityKind};
use super::relations::{RelationIndex, RelationKind, UnresolvedEdge};
use super::signals::SignalId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Enum(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Value::Enum(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Value::Enum(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
struct SignalSlot {
    values: HashMap<EntityId, Value>,
    unavailable: bool,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactStore {
    entities: Vec<Entity>,
    entity_index: HashSet<EntityId>,
    files: Vec<String>,
    modules: Vec<String>,
    authors: Vec<String>,
    slots: HashMap<SignalId, SignalSlot>,
    relations: HashMap<RelationKind, RelationIndex>,
    unresolved: Vec<UnresolvedEdge>,
    warnings: Vec<String>,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity. No-op (not an error) if already present, so
    /// collectors can call this idempotently.
    pub fn add_entity(&mut self, entity: Entity) {
        if self.entity_index.contains(&entity.id) {
            return;
        }
        match entity.id.kind() {
            EntityKind::File => self.files.push(entity.id.key().to_string()),
            EntityKind::Module => self.modules.push(entity.id.key().to_string()),
            EntityKind::Author => self.authors.push(entity.id.key().to_string()),
            EntityKind::Codebase => {}
        }
        self.entity_index.insert(entity.id.clone());
        self.entities.push(entity);
    }

    pub fn has_entity(&self, id: &EntityId) -> bool {
        self.entity_index.contains(id)
    }

    /// Ordered by insertion (i.e. discovery order during Collect), which is
    /// deterministic because the walker visits a sorted tree.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|s| s.as_str())
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|s| s.as_str())
    }

    pub fn authors(&self) -> impl Iterator<Item = &str> {
        self.authors.iter().map(|s| s.as_str())
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Overwrite allowed; warns (recorded, not panicked) if the new value
    /// differs from a prior one for the same slot.
    pub fn set(&mut self, entity: &EntityId, signal: SignalId, value: Value) {
        let slot = self.slots.entry(signal).or_default();
        if let Some(prev) = slot.values.get(entity) {
            if *prev != value {
                self.warnings.push(format!(
                    "overwriting {:?}@{} : {:?} -> {:?}",
                    signal, entity, prev, value
                ));
            }
        }
        slot.unavailable = false;
        slot.values.insert(entity.clone(), value);
    }

    pub fn get(&self, entity: &EntityId, signal: SignalId) -> Option<&Value> {
        self.slots.get(&signal).and_then(|slot| {
            if slot.unavailable {
                None
            } else {
                slot.values.get(entity)
            }
        })
    }

    pub fn get_f64(&self, entity: &EntityId, signal: SignalId) -> Option<f64> {
        self.get(entity, signal).and_then(Value::as_f64)
    }

    /// Coarse availability query: has at least one value been written for
    /// this signal anywhere, and has it not been globally marked
    /// unavailable? Used by derivers/finders to decide whether to run at
    /// all (tier gating), not whether one specific entity has a value.
    pub fn has(&self, signal: SignalId) -> bool {
        self.slots
            .get(&signal)
            .is_some_and(|slot| !slot.unavailable && !slot.values.is_empty())
    }

    pub fn has_value(&self, entity: &EntityId, signal: SignalId) -> bool {
        self.get(entity, signal).is_some()
    }

    /// Explicit negative assertion: a collector/deriver failed to produce
    /// this signal at all. Downstream consumers must treat this the same
    /// as absence, but it is recorded distinctly so a later stage does not
    /// mistake "not yet computed" for "will never be computed".
    pub fn mark_unavailable(&mut self, signal: SignalId) {
        let slot = self.slots.entry(signal).or_default();
        slot.unavailable = true;
        slot.values.clear();
    }

    pub fn relations_mut(&mut self, kind: RelationKind) -> &mut RelationIndex {
        self.relations.entry(kind).or_default()
    }

    pub fn outgoing(&self, entity: &EntityId, kind: RelationKind) -> Vec<&super::relations::Relation> {
        self.relations
            .get(&kind)
            .map(|idx| idx.outgoing(entity))
            .unwrap_or_default()
    }

    pub fn incoming(&self, entity: &EntityId, kind: RelationKind) -> Vec<&super::relations::Relation> {
        self.relations
            .get(&kind)
            .map(|idx| idx.incoming(entity))
            .unwrap_or_default()
    }

    pub fn relation_index(&self, kind: RelationKind) -> Option<&RelationIndex> {
        self.relations.get(&kind)
    }

    pub fn add_unresolved(&mut self, edge: UnresolvedEdge) {
        self.unresolved.push(edge);
    }

    pub fn unresolved(&self) -> &[UnresolvedEdge] {
        &self.unresolved
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Every signal with at least one populated (non-unavailable) value,
    /// for callers that need to walk the whole store (persistence).
    pub fn populated_signals(&self) -> impl Iterator<Item = SignalId> + '_ {
        self.slots.iter().filter(|(_, slot)| !slot.unavailable && !slot.values.is_empty()).map(|(&signal, _)| signal)
    }

    /// All `(entity, value)` pairs for `signal`, empty if unavailable or
    /// never written.
    pub fn signal_values(&self, signal: SignalId) -> impl Iterator<Item = (&EntityId, &Value)> {
        self.slots
            .get(&signal)
            .into_iter()
            .filter(|slot| !slot.unavailable)
            .flat_map(|slot| slot.values.iter())
    }
}
