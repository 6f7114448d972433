//! Blackboard: entities, the signal registry, relations, and the FactStore
//! that ties them together (spec 3, 4.1, 9).

pub mod entities;
pub mod relations;
pub mod signals;
pub mod store;

pub use entities::{Entity, EntityId, EntityKind};
pub use relations::{Relation, RelationIndex, RelationKind, UnresolvedEdge, UnresolvedKind};
pub use signals::{
    build_signal_registry, Dimension, Phase, Polarity, SignalId, SignalMeta, SignalRegistry,
    ValueType,
};
pub use store::{FactStore, Value};

// Back-compat aliases used by core::mod's re-export surface.
pub type Signal = SignalMeta;
