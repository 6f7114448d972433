//! Entity identity: the 4-level hierarchy `Codebase > Module > File`, plus
//! `Author` (spec 3.1). Entities are immutable after construction;
//! `EntityId` is the universal handle used to key signals and relations.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Codebase,
    Module,
    File,
    Author,
}

/// `(EntityKind, key)` — the universal handle. Keys are root-relative paths
/// for `File`, directory names for `Module`, normalized lowercase emails for
/// `Author`, and the absolute root path for the single `Codebase` entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub EntityKind, pub String);

impl EntityId {
    pub fn codebase(root: impl Into<String>) -> Self {
        Self(EntityKind::Codebase, root.into())
    }

    pub fn module(name: impl Into<String>) -> Self {
        Self(EntityKind::Module, name.into())
    }

    pub fn file(path: impl Into<String>) -> Self {
        Self(EntityKind::File, path.into())
    }

    pub fn author(email: impl Into<String>) -> Self {
        Self(EntityKind::Author, email.into().to_lowercase())
    }

    pub fn kind(&self) -> EntityKind {
        self.0
    }

    pub fn key(&self) -> &str {
        &self.1
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}:{}", self.0, self.1)
    }
}

/// A constructed entity. `parent` is `None` only for the one `Codebase`
/// entity and for top-level files/modules directly under the codebase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub parent: Option<EntityId>,
}

impl Entity {
    pub fn new(id: EntityId, parent: Option<EntityId>) -> Self {
        Self { id, parent }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_key_is_lowercased() {
        let a = EntityId::author("Alice@Example.COM");
        assert_eq!(a.key(), "alice@example.com");
    }

    #[test]
    fn entity_ids_with_same_kind_and_key_are_equal() {
        assert_eq!(EntityId::file("src/lib.rs"), EntityId::file("src/lib.rs"));
        assert_ne!(EntityId::file("src/lib.rs"), EntityId::module("src"));
    }
}
