//! Shared read-only context every finder receives (spec 4.8): the fact
//! store plus the auxiliary data finders need but that isn't itself a
//! per-entity signal (the hotspot threshold, clone pairs, team size).

use std::collections::HashMap;

use crate::core::blackboard::{EntityId, FactStore, SignalId};

pub struct DetectionContext<'a> {
    pub store: &'a FactStore,
    /// Median `total_changes` across non-test files; hotspot-filtered
    /// finders require a target to exceed this before firing.
    pub hotspot_median: f64,
    /// `(file_a, file_b, similarity)` from the information layer's NCD
    /// clone search, not stored as a per-entity signal.
    pub clone_pairs: Vec<(String, String, f64)>,
    pub team_size: usize,
    /// `Δh` per file (spec 4.7), computed by fusion over pre-percentile
    /// raw risk; not itself a registry signal.
    pub health_laplacian: HashMap<String, f64>,
}

impl<'a> DetectionContext<'a> {
    pub fn new(store: &'a FactStore, clone_pairs: Vec<(String, String, f64)>) -> Self {
        Self::with_health_laplacian(store, clone_pairs, HashMap::new())
    }

    pub fn with_health_laplacian(
        store: &'a FactStore,
        clone_pairs: Vec<(String, String, f64)>,
        health_laplacian: HashMap<String, f64>,
    ) -> Self {
        let mut changes: Vec<f64> = store
            .files()
            .filter_map(|f| store.get_f64(&EntityId::file(f), SignalId::TotalChanges))
            .collect();
        changes.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let hotspot_median = if changes.is_empty() {
            0.0
        } else {
            changes[changes.len() / 2]
        };
        let team_size = store.authors().count();
        Self { store, hotspot_median, clone_pairs, team_size, health_laplacian }
    }

    pub fn is_hotspot(&self, entity: &EntityId) -> bool {
        self.store
            .get_f64(entity, SignalId::TotalChanges)
            .map(|c| c > self.hotspot_median)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::blackboard::{Entity, Value};

    #[test]
    fn hotspot_median_is_computed_from_total_changes() {
        let mut store = FactStore::new();
        for (f, c) in [("a.rs", 1), ("b.rs", 5), ("c.rs", 10)] {
            store.add_entity(Entity::new(EntityId::file(f), None));
            store.set(&EntityId::file(f), SignalId::TotalChanges, Value::Int(c));
        }
        let ctx = DetectionContext::new(&store, Vec::new());
        assert_eq!(ctx.hotspot_median, 5.0);
        assert!(ctx.is_hotspot(&EntityId::file("c.rs")));
        assert!(!ctx.is_hotspot(&EntityId::file("a.rs")));
    }
}
