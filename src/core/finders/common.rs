//! Shared atom-evaluation helper used by every concrete finder: a
//! condition is a conjunction of atoms, and confidence is the mean
//! margin over whichever atoms fired (spec 4.8).

use crate::core::blackboard::{EntityId, FactStore};

use super::types::{AtomSpec, TriggeredAtom};

/// Evaluates every atom against `entity`. Returns `None` if any required
/// signal is missing (graceful skip) or any atom fails to hold;
/// otherwise the triggered atoms plus the mean normalized margin.
pub fn evaluate_all(
    atoms: &[AtomSpec],
    store: &FactStore,
    entity: &EntityId,
) -> Option<(Vec<TriggeredAtom>, f64)> {
    let mut triggered = Vec::with_capacity(atoms.len());
    let mut margin_sum = 0.0;
    for atom in atoms {
        let actual = store.get_f64(entity, atom.signal)?;
        if !atom.holds(actual) {
            return None;
        }
        margin_sum += atom.margin(actual);
        triggered.push(TriggeredAtom { signal: atom.signal, threshold: atom.threshold, actual });
    }
    if triggered.is_empty() {
        return None;
    }
    Some((triggered, margin_sum / triggered.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::blackboard::{SignalId, Value};
    use crate::core::finders::types::AtomSpec;

    #[test]
    fn missing_signal_yields_none() {
        let store = FactStore::new();
        let atoms = [AtomSpec::gt(SignalId::RiskScore, 0.5)];
        assert!(evaluate_all(&atoms, &store, &EntityId::file("a.rs")).is_none());
    }

    #[test]
    fn all_atoms_must_hold() {
        let mut store = FactStore::new();
        let entity = EntityId::file("a.rs");
        store.set(&entity, SignalId::RiskScore, Value::Float(0.9));
        store.set(&entity, SignalId::StubRatio, Value::Float(0.1));
        let atoms = [
            AtomSpec::gt(SignalId::RiskScore, 0.5),
            AtomSpec::gt(SignalId::StubRatio, 0.5),
        ];
        assert!(evaluate_all(&atoms, &store, &entity).is_none());
    }
}
