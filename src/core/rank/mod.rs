//! Rank (spec 4.9): turns raw findings into a sorted, deduplicated,
//! chronic-amplified result list.

use std::collections::HashMap;

use crate::core::blackboard::{EntityId, EntityKind, FactStore, RelationKind, SignalId};
use crate::core::finders::{Finding, Scope};
use crate::core::fusion::tier::{percentile, Tier};

/// `score(F) = severity * confidence * impact` (spec 4.9).
pub fn score(finding: &Finding, store: &FactStore, tier: Tier) -> f64 {
    finding.severity * finding.confidence * impact(finding, store, tier)
}

fn impact(finding: &Finding, store: &FactStore, tier: Tier) -> f64 {
    match finding.scope {
        Scope::File => finding.targets.first().map(|t| pagerank_pctl(store, tier, t)).unwrap_or(0.0),
        Scope::FilePair => finding
            .targets
            .iter()
            .map(|t| pagerank_pctl(store, tier, t))
            .fold(0.0_f64, f64::max),
        Scope::Module => finding
            .targets
            .first()
            .map(|m| mean_member_pagerank_pctl(store, tier, m))
            .unwrap_or(0.0),
        Scope::ModulePair => {
            let values: Vec<f64> = finding
                .targets
                .iter()
                .flat_map(|m| member_file_entities(store, m))
                .map(|f| pagerank_pctl(store, tier, &f))
                .collect();
            if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            }
        }
        Scope::Codebase => 1.0,
    }
}

fn all_pagerank_values(store: &FactStore) -> Vec<f64> {
    store.files().filter_map(|f| store.get_f64(&EntityId::file(f), SignalId::PageRank)).collect()
}

fn pagerank_pctl(store: &FactStore, tier: Tier, entity: &EntityId) -> f64 {
    if entity.kind() != EntityKind::File {
        return 0.0;
    }
    let actual = match store.get_f64(entity, SignalId::PageRank) {
        Some(v) => v,
        None => return 0.0,
    };
    let values = all_pagerank_values(store);
    percentile(tier, &values, actual)
}

fn member_file_entities(store: &FactStore, module: &EntityId) -> Vec<EntityId> {
    store.incoming(module, RelationKind::InModule).into_iter().map(|r| r.from.clone()).collect()
}

fn mean_member_pagerank_pctl(store: &FactStore, tier: Tier, module: &EntityId) -> f64 {
    let members = member_file_entities(store, module);
    if members.is_empty() {
        return 0.0;
    }
    let sum: f64 = members.iter().map(|f| pagerank_pctl(store, tier, f)).sum();
    sum / members.len() as f64
}

const CHRONIC_MULTIPLIER: f64 = 1.25;
const CHRONIC_MIN_PERSISTENCE: usize = 3;

/// Amplifies the severity of findings that have persisted across at
/// least `CHRONIC_MIN_PERSISTENCE` prior snapshots (spec 4.9, DN open
/// question 1): `severity *= 1.25`, clamped to 1.0. Lookup is keyed by
/// [`Finding::identity_key`], independent of how persistence stores its
/// lifecycle rows.
pub fn apply_chronic_amplification(findings: &mut [Finding], persistence_counts: &HashMap<String, usize>) {
    for finding in findings.iter_mut() {
        let count = persistence_counts.get(&finding.identity_key()).copied().unwrap_or(0);
        if count >= CHRONIC_MIN_PERSISTENCE {
            finding.severity = (finding.severity * CHRONIC_MULTIPLIER).min(1.0);
        }
    }
}

/// Sorts by score descending and deduplicates by identity key, keeping
/// whichever duplicate has the higher severity (spec 4.9).
pub fn rank(mut findings: Vec<Finding>, store: &FactStore, tier: Tier) -> Vec<Finding> {
    let mut best: HashMap<String, Finding> = HashMap::new();
    for finding in findings.drain(..) {
        let key = finding.identity_key();
        match best.get(&key) {
            Some(existing) if existing.severity >= finding.severity => {}
            _ => {
                best.insert(key, finding);
            }
        }
    }
    let mut deduped: Vec<Finding> = best.into_values().collect();
    deduped.sort_by(|a, b| {
        score(b, store, tier)
            .partial_cmp(&score(a, store, tier))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| format!("{:?}", a.kind).cmp(&format!("{:?}", b.kind)))
    });
    deduped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::blackboard::{Entity, Value};
    use crate::core::finders::FindingId;

    fn file_finding(kind: FindingId, target: &str, severity: f64, confidence: f64) -> Finding {
        Finding {
            kind,
            scope: Scope::File,
            targets: vec![EntityId::file(target)],
            severity,
            confidence,
            rationale: String::new(),
            evidence: vec![],
        }
    }

    #[test]
    fn dedup_keeps_highest_severity() {
        let store = FactStore::new();
        let findings = vec![
            file_finding(FindingId::GodFile, "a.rs", 0.5, 0.5),
            file_finding(FindingId::GodFile, "a.rs", 0.9, 0.5),
        ];
        let ranked = rank(findings, &store, Tier::Absolute);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].severity, 0.9);
    }

    #[test]
    fn chronic_amplification_caps_at_one() {
        let mut findings = vec![file_finding(FindingId::GodFile, "a.rs", 0.9, 0.5)];
        let mut counts = HashMap::new();
        counts.insert(findings[0].identity_key(), 5);
        apply_chronic_amplification(&mut findings, &counts);
        assert!((findings[0].severity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn chronic_amplification_skips_below_threshold() {
        let mut findings = vec![file_finding(FindingId::GodFile, "a.rs", 0.5, 0.5)];
        let counts = HashMap::new();
        apply_chronic_amplification(&mut findings, &counts);
        assert_eq!(findings[0].severity, 0.5);
    }

    #[test]
    fn codebase_scope_has_full_impact() {
        let mut store = FactStore::new();
        let codebase = EntityId::codebase("");
        store.add_entity(Entity::new(codebase.clone(), None));
        let finding = Finding {
            kind: FindingId::FlatArchitecture,
            scope: Scope::Codebase,
            targets: vec![codebase],
            severity: 0.5,
            confidence: 1.0,
            rationale: String::new(),
            evidence: vec![],
        };
        assert_eq!(score(&finding, &store, Tier::Absolute), 0.5);
    }

    #[test]
    fn file_pair_impact_uses_max_of_both_percentiles() {
        let mut store = FactStore::new();
        for (f, pr) in [("a.rs", 0.1), ("b.rs", 0.9)] {
            let e = EntityId::file(f);
            store.add_entity(Entity::new(e.clone(), None));
            store.set(&e, SignalId::PageRank, Value::Float(pr));
        }
        let finding = Finding {
            kind: FindingId::HiddenCoupling,
            scope: Scope::FilePair,
            targets: vec![EntityId::file("a.rs"), EntityId::file("b.rs")],
            severity: 0.9,
            confidence: 0.5,
            rationale: String::new(),
            evidence: vec![],
        };
        let impact = impact(&finding, &store, Tier::Full);
        assert!(impact > 0.5);
    }
}
