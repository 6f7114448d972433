//! Temporal analysis spine (spec 4.5, 6.3): everything derived from git
//! history rather than a single-tree parse. `analyze` is the seam where
//! this spine joins the structural one at the Model stage: it consumes a
//! `CommitStream` and writes churn, authorship, and intent signals plus
//! `CoChangesWith` relations straight into the shared `FactStore`.

pub mod authorship;
pub mod cache;
pub mod churn;
pub mod cochange;
pub mod commit;
#[cfg(feature = "temporal")]
pub mod git_driver;
pub mod intent;

use std::collections::HashMap;

use crate::core::blackboard::{EntityId, FactStore, RelationKind, SignalId, Value};



pub use authorship::{author_entropy, bus_factor};
pub use churn::{
    changes_per_window, classify_trajectory, coefficient_of_variation, ols_slope, Trajectory,
};
pub use cochange::CoChangeMatrix;
pub use commit::{normalize, Commit, CommitStream};
pub use intent::{fix_ratio, is_fix_commit, is_refactor_commit, refactor_ratio};

/// Minimum co-change lift for two files to be materialized as a
/// `CoChangesWith` relation; below this the pair is statistical noise.
const COCHANGE_LIFT_THRESHOLD: f64 = 2.0;
const COCHANGE_MIN_SUPPORT: usize = 3;

/// Runs the full temporal analysis over a normalized commit stream and
/// writes every file- and author-level signal (plus co-change relations)
/// into `store`. Files and authors that never appear in history are left
/// untouched (their slots stay unavailable, not zeroed).
pub fn analyze(store: &mut FactStore, commits: &[Commit]) {
    if commits.is_empty() {
        return;
    }
    let commits = normalize(commits.to_vec());
    let epoch = commits.first().map(|c| c.timestamp_unix).unwrap_or(0);

    let mut touches: HashMap<String, Vec<i64>> = HashMap::new();
    let mut commit_counts_by_author: HashMap<String, HashMap<String, usize>> = HashMap::new();
    let mut messages_by_file: HashMap<String, Vec<String>> = HashMap::new();

    for commit in &commits {
        for file in resolved_paths(&commit.files, &commit.renames) {
            touches.entry(file.clone()).or_default().push(commit.timestamp_unix);
            commit_counts_by_author
                .entry(file.clone())
                .or_default()
                .entry(commit.author_email.clone())
                .and_modify(|c| *c += 1)
                .or_insert(1);
            messages_by_file.entry(file).or_default().push(commit.message.clone());
        }
    }

    for (path, timestamps) in &touches {
        if !store.has_entity(&EntityId::file(path)) {
            continue;
        }
        let entity = EntityId::file(path);
        let series = changes_per_window(timestamps, epoch);
        let slope = ols_slope(&series);
        let cv = coefficient_of_variation(&series);
        let total: usize = timestamps.len();
        let trajectory = classify_trajectory(total, slope, cv);

        store.set(&entity, SignalId::TotalChanges, Value::Int(total as i64));
        store.set(&entity, SignalId::ChurnSlope, Value::Float(slope));
        store.set(&entity, SignalId::ChurnCv, Value::Float(cv));
        store.set(
            &entity,
            SignalId::ChurnTrajectory,
            Value::Enum(trajectory.to_string()),
        );

        if let Some(counts) = commit_counts_by_author.get(path) {
            let h = author_entropy(counts);
            store.set(&entity, SignalId::AuthorEntropy, Value::Float(h));
            store.set(&entity, SignalId::BusFactor, Value::Float(bus_factor(h)));
        }
        if let Some(messages) = messages_by_file.get(path) {
            let refs: Vec<&str> = messages.iter().map(|s| s.as_str()).collect();
            store.set(&entity, SignalId::FixRatio, Value::Float(fix_ratio(&refs)));
            store.set(&entity, SignalId::RefactorRatio, Value::Float(refactor_ratio(&refs)));
        }
    }

    materialize_cochange_relations(store, &commits);
}

/// Applies renames before attributing a commit's touches to a path, so a
/// file's history survives being moved (spec 4.5: rename-aware history).
fn resolved_paths(files: &[String], renames: &[(String, String)]) -> Vec<String> {
    if renames.is_empty() {
        return files.to_vec();
    }
    let mut remap: HashMap<&str, &str> = HashMap::new();
    for (old, new) in renames {
        remap.insert(old.as_str(), new.as_str());
    }
    files
        .iter()
        .map(|f| remap.get(f.as_str()).map(|s| s.to_string()).unwrap_or_else(|| f.clone()))
        .collect()
}

fn materialize_cochange_relations(store: &mut FactStore, commits: &[Commit]) {
    let matrix = CoChangeMatrix::build(commits);
    let files: Vec<String> = store.files().map(|s| s.to_string()).collect();
    for i in 0..files.len() {
        for j in (i + 1)..files.len() {
            let (a, b) = (&files[i], &files[j]);
            let support = *matrix
                .pair_commit_count
                .get(&if a <= b { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) })
                .unwrap_or(&0);
            if support < COCHANGE_MIN_SUPPORT {
                continue;
            }
            let lift = matrix.lift(a, b);
            if lift < COCHANGE_LIFT_THRESHOLD {
                continue;
            }
            store.relations_mut(RelationKind::CoChangesWith).add(
                EntityId::file(a),
                EntityId::file(b),
                RelationKind::CoChangesWith,
                lift,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::blackboard::Entity;

    fn commit(ts: i64, email: &str, files: &[&str], message: &str) -> Commit {
        Commit {
            sha: format!("{ts}"),
            author_email: email.to_string(),
            timestamp_unix: ts,
            message: message.to_string(),
            files: files.iter().map(|s| s.to_string()).collect(),
            renames: Vec::new(),
        }
    }

    #[test]
    fn analyze_populates_churn_signals_for_known_files() {
        let mut store = FactStore::new();
        store.add_entity(Entity::new(EntityId::file("a.rs"), None));
        let commits = vec![
            commit(0, "alice@x.com", &["a.rs"], "fix bug"),
            commit(100, "alice@x.com", &["a.rs"], "add feature"),
            commit(200, "bob@x.com", &["a.rs"], "refactor module"),
        ];
        analyze(&mut store, &commits);
        let entity = EntityId::file("a.rs");
        assert!(store.has_value(&entity, SignalId::TotalChanges));
        assert_eq!(
            store.get(&entity, SignalId::TotalChanges),
            Some(&Value::Int(3))
        );
        assert!(store.has_value(&entity, SignalId::FixRatio));
    }

    #[test]
    fn analyze_skips_files_not_in_the_store() {
        let mut store = FactStore::new();
        let commits = vec![commit(0, "a@x.com", &["untracked.rs"], "x")];
        analyze(&mut store, &commits);
        assert!(!store.has_entity(&EntityId::file("untracked.rs")));
    }

    #[test]
    fn empty_commit_stream_is_a_noop() {
        let mut store = FactStore::new();
        store.add_entity(Entity::new(EntityId::file("a.rs"), None));
        analyze(&mut store, &[]);
        assert!(!store.has_value(&EntityId::file("a.rs"), SignalId::TotalChanges));
    }

    #[test]
    fn renamed_file_touches_attribute_to_new_path() {
        let mut store = FactStore::new();
        store.add_entity(Entity::new(EntityId::file("new.rs"), None));
        let mut c = commit(0, "a@x.com", &["old.rs"], "x");
        c.renames.push(("old.rs".to_string(), "new.rs".to_string()));
        analyze(&mut store, &[c]);
        assert!(store.has_value(&EntityId::file("new.rs"), SignalId::TotalChanges));
    }
}
