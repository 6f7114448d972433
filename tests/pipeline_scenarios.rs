//! End-to-end scenarios run through the public `Orchestrator` API, rather
//! than through any single signal or finder in isolation.

use std::fs;
use std::path::Path;

use shannon_insight::core::pipeline::{CommitSource, Orchestrator, RunMetadata};
use shannon_insight::{Config, FindingId};

struct NoHistory;
impl CommitSource for NoHistory {
    fn load(&self, _root: &Path) -> shannon_insight::Result<Vec<shannon_insight::core::temporal::Commit>> {
        Ok(Vec::new())
    }
}

/// S1: four plain files, no git history. Tier must be ABSOLUTE (no
/// composites-driven percentile findings), and the file nobody imports
/// must come back tagged ORPHAN_CODE.
#[test]
fn tiny_repo_with_no_history_lands_in_absolute_tier_and_flags_the_orphan() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.rs"), "fn main() { helper::run(); }\n").unwrap();
    fs::write(dir.path().join("helper.rs"), "pub fn run() {}\n").unwrap();
    fs::write(dir.path().join("util.rs"), "pub fn unused() {}\n").unwrap();
    fs::write(dir.path().join("lib.rs"), "mod helper;\nmod util;\n").unwrap();

    let orchestrator = Orchestrator::new(Config::default());
    let meta = RunMetadata { timestamp: 1_700_000_000, commit_sha: None };
    let result = orchestrator.run(dir.path(), Some(&NoHistory), None, meta).unwrap();

    assert_eq!(result.file_count, 4);
    assert_eq!(result.tier, "absolute");
    assert!(!result.truncated);
    let orphan_prefix = format!("{:?}:", FindingId::OrphanCode);
    assert!(
        result.findings.iter().any(|f| f.id.starts_with(&orphan_prefix)),
        "expected an OrphanCode finding among: {:?}",
        result.findings.iter().map(|f| &f.id).collect::<Vec<_>>()
    );
}

/// Codebase health and architecture health are always normalized scores,
/// never raw accumulator values, regardless of repo shape (spec 8.1).
#[test]
fn composite_health_scores_stay_within_unit_range() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..6 {
        fs::write(dir.path().join(format!("mod_{i}.rs")), format!("pub fn f_{i}() {{}}\n")).unwrap();
    }
    let orchestrator = Orchestrator::new(Config::default());
    let meta = RunMetadata { timestamp: 1_700_000_100, commit_sha: None };
    let result = orchestrator.run(dir.path(), Some(&NoHistory), None, meta).unwrap();

    assert!((0.0..=1.0).contains(&result.codebase_health));
    assert!((0.0..=1.0).contains(&result.architecture_health));
    assert!((0.0..=1.0).contains(&result.wiring_score));
}

/// A repository with no source files at all is an explicit error, never a
/// silently empty result (spec 7's EmptyRepository variant).
#[test]
fn repository_with_no_source_files_errors_instead_of_returning_empty() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = Orchestrator::new(Config::default());
    let meta = RunMetadata { timestamp: 0, commit_sha: None };
    let result = orchestrator.run(dir.path(), None, None, meta);
    assert!(result.is_err());
}

/// `fail_on` policy thresholds gate the process exit code, not the
/// analysis itself: a clean run always exits 0 regardless of policy.
#[test]
fn fail_on_any_does_not_fail_a_run_with_no_findings() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("only.rs"), "fn main() {}\n").unwrap();
    let orchestrator = Orchestrator::new(Config::default());
    let meta = RunMetadata { timestamp: 1_700_000_200, commit_sha: None };
    let result = orchestrator.run(dir.path(), Some(&NoHistory), None, meta).unwrap();
    if result.findings.is_empty() {
        assert_eq!(result.exit_code(Some(0.0)), 0);
    }
}
