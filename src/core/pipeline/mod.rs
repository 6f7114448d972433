//! The seven-stage orchestrator (spec 5, 6.5, 6.6): Initialize -> Collect
//! -> Model -> Derive -> Detect -> Rank -> Output. Structural collection and
//! temporal history are independent spines that join at Model (see
//! [`Orchestrator::run`] for why that join happens on one thread rather
//! than via `std::thread::scope`); cancellation and stage budgets are
//! cooperative, checked at stage boundaries rather than inside any single
//! algorithm.

pub mod derive;
pub mod model;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::core::architecture;
use crate::core::blackboard::{EntityId, FactStore, SignalId, SignalRegistry};
use crate::core::collectors::{DefaultWalker, FileWalker, HeuristicParser, Parser, PathResolver};
use crate::core::config::Config;
use crate::core::error::{InsightError, Result};
use crate::core::finders::{self, DetectionContext, FindingId, TriggeredAtom};
use crate::core::fusion;
use crate::core::fusion::tier::{tier_for, Tier};
use crate::core::graph::BetweennessConfig;
use crate::core::persistence::{diff_findings, SignalDiff, SnapshotMeta, SnapshotStore};
use crate::core::rank;
use crate::core::temporal::Commit;

/// One atom that fired, for the output `Finding.evidence` field (spec 6.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub signal: String,
    pub threshold: f64,
    pub actual: f64,
}

/// Output finding DTO (spec 6.5): distinct from [`crate::core::finders::Finding`],
/// which is the internal, store-referencing representation ranking operates on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    pub name: String,
    pub scope: String,
    pub target: String,
    pub severity: f64,
    pub confidence: f64,
    pub score: f64,
    pub evidence: Vec<Evidence>,
    pub rationale: String,
    pub remediation: String,
}

/// Top-level analysis output (spec 6.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub root: PathBuf,
    pub timestamp: i64,
    pub commit_sha: Option<String>,
    pub tier: String,
    pub file_count: usize,
    pub module_count: usize,
    pub codebase_health: f64,
    pub architecture_health: f64,
    pub wiring_score: f64,
    pub findings: Vec<Finding>,
    pub snapshot_id: Option<String>,
    /// Set when a stage budget expired and the run returned a partial
    /// result rather than erroring (spec 7: "cancellation yields a
    /// truncated result, never an error").
    pub truncated: bool,
}

impl AnalysisResult {
    /// Exit code contract (spec 6.6): 1 if any finding meets or exceeds
    /// `fail_on`'s threshold, 0 otherwise. Analysis errors are reported via
    /// `Result::Err` before an `AnalysisResult` ever exists, so this never
    /// returns the `2` case itself; callers map the `Err` path to `2`.
    pub fn exit_code(&self, fail_on_threshold: Option<f64>) -> i32 {
        match fail_on_threshold {
            None => 0,
            Some(threshold) => {
                if self.findings.iter().any(|f| f.severity >= threshold) {
                    1
                } else {
                    0
                }
            }
        }
    }
}

/// Where the Orchestrator sources commit history from. Analysis over a
/// plain source tree with no history simply passes `None`.
pub trait CommitSource {
    fn load(&self, root: &Path) -> Result<Vec<Commit>>;
}

/// Any `CommitStream` (e.g. `temporal::git_driver::GitCommitStream`) is
/// already bound to its own root when constructed, so it can source the
/// Orchestrator directly; `root` here is ignored.
impl<T: crate::core::temporal::CommitStream> CommitSource for T {
    fn load(&self, _root: &Path) -> Result<Vec<Commit>> {
        self.commits()
    }
}

/// Timestamp source, since `pipeline` (like the rest of the engine) never
/// calls `SystemTime::now()` internally: callers stamp results so the core
/// stays a pure function of its inputs.
pub struct RunMetadata {
    pub timestamp: i64,
    pub commit_sha: Option<String>,
}

pub struct Orchestrator {
    config: Config,
    walker: Box<dyn FileWalker>,
    parser: Box<dyn Parser>,
    betweenness_config: BetweennessConfig,
    cancelled: Arc<AtomicBool>,
}

impl Orchestrator {
    pub fn new(config: Config) -> Self {
        let betweenness_config = BetweennessConfig {
            sampling_threshold: config.thresholds.betweenness_sampling_threshold,
            sample_k: config.thresholds.betweenness_sample_k,
        };
        Self {
            config,
            walker: Box::new(DefaultWalker::new()),
            parser: Box::new(HeuristicParser::new()),
            betweenness_config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_walker(mut self, walker: Box<dyn FileWalker>) -> Self {
        self.walker = walker;
        self
    }

    pub fn with_parser(mut self, parser: Box<dyn Parser>) -> Self {
        self.parser = parser;
        self
    }

    /// A handle the caller can flip from another thread to cooperatively
    /// cancel a running analysis (spec 5: cancellation is checked at stage
    /// boundaries, never mid-algorithm).
    pub fn cancellation_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Runs the full seven-stage pipeline. `commit_source` is `None` for a
    /// plain source tree with no git history (spec 7, case 4: temporal
    /// spine skipped, D6/D7/D8 signals left unavailable).
    pub fn run(
        &self,
        root: &Path,
        commit_source: Option<&dyn CommitSource>,
        snapshots: Option<&SnapshotStore>,
        meta: RunMetadata,
    ) -> Result<AnalysisResult> {
        // -- Initialize --
        self.config.validate()?;
        if !root.is_dir() {
            return Err(InsightError::InvalidRoot { path: root.to_path_buf() });
        }

        // -- Collect --
        let collect_started = Instant::now();
        let paths = self.walker.walk(root, &self.config.ignore)?;
        if paths.is_empty() {
            return Err(InsightError::EmptyRepository { path: root.to_path_buf() });
        }
        let collect_budget_ms =
            self.config.budgets.collect_per_10k_files_ms * (paths.len() as u64 / 10_000).max(1);

        let mut store = FactStore::new();
        let known: HashSet<String> = paths.iter().cloned().collect();
        let resolver = PathResolver::new(&known);

        // -- Model --
        // Structural and temporal collection are logically independent
        // spines that join here. They run on the calling thread one after
        // the other rather than via `std::thread::scope`: the reference
        // `CommitSource` (`temporal::git_driver::GitCommitStream`) wraps a
        // `git2::Repository`, which is `Send` but not `Sync`, so a
        // `&dyn CommitSource` borrowed into a spawned closure cannot be
        // required `Send` without also requiring every implementation be
        // `Sync` - a bound the reference implementation cannot meet.
        let ingested_files = model::ingest(&mut store, root, &paths, self.parser.as_ref(), &resolver)?;
        let commits = match commit_source {
            Some(source) => source.load(root).unwrap_or_default(),
            None => Vec::new(),
        };

        if elapsed_exceeds(collect_started, collect_budget_ms) || self.is_cancelled() {
            return Ok(self.truncated_result(root, &meta, &store, &paths));
        }

        // -- Derive --
        let derive_started = Instant::now();
        derive::annotate_graph_signals(&mut store, &paths, &self.betweenness_config);
        let clone_pairs = derive::annotate_information_signals(&mut store, &ingested_files);
        architecture::analyze(&mut store);
        if !commits.is_empty() {
            crate::core::temporal::analyze(&mut store, &commits);
        }
        architecture::annotate_module_aggregates(&mut store, &commits);
        fusion::analyze(&mut store, &self.config);

        if elapsed_exceeds(derive_started, self.config.budgets.derive_ms) || self.is_cancelled() {
            return Ok(self.truncated_result(root, &meta, &store, &paths));
        }

        // -- Detect --
        let detect_started = Instant::now();
        let registry = finders::build_finder_registry()?;
        let health_laplacian = health_laplacian_map(&store);
        let ctx = DetectionContext::with_health_laplacian(&store, clone_pairs, health_laplacian);
        let mut raw_findings = finders::run_all(&registry, &ctx);

        if elapsed_exceeds(detect_started, self.config.budgets.detect_ms) || self.is_cancelled() {
            return Ok(self.truncated_result(root, &meta, &store, &paths));
        }

        // -- Rank --
        let tier = tier_for(paths.len(), &self.config.tiers);
        let previous_counts = snapshots
            .map(|s| load_persistence_counts(s, meta.timestamp))
            .transpose()?
            .unwrap_or_default();
        rank::apply_chronic_amplification(&mut raw_findings, &previous_counts);
        let ranked = rank::rank(raw_findings, &store, tier);

        // -- Output --
        let module_count = store.modules().count();
        let codebase_health = store.get_f64(&EntityId::codebase(""), SignalId::CodebaseHealth).unwrap_or(0.0);
        let architecture_health =
            store.get_f64(&EntityId::codebase(""), SignalId::ArchitectureHealth).unwrap_or(0.0);
        let wiring_score = store.get_f64(&EntityId::codebase(""), SignalId::WiringScore).unwrap_or(0.0);

        let findings: Vec<Finding> =
            ranked.iter().map(|f| to_output_finding(f, &store, tier)).collect();

        let snapshot_id = match snapshots {
            Some(store_handle) => Some(self.persist_snapshot(
                store_handle,
                &store,
                &meta,
                &paths,
                &findings,
                codebase_health,
            )?),
            None => None,
        };

        Ok(AnalysisResult {
            root: root.to_path_buf(),
            timestamp: meta.timestamp,
            commit_sha: meta.commit_sha,
            tier: format!("{tier:?}").to_lowercase(),
            file_count: paths.len(),
            module_count,
            codebase_health,
            architecture_health,
            wiring_score,
            findings,
            snapshot_id,
            truncated: false,
        })
    }

    fn truncated_result(
        &self,
        root: &Path,
        meta: &RunMetadata,
        store: &FactStore,
        paths: &[String],
    ) -> AnalysisResult {
        let tier = tier_for(paths.len(), &self.config.tiers);
        AnalysisResult {
            root: root.to_path_buf(),
            timestamp: meta.timestamp,
            commit_sha: meta.commit_sha.clone(),
            tier: format!("{tier:?}").to_lowercase(),
            file_count: paths.len(),
            module_count: store.modules().count(),
            codebase_health: store.get_f64(&EntityId::codebase(""), SignalId::CodebaseHealth).unwrap_or(0.0),
            architecture_health: store
                .get_f64(&EntityId::codebase(""), SignalId::ArchitectureHealth)
                .unwrap_or(0.0),
            wiring_score: store.get_f64(&EntityId::codebase(""), SignalId::WiringScore).unwrap_or(0.0),
            findings: Vec::new(),
            snapshot_id: None,
            truncated: true,
        }
    }

    fn persist_snapshot(
        &self,
        snapshots: &SnapshotStore,
        store: &FactStore,
        meta: &RunMetadata,
        paths: &[String],
        findings: &[Finding],
        codebase_health: f64,
    ) -> Result<String> {
        let snapshot_id = format!("{}", meta.timestamp);
        let snapshot_meta = SnapshotMeta {
            id: snapshot_id.clone(),
            timestamp: meta.timestamp,
            commit_sha: meta.commit_sha.clone(),
            file_count: paths.len(),
            finding_count: findings.len(),
            health: codebase_health,
        };
        // Resolved against the snapshot immediately preceding this run, since
        // that's the only finding-id set the embedded store exposes cheaply;
        // a finding resolved two or more runs ago reads as `New` on return
        // rather than `Regression` (documented open-question resolution).
        let previous_counts = load_persistence_counts(snapshots, meta.timestamp)?;
        let previous_open: HashSet<String> = previous_counts.keys().cloned().collect();

        snapshots.save_snapshot(&snapshot_meta, store)?;

        let current_ids: HashSet<String> = findings.iter().map(|f| f.id.clone()).collect();
        let statuses = diff_findings(&previous_open, &previous_open, &current_ids);
        snapshots.record_finding_lifecycle(&snapshot_id, &statuses, &previous_counts)?;
        Ok(snapshot_id)
    }
}

fn elapsed_exceeds(started: Instant, budget_ms: u64) -> bool {
    started.elapsed().as_millis() as u64 > budget_ms
}

fn health_laplacian_map(store: &FactStore) -> HashMap<String, f64> {
    store
        .files()
        .filter_map(|f| store.get_f64(&EntityId::file(f), SignalId::RiskScore).map(|v| (f.to_string(), v)))
        .collect()
}

fn load_persistence_counts(snapshots: &SnapshotStore, timestamp: i64) -> Result<HashMap<String, usize>> {
    let ids = snapshots.list_snapshot_ids()?;
    match ids.iter().filter(|id| id.parse::<i64>().map(|t| t < timestamp).unwrap_or(false)).last() {
        Some(id) => snapshots.persistence_counts(id),
        None => Ok(HashMap::new()),
    }
}

fn to_output_finding(finding: &finders::Finding, store: &FactStore, tier: Tier) -> Finding {
    let target = finding.targets.iter().map(|t| t.key()).collect::<Vec<_>>().join(" <-> ");
    let evidence = finding
        .evidence
        .iter()
        .map(|a: &TriggeredAtom| Evidence {
            signal: SignalRegistry::meta(a.signal).name.to_string(),
            threshold: a.threshold,
            actual: a.actual,
        })
        .collect();
    Finding {
        id: finding.identity_key(),
        name: display_name(finding.kind).to_string(),
        scope: format!("{:?}", finding.scope).to_lowercase(),
        target,
        severity: finding.severity,
        confidence: finding.confidence,
        score: rank::score(finding, store, tier),
        evidence,
        rationale: finding.rationale.clone(),
        remediation: remediation_for(finding.kind).to_string(),
    }
}

fn display_name(kind: FindingId) -> &'static str {
    match kind {
        FindingId::HighRiskHub => "High-risk hub",
        FindingId::HiddenCoupling => "Hidden coupling",
        FindingId::GodFile => "God file",
        FindingId::UnstableFile => "Unstable file",
        FindingId::BoundaryMismatch => "Boundary mismatch",
        FindingId::DeadDependency => "Dead dependency",
        FindingId::ChronicProblem => "Chronic problem",
        FindingId::OrphanCode => "Orphan code",
        FindingId::HollowCode => "Hollow code",
        FindingId::PhantomImports => "Phantom imports",
        FindingId::CopyPasteClone => "Copy-paste clone",
        FindingId::FlatArchitecture => "Flat architecture",
        FindingId::NamingDrift => "Naming drift",
        FindingId::KnowledgeSilo => "Knowledge silo",
        FindingId::ConwayViolation => "Conway violation",
        FindingId::ReviewBlindspot => "Review blindspot",
        FindingId::LayerViolation => "Layer violation",
        FindingId::ZoneOfPain => "Zone of pain",
        FindingId::ArchitectureErosion => "Architecture erosion",
        FindingId::WeakLink => "Weak link",
        FindingId::BugAttractor => "Bug attractor",
        FindingId::AccidentalCoupling => "Accidental coupling",
    }
}

fn remediation_for(kind: FindingId) -> &'static str {
    match kind {
        FindingId::HighRiskHub => "Split responsibilities out of this file before adding more callers to it.",
        FindingId::HiddenCoupling => "Make the dependency explicit via an import, or remove the co-change coupling.",
        FindingId::GodFile => "Extract cohesive pieces of this file into separate modules.",
        FindingId::UnstableFile => "Reduce outgoing dependencies or raise its abstraction level.",
        FindingId::BoundaryMismatch => "Move this module across the inferred layer boundary it violates.",
        FindingId::DeadDependency => "Remove the unused import.",
        FindingId::ChronicProblem => "Prioritize this finding; it has persisted across multiple snapshots.",
        FindingId::OrphanCode => "Confirm this file is still reachable, or delete it.",
        FindingId::HollowCode => "Implement the stubbed functions or remove them.",
        FindingId::PhantomImports => "Fix the import path; it does not resolve to a known module.",
        FindingId::CopyPasteClone => "Factor the duplicated logic into a shared function.",
        FindingId::FlatArchitecture => "Introduce intermediate modules; the codebase has little internal structure.",
        FindingId::NamingDrift => "Align identifier naming with the rest of the file.",
        FindingId::KnowledgeSilo => "Spread ownership of this module across more than one author.",
        FindingId::ConwayViolation => "Align module boundaries with team boundaries, or vice versa.",
        FindingId::ReviewBlindspot => "Add reviewers unfamiliar with this area before merging changes to it.",
        FindingId::LayerViolation => "Route this dependency through the layer it currently bypasses.",
        FindingId::ZoneOfPain => "Reduce coupling or raise abstraction; this module is rigid and concrete.",
        FindingId::ArchitectureErosion => "Architecture health has been declining; review recent structural changes.",
        FindingId::WeakLink => "Shore up this edge; removing it would fragment the dependency graph.",
        FindingId::BugAttractor => "Add test coverage and review history before changing this file further.",
        FindingId::AccidentalCoupling => "Decouple these files; their co-change history isn't backed by an import.",
    }
}

/// Per-signal diff summary for a file across snapshots, exposed for CLI
/// `--history` style reporting (spec 4.10); not part of `AnalysisResult`
/// itself.
pub fn signal_trend(snapshots: &SnapshotStore, entity_key: &str, signal: SignalId) -> Result<Option<SignalDiff>> {
    let series = snapshots.signal_series(entity_key, signal)?;
    let polarity = SignalRegistry::meta(signal).polarity;
    Ok(crate::core::persistence::diff_signal_series(&series, polarity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct NoCommits;
    impl CommitSource for NoCommits {
        fn load(&self, _root: &Path) -> Result<Vec<Commit>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn run_over_a_small_tree_produces_a_result() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.rs"), "fn main() {}\n").unwrap();
        fs::write(dir.path().join("lib.rs"), "pub fn helper() {}\n").unwrap();
        let orchestrator = Orchestrator::new(Config::default());
        let meta = RunMetadata { timestamp: 1_700_000_000, commit_sha: None };
        let result = orchestrator.run(dir.path(), Some(&NoCommits), None, meta).unwrap();
        assert_eq!(result.file_count, 2);
        assert!(!result.truncated);
        assert!(result.codebase_health >= 0.0 && result.codebase_health <= 1.0);
    }

    #[test]
    fn empty_repository_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::new(Config::default());
        let meta = RunMetadata { timestamp: 0, commit_sha: None };
        let result = orchestrator.run(dir.path(), None, None, meta);
        assert!(result.is_err());
    }

    #[test]
    fn missing_root_is_an_error() {
        let orchestrator = Orchestrator::new(Config::default());
        let meta = RunMetadata { timestamp: 0, commit_sha: None };
        let result = orchestrator.run(Path::new("/nonexistent/path/for/shannon"), None, None, meta);
        assert!(result.is_err());
    }

    #[test]
    fn exit_code_zero_when_no_findings_meet_threshold() {
        let result = AnalysisResult {
            root: PathBuf::new(),
            timestamp: 0,
            commit_sha: None,
            tier: "absolute".to_string(),
            file_count: 1,
            module_count: 1,
            codebase_health: 1.0,
            architecture_health: 1.0,
            wiring_score: 1.0,
            findings: vec![],
            snapshot_id: None,
            truncated: false,
        };
        assert_eq!(result.exit_code(Some(0.8)), 0);
    }
}
