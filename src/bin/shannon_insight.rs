//! Thin CLI wrapper around `core::pipeline::Orchestrator` (spec 6.5, 6.6).
//! All analysis logic lives in the library; this binary only parses
//! arguments, wires up the file walker/parser/commit source, and formats
//! the result.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use shannon_insight::core::config::{Config, FailOn};
use shannon_insight::core::pipeline::{CommitSource, Orchestrator, RunMetadata};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "shannon-insight")]
#[command(version = shannon_insight::version())]
#[command(about = "Static + temporal codebase quality analyzer")]
struct Cli {
    /// Project root to analyze
    #[arg(value_name = "PATH", default_value = ".")]
    root: PathBuf,

    /// TOML config file overriding defaults
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Fail the process when a finding meets this severity policy
    #[arg(long = "fail-on", value_enum, default_value = "none")]
    fail_on: FailOnArg,

    /// Skip the git history spine even if the root is a repository
    #[arg(long = "no-history")]
    no_history: bool,

    /// Persist and diff against a snapshot database at this path
    #[arg(long = "snapshot-db", value_name = "FILE")]
    snapshot_db: Option<PathBuf>,

    /// Emit the result as JSON instead of a text summary
    #[arg(long = "json")]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FailOnArg {
    None,
    Any,
    High,
}

impl From<FailOnArg> for FailOn {
    fn from(value: FailOnArg) -> Self {
        match value {
            FailOnArg::None => FailOn::None,
            FailOnArg::Any => FailOn::Any,
            FailOnArg::High => FailOn::High,
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "shannon_insight=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
fn reset_sigpipe() {}

fn main() -> ExitCode {
    reset_sigpipe();
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("error loading config: {e}");
                return ExitCode::from(2);
            }
        },
        None => Config::default(),
    };
    config.fail_on = cli.fail_on.into();

    if let Err(e) = config.validate() {
        eprintln!("error: {e}");
        return ExitCode::from(2);
    }

    let orchestrator = Orchestrator::new(config.clone());

    let commit_source: Option<Box<dyn CommitSource>> = if cli.no_history {
        None
    } else {
        #[cfg(feature = "temporal")]
        {
            shannon_insight::core::temporal::git_driver::GitCommitStream::open(&cli.root)
                .ok()
                .map(|stream| Box::new(stream) as Box<dyn CommitSource>)
        }
        #[cfg(not(feature = "temporal"))]
        {
            None
        }
    };

    let snapshots = match &cli.snapshot_db {
        Some(path) => match shannon_insight::core::persistence::SnapshotStore::open(path) {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::warn!("could not open snapshot database: {e}");
                None
            }
        },
        None => None,
    };

    let meta = RunMetadata {
        timestamp: current_unix_timestamp(),
        commit_sha: None,
    };

    let result = orchestrator.run(
        &cli.root,
        commit_source.as_deref(),
        snapshots.as_ref(),
        meta,
    );

    match result {
        Ok(analysis) => {
            if cli.json {
                match serde_json::to_string_pretty(&analysis) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("error serializing result: {e}");
                        return ExitCode::from(2);
                    }
                }
            } else {
                print_summary(&analysis);
            }
            ExitCode::from(analysis.exit_code(config.fail_on.threshold()) as u8)
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

fn print_summary(result: &shannon_insight::core::pipeline::AnalysisResult) {
    println!(
        "{} files, {} modules, tier={}",
        result.file_count, result.module_count, result.tier
    );
    println!(
        "codebase_health={:.2} architecture_health={:.2} wiring_score={:.2}",
        result.codebase_health, result.architecture_health, result.wiring_score
    );
    if result.truncated {
        println!("(analysis truncated: a stage exceeded its time budget)");
    }
    for finding in &result.findings {
        println!(
            "[{:.2}] {} - {} ({})",
            finding.score, finding.name, finding.target, finding.rationale
        );
    }
}

fn current_unix_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
