//! Lane orchestration
//!
//! Wires the lane end to end: validate the root, read the requested spec
//! list, load the catalog from `.podlane.toml`, select jobs, run them on
//! the bounded pool with a progress ticker alongside, and report the
//! aggregate exit code.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::config::{ConfigError, RepoConfig};
use crate::lint::LintTool;
use crate::pool::JobPool;
use crate::progress::ProgressTicker;
use crate::selection::select_jobs;
use crate::summary::{generate_run_id, log_result, RunSummary};

/// Interval between progress lines while jobs run.
pub const TICK_INTERVAL: Duration = Duration::from_secs(60);

/// Fatal startup errors. Nothing is dispatched once one of these fires.
#[derive(Debug, Error)]
pub enum LaneError {
    #[error("invalid root directory: {}", .0.display())]
    InvalidRoot(PathBuf),

    #[error("failed to read spec list {}: {source}", .path.display())]
    SpecList {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Options for one lane run, resolved from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct LaneOptions {
    /// Root working directory for all jobs.
    pub root: PathBuf,

    /// File listing one spec identifier per line.
    pub specs_file: PathBuf,

    /// Directory for per-job logs and the run summary (optional).
    pub log_dir: Option<PathBuf>,

    /// Worker bound override (falls back to config, then CPU count).
    pub jobs: Option<usize>,

    /// Linter program override.
    pub tool: Option<String>,

    /// Linter argument override.
    pub tool_args: Option<Vec<String>>,
}

/// Read the requested spec identifiers: one per line, trimmed, empty lines
/// dropped.
pub fn read_spec_list(path: &Path) -> Result<Vec<String>, LaneError> {
    let contents = fs::read_to_string(path).map_err(|source| LaneError::SpecList {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

fn resolve_tool(opts: &LaneOptions, config: &RepoConfig) -> LintTool {
    let base = config.lint_tool();
    if opts.tool.is_none() && opts.tool_args.is_none() {
        return base;
    }
    LintTool::new(
        opts.tool
            .clone()
            .unwrap_or_else(|| base.program().to_string()),
        opts.tool_args
            .clone()
            .unwrap_or_else(|| base.args().to_vec()),
    )
}

/// Run the lane. Returns the aggregate exit code: the sum of all job exit
/// codes, 0 only if every spec passed.
pub fn run_lane(opts: &LaneOptions) -> Result<i32, LaneError> {
    if !opts.root.is_dir() {
        return Err(LaneError::InvalidRoot(opts.root.clone()));
    }
    let requested = read_spec_list(&opts.specs_file)?;
    let config = RepoConfig::from_root(&opts.root)?;

    let catalog = config.catalog();
    let jobs = select_jobs(&requested, &catalog, &opts.root);
    if jobs.is_empty() {
        eprintln!("Note: no requested spec matched the catalog; nothing to lint.");
        return Ok(0);
    }

    if let Some(dir) = &opts.log_dir {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!(
                "Warning: could not create log directory {}: {}",
                dir.display(),
                e
            );
        }
    }

    let pool = opts
        .jobs
        .or(config.jobs)
        .map(JobPool::new)
        .unwrap_or_default();
    let tool = resolve_tool(opts, &config);
    let run_id = generate_run_id();

    println!(
        "Linting {} spec{} with {} worker{} (run {})",
        jobs.len(),
        if jobs.len() == 1 { "" } else { "s" },
        pool.workers(),
        if pool.workers() == 1 { "" } else { "s" },
        run_id,
    );

    // The minutes counter lives inside the handler: written by exactly one
    // task, so it needs no synchronization.
    let mut minutes: u64 = 0;
    let mut ticker = ProgressTicker::new(TICK_INTERVAL, move || {
        minutes += 1;
        eprintln!("[podlane] still linting... ({} min elapsed)", minutes);
    });
    ticker.resume();

    let started = Instant::now();
    let log_dir = opts.log_dir.clone();
    let batch = pool.dispatch(jobs, move |job| {
        let result = tool.invoke(job);
        log_result(&result, log_dir.as_deref());
        result
    });
    let status = batch.wait();
    ticker.suspend();
    drop(ticker);

    let summary = RunSummary::new(run_id, &status, started.elapsed());
    println!("{}", summary.human_summary);
    if let Some(dir) = &opts.log_dir {
        if let Err(e) = summary.write_to_dir(dir) {
            eprintln!("Warning: could not write run summary: {}", e);
        }
    }

    Ok(status.exit_code())
}
