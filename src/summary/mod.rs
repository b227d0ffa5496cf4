//! Result logging and run summary
//!
//! Per-job pass/fail lines and best-effort log capture, plus the
//! `run_summary.json` artifact written next to the job logs at the end of a
//! lane run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::lint::JobResult;
use crate::pool::AggregateStatus;

/// Extension appended to the spec file name for its log.
pub const LOG_EXTENSION: &str = "txt";

/// File name of the run summary artifact.
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";

/// Generate a run identifier (sortable, filesystem-safe).
pub fn generate_run_id() -> String {
    ulid::Ulid::new().to_string().to_lowercase()
}

/// Render the human-readable completion line for one job.
///
/// The line carries the job's output, passing or failing; lines from
/// concurrent jobs interleave arbitrarily.
pub fn job_line(result: &JobResult) -> String {
    let verdict = if result.passed() { "PASS" } else { "FAIL" };
    let mut line = format!(
        "[{}] {} (exit {}, {} ms)",
        verdict, result.spec_file, result.exit_code, result.duration_ms
    );
    let output = result.output.trim_end();
    if !output.is_empty() {
        line.push('\n');
        line.push_str(output);
    }
    line
}

/// Write a job's captured output to `<spec-file>.txt` inside `dir`.
///
/// The write goes through a temp file and a rename, so readers never see a
/// half-written log; an existing log of the same name is overwritten.
pub fn write_job_log(dir: &Path, result: &JobResult) -> io::Result<PathBuf> {
    let file_name = format!("{}.{}", result.spec_file, LOG_EXTENSION);
    let path = dir.join(&file_name);
    let tmp = dir.join(format!(".{}.tmp", file_name));

    fs::write(&tmp, &result.output)?;
    fs::rename(&tmp, &path)?;
    Ok(path)
}

/// Report one completed job: print its pass/fail line, and when a log
/// directory is given, persist its output there.
///
/// Log writes are best-effort: a failure is reported on stderr and ignored,
/// never folded into the aggregate status.
pub fn log_result(result: &JobResult, log_dir: Option<&Path>) {
    println!("{}", job_line(result));
    if let Some(dir) = log_dir {
        if let Err(e) = write_job_log(dir, result) {
            eprintln!(
                "Warning: could not write log for {}: {}",
                result.spec_file, e
            );
        }
    }
}

/// Run summary artifact (run_summary.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Run identifier.
    pub run_id: String,

    /// When the summary was created.
    pub created_at: DateTime<Utc>,

    /// Number of specs linted.
    pub spec_count: usize,

    /// Count of specs whose linter exited 0.
    pub passed: usize,

    /// Count of specs whose linter exited non-zero.
    pub failed: usize,

    /// Summed exit code across all jobs (the process exit code).
    pub exit_code: i32,

    /// Wall-clock duration of the whole run in milliseconds.
    pub duration_ms: u64,

    /// Human-readable one-liner.
    pub human_summary: String,
}

impl RunSummary {
    /// Build a summary from the aggregate status of a finished batch.
    pub fn new(run_id: impl Into<String>, status: &AggregateStatus, duration: Duration) -> Self {
        let spec_count = status.jobs_run();
        let failed = status.failed();
        let passed = spec_count - failed;
        let duration_ms = duration.as_millis() as u64;
        let human_summary = format!(
            "{} spec{} linted: {} passed, {} failed (exit {}) in {:.1}s",
            spec_count,
            if spec_count == 1 { "" } else { "s" },
            passed,
            failed,
            status.exit_code(),
            duration.as_secs_f64(),
        );

        Self {
            run_id: run_id.into(),
            created_at: Utc::now(),
            spec_count,
            passed,
            failed,
            exit_code: status.exit_code(),
            duration_ms,
            human_summary,
        }
    }

    /// Serialize to JSON (pretty printed).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write `run_summary.json` into `dir`.
    pub fn write_to_dir(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(RUN_SUMMARY_FILE);
        let json = self.to_json().map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("JSON error: {}", e))
        })?;
        fs::write(&path, json)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(spec: &str, exit_code: i32, output: &str) -> JobResult {
        JobResult {
            spec_file: spec.to_string(),
            exit_code,
            output: output.to_string(),
            duration_ms: 42,
        }
    }

    #[test]
    fn test_job_line_pass_includes_output() {
        let line = job_line(&result("A.podspec", 0, "ok\n"));
        assert!(line.starts_with("[PASS] A.podspec"));
        assert!(line.contains("ok"));
    }

    #[test]
    fn test_job_line_fail_includes_exit_code_and_output() {
        let line = job_line(&result("B.podspec", 1, "fail: syntax"));
        assert!(line.starts_with("[FAIL] B.podspec (exit 1"));
        assert!(line.contains("fail: syntax"));
    }

    #[test]
    fn test_job_line_without_output_is_single_line() {
        let line = job_line(&result("A.podspec", 0, ""));
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_write_job_log_creates_named_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_job_log(tmp.path(), &result("A.podspec", 0, "ok")).unwrap();

        assert_eq!(path, tmp.path().join("A.podspec.txt"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "ok");
    }

    #[test]
    fn test_write_job_log_overwrites_existing() {
        let tmp = tempfile::tempdir().unwrap();
        write_job_log(tmp.path(), &result("A.podspec", 0, "first")).unwrap();
        write_job_log(tmp.path(), &result("A.podspec", 1, "second")).unwrap();

        let content = fs::read_to_string(tmp.path().join("A.podspec.txt")).unwrap();
        assert_eq!(content, "second");
    }

    #[test]
    fn test_write_job_log_missing_dir_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        assert!(write_job_log(&missing, &result("A.podspec", 0, "ok")).is_err());
    }

    #[test]
    fn test_run_summary_counts_and_roundtrip() {
        let mut status = AggregateStatus::default();
        status.record(&result("A.podspec", 0, ""));
        status.record(&result("B.podspec", 1, ""));
        status.record(&result("C.podspec", 2, ""));

        let summary = RunSummary::new(generate_run_id(), &status, Duration::from_millis(1500));
        assert_eq!(summary.spec_count, 3);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.exit_code, 3);
        assert!(summary.human_summary.contains("3 specs linted"));

        let json = summary.to_json().unwrap();
        let parsed: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.run_id, summary.run_id);
        assert_eq!(parsed.exit_code, 3);
    }

    #[test]
    fn test_run_summary_written_to_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let status = AggregateStatus::default();
        let summary = RunSummary::new("run1", &status, Duration::ZERO);

        let path = summary.write_to_dir(tmp.path()).unwrap();
        assert_eq!(path, tmp.path().join(RUN_SUMMARY_FILE));
        assert!(fs::read_to_string(path).unwrap().contains("\"run_id\""));
    }
}
