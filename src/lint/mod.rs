//! External lint invocation
//!
//! Wraps the opaque linter tool behind a blocking call: one invocation per
//! spec file, run in the job's working directory, returning the exit code
//! and combined output. The tool is a black box; there is no retry and no
//! timeout (a hung linter occupies its worker slot until it exits).

use std::process::Command;
use std::time::Instant;

use crate::selection::JobSpec;

/// Default linter program.
pub const DEFAULT_TOOL: &str = "pod";

/// Default arguments placed before the spec file.
pub const DEFAULT_ARGS: &[&str] = &["lib", "lint"];

/// Outcome of one lint job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    /// Spec file this result belongs to.
    pub spec_file: String,

    /// Process exit code; 0 means the spec passed validation.
    pub exit_code: i32,

    /// Combined stdout and stderr of the linter.
    pub output: String,

    /// Wall-clock duration of the invocation in milliseconds.
    pub duration_ms: u64,
}

impl JobResult {
    /// True when the linter exited 0.
    pub fn passed(&self) -> bool {
        self.exit_code == 0
    }
}

/// The external lint command: a program and the arguments that precede the
/// spec file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintTool {
    program: String,
    args: Vec<String>,
}

impl LintTool {
    /// Describe a linter invocation as `program args... <spec-file>`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// The program that will be spawned.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The fixed arguments placed before the spec file.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Run the linter for one job, blocking until it exits.
    ///
    /// Failure to spawn the tool is itself a failing result (exit code 127,
    /// the error message as output) rather than an error: one broken
    /// invocation must not abort the rest of the batch.
    pub fn invoke(&self, job: &JobSpec) -> JobResult {
        let started = Instant::now();
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(&job.spec_file)
            .current_dir(&job.work_dir)
            .output();

        let duration_ms = started.elapsed().as_millis() as u64;
        match output {
            Ok(output) => {
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&output.stderr);
                if !stderr.is_empty() {
                    if !text.is_empty() && !text.ends_with('\n') {
                        text.push('\n');
                    }
                    text.push_str(&stderr);
                }

                let exit_code = match output.status.code() {
                    Some(code) => code,
                    None => {
                        // Killed by a signal: note it and report the
                        // shell-style code so the aggregate still fails.
                        let sig = term_signal(&output.status);
                        if !text.is_empty() && !text.ends_with('\n') {
                            text.push('\n');
                        }
                        match sig {
                            Some(sig) => {
                                text.push_str(&format!("terminated by signal {}", sig));
                                128 + sig
                            }
                            None => {
                                text.push_str("terminated without exit code");
                                1
                            }
                        }
                    }
                };

                JobResult {
                    spec_file: job.spec_file.clone(),
                    exit_code,
                    output: text,
                    duration_ms,
                }
            }
            Err(e) => JobResult {
                spec_file: job.spec_file.clone(),
                exit_code: 127,
                output: format!("failed to spawn '{}': {}", self.program, e),
                duration_ms,
            },
        }
    }
}

impl Default for LintTool {
    fn default() -> Self {
        Self::new(
            DEFAULT_TOOL,
            DEFAULT_ARGS.iter().map(|s| s.to_string()).collect(),
        )
    }
}

#[cfg(unix)]
fn term_signal(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn term_signal(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}
