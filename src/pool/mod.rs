//! Parallel job runner
//!
//! Executes independent lint jobs concurrently on an explicitly bounded set
//! of worker threads and folds their exit codes into one aggregate status.
//!
//! Workers claim jobs off a shared cursor, so a slow job never blocks the
//! rest of the batch behind it. Each worker sends exactly one result per
//! claimed job over a channel; [`RunningBatch::wait`] receives exactly as
//! many results as jobs were dispatched and then joins the worker threads,
//! so it cannot return before every job has reported and no result is lost
//! or double-counted.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::lint::JobResult;
use crate::selection::JobSpec;

/// Aggregated outcome of a batch of jobs.
///
/// The aggregate is the sum of the job exit codes, not a boolean OR: this is
/// the inherited release-toolchain contract, and it means two jobs exiting 1
/// are indistinguishable from one job exiting 2. The sum saturates so a
/// pathological batch cannot wrap around to "success".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStatus {
    exit_code_sum: i32,
    jobs_run: usize,
    failed: usize,
}

impl AggregateStatus {
    /// Fold one job result into the aggregate.
    pub fn record(&mut self, result: &JobResult) {
        self.exit_code_sum = self.exit_code_sum.saturating_add(result.exit_code);
        self.jobs_run += 1;
        if result.exit_code != 0 {
            self.failed += 1;
        }
    }

    /// Summed exit code across all recorded jobs (0 only if all passed).
    pub fn exit_code(&self) -> i32 {
        self.exit_code_sum
    }

    /// Number of job results recorded.
    pub fn jobs_run(&self) -> usize {
        self.jobs_run
    }

    /// Number of jobs that exited non-zero.
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// True when every recorded job exited 0.
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// A bounded pool of lint workers.
#[derive(Debug, Clone, Copy)]
pub struct JobPool {
    workers: usize,
}

impl JobPool {
    /// Create a pool with an explicit worker bound (clamped to at least 1).
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Create a pool bounded by the available CPU parallelism.
    pub fn with_default_workers() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(workers)
    }

    /// The worker bound.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Dispatch every job for concurrent execution.
    ///
    /// Spawns `min(workers, jobs.len())` threads; each claims the next
    /// undispatched job, runs `worker_fn` on it (blocking until the external
    /// linter exits), and reports the result. Returns immediately; call
    /// [`RunningBatch::wait`] for the completion barrier.
    pub fn dispatch<F>(&self, jobs: Vec<JobSpec>, worker_fn: F) -> RunningBatch
    where
        F: Fn(&JobSpec) -> JobResult + Send + Sync + 'static,
    {
        let expected = jobs.len();
        let jobs = Arc::new(jobs);
        let cursor = Arc::new(AtomicUsize::new(0));
        let worker_fn = Arc::new(worker_fn);
        let (tx, rx) = mpsc::channel::<JobResult>();

        let thread_count = self.workers.min(expected);
        let mut handles = Vec::with_capacity(thread_count);
        for _ in 0..thread_count {
            let jobs = Arc::clone(&jobs);
            let cursor = Arc::clone(&cursor);
            let worker_fn = Arc::clone(&worker_fn);
            let tx = tx.clone();

            handles.push(std::thread::spawn(move || loop {
                let index = cursor.fetch_add(1, Ordering::SeqCst);
                let Some(job) = jobs.get(index) else {
                    break;
                };
                if tx.send(worker_fn(job)).is_err() {
                    break;
                }
            }));
        }
        drop(tx);

        RunningBatch {
            rx,
            expected,
            handles,
        }
    }
}

impl Default for JobPool {
    fn default() -> Self {
        Self::with_default_workers()
    }
}

/// A dispatched batch whose workers are still running.
pub struct RunningBatch {
    rx: Receiver<JobResult>,
    expected: usize,
    handles: Vec<JoinHandle<()>>,
}

impl RunningBatch {
    /// Number of jobs dispatched into this batch.
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Block until every dispatched job has reported, then return the
    /// aggregate status.
    ///
    /// The barrier is the channel plus the thread joins; there is no
    /// polling. The receive loop stops early only if every sender is gone,
    /// which can happen solely when a worker thread died without reporting.
    pub fn wait(mut self) -> AggregateStatus {
        let mut status = AggregateStatus::default();
        for _ in 0..self.expected {
            match self.rx.recv() {
                Ok(result) => status.record(&result),
                Err(_) => break,
            }
        }
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
        status
    }
}
