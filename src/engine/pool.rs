//! Pool manager - orchestrates the parallel permission change
//!
//! The pool is responsible for:
//! - Setting up the shared work queue and spawning workers
//! - Running the traversal producer on the calling thread
//! - Enqueueing exactly one termination item per spawned worker
//! - Joining all workers and aggregating final statistics

use crate::config::RunConfig;
use crate::engine::queue::{WorkItem, WorkQueue};
use crate::engine::traversal;
use crate::engine::worker::{aggregate_stats, Worker};
use crate::error::{Result, WorkerError};
use crate::exec::ChangeExecutor;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Result of a completed run
#[derive(Debug)]
pub struct RunResult {
    /// Entries enqueued by the traversal (files + directories)
    pub total_entries: u64,

    /// Entries consumed by workers (equals total_entries on a clean run)
    pub entries_processed: u64,

    /// Batches flushed across all workers
    pub batches_flushed: u64,

    /// Change invocations that reported failure
    pub failed_invocations: u64,

    /// Wall-clock time for the whole run
    pub duration: Duration,
}

impl RunResult {
    /// Whether any mutation invocation failed
    ///
    /// The engine never aborts on mutation failures; the caller decides
    /// what exit code this deserves.
    pub fn has_failures(&self) -> bool {
        self.failed_invocations > 0
    }

    /// Entries changed per second
    pub fn entries_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.total_entries as f64 / secs
        } else {
            0.0
        }
    }

    /// Seconds spent per entry, None when nothing was processed
    pub fn seconds_per_entry(&self) -> Option<f64> {
        if self.total_entries == 0 {
            None
        } else {
            Some(self.duration.as_secs_f64() / self.total_entries as f64)
        }
    }
}

/// Coordinates the traversal producer and the worker pool
pub struct ChangePool {
    /// Configuration
    config: Arc<RunConfig>,

    /// Change executor shared by all workers
    executor: Arc<dyn ChangeExecutor>,

    /// Shared work queue
    queue: WorkQueue,

    /// Worker threads
    workers: Vec<Worker>,
}

impl ChangePool {
    /// Create a new pool
    pub fn new(config: RunConfig, executor: Arc<dyn ChangeExecutor>) -> Self {
        Self {
            config: Arc::new(config),
            executor,
            queue: WorkQueue::new(),
            workers: Vec::new(),
        }
    }

    /// Run the whole change: spawn workers, traverse, drain, join
    pub fn run(mut self) -> Result<RunResult> {
        let start = Instant::now();

        info!(
            workers = self.config.worker_count,
            batch_size = self.config.batch_size,
            targets = self.config.paths.len(),
            "Starting permission change"
        );

        self.spawn_workers()?;

        // Produce on this thread while workers consume
        let classifier = self.config.classifier();
        let sender = self.queue.sender();
        let total_entries = traversal::enqueue_targets(&self.config, &classifier, &sender)?;

        // One terminator per spawned worker, derived from the actual
        // pool size - fewer would deadlock the pool
        for _ in 0..self.workers.len() {
            sender
                .send(WorkItem::Terminate)
                .map_err(|_| WorkerError::QueueSendFailed)?;
        }

        let (entries_processed, batches_flushed, failed_invocations) = self.join_workers();

        let duration = start.elapsed();

        info!(
            entries = total_entries,
            batches = batches_flushed,
            failures = failed_invocations,
            duration_secs = duration.as_secs_f64(),
            "Run complete"
        );

        Ok(RunResult {
            total_entries,
            entries_processed,
            batches_flushed,
            failed_invocations,
            duration,
        })
    }

    /// Spawn worker threads
    fn spawn_workers(&mut self) -> Result<()> {
        for id in 0..self.config.worker_count {
            let worker = Worker::spawn(
                id,
                Arc::clone(&self.config),
                self.queue.receiver(),
                Arc::clone(&self.executor),
            )?;

            self.workers.push(worker);
        }

        info!(count = self.workers.len(), "Workers spawned");
        Ok(())
    }

    /// Join all worker threads and collect final stats
    fn join_workers(&mut self) -> (u64, u64, u64) {
        let workers = std::mem::take(&mut self.workers);
        let stats: Vec<_> = workers.iter().map(|w| w.stats_handle()).collect();

        // Blocks until every worker has drained and exited
        for worker in workers {
            let id = worker.id();
            if let Err(e) = worker.join() {
                warn!(worker = id, error = %e, "Worker failed to join cleanly");
            }
        }

        // Stats handles outlive the threads, so these are final totals
        aggregate_stats(&stats)
    }
}
