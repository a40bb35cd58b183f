//! Worker thread logic for batched permission changes
//!
//! Each worker:
//! - Pulls items from the shared work queue
//! - Accumulates paths into batches keyed by mode string
//! - Flushes a batch the moment it reaches the configured size,
//!   issuing one chgrp and/or one chmod invocation over the whole batch
//! - On its termination item, flushes every remaining partial batch
//!   and exits
//!
//! Batches are worker-local, so no locking is needed around them; the
//! queue is the only shared state.

use crate::config::RunConfig;
use crate::engine::queue::WorkQueueReceiver;
use crate::error::{FlushOutcome, WorkerError};
use crate::exec::ChangeExecutor;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace, warn};

/// Statistics collected by a worker
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Entries consumed from the queue (termination item excluded)
    pub entries_processed: AtomicU64,

    /// Batches flushed
    pub batches_flushed: AtomicU64,

    /// Change invocations that reported failure
    pub failed_invocations: AtomicU64,
}

impl WorkerStats {
    fn record_entry(&self) {
        self.entries_processed.fetch_add(1, Ordering::Relaxed);
    }

    fn record_flush(&self) {
        self.batches_flushed.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.failed_invocations.fetch_add(1, Ordering::Relaxed);
    }
}

/// Per-worker accumulator mapping mode string -> pending paths
///
/// Each key's set is flushed and cleared independently once it reaches
/// the batch-size threshold; a path sits in at most one pending batch
/// at a time.
pub struct BatchBuffer {
    capacity: usize,
    buckets: HashMap<Arc<str>, HashSet<PathBuf>>,
}

impl BatchBuffer {
    /// Create a buffer that flushes each key at `capacity` paths
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            buckets: HashMap::new(),
        }
    }

    /// Insert a path under its mode string
    ///
    /// Returns the full batch for that key once it reaches capacity,
    /// leaving the key empty.
    pub fn insert(&mut self, perms: Arc<str>, path: PathBuf) -> Option<(Arc<str>, Vec<PathBuf>)> {
        let bucket = self.buckets.entry(Arc::clone(&perms)).or_default();
        bucket.insert(path);

        if bucket.len() >= self.capacity {
            let batch = bucket.drain().collect();
            Some((perms, batch))
        } else {
            None
        }
    }

    /// Take every non-empty pending batch (the final drain flush)
    pub fn drain_all(&mut self) -> Vec<(Arc<str>, Vec<PathBuf>)> {
        self.buckets
            .drain()
            .filter(|(_, paths)| !paths.is_empty())
            .map(|(perms, paths)| (perms, paths.into_iter().collect()))
            .collect()
    }

    /// Number of pending paths across all keys
    pub fn pending(&self) -> usize {
        self.buckets.values().map(|b| b.len()).sum()
    }
}

/// A worker thread that batches and applies changes
pub struct Worker {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<JoinHandle<Result<(), WorkerError>>>,

    /// Worker statistics
    stats: Arc<WorkerStats>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn(
        id: usize,
        config: Arc<RunConfig>,
        queue_rx: WorkQueueReceiver,
        executor: Arc<dyn ChangeExecutor>,
    ) -> Result<Self, WorkerError> {
        let stats = Arc::new(WorkerStats::default());
        let stats_clone = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name(format!("fastperm-{}", id))
            .spawn(move || worker_loop(id, config, queue_rx, executor, stats_clone))
            .map_err(|e| WorkerError::InitFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
            stats,
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get worker statistics
    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }

    /// Shared handle to this worker's statistics
    ///
    /// Outlives the worker, so totals can be read after join.
    pub fn stats_handle(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    /// Wait for the worker to finish
    pub fn join(mut self) -> Result<(), WorkerError> {
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(result) => result,
                Err(_) => Err(WorkerError::Panicked {
                    id: self.id,
                    message: "Worker thread panicked".into(),
                }),
            }
        } else {
            Ok(())
        }
    }
}

/// Main worker loop
///
/// Runs until its termination item arrives, then drains every pending
/// batch once and exits. A disconnected queue (producer gone without
/// terminators) is treated the same as termination so the thread can
/// never hang.
fn worker_loop(
    id: usize,
    config: Arc<RunConfig>,
    queue_rx: WorkQueueReceiver,
    executor: Arc<dyn ChangeExecutor>,
    stats: Arc<WorkerStats>,
) -> Result<(), WorkerError> {
    debug!(worker = id, "Worker starting");

    let mut buffer = BatchBuffer::new(config.batch_size);

    while let Some(item) = queue_rx.recv() {
        let Some((path, perms)) = item.into_change() else {
            break;
        };

        stats.record_entry();

        if let Some((key, batch)) = buffer.insert(perms, path) {
            let outcome = flush_batch(id, &config, executor.as_ref(), &stats, &key, &batch);
            trace!(worker = id, ok = outcome.is_success(), paths = outcome.batch_len(), "Batch flushed");
        }
    }

    // Drain: every remaining partial batch goes out exactly once
    let remaining = buffer.pending();
    if remaining > 0 {
        debug!(worker = id, pending = remaining, "Draining partial batches");
    }
    for (key, batch) in buffer.drain_all() {
        flush_batch(id, &config, executor.as_ref(), &stats, &key, &batch);
    }

    debug!(
        worker = id,
        entries = stats.entries_processed.load(Ordering::Relaxed),
        batches = stats.batches_flushed.load(Ordering::Relaxed),
        "Worker done"
    );

    Ok(())
}

/// Flush one batch: group change first (setgid in the mode string
/// depends on final group ownership), then the mode change
fn flush_batch(
    id: usize,
    config: &RunConfig,
    executor: &dyn ChangeExecutor,
    stats: &WorkerStats,
    perms: &str,
    batch: &[PathBuf],
) -> FlushOutcome {
    let mut failures = 0u64;

    if let Some(group) = &config.group {
        if let Err(e) = executor.change_group(group, batch) {
            failures += 1;
            stats.record_failure();
            if !config.quiet {
                warn!(worker = id, error = %e, paths = batch.len(), "Group change failed");
            }
        }
    }

    if config.is_nontrivial() {
        if let Err(e) = executor.change_mode(perms, batch) {
            failures += 1;
            stats.record_failure();
            if !config.quiet {
                warn!(worker = id, error = %e, perms = perms, paths = batch.len(), "Mode change failed");
            }
        }
    }

    stats.record_flush();

    if failures == 0 {
        FlushOutcome::Success {
            perms: perms.to_string(),
            paths: batch.len(),
        }
    } else {
        FlushOutcome::Failed {
            perms: perms.to_string(),
            paths: batch.len(),
            failures,
        }
    }
}

/// Aggregate statistics from multiple workers
pub fn aggregate_stats(stats: &[Arc<WorkerStats>]) -> (u64, u64, u64) {
    let mut entries = 0u64;
    let mut batches = 0u64;
    let mut failures = 0u64;

    for s in stats {
        entries += s.entries_processed.load(Ordering::Relaxed);
        batches += s.batches_flushed.load(Ordering::Relaxed);
        failures += s.failed_invocations.load(Ordering::Relaxed);
    }

    (entries, batches, failures)
}
