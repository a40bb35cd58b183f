//! Shared work queue for change items
//!
//! A single unbounded FIFO shared by one producer (the traversal
//! driver) and N consumer workers. Enqueue never blocks; dequeue
//! blocks until an item arrives. Workers terminate only on an explicit
//! [`WorkItem::Terminate`], never on a timeout - the pool enqueues
//! exactly one per spawned worker.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// One unit of work, created by the traversal and consumed exactly once
#[derive(Debug, Clone)]
pub enum WorkItem {
    /// A file (or other non-directory entry) to change
    File { path: PathBuf, perms: Arc<str> },

    /// A visited directory itself
    DirSelf { path: PathBuf, perms: Arc<str> },

    /// Instructs exactly one worker to flush its batches and exit
    Terminate,
}

impl WorkItem {
    /// Create a file item tagged with its mode string
    pub fn file(path: PathBuf, perms: Arc<str>) -> Self {
        Self::File { path, perms }
    }

    /// Create a directory-self item tagged with its mode string
    pub fn dir_self(path: PathBuf, perms: Arc<str>) -> Self {
        Self::DirSelf { path, perms }
    }

    /// The path and mode string for change items, None for Terminate
    pub fn into_change(self) -> Option<(PathBuf, Arc<str>)> {
        match self {
            Self::File { path, perms } | Self::DirSelf { path, perms } => Some((path, perms)),
            Self::Terminate => None,
        }
    }
}

/// Statistics for the work queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Total items enqueued (termination items included)
    pub enqueued: AtomicU64,

    /// Total items dequeued
    pub dequeued: AtomicU64,
}

impl QueueStats {
    /// Get total enqueued items
    pub fn enqueued_count(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    /// Get total dequeued items
    pub fn dequeued_count(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }
}

/// Unbounded work queue shared by the producer and all workers
pub struct WorkQueue {
    /// Sender for adding items
    sender: Sender<WorkItem>,

    /// Receiver for getting items
    receiver: Receiver<WorkItem>,

    /// Queue statistics
    stats: Arc<QueueStats>,
}

impl WorkQueue {
    /// Create a new unbounded work queue
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();

        Self {
            sender,
            receiver,
            stats: Arc::new(QueueStats::default()),
        }
    }

    /// Get a sender for this queue (held by the traversal driver)
    pub fn sender(&self) -> WorkQueueSender {
        WorkQueueSender {
            sender: self.sender.clone(),
            stats: Arc::clone(&self.stats),
        }
    }

    /// Get a receiver for this queue (clone for each worker)
    pub fn receiver(&self) -> WorkQueueReceiver {
        WorkQueueReceiver {
            receiver: self.receiver.clone(),
            stats: Arc::clone(&self.stats),
        }
    }

    /// Get queue statistics
    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Get current queue length
    pub fn len(&self) -> usize {
        self.receiver.len()
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for enqueueing items
#[derive(Clone)]
pub struct WorkQueueSender {
    sender: Sender<WorkItem>,
    stats: Arc<QueueStats>,
}

impl WorkQueueSender {
    /// Enqueue an item (never blocks - the queue is unbounded)
    ///
    /// Fails only if every receiver has been dropped.
    pub fn send(&self, item: WorkItem) -> Result<(), ()> {
        self.sender.send(item).map_err(|_| ())?;
        self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Handle for dequeueing items
#[derive(Clone)]
pub struct WorkQueueReceiver {
    receiver: Receiver<WorkItem>,
    stats: Arc<QueueStats>,
}

impl WorkQueueReceiver {
    /// Receive an item, blocking until one is available
    ///
    /// Returns None only if the channel is empty and every sender has
    /// been dropped.
    pub fn recv(&self) -> Option<WorkItem> {
        match self.receiver.recv() {
            Ok(item) => {
                self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
                Some(item)
            }
            Err(_) => None,
        }
    }

    /// Try to receive an item without blocking
    pub fn try_recv(&self) -> Option<WorkItem> {
        match self.receiver.try_recv() {
            Ok(item) => {
                self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
                Some(item)
            }
            Err(_) => None,
        }
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Get current queue length
    pub fn len(&self) -> usize {
        self.receiver.len()
    }
}
