//! Traversal driver - the single producer feeding the work queue
//!
//! Walks each configured target path and enqueues one item per
//! filesystem entry: plain-file targets yield a single file item;
//! directory targets yield a directory-self item for every visited
//! directory (the root included) plus a file item for every
//! non-directory entry. Unreadable entries are skipped with a warning
//! and never abort the run.
//!
//! Traversal order is filesystem-dependent and deliberately
//! unspecified; consumers batch by mode string, not by position.

use crate::config::RunConfig;
use crate::engine::queue::{WorkItem, WorkQueueSender};
use crate::error::WorkerError;
use crate::perms::{Classifier, EntryKind};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Enqueue every entry reachable from the configured targets
///
/// Returns the number of items enqueued (files + directories, once
/// each), for throughput reporting. Fails only if the queue has been
/// disconnected, which means every worker died.
pub fn enqueue_targets(
    config: &RunConfig,
    classifier: &Classifier,
    tx: &WorkQueueSender,
) -> Result<u64, WorkerError> {
    let mut total = 0u64;

    for target in &config.paths {
        if target.is_file() {
            let item = WorkItem::file(target.clone(), classifier.perms_for(EntryKind::File));
            tx.send(item).map_err(|_| WorkerError::QueueSendFailed)?;
            total += 1;
            continue;
        }

        for entry in WalkDir::new(target).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    // Vanished or unreadable entry - skip and move on
                    warn!(error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            let item = if entry.file_type().is_dir() {
                WorkItem::dir_self(
                    entry.into_path(),
                    classifier.perms_for(EntryKind::Directory),
                )
            } else {
                // A symlink to a directory is neither walked nor
                // changed: chmod would dereference it and apply file
                // perms to the target directory, possibly outside the
                // tree entirely
                if entry.file_type().is_symlink() && entry.path().is_dir() {
                    debug!(path = %entry.path().display(), "Skipping symlink to directory");
                    continue;
                }
                WorkItem::file(entry.into_path(), classifier.perms_for(EntryKind::File))
            };

            tx.send(item).map_err(|_| WorkerError::QueueSendFailed)?;
            total += 1;
        }
    }

    debug!(entries = total, "Traversal complete");
    Ok(total)
}
