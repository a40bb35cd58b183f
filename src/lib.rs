//! fastperm - Parallel Batched Recursive Permission Changer
//!
//! A tool for recursively applying file-mode and group-ownership
//! changes across large directory trees. Designed around one
//! observation: the dominant cost of `chmod -R`-style work at scale is
//! per-invocation process spawn, so paths are batched by mode string
//! and changed many at a time.
//!
//! # Features
//!
//! - **Parallel workers**: a traversal producer feeds a shared queue;
//!   N worker threads consume and apply changes concurrently.
//!
//! - **Batched invocations**: each worker accumulates paths per mode
//!   string and issues one chgrp/chmod call per full batch.
//!
//! - **Split file/directory modes**: separate permission strings for
//!   files and directories (e.g. add `x` to directories only).
//!
//! - **No-op detection**: syntactically valid strings that change
//!   nothing (like `+` or `u-`) skip chmod invocations entirely.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Traversal (producer)                        │
//! │        walks targets, classifies file vs directory entries       │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Work Queue                                │
//! │                   (crossbeam, unbounded FIFO)                     │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//! ┌─────────┐  ┌─────────┐  ┌───┴─────┐         ┌─────────┐
//! │Worker 1 │  │Worker 2 │  │Worker 3 │  ...    │Worker N │
//! │ batches │  │ batches │  │ batches │         │ batches │
//! └────┬────┘  └────┬────┘  └────┬────┘         └────┬────┘
//!      │            │            │                    │
//!      ▼            ▼            ▼                    ▼
//!            one chgrp + one chmod per full batch
//! ```
//!
//! # Example
//!
//! ```bash
//! # User-writable everywhere under the current directory
//! fastperm u+w .
//!
//! # Different strings for files and directories, set group first
//! fastperm -G staff ug+rw,o+r-w:ug+rwx,o+rx-w /srv/data
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod exec;
pub mod perms;
pub mod progress;

pub use config::{CliArgs, RunConfig};
pub use engine::{ChangePool, RunResult};
pub use error::{FastpermError, Result};
pub use exec::{ChangeExecutor, CommandExecutor, LoggingExecutor};
pub use perms::{Classifier, EntryKind, ModeSpec};
