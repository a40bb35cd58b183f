//! Change executors - the seam between the engine and the OS
//!
//! A [`ChangeExecutor`] issues the actual group/mode change for a
//! flushed batch, one external invocation covering every path in the
//! batch. Workers hold the executor behind a trait object so tests can
//! inject recorders and verbose runs can wrap the real executor in a
//! logging decorator.

use crate::error::{ExecError, ExecResult};
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

/// Issues ownership/permission changes for flushed batches
pub trait ChangeExecutor: Send + Sync {
    /// Change group ownership of every path in the batch
    fn change_group(&self, group: &str, paths: &[PathBuf]) -> ExecResult<()>;

    /// Apply the mode string to every path in the batch
    fn change_mode(&self, perms: &str, paths: &[PathBuf]) -> ExecResult<()>;
}

/// Executor that shells out to the system chmod/chgrp binaries
///
/// Each call spawns exactly one process for the entire batch - the
/// whole point of batching is to amortize that spawn cost.
pub struct CommandExecutor {
    /// Pass -f so the tools suppress their own error messages
    quiet: bool,
}

impl CommandExecutor {
    /// Create a command executor
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    fn run(&self, program: &str, arg: &str, paths: &[PathBuf]) -> ExecResult<()> {
        let mut cmd = Command::new(program);
        if self.quiet {
            cmd.arg("-f");
        }
        cmd.arg(arg);
        cmd.args(paths);

        let status = cmd.status().map_err(|source| ExecError::Spawn {
            program: program.to_string(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(ExecError::CommandFailed {
                program: program.to_string(),
                code: status.code().unwrap_or(-1),
                batch_len: paths.len(),
            })
        }
    }
}

impl ChangeExecutor for CommandExecutor {
    fn change_group(&self, group: &str, paths: &[PathBuf]) -> ExecResult<()> {
        self.run("chgrp", group, paths)
    }

    fn change_mode(&self, perms: &str, paths: &[PathBuf]) -> ExecResult<()> {
        self.run("chmod", perms, paths)
    }
}

/// Decorator that traces every invocation before delegating
///
/// Swapped in for verbose runs instead of mutating any shared state.
pub struct LoggingExecutor<E> {
    inner: E,
}

impl<E: ChangeExecutor> LoggingExecutor<E> {
    /// Wrap an executor with invocation logging
    pub fn new(inner: E) -> Self {
        Self { inner }
    }
}

impl<E: ChangeExecutor> ChangeExecutor for LoggingExecutor<E> {
    fn change_group(&self, group: &str, paths: &[PathBuf]) -> ExecResult<()> {
        debug!(group = group, batch = paths.len(), "chgrp batch");
        let result = self.inner.change_group(group, paths);
        if let Err(ref e) = result {
            warn!(error = %e, "chgrp batch failed");
        }
        result
    }

    fn change_mode(&self, perms: &str, paths: &[PathBuf]) -> ExecResult<()> {
        debug!(perms = perms, batch = paths.len(), "chmod batch");
        let result = self.inner.change_mode(perms, paths);
        if let Err(ref e) = result {
            warn!(error = %e, "chmod batch failed");
        }
        result
    }
}
