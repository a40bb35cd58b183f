//! Error types for fastperm
//!
//! This module defines the error hierarchy covering:
//! - Configuration and CLI errors
//! - Worker thread errors
//! - Change-invocation (chmod/chgrp) errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Errors should be actionable - include context about what to do
//! - Mutation failures are counted, never fatal; only setup errors
//!   propagate

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the fastperm application
#[derive(Error, Debug)]
pub enum FastpermError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid batch size
    #[error("Invalid batch size {size}: must be between {min} and {max}")]
    InvalidBatchSize { size: usize, min: usize, max: usize },

    /// Invalid permission string
    #[error("Invalid permission string '{perms}': {reason}")]
    InvalidModeString { perms: String, reason: String },

    /// Target path does not exist
    #[error("No such path: '{path}'")]
    PathNotFound { path: PathBuf },

    /// No target paths given
    #[error("Must specify at least one path")]
    NoPaths,
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Worker initialization failed
    #[error("Failed to initialize worker {id}: {reason}")]
    InitFailed { id: usize, reason: String },

    /// Work queue send failed
    #[error("Failed to send work item: queue closed")]
    QueueSendFailed,
}

/// Change invocation errors (one external call over a batch of paths)
#[derive(Error, Debug)]
pub enum ExecError {
    /// Could not spawn the external command at all
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Command ran but reported failure
    #[error("'{program}' exited with status {code} for a batch of {batch_len} paths")]
    CommandFailed {
        program: String,
        code: i32,
        batch_len: usize,
    },
}

impl ExecError {
    /// Mutation errors are recorded and skipped; only a missing binary
    /// suggests the whole run is misconfigured.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ExecError::CommandFailed { .. })
    }
}

/// Result type alias for FastpermError
pub type Result<T> = std::result::Result<T, FastpermError>;

/// Result type alias for ExecError
pub type ExecResult<T> = std::result::Result<T, ExecError>;

/// Represents the outcome of flushing a single batch
#[derive(Debug)]
pub enum FlushOutcome {
    /// Every requested invocation succeeded
    Success { perms: String, paths: usize },

    /// At least one invocation failed (counted, not fatal)
    Failed {
        perms: String,
        paths: usize,
        failures: u64,
    },
}

impl FlushOutcome {
    /// Returns true if this outcome represents success
    pub fn is_success(&self) -> bool {
        matches!(self, FlushOutcome::Success { .. })
    }

    /// Number of paths covered by the flushed batch
    pub fn batch_len(&self) -> usize {
        match self {
            FlushOutcome::Success { paths, .. } => *paths,
            FlushOutcome::Failed { paths, .. } => *paths,
        }
    }
}
