//! Configuration types for fastperm
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//!
//! The engine only ever sees an already-validated [`RunConfig`];
//! everything that can be rejected is rejected here, before any worker
//! is spawned.

use crate::error::ConfigError;
use crate::perms::{Classifier, ModeSpec};
use clap::Parser;
use std::path::PathBuf;

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 512;

/// Batch size limits
const MIN_BATCH_SIZE: usize = 1;
const MAX_BATCH_SIZE: usize = 100_000;

/// Parallel batched recursive permission changer
#[derive(Parser, Debug, Clone)]
#[command(
    name = "fastperm",
    version,
    about = "Parallel batched recursive permission changer",
    long_about = "Recursively applies chmod-style permission changes (and optionally group \
                  ownership) across directory trees.\n\n\
                  A traversal thread feeds a shared queue; worker threads batch paths by \
                  permission string and issue one chmod/chgrp invocation per batch, \
                  amortizing process-spawn cost across the whole batch.",
    after_help = "EXAMPLES:\n    \
        fastperm u+w .\n    \
        fastperm ug+rw,o+r-w:ug+rwx,o+rx-w /srv/data\n    \
        fastperm -G staff -w 8 a-w,+t /archive /backups\n    \
        fastperm -q -b 256 644 big-tree/"
)]
pub struct CliArgs {
    /// Permission string, or FILE_PERMS:DIR_PERMS to apply different
    /// strings to files and directories
    #[arg(value_name = "PERMS")]
    pub perms: String,

    /// Paths to change; directories are changed recursively
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Also set group ownership to this group (applied before permissions)
    #[arg(short = 'G', long, value_name = "GROUP")]
    pub group: Option<String>,

    /// Number of worker threads
    #[arg(
        short = 'w',
        long,
        default_value_t = default_workers(),
        value_name = "NUM"
    )]
    pub workers: usize,

    /// Number of paths changed per chmod/chgrp invocation
    #[arg(short = 'b', long, default_value = "128", value_name = "NUM")]
    pub batch_size: usize,

    /// Quiet mode - suppress notices and per-batch failure messages
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (log every change invocation)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

fn default_workers() -> usize {
    // Leave one core for the traversal producer
    num_cpus::get().saturating_sub(1).max(1)
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Target paths, in the order given
    pub paths: Vec<PathBuf>,

    /// Mode string applied to files
    pub file_perms: ModeSpec,

    /// Mode string applied to directories
    pub dir_perms: ModeSpec,

    /// Group to chgrp to, if any
    pub group: Option<String>,

    /// Number of worker threads
    pub worker_count: usize,

    /// Paths per change invocation
    pub batch_size: usize,

    /// Suppress notices and failure messages
    pub quiet: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl RunConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        // PERMS is either one string for everything or file:dir
        let (file_str, dir_str) = match args.perms.split_once(':') {
            Some((file, dir)) => (file, dir),
            None => (args.perms.as_str(), args.perms.as_str()),
        };

        let file_perms = ModeSpec::parse(file_str)?;
        let dir_perms = ModeSpec::parse(dir_str)?;

        // Validate worker count
        if args.workers == 0 || args.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: args.workers,
                max: MAX_WORKERS,
            });
        }

        // Validate batch size
        if args.batch_size < MIN_BATCH_SIZE || args.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::InvalidBatchSize {
                size: args.batch_size,
                min: MIN_BATCH_SIZE,
                max: MAX_BATCH_SIZE,
            });
        }

        // Validate target paths
        if args.paths.is_empty() {
            return Err(ConfigError::NoPaths);
        }
        for path in &args.paths {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
        }

        Ok(Self {
            paths: args.paths,
            file_perms,
            dir_perms,
            group: args.group,
            worker_count: args.workers,
            batch_size: args.batch_size,
            quiet: args.quiet,
            verbose: args.verbose,
        })
    }

    /// Classifier over the configured file/directory mode strings
    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.file_perms.clone(), self.dir_perms.clone())
    }

    /// Whether the configured permission change has any real effect
    ///
    /// When false and no group is configured, workers never issue a
    /// single change invocation.
    pub fn is_nontrivial(&self) -> bool {
        self.file_perms.is_nontrivial() || self.dir_perms.is_nontrivial()
    }
}
