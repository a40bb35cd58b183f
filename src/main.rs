//! fastperm - Parallel Batched Recursive Permission Changer
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use fastperm::config::{CliArgs, RunConfig};
use fastperm::engine::ChangePool;
use fastperm::exec::{ChangeExecutor, CommandExecutor, LoggingExecutor};
use fastperm::progress::{print_header, print_summary, ProgressReporter};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(clean) => {
            if clean {
                ExitCode::SUCCESS
            } else {
                // Some change invocations failed; the run itself completed
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<bool> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = RunConfig::from_args(args).context("Invalid configuration")?;

    // Effectively empty change: nothing to do at all
    if !config.is_nontrivial() && config.group.is_none() {
        if !config.quiet {
            println!(
                "fastperm: notice: the permission string changes nothing and no group \
                 was given; there are no changes to perform"
            );
        }
        return Ok(true);
    }

    if !config.is_nontrivial() && !config.quiet {
        println!(
            "fastperm: notice: the permission string changes nothing; only group \
             ownership will be changed"
        );
    }

    // Print header
    if !config.quiet {
        print_header(
            config.file_perms.as_str(),
            config.dir_perms.as_str(),
            config.group.as_deref(),
            config.is_nontrivial(),
            config.worker_count,
            config.batch_size,
        );
    }

    // Real executor, with invocation logging for verbose runs
    let executor: Arc<dyn ChangeExecutor> = if config.verbose {
        Arc::new(LoggingExecutor::new(CommandExecutor::new(config.quiet)))
    } else {
        Arc::new(CommandExecutor::new(config.quiet))
    };

    let progress = if !config.quiet {
        let p = ProgressReporter::new();
        p.set_status("Applying changes...");
        Some(p)
    } else {
        None
    };

    // Run the pool (traversal happens on this thread)
    let pool = ChangePool::new(config, executor);
    let result = pool.run().context("Run failed")?;

    if let Some(ref p) = progress {
        p.finish_and_clear();
    }

    // Summary
    print_summary(&result);

    Ok(!result.has_failures())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("fastperm=debug,warn")
    } else {
        EnvFilter::new("fastperm=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
