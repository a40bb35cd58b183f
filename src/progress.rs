//! Progress and summary output for fastperm
//!
//! Provides a spinner while the run is in flight and the final
//! human-readable summary line.

use crate::engine::RunResult;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while the pool is working
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a header describing the changes about to be made
pub fn print_header(
    file_perms: &str,
    dir_perms: &str,
    group: Option<&str>,
    nontrivial: bool,
    workers: usize,
    batch_size: usize,
) {
    println!();
    println!(
        "{} {}",
        style("fastperm").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    if nontrivial {
        println!("  {} {}", style("Files:").bold(), file_perms);
        println!("  {} {}", style("Dirs:").bold(), dir_perms);
    }
    if let Some(group) = group {
        println!("  {} {}", style("Group:").bold(), group);
    }
    println!(
        "  {} {} ({} paths/batch)",
        style("Workers:").bold(),
        workers,
        batch_size
    );
    println!();
}

/// Print the final throughput summary
pub fn print_summary(result: &RunResult) {
    let secs = result.duration.as_secs_f64();
    let per_entry = match result.seconds_per_entry() {
        Some(s) => format!("{:.5}", s),
        None => "NA".to_string(),
    };
    let noun = if result.total_entries == 1 {
        "entry"
    } else {
        "entries"
    };

    println!(
        "set permissions on {} {} in {:.3} seconds ({} s/entry; {:.1} entries/s)",
        format_number(result.total_entries),
        noun,
        secs,
        per_entry,
        result.entries_per_second(),
    );

    if result.has_failures() {
        println!(
            "{} {} change invocation(s) failed",
            style("warning:").yellow().bold(),
            format_number(result.failed_invocations)
        );
    }
}
