//! Integration tests for fastperm
//!
//! The engine is exercised against real temporary directory trees. A
//! recording executor stands in for chmod/chgrp so the tests can
//! assert batching and ordering properties; one unix-only test runs
//! the real CommandExecutor end to end.

use fastperm::config::RunConfig;
use fastperm::engine::ChangePool;
use fastperm::error::{ExecError, ExecResult};
use fastperm::exec::ChangeExecutor;
use fastperm::perms::ModeSpec;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// One recorded change invocation
#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Group { group: String, paths: Vec<PathBuf> },
    Mode { perms: String, paths: Vec<PathBuf> },
}

impl Call {
    fn paths(&self) -> &[PathBuf] {
        match self {
            Call::Group { paths, .. } | Call::Mode { paths, .. } => paths,
        }
    }
}

/// Executor that records every invocation instead of touching the OS
#[derive(Default)]
struct RecordingExecutor {
    calls: Mutex<Vec<Call>>,
    fail_mode_changes: bool,
}

impl RecordingExecutor {
    fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_mode_changes: true,
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl ChangeExecutor for RecordingExecutor {
    fn change_group(&self, group: &str, paths: &[PathBuf]) -> ExecResult<()> {
        self.calls.lock().unwrap().push(Call::Group {
            group: group.to_string(),
            paths: paths.to_vec(),
        });
        Ok(())
    }

    fn change_mode(&self, perms: &str, paths: &[PathBuf]) -> ExecResult<()> {
        self.calls.lock().unwrap().push(Call::Mode {
            perms: perms.to_string(),
            paths: paths.to_vec(),
        });
        if self.fail_mode_changes {
            Err(ExecError::CommandFailed {
                program: "chmod".into(),
                code: 1,
                batch_len: paths.len(),
            })
        } else {
            Ok(())
        }
    }
}

fn config(
    paths: Vec<PathBuf>,
    file_perms: &str,
    dir_perms: &str,
    group: Option<&str>,
    workers: usize,
    batch_size: usize,
) -> RunConfig {
    RunConfig {
        paths,
        file_perms: ModeSpec::parse(file_perms).unwrap(),
        dir_perms: ModeSpec::parse(dir_perms).unwrap(),
        group: group.map(String::from),
        worker_count: workers,
        batch_size,
        quiet: true,
        verbose: false,
    }
}

/// Root with files f1, f2 and subdirectory b containing f3
fn small_tree() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("f1"), b"1").unwrap();
    std::fs::write(dir.path().join("f2"), b"2").unwrap();
    std::fs::create_dir(dir.path().join("b")).unwrap();
    std::fs::write(dir.path().join("b").join("f3"), b"3").unwrap();
    dir
}

fn wide_tree(files: usize) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..files {
        std::fs::write(dir.path().join(format!("f{:04}", i)), b"x").unwrap();
    }
    dir
}

/// Every path under `root`, plus root itself
fn all_entries(root: &Path) -> Vec<PathBuf> {
    let mut entries = vec![root.to_path_buf()];
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path.clone());
            }
            entries.push(path);
        }
    }
    entries
}

#[test]
fn test_small_tree_flush_and_drain() {
    let dir = small_tree();
    let executor = Arc::new(RecordingExecutor::default());

    // batch size 2, single worker: the file bucket flushes once at
    // threshold, then the drain covers the remaining 3 entries
    let result = ChangePool::new(
        config(
            vec![dir.path().to_path_buf()],
            "u+w",
            "u+rwx",
            None,
            1,
            2,
        ),
        Arc::clone(&executor) as Arc<dyn ChangeExecutor>,
    )
    .run()
    .unwrap();

    // root dir + f1 + f2 + b + f3
    assert_eq!(result.total_entries, 5);
    assert_eq!(result.entries_processed, 5);

    let calls = executor.calls();

    // No batch ever exceeds the threshold
    assert!(calls.iter().all(|c| c.paths().len() <= 2));

    // Exactly one threshold flush of the file bucket
    let full_file_flushes = calls
        .iter()
        .filter(|c| matches!(c, Call::Mode { perms, paths } if perms == "u+w" && paths.len() == 2))
        .count();
    assert_eq!(full_file_flushes, 1);

    // Dir bucket reached the threshold too (2 dirs); every path is
    // covered exactly once overall
    let mut seen: HashMap<PathBuf, usize> = HashMap::new();
    for call in &calls {
        for path in call.paths() {
            *seen.entry(path.clone()).or_default() += 1;
        }
    }
    assert_eq!(seen.len(), 5);
    assert!(seen.values().all(|&n| n == 1));

    // Classification is consistent: dirs only ever under u+rwx
    for call in &calls {
        if let Call::Mode { perms, paths } = call {
            for path in paths {
                let is_dir = path == dir.path() || path == &dir.path().join("b");
                assert_eq!(perms == "u+rwx", is_dir, "misclassified {:?}", path);
            }
        }
    }
}

#[test]
fn test_no_loss_no_duplication_across_workers() {
    let dir = wide_tree(64);
    let executor = Arc::new(RecordingExecutor::default());

    // batch size 128, 4 workers: all batches stay sub-threshold, so
    // only drain flushes fire
    let result = ChangePool::new(
        config(
            vec![dir.path().to_path_buf()],
            "u+w",
            "u+rwx",
            None,
            4,
            128,
        ),
        Arc::clone(&executor) as Arc<dyn ChangeExecutor>,
    )
    .run()
    .unwrap();

    // 64 files + 1 directory
    assert_eq!(result.total_entries, 65);
    assert_eq!(result.entries_processed, 65);
    assert!(!result.has_failures());

    let calls = executor.calls();
    assert!(calls.iter().all(|c| c.paths().len() <= 128));

    // Every reachable entry changed exactly once, across all workers
    let mut seen: HashMap<PathBuf, usize> = HashMap::new();
    for call in &calls {
        for path in call.paths() {
            *seen.entry(path.clone()).or_default() += 1;
        }
    }
    let expected = all_entries(dir.path());
    assert_eq!(seen.len(), expected.len());
    for path in expected {
        assert_eq!(seen.get(&path), Some(&1), "missing or duplicated {:?}", path);
    }
}

#[test]
fn test_group_change_precedes_mode_change_per_batch() {
    let dir = wide_tree(7);
    let executor = Arc::new(RecordingExecutor::default());

    ChangePool::new(
        config(
            vec![dir.path().to_path_buf()],
            "u+w",
            "u+rwx",
            Some("staff"),
            1,
            3,
        ),
        Arc::clone(&executor) as Arc<dyn ChangeExecutor>,
    )
    .run()
    .unwrap();

    // Single worker, so calls are sequential: each flush emits a group
    // call immediately followed by the mode call over the same paths
    let calls = executor.calls();
    assert_eq!(calls.len() % 2, 0);
    for pair in calls.chunks(2) {
        let (group_paths, mode_paths) = match pair {
            [Call::Group { group, paths: g }, Call::Mode { paths: m, .. }] => {
                assert_eq!(group, "staff");
                (g.clone(), m.clone())
            }
            other => panic!("expected group-then-mode pair, got {:?}", other),
        };
        let mut g = group_paths;
        let mut m = mode_paths;
        g.sort();
        m.sort();
        assert_eq!(g, m);
    }
}

#[test]
fn test_trivial_perms_only_change_group() {
    let dir = wide_tree(5);
    let executor = Arc::new(RecordingExecutor::default());

    ChangePool::new(
        config(
            vec![dir.path().to_path_buf()],
            "+",
            "+",
            Some("staff"),
            2,
            2,
        ),
        Arc::clone(&executor) as Arc<dyn ChangeExecutor>,
    )
    .run()
    .unwrap();

    let calls = executor.calls();
    assert!(!calls.is_empty());
    assert!(
        calls.iter().all(|c| matches!(c, Call::Group { .. })),
        "no-op permission string must never reach chmod"
    );
}

#[test]
fn test_mutation_failures_are_counted_not_fatal() {
    let dir = wide_tree(10);
    let executor = Arc::new(RecordingExecutor::failing());

    let result = ChangePool::new(
        config(
            vec![dir.path().to_path_buf()],
            "u+w",
            "u+rwx",
            None,
            2,
            4,
        ),
        Arc::clone(&executor) as Arc<dyn ChangeExecutor>,
    )
    .run()
    .unwrap();

    // The run completes despite every invocation failing
    assert_eq!(result.total_entries, 11);
    assert_eq!(result.entries_processed, 11);
    assert!(result.has_failures());
    assert_eq!(result.failed_invocations as usize, executor.calls().len());
}

#[test]
fn test_mixed_file_and_directory_targets() {
    let dir = small_tree();
    let standalone = tempfile::tempdir().unwrap();
    let lone_file = standalone.path().join("lone");
    std::fs::write(&lone_file, b"x").unwrap();

    let executor = Arc::new(RecordingExecutor::default());
    let result = ChangePool::new(
        config(
            vec![lone_file.clone(), dir.path().to_path_buf()],
            "u+w",
            "u+rwx",
            None,
            2,
            100,
        ),
        Arc::clone(&executor) as Arc<dyn ChangeExecutor>,
    )
    .run()
    .unwrap();

    // 1 standalone file + 5 tree entries
    assert_eq!(result.total_entries, 6);

    let changed: Vec<PathBuf> = executor
        .calls()
        .iter()
        .flat_map(|c| c.paths().to_vec())
        .collect();
    assert!(changed.contains(&lone_file));
}

#[cfg(unix)]
#[test]
fn test_real_chmod_end_to_end() {
    use fastperm::exec::CommandExecutor;
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let f1 = dir.path().join("f1");
    let f2 = dir.path().join("f2");
    for f in [&f1, &f2] {
        std::fs::write(f, b"x").unwrap();
        std::fs::set_permissions(f, std::fs::Permissions::from_mode(0o600)).unwrap();
    }

    let result = ChangePool::new(
        config(
            vec![dir.path().to_path_buf()],
            "u+x",
            "u+rwx",
            None,
            2,
            2,
        ),
        Arc::new(CommandExecutor::new(false)),
    )
    .run()
    .unwrap();

    assert_eq!(result.total_entries, 3);
    assert!(!result.has_failures());

    for f in [&f1, &f2] {
        let mode = std::fs::metadata(f).unwrap().permissions().mode();
        assert_eq!(mode & 0o700, 0o700, "u+x not applied to {:?}", f);
    }
}
