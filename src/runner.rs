//! Batch orchestration: discovery feeding a pool of rewrite workers.
//!
//! Discovery runs on its own thread and pushes paths into a bounded queue.
//! Each worker takes one path at a time and runs its whole pipeline (read,
//! rewrite, write back). Workers send a [`FileReport`] per file back to the
//! calling thread, which is the only place counts are tallied.

use crate::config::VitestifyConfig;
use crate::discovery::{discover, DiscoveryError, FileFilter};
use crate::edit::{write_back, EditError, Fingerprint};
use crate::rewrite::{read_source, rewrite_source, Outcome, RewriteError, RewriteOptions};
use crate::safety::{SafetyError, WorkspaceGuard};
use crossbeam_channel::{bounded, unbounded};
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;
use thiserror::Error;

/// Deeply nested test files make for deep syntax trees.
const WORKER_STACK_SIZE: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Write rewritten files back to disk.
    #[default]
    Write,
    /// Report what would change without writing.
    DryRun,
    /// Like a dry run; callers treat any rewrite as a failure.
    Check,
}

impl RunMode {
    pub fn writes(self) -> bool {
        self == RunMode::Write
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub mode: RunMode,
    /// Overrides the configured worker range.
    pub workers: Option<usize>,
    /// Keep original and rewritten text in reports, for diff output.
    pub capture_output: bool,
}

/// Per-file failure. None of these stop the batch on their own.
#[derive(Error, Debug)]
pub enum FileError {
    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error("write failed: {0}")]
    Write(#[from] EditError),

    #[error(transparent)]
    Safety(#[from] SafetyError),

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("rewrite panicked: {0}")]
    Panicked(String),
}

impl FileError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, FileError::Rewrite(err) if err.is_fatal())
    }
}

#[derive(Debug)]
pub enum FileOutcome {
    Rewritten {
        /// Original and rewritten text, when captured.
        texts: Option<(String, String)>,
    },
    Unchanged,
    Failed(FileError),
}

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

impl FileReport {
    fn is_fatal(&self) -> bool {
        matches!(&self.outcome, FileOutcome::Failed(err) if err.is_fatal())
    }
}

/// Errors that stop the whole batch.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("cannot use {} as repository root: {source}", path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: SafetyError,
    },

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("{}: {source}", path.display())]
    Fatal {
        path: PathBuf,
        #[source]
        source: FileError,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FailureEntry {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub rewritten: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub workers: usize,
    pub elapsed_ms: u64,
    pub failures: Vec<FailureEntry>,
}

impl RunSummary {
    fn record(&mut self, report: &FileReport) {
        match &report.outcome {
            FileOutcome::Rewritten { .. } => self.rewritten += 1,
            FileOutcome::Unchanged => self.unchanged += 1,
            FileOutcome::Failed(err) => {
                self.failed += 1;
                self.failures.push(FailureEntry {
                    path: report.path.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    pub fn total(&self) -> usize {
        self.rewritten + self.unchanged + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// State shared read-only by every worker.
struct WorkerContext<'a> {
    guard: &'a WorkspaceGuard,
    rewrite: &'a RewriteOptions,
    options: &'a RunOptions,
}

/// Rewrite every matching file under `root`.
///
/// `observe` is called on the calling thread once per finished file.
pub fn run<F>(
    root: &Path,
    config: &VitestifyConfig,
    options: &RunOptions,
    mut observe: F,
) -> Result<RunSummary, RunError>
where
    F: FnMut(&FileReport),
{
    let started = Instant::now();

    let guard = WorkspaceGuard::new(root).map_err(|source| RunError::Root {
        path: root.to_path_buf(),
        source,
    })?;
    let filter = FileFilter::from_config(&config.discovery)?;
    let worker_count = config.workers.resolve(options.workers);

    let (path_tx, path_rx) = bounded::<PathBuf>(config.workers.queue_depth.max(1));
    let (report_tx, report_rx) = unbounded::<FileReport>();
    let halt = AtomicBool::new(false);

    let context = WorkerContext {
        guard: &guard,
        rewrite: &config.rewrite,
        options,
    };
    let context = &context;
    let halt = &halt;
    let filter = &filter;
    let observe = &mut observe;

    let (mut summary, fatal) = thread::scope(move |scope| -> Result<_, RunError> {
        for index in 0..worker_count {
            let paths = path_rx.clone();
            let reports = report_tx.clone();
            thread::Builder::new()
                .name(format!("vitestify-worker-{index}"))
                .stack_size(WORKER_STACK_SIZE)
                .spawn_scoped(scope, move || {
                    for path in paths.iter() {
                        // Keep draining after a halt so discovery never blocks
                        if halt.load(Ordering::Relaxed) {
                            continue;
                        }
                        let report = process_file(path, context);
                        if report.is_fatal() {
                            halt.store(true, Ordering::Relaxed);
                        }
                        if reports.send(report).is_err() {
                            break;
                        }
                    }
                })
                .map_err(RunError::Spawn)?;
        }
        drop(path_rx);

        let walk_reports = report_tx.clone();
        let root = context.guard.workspace_root();
        scope.spawn(move || {
            discover(root, filter, |entry| {
                if halt.load(Ordering::Relaxed) {
                    return false;
                }
                match entry {
                    Ok(path) => path_tx.send(path).is_ok(),
                    Err(err) => {
                        let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                        walk_reports
                            .send(FileReport {
                                path,
                                outcome: FileOutcome::Failed(FileError::Walk(err)),
                            })
                            .is_ok()
                    }
                }
            });
            // path_tx drops here, closing the queue
        });
        drop(report_tx);

        let mut summary = RunSummary {
            workers: worker_count,
            ..RunSummary::default()
        };
        let mut fatal = None;
        for report in report_rx.iter() {
            if report.is_fatal() {
                fatal.get_or_insert(report);
                continue;
            }
            summary.record(&report);
            observe(&report);
        }
        Ok((summary, fatal))
    })?;

    if let Some(report) = fatal {
        if let FileOutcome::Failed(source) = report.outcome {
            return Err(RunError::Fatal {
                path: report.path,
                source,
            });
        }
    }

    summary.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    Ok(summary)
}

fn process_file(path: PathBuf, context: &WorkerContext<'_>) -> FileReport {
    let result = panic::catch_unwind(AssertUnwindSafe(|| rewrite_one(&path, context)));

    let outcome = match result {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(err)) => FileOutcome::Failed(err),
        Err(payload) => FileOutcome::Failed(FileError::Panicked(panic_message(payload))),
    };

    FileReport { path, outcome }
}

fn rewrite_one(path: &Path, context: &WorkerContext<'_>) -> Result<FileOutcome, FileError> {
    let source = read_source(path)?;
    let fingerprint = Fingerprint::of(source.as_bytes());
    let original = context.options.capture_output.then(|| source.clone());

    let output = match rewrite_source(path, source, context.rewrite)? {
        Outcome::NoOp => return Ok(FileOutcome::Unchanged),
        Outcome::Rewritten(output) => output,
    };

    if context.options.mode.writes() {
        let target = context.guard.validate_path(path)?;
        write_back(&target, &output, fingerprint)?;
    }

    Ok(FileOutcome::Rewritten {
        texts: original.map(|original| (original, output)),
    })
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts() {
        let mut summary = RunSummary::default();
        summary.record(&FileReport {
            path: PathBuf::from("a.test.ts"),
            outcome: FileOutcome::Rewritten { texts: None },
        });
        summary.record(&FileReport {
            path: PathBuf::from("b.test.ts"),
            outcome: FileOutcome::Unchanged,
        });
        summary.record(&FileReport {
            path: PathBuf::from("c.test.ts"),
            outcome: FileOutcome::Failed(FileError::Panicked("boom".to_string())),
        });

        assert_eq!(summary.total(), 3);
        assert!(summary.has_failures());
        assert_eq!(summary.failures[0].path, PathBuf::from("c.test.ts"));
        assert_eq!(summary.failures[0].error, "rewrite panicked: boom");
    }

    #[test]
    fn panic_payloads() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new(String::from("owned"))), "owned");
        assert_eq!(panic_message(Box::new(42)), "unknown panic payload");
    }

    #[test]
    fn summary_serializes() {
        let summary = RunSummary {
            rewritten: 2,
            workers: 4,
            ..RunSummary::default()
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["rewritten"], 2);
        assert_eq!(json["workers"], 4);
        assert!(json["failures"].as_array().unwrap().is_empty());
    }
}
