//! Manifest discovery.
//!
//! Walks a directory tree and collects every file whose base name equals the
//! target manifest name. Unreadable entries become warnings instead of
//! aborting the walk, and a [`CancelToken`] can stop the walk early, in which
//! case the partial result is returned inside the error.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use glob::Pattern;
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;
use walkdir::WalkDir;

use crate::util::fs::absolute_path;

/// A path that could not be visited during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanWarning {
    pub path: PathBuf,
    pub message: String,
}

/// Paths found by a scan, plus anything that had to be skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Absolute manifest paths, in walk order
    pub paths: Vec<PathBuf>,

    pub warnings: Vec<ScanWarning>,
}

/// Scan failure.
#[derive(Debug, Error, Diagnostic)]
pub enum ScanError {
    #[error("no manifest file name to look for")]
    #[diagnostic(
        code(sherpa::scan::empty_target),
        help("Set `scan.target` in .sherpa/config.toml or pass --target")
    )]
    EmptyTargetName,

    #[error("invalid exclude pattern `{pattern}`: {reason}")]
    #[diagnostic(
        code(sherpa::scan::invalid_exclude),
        help("Exclude patterns use glob syntax, e.g. `node_modules` or `build-*`")
    )]
    InvalidExclude { pattern: String, reason: String },

    #[error("scan cancelled after finding {} manifest(s)", partial.paths.len())]
    #[diagnostic(code(sherpa::scan::cancelled))]
    Cancelled { partial: ScanOutcome },

    #[error("scan timed out after finding {} manifest(s)", partial.paths.len())]
    #[diagnostic(
        code(sherpa::scan::timed_out),
        help("Raise `scan.timeout_secs` or scan a smaller directory")
    )]
    TimedOut { partial: ScanOutcome },
}

impl ScanError {
    /// Whether the error comes from invalid scan settings (raised before any I/O).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ScanError::EmptyTargetName | ScanError::InvalidExclude { .. }
        )
    }

    /// Paths discovered before the scan was interrupted, if it was.
    pub fn partial(&self) -> Option<&ScanOutcome> {
        match self {
            ScanError::Cancelled { partial } | ScanError::TimedOut { partial } => Some(partial),
            _ => None,
        }
    }
}

/// Why a scan stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interruption {
    Cancelled,
    TimedOut,
}

/// Cooperative cancellation signal shared between a scan and its caller.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// Create a token that never fires on its own.
    pub fn new() -> Self {
        CancelToken::default()
    }

    /// Fire automatically once `timeout` has elapsed from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Request cancellation. Every clone of this token observes it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Check whether work should stop, and why.
    pub fn interruption(&self) -> Option<Interruption> {
        if self.is_cancelled() {
            return Some(Interruption::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Interruption::TimedOut),
            _ => None,
        }
    }
}

/// What to look for and what to do with each hit.
pub struct ScanStrategy<F> {
    /// Base name a file must have to count as a manifest
    pub target_name: String,

    /// Called once per discovered path, in walk order
    pub on_found: F,
}

fn ignore_path(_: &Path) {}

impl ScanStrategy<fn(&Path)> {
    /// A strategy that only collects paths.
    pub fn collect(target_name: impl Into<String>) -> Self {
        ScanStrategy {
            target_name: target_name.into(),
            on_found: ignore_path,
        }
    }
}

impl<F: FnMut(&Path)> ScanStrategy<F> {
    /// Create a strategy with a per-path handler.
    pub fn new(target_name: impl Into<String>, on_found: F) -> Self {
        ScanStrategy {
            target_name: target_name.into(),
            on_found,
        }
    }
}

/// Recursive manifest finder.
#[derive(Debug, Clone, Default)]
pub struct ManifestScanner {
    exclude: Vec<Pattern>,
    cancel: CancelToken,
}

impl ManifestScanner {
    /// Create a scanner with no exclusions.
    pub fn new() -> Self {
        ManifestScanner::default()
    }

    /// Never descend into directories whose name matches one of `patterns`.
    pub fn with_exclude<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self, ScanError> {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let compiled = Pattern::new(pattern).map_err(|e| ScanError::InvalidExclude {
                pattern: pattern.to_string(),
                reason: e.msg.to_string(),
            })?;
            self.exclude.push(compiled);
        }
        Ok(self)
    }

    /// Observe `cancel` between directory entries.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Collect every file under `root` named `target_name`.
    pub fn scan(&self, root: &Path, target_name: &str) -> Result<ScanOutcome, ScanError> {
        self.scan_with(root, &mut ScanStrategy::collect(target_name))
    }

    /// Walk `root`, invoking the strategy's handler for every match.
    pub fn scan_with<F: FnMut(&Path)>(
        &self,
        root: &Path,
        strategy: &mut ScanStrategy<F>,
    ) -> Result<ScanOutcome, ScanError> {
        if strategy.target_name.is_empty() {
            return Err(ScanError::EmptyTargetName);
        }

        let root = absolute_path(root);
        tracing::debug!(
            "Scanning {} for `{}`",
            root.display(),
            strategy.target_name
        );

        let mut outcome = ScanOutcome::default();
        let mut walker = WalkDir::new(&root).sort_by_file_name().into_iter();

        loop {
            if let Some(reason) = self.cancel.interruption() {
                tracing::warn!(
                    "Scan of {} interrupted with {} manifest(s) found",
                    root.display(),
                    outcome.paths.len()
                );
                return Err(match reason {
                    Interruption::Cancelled => ScanError::Cancelled { partial: outcome },
                    Interruption::TimedOut => ScanError::TimedOut { partial: outcome },
                });
            }

            let entry = match walker.next() {
                None => break,
                Some(Ok(entry)) => entry,
                Some(Err(err)) => {
                    let path = err.path().unwrap_or(&root).to_path_buf();
                    tracing::warn!("Skipping {}: {}", path.display(), err);
                    outcome.warnings.push(ScanWarning {
                        path,
                        message: err.to_string(),
                    });
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                if entry.depth() > 0 && self.is_excluded(entry.file_name()) {
                    tracing::debug!("Excluding {}", entry.path().display());
                    walker.skip_current_dir();
                }
                continue;
            }

            if entry.file_name() == strategy.target_name.as_str() {
                let path = entry.into_path();
                (strategy.on_found)(&path);
                outcome.paths.push(path);
            }
        }

        tracing::debug!(
            "Found {} manifest(s), {} warning(s)",
            outcome.paths.len(),
            outcome.warnings.len()
        );
        Ok(outcome)
    }

    fn is_excluded(&self, name: &std::ffi::OsStr) -> bool {
        let name = name.to_string_lossy();
        self.exclude.iter().any(|p| p.matches(&name))
    }
}

/// Collect every file under `root` named `target_name`, with default settings.
pub fn scan(root: &Path, target_name: &str) -> Result<ScanOutcome, ScanError> {
    ManifestScanner::new().scan(root, target_name)
}
