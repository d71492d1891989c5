//! Implementation of `sherpa check`.
//!
//! Runs the whole pipeline for one workspace:
//!
//! 1. scan for manifest files (fails fast only on bad scan settings or
//!    cancellation)
//! 2. load and field-validate every file on a worker pool
//! 3. insert results into the [`ManifestMap`] from a single thread
//! 4. validate the dependency graph once the map is complete
//! 5. aggregate everything into a [`Report`]

use std::path::{Path, PathBuf};
use std::time::Duration;

use rayon::prelude::*;
use thiserror::Error;

use crate::core::manifest::{LoadError, LoadedManifest, ManifestLoader};
use crate::core::workspace::ManifestMap;
use crate::ops::graph::validate_graph;
use crate::ops::report::{ErrorAggregator, LoadFailure, Report};
use crate::ops::scan::{CancelToken, ManifestScanner, ScanError, ScanWarning};
use crate::ops::validate::{FieldValidatorPipeline, ValidationPolicy};
use crate::util::config::Config;
use crate::util::fs::absolute_path;

/// Options for a check run.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Manifest file name
    pub target: String,

    /// Directory-name globs to skip
    pub exclude: Vec<String>,

    /// Scan timeout
    pub timeout: Option<Duration>,

    /// Field validation settings
    pub policy: ValidationPolicy,

    /// Dependency types that point inside the workspace
    pub internal_types: Vec<String>,

    /// Worker threads (None = one per core)
    pub jobs: Option<usize>,

    /// Fail when the workspace holds no manifest
    pub require_manifests: bool,

    /// External cancellation signal
    pub cancel: CancelToken,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl CheckOptions {
    /// Options taken from a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        CheckOptions {
            target: config.target().to_string(),
            exclude: config.exclude(),
            timeout: config.timeout(),
            policy: config.policy(),
            internal_types: config.internal_types(),
            jobs: config.check.jobs,
            require_manifests: config.check.require_manifests,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// A run-level failure: no report can be produced.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("no `{target}` manifests found under {}", root.display())]
    NoManifests { root: PathBuf, target: String },

    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Every manifest of a workspace, loaded and field-validated.
#[derive(Debug, Clone)]
pub struct LoadedWorkspace {
    pub root: PathBuf,
    pub map: ManifestMap,
    pub load_failures: Vec<LoadFailure>,
    pub warnings: Vec<ScanWarning>,
}

/// Discover, load and field-validate every manifest under `root`.
pub fn load_workspace(root: &Path, opts: &CheckOptions) -> Result<LoadedWorkspace, CheckError> {
    let root = absolute_path(root);

    let mut cancel = opts.cancel.clone();
    if let Some(timeout) = opts.timeout {
        cancel = cancel.with_timeout(timeout);
    }

    let scanner = ManifestScanner::new()
        .with_exclude(&opts.exclude)?
        .with_cancel(cancel);
    let outcome = scanner.scan(&root, &opts.target)?;

    let mut paths = outcome.paths;
    paths.sort();
    tracing::info!(
        "Found {} `{}` manifest(s) under {}",
        paths.len(),
        opts.target,
        root.display()
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.jobs.unwrap_or(0))
        .build()?;
    let pipeline = FieldValidatorPipeline::with_defaults(opts.policy.clone());

    let loaded: Vec<Result<LoadedManifest, LoadError>> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| load_and_validate(path, &pipeline))
            .collect()
    });

    // Single writer: results arrive in path order, so the first file to
    // claim a name is the one that stays.
    let mut map = ManifestMap::new();
    let mut load_failures = Vec::new();
    for result in loaded {
        match result {
            // Unnamed manifests stay out of the name-keyed map. Their
            // errors are reported against the file instead.
            Ok(manifest) if manifest.record.name.trim().is_empty() => {
                let path = manifest.meta.on_disk_location;
                tracing::warn!("{}: manifest has no name", path.display());
                load_failures.extend(manifest.meta.errors.into_iter().map(|error| LoadFailure {
                    path: path.clone(),
                    error,
                }));
            }
            Ok(manifest) => {
                if let Err(dup) = map.insert(manifest) {
                    tracing::warn!("{}: {}", dup.rejected.display(), dup);
                    let path = dup.rejected.clone();
                    load_failures.extend(dup.into_manifest_errors().into_iter().map(|error| {
                        LoadFailure {
                            path: path.clone(),
                            error,
                        }
                    }));
                }
            }
            Err(err) => {
                tracing::warn!("{}", err.developer_message());
                load_failures.push(LoadFailure {
                    path: err.path().to_path_buf(),
                    error: err.to_manifest_error(),
                });
            }
        }
    }

    if map.is_empty() && opts.require_manifests {
        return Err(CheckError::NoManifests {
            root,
            target: opts.target.clone(),
        });
    }

    Ok(LoadedWorkspace {
        root,
        map,
        load_failures,
        warnings: outcome.warnings,
    })
}

fn load_and_validate(
    path: &Path,
    pipeline: &FieldValidatorPipeline,
) -> Result<LoadedManifest, LoadError> {
    tracing::debug!("Loading {}", path.display());
    let mut manifest = ManifestLoader::load(path)?;
    manifest.meta.errors = pipeline.validate_to_errors(&manifest.record);
    Ok(manifest)
}

/// Check the workspace under `root` and build its report.
pub fn check_workspace(root: &Path, opts: &CheckOptions) -> Result<Report, CheckError> {
    let workspace = load_workspace(root, opts)?;

    let graph_errors = validate_graph(&workspace.map, &opts.internal_types);

    let report = ErrorAggregator::new(workspace.root, opts.target.clone())
        .with_warnings(workspace.warnings)
        .with_load_failures(workspace.load_failures)
        .finish(&workspace.map, &graph_errors);

    tracing::info!(
        "Checked {} manifest(s): {} valid, {} error(s)",
        report.summary.manifests,
        report.summary.valid,
        report.summary.errors
    );

    Ok(report)
}

/// Check a workspace with default options.
pub fn check(root: &Path) -> Result<Report, CheckError> {
    check_workspace(root, &CheckOptions::default())
}
