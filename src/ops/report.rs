//! Final report assembly.
//!
//! The aggregator merges what every stage produced (scan warnings, load
//! failures, field errors already attached to each manifest, and graph errors)
//! into one [`Report`]. Every manifest in the map appears in the report, with
//! an empty error list when it is fully valid.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::error::ManifestError;
use crate::core::workspace::ManifestMap;
use crate::ops::graph::GraphError;
use crate::ops::scan::ScanWarning;
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::fs::relative_path;

/// Errors for one manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestReport {
    pub location: PathBuf,
    pub errors: Vec<ManifestError>,
}

impl ManifestReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A file that never made it into the manifest map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: ManifestError,
}

/// Totals over a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Manifests in the map
    pub manifests: usize,
    /// Manifests with no errors
    pub valid: usize,
    /// Errors across manifests and load failures
    pub errors: usize,
    pub load_failures: usize,
    pub warnings: usize,
}

/// Outcome of checking one workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub root: PathBuf,
    pub target: String,
    pub manifests: BTreeMap<String, ManifestReport>,
    pub load_failures: Vec<LoadFailure>,
    pub warnings: Vec<ScanWarning>,
    pub summary: Summary,
}

impl Report {
    /// True when nothing anywhere is wrong. Warnings do not count.
    pub fn is_clean(&self) -> bool {
        self.summary.errors == 0
    }

    /// Errors for one manifest, if it is in the report.
    pub fn errors_for(&self, name: &str) -> Option<&[ManifestError]> {
        self.manifests.get(name).map(|m| m.errors.as_slice())
    }

    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Terminal diagnostics, in report order: warnings, load failures, then
    /// manifest errors by name.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut out = Vec::new();

        for warning in &self.warnings {
            out.push(
                Diagnostic::warning(format!("skipped: {}", warning.message))
                    .with_location(self.display_path(&warning.path)),
            );
        }

        for failure in &self.load_failures {
            out.push(
                Diagnostic::from_manifest_error(&failure.error)
                    .with_location(self.display_path(&failure.path)),
            );
        }

        for (name, manifest) in &self.manifests {
            for err in &manifest.errors {
                out.push(
                    Diagnostic::from_manifest_error(err)
                        .with_location(self.display_path(&manifest.location))
                        .with_context(format!("manifest: {}", name)),
                );
            }
        }

        out
    }

    /// Render for a terminal.
    pub fn render_human(&self, color: bool) -> String {
        let mut output = String::new();

        for diag in self.diagnostics() {
            output.push_str(&diag.format(color));
            output.push('\n');
        }

        if self.summary.manifests == 0 && self.load_failures.is_empty() {
            output.push_str(
                &Diagnostic::note(format!(
                    "no `{}` manifests found under {}",
                    self.target,
                    self.root.display()
                ))
                .with_suggestion(suggestions::NO_MANIFESTS)
                .format(color),
            );
        }

        output.push_str(&format!(
            "Checked {} manifest(s): {} valid, {} error(s), {} warning(s)\n",
            self.summary.manifests, self.summary.valid, self.summary.errors, self.summary.warnings
        ));

        if !self.is_clean() {
            output.push_str(&Diagnostic::note(suggestions::SEE_JSON).format(color));
        }

        output
    }

    fn display_path(&self, path: &Path) -> PathBuf {
        relative_path(&self.root, path)
    }
}

/// Collects run-level problems, then merges them with the manifest map.
#[derive(Debug, Clone)]
pub struct ErrorAggregator {
    root: PathBuf,
    target: String,
    load_failures: Vec<LoadFailure>,
    warnings: Vec<ScanWarning>,
}

impl ErrorAggregator {
    pub fn new(root: impl Into<PathBuf>, target: impl Into<String>) -> Self {
        ErrorAggregator {
            root: root.into(),
            target: target.into(),
            load_failures: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add scan warnings.
    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = ScanWarning>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    /// Add files that failed to load.
    pub fn with_load_failures(mut self, failures: impl IntoIterator<Item = LoadFailure>) -> Self {
        self.load_failures.extend(failures);
        self
    }

    /// Record a file that could not be loaded or inserted.
    pub fn record_load_failure(&mut self, path: impl Into<PathBuf>, error: ManifestError) {
        self.load_failures.push(LoadFailure {
            path: path.into(),
            error,
        });
    }

    /// Build the report.
    ///
    /// Each manifest gets the errors already in its metadata plus every graph
    /// error that involves it. The merged list is stably sorted by code, so
    /// errors sharing a code keep the order their stage produced them in.
    pub fn finish(mut self, map: &ManifestMap, graph_errors: &[GraphError]) -> Report {
        let mut manifests: BTreeMap<String, ManifestReport> = map
            .iter()
            .map(|(name, entry)| {
                (
                    name.to_string(),
                    ManifestReport {
                        location: entry.location().to_path_buf(),
                        errors: entry.meta.errors.clone(),
                    },
                )
            })
            .collect();

        for graph_error in graph_errors {
            let report_error = graph_error.to_manifest_error();
            for name in graph_error.involved() {
                if let Some(manifest) = manifests.get_mut(name) {
                    manifest.errors.push(report_error.clone());
                }
            }
        }

        for manifest in manifests.values_mut() {
            manifest.errors.sort_by_key(|e| e.code);
        }

        self.load_failures.sort_by(|a, b| {
            a.path
                .cmp(&b.path)
                .then_with(|| a.error.report_order(&b.error))
        });
        self.warnings.sort_by(|a, b| a.path.cmp(&b.path));

        let manifest_errors: usize = manifests.values().map(|m| m.errors.len()).sum();
        let summary = Summary {
            manifests: manifests.len(),
            valid: manifests.values().filter(|m| m.is_valid()).count(),
            errors: manifest_errors + self.load_failures.len(),
            load_failures: self.load_failures.len(),
            warnings: self.warnings.len(),
        };

        Report {
            root: self.root,
            target: self.target,
            manifests,
            load_failures: self.load_failures,
            warnings: self.warnings,
            summary,
        }
    }
}
