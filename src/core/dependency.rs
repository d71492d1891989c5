//! Dependency entries declared by a manifest.
//!
//! A dependency is either internal (it names another manifest in the same
//! workspace and takes part in graph validation) or external (fetched from
//! somewhere else, informational only).

use serde::{Deserialize, Serialize};

/// Dependency `type` values treated as internal when nothing is configured.
pub const DEFAULT_INTERNAL_TYPES: &[&str] = &["workspace", "local", "path"];

/// A dependency declared in a manifest's `dependencies` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dependency {
    /// Name of the required package
    pub name: String,

    /// Source type (`git`, `workspace`, ...)
    #[serde(rename = "type")]
    pub kind: String,

    /// Source location
    pub url: String,
}

/// Whether a dependency takes part in the workspace graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// Expected to be another manifest in the workspace
    Internal,
    /// Sourced from outside the workspace
    External,
}

impl Dependency {
    /// Create a dependency.
    pub fn new(name: impl Into<String>, kind: impl Into<String>, url: impl Into<String>) -> Self {
        Dependency {
            name: name.into(),
            kind: kind.into(),
            url: url.into(),
        }
    }

    /// Create an internal dependency on another workspace manifest.
    pub fn workspace(name: impl Into<String>) -> Self {
        Dependency::new(name, "workspace", "")
    }

    /// Classify this dependency.
    ///
    /// A `type` listed in `internal_types` (case-insensitive, surrounding
    /// whitespace ignored on both sides) is internal. An
    /// entry with neither `type` nor `url` is a bare name reference and is
    /// internal as well. Everything else is external.
    pub fn classify<S: AsRef<str>>(&self, internal_types: &[S]) -> DependencyKind {
        let kind = self.kind.trim();

        if kind.is_empty() {
            return if self.url.trim().is_empty() {
                DependencyKind::Internal
            } else {
                DependencyKind::External
            };
        }

        if internal_types
            .iter()
            .any(|t| t.as_ref().trim().eq_ignore_ascii_case(kind))
        {
            DependencyKind::Internal
        } else {
            DependencyKind::External
        }
    }

    /// Check whether this dependency is internal under the given types.
    pub fn is_internal<S: AsRef<str>>(&self, internal_types: &[S]) -> bool {
        self.classify(internal_types) == DependencyKind::Internal
    }
}
