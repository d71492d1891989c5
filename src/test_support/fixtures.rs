//! Test fixtures for common test scenarios.
//!
//! `WorkspaceFixture` collects manifests and raw files, then writes them all
//! into a fresh temporary directory.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::dependency::Dependency;
use crate::core::manifest::{Author, ManifestRecord, MANIFEST_NAME};

use super::write_file;

/// Builder for a single manifest.
#[derive(Debug, Clone)]
pub struct ManifestFixture {
    record: ManifestRecord,
}

impl ManifestFixture {
    /// A valid manifest with the given name and version `1.0.0`.
    pub fn new(name: impl Into<String>) -> Self {
        ManifestFixture {
            record: ManifestRecord::new(name, "1.0.0"),
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.record.version = version.into();
        self
    }

    pub fn homepage(mut self, homepage: impl Into<String>) -> Self {
        self.record.homepage = homepage.into();
        self
    }

    pub fn license(mut self, license: impl Into<String>) -> Self {
        self.record.license = license.into();
        self
    }

    pub fn author(mut self, name: impl Into<String>) -> Self {
        self.record.authors.push(Author {
            name: name.into(),
            ..Author::default()
        });
        self
    }

    /// Add an internal (`workspace`) dependency.
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.record.dependencies.push(Dependency::workspace(name));
        self
    }

    /// Add an external (`git`) dependency.
    pub fn external(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.record
            .dependencies
            .push(Dependency::new(name, "git", url));
        self
    }

    pub fn record(&self) -> &ManifestRecord {
        &self.record
    }

    /// Serialize to manifest JSON.
    pub fn to_json(&self) -> String {
        self.record.to_json().unwrap()
    }
}

/// Builder for a directory tree of manifests.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceFixture {
    /// Files to write (path relative to the root -> content)
    files: Vec<(PathBuf, String)>,
}

impl WorkspaceFixture {
    pub fn new() -> Self {
        WorkspaceFixture::default()
    }

    /// Add a manifest at `<name>/sherpa.json`.
    pub fn manifest(
        self,
        name: &str,
        build: impl FnOnce(ManifestFixture) -> ManifestFixture,
    ) -> Self {
        self.manifest_at(name, name, build)
    }

    /// Add a manifest named `name` at `<dir>/sherpa.json`.
    pub fn manifest_at(
        mut self,
        dir: &str,
        name: &str,
        build: impl FnOnce(ManifestFixture) -> ManifestFixture,
    ) -> Self {
        let manifest = build(ManifestFixture::new(name));
        self.files
            .push((Path::new(dir).join(MANIFEST_NAME), manifest.to_json()));
        self
    }

    /// Add an arbitrary file.
    pub fn raw(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.files.push((path.into(), contents.into()));
        self
    }

    /// Write everything into a new temporary directory.
    pub fn build(self) -> BuiltWorkspace {
        let tmp = TempDir::new().unwrap();
        for (rel, contents) in &self.files {
            write_file(&tmp.path().join(rel), contents);
        }
        BuiltWorkspace { tmp }
    }
}

/// A workspace written to disk. The directory is removed on drop.
#[derive(Debug)]
pub struct BuiltWorkspace {
    tmp: TempDir,
}

impl BuiltWorkspace {
    pub fn root(&self) -> &Path {
        self.tmp.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_fixture_layout() {
        let ws = WorkspaceFixture::new()
            .manifest("app", |m| m.depends_on("core"))
            .manifest_at("libs/core", "core", |m| m.license("MIT"))
            .raw("notes.txt", "hello")
            .build();

        assert!(ws.root().join("app/sherpa.json").is_file());
        assert!(ws.root().join("libs/core/sherpa.json").is_file());
        assert!(ws.root().join("notes.txt").is_file());

        let text = std::fs::read_to_string(ws.root().join("app/sherpa.json")).unwrap();
        let record: ManifestRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(record.name, "app");
        assert_eq!(record.dependencies[0].name, "core");
    }

    #[test]
    fn test_manifest_fixture_defaults_are_valid() {
        let m = ManifestFixture::new("core");
        assert_eq!(m.record().version, "1.0.0");
        assert!(m.record().dependencies.is_empty());
    }
}
