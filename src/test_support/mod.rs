//! Test utilities for Sherpa unit tests.
//!
//! Provides helpers for writing manifest trees into temporary directories.
//!
//! # Example
//!
//! ```rust,ignore
//! use sherpa::test_support::WorkspaceFixture;
//!
//! #[test]
//! fn test_example() {
//!     let ws = WorkspaceFixture::new()
//!         .manifest("app", |m| m.depends_on("core"))
//!         .manifest("core", |m| m)
//!         .build();
//!
//!     let report = sherpa::ops::check(ws.root()).unwrap();
//!     assert!(report.is_clean());
//! }
//! ```

pub mod fixtures;

use std::path::Path;

// Re-export fixtures for convenience
pub use fixtures::*;

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// A manifest using every schema field, with one external dependency.
pub fn full_manifest_json() -> &'static str {
    r#"{
  "name": "BTBurke/Test",
  "description": "A test sherpa file",
  "version": "0.1.0",
  "main": ["test.yaml"],
  "license": "MIT",
  "ignore": ["test/"],
  "keywords": ["test", "sherpa"],
  "authors": [
    {
      "name": "Bryan Burke",
      "email": "bryan@kilimanjaro.io",
      "homepage": "https://github.com/BTBurke"
    }
  ],
  "homepage": "https://github.com/BTBurke/Sherpa",
  "repository": {
    "type": "git",
    "url": "https://github.com/BTBurke/Sherpa"
  },
  "dependencies": [
    {
      "name": "BTBurke/SherpaDepTest",
      "type": "git",
      "url": "https://github.com/BTBurke/Sherpa/SherpaDepTest"
    }
  ],
  "osVersions": ["osx", "linux", "windows"],
  "private": false,
  "privateData": {
    "name": "test",
    "type": "file",
    "url": "",
    "file": "test_private_data.json"
  }
}"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_file_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a/b/c.json");
        write_file(&path, "{}");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_full_manifest_is_json() {
        let value: serde_json::Value = serde_json::from_str(full_manifest_json()).unwrap();
        assert_eq!(value["name"], "BTBurke/Test");
    }
}
