//! Sherpa manifest schema and loading.
//!
//! A manifest is a single JSON file describing one package: its metadata,
//! authors, source repository and dependencies. Loading turns the file into a
//! [`ManifestRecord`] plus a fresh [`ManifestMetadata`] that later stages
//! attach validation errors to.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use thiserror::Error;

use crate::core::dependency::Dependency;
use crate::core::error::{ErrorKind, ManifestError};
use crate::util::fs::absolute_path;

/// Conventional manifest file name.
pub const MANIFEST_NAME: &str = "sherpa.json";

/// A package author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    pub name: String,
    pub email: String,
    pub homepage: String,
}

/// Source repository of a package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Repository {
    /// Repository type (`git`, `hg`, ...)
    #[serde(rename = "type")]
    pub kind: String,

    /// Repository URL
    pub url: String,
}

/// Location of a package's private data bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivateData {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: String,

    pub url: String,

    /// File inside the bundle holding the data
    pub file: String,
}

/// One decoded manifest file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManifestRecord {
    /// Package name, unique within a workspace
    pub name: String,

    pub description: String,

    /// Package version (semver)
    pub version: String,

    /// Entry files
    pub main: Vec<String>,

    /// License identifier
    pub license: String,

    /// Ignore patterns
    pub ignore: Vec<String>,

    pub keywords: Vec<String>,

    pub authors: Vec<Author>,

    /// Package homepage URL
    pub homepage: String,

    pub repository: Repository,

    pub dependencies: Vec<Dependency>,

    /// Supported operating system identifiers
    pub os_versions: Vec<String>,

    pub private: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_data: Option<PrivateData>,
}

impl ManifestRecord {
    /// Create a record with only a name and version set.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        ManifestRecord {
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Serialize the record back to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Validation state attached to one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestMetadata {
    /// Errors found so far, in the order they were attached
    pub errors: Vec<ManifestError>,

    /// Absolute path of the file the record was loaded from
    pub on_disk_location: PathBuf,
}

impl ManifestMetadata {
    /// Create metadata for a file with no errors yet.
    pub fn new(on_disk_location: impl Into<PathBuf>) -> Self {
        ManifestMetadata {
            errors: Vec::new(),
            on_disk_location: on_disk_location.into(),
        }
    }
}

/// A successfully loaded manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedManifest {
    pub record: ManifestRecord,
    pub meta: ManifestMetadata,
}

/// How decoding failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseCategory {
    /// Not JSON at all (syntax error, truncated input)
    Syntax,
    /// Valid JSON whose values do not fit the schema
    Schema,
}

/// Failure to turn a file into a manifest record.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unable to read file: {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse file: {}", path.display())]
    Parse {
        path: PathBuf,
        category: ParseCategory,
        detail: String,
    },
}

impl LoadError {
    /// The file the error is about.
    pub fn path(&self) -> &Path {
        match self {
            LoadError::Io { path, .. } | LoadError::Parse { path, .. } => path.as_path(),
        }
    }

    /// Developer-facing detail.
    pub fn developer_message(&self) -> String {
        match self {
            LoadError::Io { path, source } => {
                format!("failed to open file {}: {}", path.display(), source)
            }
            LoadError::Parse { path, detail, .. } => {
                format!("failed to decode JSON from {}: {}", path.display(), detail)
            }
        }
    }

    /// User-facing remediation hint.
    pub fn help(&self) -> String {
        match self {
            LoadError::Io { path, .. } => format!(
                "Check that {} exists and is readable, then run the check again",
                path.display()
            ),
            LoadError::Parse {
                category: ParseCategory::Syntax,
                ..
            } => "Fix the JSON syntax of the manifest".to_string(),
            LoadError::Parse {
                category: ParseCategory::Schema,
                ..
            } => "Make every manifest field match the documented type".to_string(),
        }
    }

    /// Convert into a report error.
    pub fn to_manifest_error(&self) -> ManifestError {
        let kind = match self {
            LoadError::Io { .. } => ErrorKind::Io,
            LoadError::Parse {
                category: ParseCategory::Syntax,
                ..
            } => ErrorKind::Parse,
            LoadError::Parse {
                category: ParseCategory::Schema,
                ..
            } => ErrorKind::WrongFieldType,
        };

        ManifestError::new(kind, self.to_string())
            .with_developer_message(self.developer_message())
            .with_help(self.help())
    }
}

/// Reads manifest files into records.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestLoader;

impl ManifestLoader {
    /// Read and decode the manifest at `path`.
    ///
    /// Relative paths are resolved against the current directory, so the
    /// recorded location is always absolute.
    pub fn load(path: &Path) -> Result<LoadedManifest, LoadError> {
        let location = absolute_path(path);
        let bytes = std::fs::read(&location).map_err(|source| LoadError::Io {
            path: location.clone(),
            source,
        })?;

        Self::from_json(&bytes, &location)
    }

    /// Decode an in-memory JSON blob that came from `location`.
    pub fn from_json(bytes: &[u8], location: &Path) -> Result<LoadedManifest, LoadError> {
        let record: ManifestRecord =
            serde_json::from_slice(bytes).map_err(|e| LoadError::Parse {
                path: location.to_path_buf(),
                category: match e.classify() {
                    Category::Data => ParseCategory::Schema,
                    Category::Io | Category::Syntax | Category::Eof => ParseCategory::Syntax,
                },
                detail: e.to_string(),
            })?;

        Ok(LoadedManifest {
            record,
            meta: ManifestMetadata::new(location),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{full_manifest_json, write_file};
    use tempfile::TempDir;

    #[test]
    fn test_load_full_manifest() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(MANIFEST_NAME);
        write_file(&path, full_manifest_json());

        let loaded = ManifestLoader::load(&path).unwrap();
        let record = &loaded.record;

        assert_eq!(record.name, "BTBurke/Test");
        assert_eq!(record.version, "0.1.0");
        assert_eq!(record.main, vec!["test.yaml"]);
        assert_eq!(record.authors[0].email, "bryan@kilimanjaro.io");
        assert_eq!(record.repository.kind, "git");
        assert_eq!(record.dependencies[0].kind, "git");
        assert_eq!(record.os_versions, vec!["osx", "linux", "windows"]);
        assert!(!record.private);
        assert_eq!(
            record.private_data.as_ref().map(|p| p.file.as_str()),
            Some("test_private_data.json")
        );

        assert_eq!(loaded.meta.on_disk_location, path.canonicalize().unwrap());
        assert!(loaded.meta.errors.is_empty());
    }

    #[test]
    fn test_load_resolves_location() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("core").join(MANIFEST_NAME);
        write_file(&path, r#"{"name": "core", "version": "1.0.0"}"#);

        let indirect = tmp.path().join("core").join("..").join("core").join(MANIFEST_NAME);
        let loaded = ManifestLoader::load(&indirect).unwrap();

        assert!(loaded.meta.on_disk_location.is_absolute());
        assert_eq!(loaded.meta.on_disk_location, path.canonicalize().unwrap());
    }

    #[test]
    fn test_load_relative_path_is_absolute() {
        // Unit tests run from the package root.
        let err = ManifestLoader::load(Path::new("Cargo.toml")).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert!(err.path().is_absolute());
        assert!(err.path().ends_with("Cargo.toml"));

        let err = ManifestLoader::load(Path::new("no-such-dir/sherpa.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.path().is_absolute());
        assert!(err.path().ends_with("no-such-dir/sherpa.json"));
    }

    #[test]
    fn test_missing_fields_default() {
        let loaded = ManifestLoader::from_json(b"{}", Path::new("/ws/sherpa.json")).unwrap();
        assert_eq!(loaded.record, ManifestRecord::default());
        assert!(loaded.record.private_data.is_none());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("absent").join(MANIFEST_NAME);

        let err = ManifestLoader::load(&path).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert_eq!(err.path(), path);

        let report = err.to_manifest_error();
        assert_eq!(report.code, 400);
        assert!(report.developer_message.contains("failed to open file"));
        assert!(!report.help.is_empty());
    }

    #[test]
    fn test_bad_json_is_syntax_error() {
        let err = ManifestLoader::from_json(b"{ \"name\": ", Path::new("/ws/sherpa.json"))
            .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Parse {
                category: ParseCategory::Syntax,
                ..
            }
        ));
        assert_eq!(err.to_manifest_error().code, 401);
    }

    #[test]
    fn test_wrong_type_is_schema_error() {
        let err = ManifestLoader::from_json(br#"{"name": 42}"#, Path::new("/ws/sherpa.json"))
            .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Parse {
                category: ParseCategory::Schema,
                ..
            }
        ));

        let report = err.to_manifest_error();
        assert_eq!(report.kind, ErrorKind::WrongFieldType);
        assert_eq!(report.code, 101);
        assert!(report.developer_message.contains("invalid type"));
    }

    #[test]
    fn test_round_trip_full_manifest() {
        let loaded =
            ManifestLoader::from_json(full_manifest_json().as_bytes(), Path::new("/ws/a")).unwrap();
        let json = loaded.record.to_json().unwrap();
        let again = ManifestLoader::from_json(json.as_bytes(), Path::new("/ws/a")).unwrap();

        assert_eq!(loaded.record, again.record);
        assert!(json.contains("\"osVersions\""));
        assert!(json.contains("\"privateData\""));
    }

    mod properties {
        use super::super::*;
        use proptest::prelude::*;

        fn text() -> impl Strategy<Value = String> {
            "[a-zA-Z0-9 ./:@_-]{0,12}"
        }

        fn texts() -> impl Strategy<Value = Vec<String>> {
            prop::collection::vec(text(), 0..4)
        }

        fn dependency() -> impl Strategy<Value = Dependency> {
            (text(), text(), text()).prop_map(|(name, kind, url)| Dependency { name, kind, url })
        }

        fn record() -> impl Strategy<Value = ManifestRecord> {
            (
                (text(), text(), text(), texts(), text(), texts(), texts()),
                (
                    prop::collection::vec(
                        (text(), text(), text()).prop_map(|(name, email, homepage)| Author {
                            name,
                            email,
                            homepage,
                        }),
                        0..3,
                    ),
                    text(),
                    (text(), text()).prop_map(|(kind, url)| Repository { kind, url }),
                    prop::collection::vec(dependency(), 0..4),
                    texts(),
                    any::<bool>(),
                    prop::option::of((text(), text(), text(), text()).prop_map(
                        |(name, kind, url, file)| PrivateData {
                            name,
                            kind,
                            url,
                            file,
                        },
                    )),
                ),
            )
                .prop_map(
                    |(
                        (name, description, version, main, license, ignore, keywords),
                        (authors, homepage, repository, dependencies, os_versions, private, private_data),
                    )| ManifestRecord {
                        name,
                        description,
                        version,
                        main,
                        license,
                        ignore,
                        keywords,
                        authors,
                        homepage,
                        repository,
                        dependencies,
                        os_versions,
                        private,
                        private_data,
                    },
                )
        }

        proptest! {
            #[test]
            fn serialize_then_load_is_identity(record in record()) {
                let json = record.to_json().unwrap();
                let loaded = ManifestLoader::from_json(json.as_bytes(), Path::new("/ws/sherpa.json")).unwrap();
                prop_assert_eq!(loaded.record, record);
            }
        }
    }
}
