//! ManifestMap - every manifest loaded for one workspace.
//!
//! Keys are manifest names. The map is ordered by name so that anything
//! iterating it (the graph builder, the report) sees the same order on every
//! run, whatever order the files were loaded in.

use std::collections::btree_map::{self, BTreeMap};
use std::path::{Path, PathBuf};

use crate::core::error::{ErrorKind, ManifestError};
use crate::core::manifest::{LoadedManifest, ManifestMetadata, ManifestRecord};

/// A record together with its validation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub record: ManifestRecord,
    pub meta: ManifestMetadata,
}

impl ManifestEntry {
    /// The manifest name.
    pub fn name(&self) -> &str {
        &self.record.name
    }

    /// Where the manifest was loaded from.
    pub fn location(&self) -> &Path {
        &self.meta.on_disk_location
    }
}

impl From<LoadedManifest> for ManifestEntry {
    fn from(loaded: LoadedManifest) -> Self {
        ManifestEntry {
            record: loaded.record,
            meta: loaded.meta,
        }
    }
}

/// Rejected insertion: another file already declared the same name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("manifest `{name}` is already declared by {}", existing.display())]
pub struct DuplicateManifest {
    pub name: String,
    pub existing: PathBuf,
    pub rejected: PathBuf,
    /// Errors already attached to the rejected manifest
    pub errors: Vec<ManifestError>,
}

impl DuplicateManifest {
    /// Convert into a report error.
    pub fn to_manifest_error(&self) -> ManifestError {
        ManifestError::new(ErrorKind::DuplicateManifest, self.to_string())
            .with_field("name")
            .with_developer_message(format!(
                "{} declares name `{}`, first seen in {}",
                self.rejected.display(),
                self.name,
                self.existing.display()
            ))
            .with_help("Give every manifest in the workspace a unique name")
    }

    /// The duplicate error followed by the rejected manifest's own errors.
    pub fn into_manifest_errors(self) -> Vec<ManifestError> {
        let mut errors = vec![self.to_manifest_error()];
        errors.extend(self.errors);
        errors
    }
}

/// Name-keyed collection of manifests.
#[derive(Debug, Clone, Default)]
pub struct ManifestMap {
    entries: BTreeMap<String, ManifestEntry>,
}

impl ManifestMap {
    /// Create an empty map.
    pub fn new() -> Self {
        ManifestMap {
            entries: BTreeMap::new(),
        }
    }

    /// Insert a loaded manifest.
    ///
    /// Names are never replaced once present: a second manifest with the same
    /// name is handed back as a [`DuplicateManifest`] that keeps its errors.
    pub fn insert(&mut self, entry: impl Into<ManifestEntry>) -> Result<(), DuplicateManifest> {
        let entry = entry.into();
        match self.entries.entry(entry.record.name.clone()) {
            btree_map::Entry::Occupied(existing) => Err(DuplicateManifest {
                name: entry.record.name,
                existing: existing.get().meta.on_disk_location.clone(),
                rejected: entry.meta.on_disk_location,
                errors: entry.meta.errors,
            }),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(())
            }
        }
    }

    /// Look up a manifest by name.
    pub fn get(&self, name: &str) -> Option<&ManifestEntry> {
        self.entries.get(name)
    }

    /// Check whether a manifest with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Append errors to a manifest's metadata.
    pub fn attach_errors(&mut self, name: &str, errors: impl IntoIterator<Item = ManifestError>) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.meta.errors.extend(errors);
        }
    }

    /// Iterate over manifests in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ManifestEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Manifest names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Get the number of manifests.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
