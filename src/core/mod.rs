//! Core data structures for Sherpa.
//!
//! This module contains the foundational types used throughout the checker:
//! - Manifest records, metadata and loading
//! - Dependency entries and their classification
//! - The workspace manifest map
//! - Structured report errors

pub mod dependency;
pub mod error;
pub mod manifest;
pub mod workspace;

pub use dependency::{Dependency, DependencyKind, DEFAULT_INTERNAL_TYPES};
pub use error::{ErrorKind, ManifestError};
pub use manifest::{
    Author, LoadError, LoadedManifest, ManifestLoader, ManifestMetadata, ManifestRecord,
    ParseCategory, PrivateData, Repository, MANIFEST_NAME,
};
pub use workspace::{DuplicateManifest, ManifestEntry, ManifestMap};
