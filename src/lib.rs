//! Sherpa - a workspace checker for `sherpa.json` package manifests
//!
//! This crate finds every manifest under a directory, validates each one's
//! fields, checks the internal dependency graph for missing packages and
//! cycles, and reports every problem in a single pass.

pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for Sherpa unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It writes manifest trees into temporary directories.
#[cfg(test)]
pub mod test_support;

pub use core::{
    dependency::Dependency, error::ManifestError, manifest::ManifestLoader,
    manifest::ManifestRecord, workspace::ManifestMap,
};

pub use ops::{check_workspace, CheckOptions, Report};
pub use util::context::GlobalContext;
