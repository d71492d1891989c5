//! High-level operations.
//!
//! This module contains the stages of a workspace check and the `check`
//! operation that runs them in order.

pub mod check;
pub mod graph;
pub mod report;
pub mod scan;
pub mod validate;

pub use check::{check, check_workspace, load_workspace, CheckError, CheckOptions, LoadedWorkspace};
pub use graph::{validate_graph, DependencyGraph, GraphError};
pub use report::{ErrorAggregator, LoadFailure, ManifestReport, Report, Summary};
pub use scan::{
    scan, CancelToken, ManifestScanner, ScanError, ScanOutcome, ScanStrategy, ScanWarning,
};
pub use validate::{FieldError, FieldValidator, FieldValidatorPipeline, ValidationPolicy};
