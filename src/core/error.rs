//! Report-level error records.
//!
//! Every problem the checker finds, whatever stage produced it, ends up as a
//! [`ManifestError`] in the final report. Stage-specific error enums
//! (`LoadError`, `FieldError`, `GraphError`) convert into this shape.
//!
//! | Code | Kind                  | Meaning                                          |
//! |------|-----------------------|--------------------------------------------------|
//! | 100  | `missing-field`       | A required field is missing or empty             |
//! | 101  | `wrong-field-type`    | A field has the wrong JSON type                  |
//! | 102  | `invalid-field`       | A field is present but fails validation          |
//! | 200  | `missing-dependency`  | An internal dependency names no known manifest   |
//! | 201  | `circular-dependency` | Internal dependencies form a cycle               |
//! | 202  | `malformed-dependency`| An internal dependency entry has no name         |
//! | 300  | `duplicate-manifest`  | Two files declare the same manifest name         |
//! | 400  | `io`                  | The manifest file could not be read              |
//! | 401  | `parse`               | The manifest file is not valid JSON              |

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Category of a report error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    MissingField,
    WrongFieldType,
    InvalidField,
    MissingDependency,
    CircularDependency,
    MalformedDependency,
    DuplicateManifest,
    Io,
    Parse,
}

impl ErrorKind {
    /// Stable numeric code for this kind.
    pub fn code(self) -> u32 {
        match self {
            ErrorKind::MissingField => 100,
            ErrorKind::WrongFieldType => 101,
            ErrorKind::InvalidField => 102,
            ErrorKind::MissingDependency => 200,
            ErrorKind::CircularDependency => 201,
            ErrorKind::MalformedDependency => 202,
            ErrorKind::DuplicateManifest => 300,
            ErrorKind::Io => 400,
            ErrorKind::Parse => 401,
        }
    }

    /// Short human label, as used in rendered reports.
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::MissingField => "missing field",
            ErrorKind::WrongFieldType => "wrong field type",
            ErrorKind::InvalidField => "field failed validation",
            ErrorKind::MissingDependency => "missing dependency",
            ErrorKind::CircularDependency => "circular dependency",
            ErrorKind::MalformedDependency => "malformed dependency",
            ErrorKind::DuplicateManifest => "duplicate manifest",
            ErrorKind::Io => "unable to read file",
            ErrorKind::Parse => "unable to parse file",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single structured problem attached to a manifest (or to a file that
/// could not become one).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{message}")]
pub struct ManifestError {
    /// Error category
    pub kind: ErrorKind,

    /// Stable numeric code, always `kind.code()`
    pub code: u32,

    /// User-facing message
    pub message: String,

    /// Offending field, if the error is about one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Developer-facing detail
    pub developer_message: String,

    /// Suggested remediation
    pub help: String,
}

impl ManifestError {
    /// Create an error of the given kind. Field, detail and help start empty.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ManifestError {
            kind,
            code: kind.code(),
            message: message.into(),
            field: None,
            developer_message: String::new(),
            help: String::new(),
        }
    }

    /// Attach the offending field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Attach developer-facing detail.
    pub fn with_developer_message(mut self, detail: impl Into<String>) -> Self {
        self.developer_message = detail.into();
        self
    }

    /// Attach a remediation hint.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Total order used wherever errors are sorted for output:
    /// code, then field, then message, then the remaining text.
    pub fn report_order(&self, other: &Self) -> Ordering {
        self.code
            .cmp(&other.code)
            .then_with(|| self.field.cmp(&other.field))
            .then_with(|| self.message.cmp(&other.message))
            .then_with(|| self.developer_message.cmp(&other.developer_message))
            .then_with(|| self.help.cmp(&other.help))
    }
}
