//! Per-manifest field validation.
//!
//! The pipeline is an ordered list of independent validators. Every validator
//! runs against every record, so one pass reports every field problem.

use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::core::error::{ErrorKind, ManifestError};
use crate::core::manifest::ManifestRecord;

/// A problem with one field of one record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("required field `{field}` is missing")]
    Missing { field: String },

    #[error("field `{field}` failed validation: {reason}")]
    Invalid {
        field: String,
        value: String,
        reason: String,
        help: String,
    },
}

impl FieldError {
    /// Stable numeric code (100 or 102).
    ///
    /// Wrong JSON types never reach the validators; the loader reports them
    /// as 101.
    pub fn code(&self) -> u32 {
        self.kind().code()
    }

    fn kind(&self) -> ErrorKind {
        match self {
            FieldError::Missing { .. } => ErrorKind::MissingField,
            FieldError::Invalid { .. } => ErrorKind::InvalidField,
        }
    }

    /// The offending field, as named in the manifest JSON.
    pub fn field(&self) -> &str {
        match self {
            FieldError::Missing { field } | FieldError::Invalid { field, .. } => field,
        }
    }

    /// Convert into a report error.
    pub fn to_manifest_error(&self) -> ManifestError {
        let err = ManifestError::new(self.kind(), self.to_string()).with_field(self.field());

        match self {
            FieldError::Missing { field } => err
                .with_developer_message(format!("`{}` is absent or empty", field))
                .with_help(format!("Add a non-empty `{}` to the manifest", field)),
            FieldError::Invalid {
                field, value, help, ..
            } => err
                .with_developer_message(format!("`{}` = {:?}", field, value))
                .with_help(help.clone()),
        }
    }
}

/// Settings the built-in validators read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// Accepted license identifiers; empty accepts any
    pub licenses: Vec<String>,

    /// Accepted OS identifiers; empty accepts any
    pub os_versions: Vec<String>,

    /// Check that homepage and repository URLs are well formed
    pub check_urls: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        ValidationPolicy {
            licenses: Vec::new(),
            os_versions: Vec::new(),
            check_urls: true,
        }
    }
}

/// A single field check.
pub type ValidatorFn = fn(&ManifestRecord, &ValidationPolicy) -> Option<FieldError>;

/// A named field check.
#[derive(Clone, Copy)]
pub struct FieldValidator {
    pub name: &'static str,
    pub check: ValidatorFn,
}

impl std::fmt::Debug for FieldValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldValidator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Ordered set of field validators sharing one policy.
#[derive(Debug, Clone)]
pub struct FieldValidatorPipeline {
    validators: Vec<FieldValidator>,
    policy: ValidationPolicy,
}

impl FieldValidatorPipeline {
    /// Create a pipeline with no validators.
    pub fn empty(policy: ValidationPolicy) -> Self {
        FieldValidatorPipeline {
            validators: Vec::new(),
            policy,
        }
    }

    /// Create a pipeline with the built-in validators, in their standard order.
    pub fn with_defaults(policy: ValidationPolicy) -> Self {
        FieldValidatorPipeline {
            validators: default_validators(),
            policy,
        }
    }

    /// Append a validator. It runs after every validator already registered.
    pub fn register(&mut self, name: &'static str, check: ValidatorFn) -> &mut Self {
        self.validators.push(FieldValidator { name, check });
        self
    }

    /// Names of the registered validators, in run order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.validators.iter().map(|v| v.name)
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Run every validator against `record`.
    pub fn validate(&self, record: &ManifestRecord) -> Vec<FieldError> {
        self.validators
            .iter()
            .filter_map(|v| (v.check)(record, &self.policy))
            .collect()
    }

    /// Run every validator and convert the results into report errors.
    pub fn validate_to_errors(&self, record: &ManifestRecord) -> Vec<ManifestError> {
        self.validate(record)
            .iter()
            .map(FieldError::to_manifest_error)
            .collect()
    }
}

impl Default for FieldValidatorPipeline {
    fn default() -> Self {
        Self::with_defaults(ValidationPolicy::default())
    }
}

/// The built-in validators.
pub fn default_validators() -> Vec<FieldValidator> {
    vec![
        FieldValidator {
            name: "name",
            check: validate_name,
        },
        FieldValidator {
            name: "version",
            check: validate_version,
        },
        FieldValidator {
            name: "homepage",
            check: validate_homepage,
        },
        FieldValidator {
            name: "repository",
            check: validate_repository,
        },
        FieldValidator {
            name: "license",
            check: validate_license,
        },
        FieldValidator {
            name: "os-versions",
            check: validate_os_versions,
        },
        FieldValidator {
            name: "authors",
            check: validate_authors,
        },
    ]
}

/// `name` must be non-empty.
pub fn validate_name(record: &ManifestRecord, _: &ValidationPolicy) -> Option<FieldError> {
    if record.name.trim().is_empty() {
        return Some(FieldError::Missing {
            field: "name".to_string(),
        });
    }
    None
}

/// `version` must be present and a semantic version.
pub fn validate_version(record: &ManifestRecord, _: &ValidationPolicy) -> Option<FieldError> {
    if record.version.trim().is_empty() {
        return Some(FieldError::Missing {
            field: "version".to_string(),
        });
    }

    match Version::parse(&record.version) {
        Ok(_) => None,
        Err(e) => Some(FieldError::Invalid {
            field: "version".to_string(),
            value: record.version.clone(),
            reason: format!("not a semantic version ({})", e),
            help: "Use a semantic version such as `1.2.3` or `0.1.0-beta.1`".to_string(),
        }),
    }
}

/// `homepage`, when set, must be an absolute URL.
pub fn validate_homepage(record: &ManifestRecord, policy: &ValidationPolicy) -> Option<FieldError> {
    if !policy.check_urls {
        return None;
    }
    check_url("homepage", &record.homepage)
}

/// `repository.url`, when set, must be an absolute URL.
pub fn validate_repository(
    record: &ManifestRecord,
    policy: &ValidationPolicy,
) -> Option<FieldError> {
    if !policy.check_urls {
        return None;
    }
    check_url("repository.url", &record.repository.url)
}

/// `license`, when set, must be on the allow-list (if one is configured).
pub fn validate_license(record: &ManifestRecord, policy: &ValidationPolicy) -> Option<FieldError> {
    let license = record.license.trim();
    if license.is_empty() || policy.licenses.is_empty() {
        return None;
    }

    if policy
        .licenses
        .iter()
        .any(|l| l.eq_ignore_ascii_case(license))
    {
        return None;
    }

    Some(FieldError::Invalid {
        field: "license".to_string(),
        value: record.license.clone(),
        reason: "license is not in the accepted list".to_string(),
        help: format!("Use one of: {}", policy.licenses.join(", ")),
    })
}

/// Every `osVersions` entry must be on the allow-list (if one is configured).
pub fn validate_os_versions(
    record: &ManifestRecord,
    policy: &ValidationPolicy,
) -> Option<FieldError> {
    if policy.os_versions.is_empty() {
        return None;
    }

    let (index, os) = record
        .os_versions
        .iter()
        .enumerate()
        .find(|(_, os)| !policy.os_versions.iter().any(|known| known == *os))?;

    Some(FieldError::Invalid {
        field: format!("osVersions[{}]", index),
        value: os.clone(),
        reason: format!("unknown OS identifier `{}`", os),
        help: format!("Use one of: {}", policy.os_versions.join(", ")),
    })
}

/// Every listed author needs a name.
pub fn validate_authors(record: &ManifestRecord, _: &ValidationPolicy) -> Option<FieldError> {
    let index = record
        .authors
        .iter()
        .position(|a| a.name.trim().is_empty())?;

    Some(FieldError::Missing {
        field: format!("authors[{}].name", index),
    })
}

fn check_url(field: &str, value: &str) -> Option<FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let reason = match Url::parse(value) {
        Ok(url) if !url.cannot_be_a_base() => return None,
        Ok(_) => "URL cannot have a path".to_string(),
        Err(e) => format!("malformed URL ({})", e),
    };

    Some(FieldError::Invalid {
        field: field.to_string(),
        value: value.to_string(),
        reason,
        help: format!("Set `{}` to an absolute URL such as `https://example.com`", field),
    })
}
