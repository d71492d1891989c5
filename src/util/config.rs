//! Configuration file support for Sherpa.
//!
//! Sherpa reads two configuration files:
//! - Global: `~/.sherpa/config.toml` - User-wide defaults
//! - Project: `<root>/.sherpa/config.toml` - Workspace-specific overrides
//!
//! Project config takes precedence over global config, and command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::dependency::DEFAULT_INTERNAL_TYPES;
use crate::core::manifest::MANIFEST_NAME;
use crate::ops::validate::ValidationPolicy;

/// Directory names skipped when nothing is configured.
pub const DEFAULT_EXCLUDE: &[&str] = &[".git"];

/// Sherpa configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Discovery settings
    pub scan: ScanConfig,

    /// Field validation settings
    pub validate: ValidateConfig,

    /// Dependency graph settings
    pub graph: GraphConfig,

    /// Run settings
    pub check: CheckConfig,
}

/// Discovery configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Manifest file name to look for
    pub target: Option<String>,

    /// Glob patterns for directory names that are never descended into
    pub exclude: Option<Vec<String>>,

    /// Give up on the scan after this many seconds
    pub timeout_secs: Option<u64>,
}

/// Field validation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateConfig {
    /// Accepted license identifiers
    pub licenses: Option<Vec<String>>,

    /// Accepted OS identifiers
    pub os_versions: Option<Vec<String>>,

    /// Check homepage and repository URLs
    pub check_urls: Option<bool>,
}

/// Dependency graph configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Dependency `type` values that point inside the workspace
    pub internal_types: Option<Vec<String>>,
}

/// Run configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Number of worker threads (None = one per core)
    pub jobs: Option<usize>,

    /// Fail the run when no manifest is found
    #[serde(default)]
    pub require_manifests: bool,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Scan settings
        if other.scan.target.is_some() {
            self.scan.target = other.scan.target;
        }
        if other.scan.exclude.is_some() {
            self.scan.exclude = other.scan.exclude;
        }
        if other.scan.timeout_secs.is_some() {
            self.scan.timeout_secs = other.scan.timeout_secs;
        }

        // Validation settings
        if other.validate.licenses.is_some() {
            self.validate.licenses = other.validate.licenses;
        }
        if other.validate.os_versions.is_some() {
            self.validate.os_versions = other.validate.os_versions;
        }
        if other.validate.check_urls.is_some() {
            self.validate.check_urls = other.validate.check_urls;
        }

        // Graph settings
        if other.graph.internal_types.is_some() {
            self.graph.internal_types = other.graph.internal_types;
        }

        // Check settings
        if other.check.jobs.is_some() {
            self.check.jobs = other.check.jobs;
        }
        if other.check.require_manifests {
            self.check.require_manifests = true;
        }
    }

    /// Manifest file name, defaulting to `sherpa.json`.
    pub fn target(&self) -> &str {
        self.scan.target.as_deref().unwrap_or(MANIFEST_NAME)
    }

    /// Exclude patterns, defaulting to [`DEFAULT_EXCLUDE`].
    pub fn exclude(&self) -> Vec<String> {
        match &self.scan.exclude {
            Some(patterns) => patterns.clone(),
            None => DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Scan timeout, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.scan.timeout_secs.map(Duration::from_secs)
    }

    /// Validation policy with defaults filled in.
    pub fn policy(&self) -> ValidationPolicy {
        let defaults = ValidationPolicy::default();
        ValidationPolicy {
            licenses: self.validate.licenses.clone().unwrap_or(defaults.licenses),
            os_versions: self
                .validate
                .os_versions
                .clone()
                .unwrap_or(defaults.os_versions),
            check_urls: self.validate.check_urls.unwrap_or(defaults.check_urls),
        }
    }

    /// Internal dependency types, defaulting to [`DEFAULT_INTERNAL_TYPES`].
    pub fn internal_types(&self) -> Vec<String> {
        match &self.graph.internal_types {
            Some(types) => types.clone(),
            None => DEFAULT_INTERNAL_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.sherpa/config.toml)
/// 2. Global config (~/.sherpa/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            tracing::debug!("Loading global config from {}", global_path.display());
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        tracing::debug!("Loading project config from {}", project_path.display());
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global sherpa config directory (~/.sherpa).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".sherpa"))
}

/// Get the global config path (~/.sherpa/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (<root>/.sherpa/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".sherpa").join("config.toml")
}
