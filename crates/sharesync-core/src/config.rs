//! Configuration module for ShareSync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::{SharePermissions, FILE_NAME_PLACEHOLDER};

/// Top-level configuration for ShareSync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub remote: RemoteConfig,
    pub sharing: SharingConfig,
    pub logging: LoggingConfig,
}

/// Remote source settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Upper bound for a single remote call, in seconds. `None` waits forever.
    pub timeout_secs: Option<u64>,
}

impl RemoteConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Public link defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharingConfig {
    /// Template for derived link names; `{file}` is replaced by the file name.
    pub link_name_template: String,
    /// Permission bitmask of new public links (1 = read only).
    pub default_public_permissions: u32,
}

impl SharingConfig {
    /// Default permissions as a validated bitmask, falling back to read only.
    pub fn default_permissions(&self) -> SharePermissions {
        SharePermissions::new(self.default_public_permissions).unwrap_or_default()
    }
}

/// Logging / tracing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!(error = %format!("{e:#}"), "Using default configuration");
                Self::default()
            }
        }
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/sharesync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("sharesync")
            .join("config.yaml")
    }
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self {
            link_name_template: format!("{FILE_NAME_PLACEHOLDER} link"),
            default_public_permissions: SharePermissions::READ,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"remote.timeout_secs"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- remote ---
        if self.remote.timeout_secs == Some(0) {
            errors.push(ValidationError {
                field: "remote.timeout_secs".into(),
                message: "must be greater than 0 (omit it to disable the timeout)".into(),
            });
        }

        // --- sharing ---
        if !self
            .sharing
            .link_name_template
            .contains(FILE_NAME_PLACEHOLDER)
        {
            errors.push(ValidationError {
                field: "sharing.link_name_template".into(),
                message: format!("must contain the {FILE_NAME_PLACEHOLDER} placeholder"),
            });
        }
        if self.sharing.default_public_permissions == 0 {
            errors.push(ValidationError {
                field: "sharing.default_public_permissions".into(),
                message: "must be greater than 0".into(),
            });
        } else if SharePermissions::new(self.sharing.default_public_permissions).is_err() {
            errors.push(ValidationError {
                field: "sharing.default_public_permissions".into(),
                message: format!(
                    "unknown permission bits in {}",
                    self.sharing.default_public_permissions
                ),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}', expected one of: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

/// Fluent builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and lets callers override individual fields.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder pre-populated with defaults.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- remote ---

    pub fn remote_timeout_secs(mut self, seconds: u64) -> Self {
        self.config.remote.timeout_secs = Some(seconds);
        self
    }

    // --- sharing ---

    pub fn sharing_link_name_template(mut self, template: impl Into<String>) -> Self {
        self.config.sharing.link_name_template = template.into();
        self
    }

    pub fn sharing_default_public_permissions(mut self, bits: u32) -> Self {
        self.config.sharing.default_public_permissions = bits;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_json(mut self, json: bool) -> Self {
        self.config.logging.json = json;
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
