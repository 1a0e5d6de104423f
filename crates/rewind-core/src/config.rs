#![forbid(unsafe_code)]

//! Configuration for [`CommandManager`](crate::CommandManager).
//!
//! ```toml
//! # rewind.toml
//! label = "inspector"
//! initial_capacity = 64
//! trace_commands = true
//! ```
//!
//! ```rust,ignore
//! let config = ManagerConfig::from_toml_file("rewind.toml")?;
//! let manager = CommandManager::new(config);
//! ```
//!
//! Loading requires the `config` feature. Missing keys fall back to
//! [`ManagerConfig::default`].

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Upper bound accepted for [`ManagerConfig::initial_capacity`].
pub const MAX_INITIAL_CAPACITY: usize = 1 << 20;

/// Settings for one editing session's command manager.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ManagerConfig {
    /// Session label attached to every span and event the manager emits.
    pub label: String,
    /// Entries to pre-allocate in the undo history.
    pub initial_capacity: usize,
    /// Emit a `debug` event for every successful execute and undo.
    ///
    /// Failures are reported at `warn` regardless.
    pub trace_commands: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            label: "default".to_string(),
            initial_capacity: 16,
            trace_commands: true,
        }
    }
}

impl ManagerConfig {
    /// Create a configuration with the given session label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Set the history pre-allocation.
    #[must_use]
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Enable or disable per-command events.
    #[must_use]
    pub fn with_trace_commands(mut self, enabled: bool) -> Self {
        self.trace_commands = enabled;
        self
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.into_validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.into_validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters.
    ///
    /// Returns a list of problems. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.label.trim().is_empty() {
            errors.push("label must not be empty".to_string());
        }
        if self.label.chars().any(char::is_control) {
            errors.push(format!("label {:?} contains control characters", self.label));
        }
        if self.initial_capacity > MAX_INITIAL_CAPACITY {
            errors.push(format!(
                "initial_capacity must be <= {MAX_INITIAL_CAPACITY}, got {}",
                self.initial_capacity
            ));
        }

        errors
    }

    /// Return `self` if [`validate`](Self::validate) finds nothing.
    pub fn into_validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a manager configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    #[cfg(feature = "config")]
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "config")]
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "config")]
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_validates_clean() {
        assert!(ManagerConfig::default().validate().is_empty());
    }

    #[test]
    fn builder_sets_fields() {
        let config = ManagerConfig::new("wizard")
            .with_initial_capacity(4)
            .with_trace_commands(false);
        assert_eq!(config.label, "wizard");
        assert_eq!(config.initial_capacity, 4);
        assert!(!config.trace_commands);
    }

    #[test]
    fn validate_catches_empty_label() {
        let errors = ManagerConfig::new("   ").validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("label"));
    }

    #[test]
    fn validate_catches_oversized_capacity() {
        let errors = ManagerConfig::default()
            .with_initial_capacity(MAX_INITIAL_CAPACITY + 1)
            .validate();
        assert!(errors.iter().any(|e| e.contains("initial_capacity")));
    }

    #[test]
    fn multiple_validation_errors_collected() {
        let config = ManagerConfig::new("\n").with_initial_capacity(usize::MAX);
        let errors = config.validate();
        assert!(errors.len() >= 3, "should catch multiple errors: {errors:?}");
    }

    #[test]
    fn into_validated_reports_validation_error() {
        let err = ManagerConfig::new("").into_validated().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().starts_with("validation errors:"));
    }

    #[cfg(not(feature = "config"))]
    #[test]
    fn without_loaders_only_validation_errors_exist() {
        let err = ManagerConfig::new("").into_validated().unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 1),
        }
    }

    #[cfg(feature = "config")]
    #[test]
    fn partial_toml_preserves_defaults() {
        let config = ManagerConfig::from_toml_str("label = \"inspector\"").unwrap();
        assert_eq!(config.label, "inspector");
        assert_eq!(config.initial_capacity, 16);
        assert!(config.trace_commands);
    }

    #[cfg(feature = "config")]
    #[test]
    fn json_round_trip() {
        let config = ManagerConfig::new("form").with_initial_capacity(2);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(ManagerConfig::from_json_str(&json).unwrap(), config);
    }

    #[cfg(feature = "config")]
    #[test]
    fn toml_parse_error_surfaces() {
        let err = ManagerConfig::from_toml_str("label = ").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
