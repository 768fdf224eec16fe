//! Store configuration.
//!
//! [`StoreConfig`] names the storage key, the class and property names the
//! store renders, and the defaults applied when nothing is persisted. Every
//! field has a default, so a config file only needs the keys it changes.
//!
//! ```rust
//! use dashtheme::StoreConfig;
//!
//! let config = StoreConfig::from_toml(r##"
//! storage_key = "admin-theme"
//!
//! [defaults]
//! primary_color = "#10b981"
//! "##).unwrap();
//! assert_eq!(config.storage_key, "admin-theme");
//! assert!(!config.defaults.is_dark);
//! ```

#[cfg(feature = "native")]
use std::fs;
#[cfg(feature = "native")]
use std::path::Path;

use serde::{Deserialize, Serialize};
#[cfg(feature = "native")]
use tracing::debug;

use crate::color::Color;
use crate::error::ConfigError;

/// Storage key the persisted record is written under.
pub const DEFAULT_STORAGE_KEY: &str = "dashboard-theme";
/// Root class toggled for dark mode.
pub const DEFAULT_DARK_CLASS: &str = "dark";
/// Prefix of the primary color custom properties.
pub const DEFAULT_PROPERTY_PREFIX: &str = "--primary";
pub const DEFAULT_PRIMARY_COLOR: &str = "#3b82f6";
pub const DEFAULT_SECONDARY_COLOR: &str = "#8b5cf6";

/// Values a fresh store starts with, and the fallbacks for fields missing
/// from a persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeDefaults {
    pub is_dark: bool,
    pub primary_color: Color,
    pub secondary_color: Color,
    pub sidebar_collapsed: bool,
}

impl Default for ThemeDefaults {
    fn default() -> Self {
        Self {
            is_dark: false,
            primary_color: Color::from(DEFAULT_PRIMARY_COLOR),
            secondary_color: Color::from(DEFAULT_SECONDARY_COLOR),
            sidebar_collapsed: false,
        }
    }
}

/// Configuration for a [`ThemeStore`](crate::ThemeStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Storage key of the persisted record.
    pub storage_key: String,
    /// Class toggled on the root element while dark mode is on.
    pub dark_class: String,
    /// Custom property prefix; shades render as `{prefix}-{key}`.
    pub property_prefix: String,
    pub defaults: ThemeDefaults,
    /// When set, a malformed persisted record is logged and ignored during
    /// `init` instead of failing it.
    pub recover_corrupt_record: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            dark_class: DEFAULT_DARK_CLASS.to_string(),
            property_prefix: DEFAULT_PROPERTY_PREFIX.to_string(),
            defaults: ThemeDefaults::default(),
            recover_corrupt_record: false,
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different storage key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Replace the defaults.
    pub fn with_defaults(mut self, defaults: ThemeDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Recover from a malformed persisted record instead of failing `init`.
    pub fn with_recover_corrupt_record(mut self, recover: bool) -> Self {
        self.recover_corrupt_record = recover;
        self
    }

    /// Check that names the store renders are usable.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` for an empty storage key or class, or a
    /// property prefix that is not a custom property name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid("storage_key is empty".into()));
        }
        if self.dark_class.trim().is_empty() || self.dark_class.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid(format!(
                "dark_class '{}' is not a single class name",
                self.dark_class
            )));
        }
        if !self.property_prefix.starts_with("--") || self.property_prefix.len() < 3 {
            return Err(ConfigError::Invalid(format!(
                "property_prefix '{}' must be a custom property name like '--primary'",
                self.property_prefix
            )));
        }
        Ok(())
    }

    /// Load a config from JSON text.
    ///
    /// # Errors
    /// Returns `ConfigError` if JSON parsing or validation fails.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from TOML text.
    ///
    /// # Errors
    /// Returns `ConfigError` if TOML parsing or validation fails.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a file (format inferred by extension).
    ///
    /// # Errors
    /// Returns `ConfigError` if reading, parsing, or validation fails.
    ///
    /// # Availability
    /// This method is only available with the `native` feature (not on WASM).
    #[cfg(feature = "native")]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            Some("toml") => Self::from_toml(&content),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.into())),
            None => Err(ConfigError::UnsupportedFormat("unknown".into())),
        }?;
        debug!(config.path = %path.display(), config.key = %config.storage_key, "Store config loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.storage_key, "dashboard-theme");
        assert_eq!(config.dark_class, "dark");
        assert_eq!(config.property_prefix, "--primary");
        assert_eq!(config.defaults.primary_color.as_str(), "#3b82f6");
        assert_eq!(config.defaults.secondary_color.as_str(), "#8b5cf6");
        assert!(!config.recover_corrupt_record);
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn test_from_json_partial() {
        let config = StoreConfig::from_json(r#"{"defaults": {"is_dark": true}}"#)
            .expect("partial config");
        assert!(config.defaults.is_dark);
        assert_eq!(config.defaults.primary_color.as_str(), DEFAULT_PRIMARY_COLOR);
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn test_from_toml() {
        let config = StoreConfig::from_toml(
            "storage_key = \"ops-theme\"\nrecover_corrupt_record = true\n",
        )
        .expect("toml config");
        assert_eq!(config.storage_key, "ops-theme");
        assert!(config.recover_corrupt_record);
    }

    #[test]
    fn test_rejects_empty_key() {
        let err = StoreConfig::from_json(r#"{"storage_key": "  "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_bad_prefix() {
        let err = StoreConfig::from_json(r#"{"property_prefix": "primary"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = StoreConfig::from_json(r#"{"property_prefix": "--"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_multi_word_class() {
        let err = StoreConfig::from_toml("dark_class = \"dark mode\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = StoreConfig::from_json("{").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[cfg(feature = "native")]
    #[test]
    fn test_from_file_by_extension() {
        let dir = tempfile::tempdir().expect("temp dir");
        let toml_path = dir.path().join("theme.toml");
        fs::write(&toml_path, "dark_class = \"theme-dark\"").expect("write toml");
        let config = StoreConfig::from_file(&toml_path).expect("load toml");
        assert_eq!(config.dark_class, "theme-dark");

        let yaml_path = dir.path().join("theme.yaml");
        fs::write(&yaml_path, "dark_class: x").expect("write yaml");
        let err = StoreConfig::from_file(&yaml_path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ext) if ext == "yaml"));
    }
}
