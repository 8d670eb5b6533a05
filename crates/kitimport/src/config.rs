//! Runner configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {details}")]
    InvalidConfiguration { details: String },
}

/// Settings that shape a content import run
///
/// All fields have defaults matching the packages produced by the exporter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImporterConfig {
    /// Platform tag a manifest must carry for this runner to apply
    pub expected_platform: String,
    /// Settings template file, relative to the package directory
    pub settings_file: String,
    /// Directory holding per-content-type payloads, relative to the package directory
    pub content_dir: String,
    /// Backup marker that remembers the kit active before the first import
    pub backup_option_key: String,
    /// Appended to the package name when titling a created kit
    pub kit_title_suffix: String,
    /// Status given to created documents
    pub publish_status: String,
    /// Channel progress events are broadcast on
    pub progress_channel: String,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            expected_platform: "elementor".to_string(),
            settings_file: "settings.json".to_string(),
            content_dir: "content".to_string(),
            backup_option_key: "__kitimport_active_kit_backup".to_string(),
            kit_title_suffix: "Kit".to_string(),
            publish_status: "publish".to_string(),
            progress_channel: "eventLog".to_string(),
        }
    }
}

impl ImporterConfig {
    /// Defaults overlaid with `KITIMPORT_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values returned by `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let pick = |key: &str, fallback: String| lookup(key).unwrap_or(fallback);

        let config = Self {
            expected_platform: pick("KITIMPORT_PLATFORM", defaults.expected_platform),
            settings_file: pick("KITIMPORT_SETTINGS_FILE", defaults.settings_file),
            content_dir: pick("KITIMPORT_CONTENT_DIR", defaults.content_dir),
            backup_option_key: pick("KITIMPORT_BACKUP_OPTION_KEY", defaults.backup_option_key),
            kit_title_suffix: pick("KITIMPORT_KIT_TITLE_SUFFIX", defaults.kit_title_suffix),
            publish_status: pick("KITIMPORT_PUBLISH_STATUS", defaults.publish_status),
            progress_channel: pick("KITIMPORT_PROGRESS_CHANNEL", defaults.progress_channel),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("expected_platform", &self.expected_platform),
            ("settings_file", &self.settings_file),
            ("content_dir", &self.content_dir),
            ("backup_option_key", &self.backup_option_key),
            ("publish_status", &self.publish_status),
            ("progress_channel", &self.progress_channel),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidConfiguration {
                    details: format!("{} must not be empty", name),
                });
            }
        }
        Ok(())
    }

    /// Title given to a kit created from the package `name`
    pub fn kit_title(&self, name: &str) -> String {
        if self.kit_title_suffix.is_empty() {
            name.to_string()
        } else {
            format!("{} {}", name, self.kit_title_suffix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = ImporterConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.expected_platform, "elementor");
        assert_eq!(config.kit_title("Agency"), "Agency Kit");
    }

    #[test]
    fn test_lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("KITIMPORT_PLATFORM", "gutenberg"),
            ("KITIMPORT_CONTENT_DIR", "docs"),
        ]);

        let config =
            ImporterConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.expected_platform, "gutenberg");
        assert_eq!(config.content_dir, "docs");
        assert_eq!(config.settings_file, "settings.json");
    }

    #[test]
    fn test_empty_platform_is_rejected() {
        let err = ImporterConfig::from_lookup(|key| {
            (key == "KITIMPORT_PLATFORM").then(|| "  ".to_string())
        })
        .unwrap_err();

        assert!(err.to_string().contains("expected_platform"));
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: ImporterConfig =
            serde_json::from_str(r#"{"kit_title_suffix": ""}"#).unwrap();

        assert_eq!(config.kit_title("Agency"), "Agency");
        assert_eq!(config.publish_status, "publish");
    }
}
