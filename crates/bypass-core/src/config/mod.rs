//! Configuration management
//!
//! Provides a strongly-typed configuration with TOML support for
//! embedding applications and the command-line front end.

use crate::bypass::Bypasser;
use crate::error::{Error, Result};
use crate::matcher::Matcher;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bypass list settings
    pub bypass: BypassConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::ConfigNotFound {
                path: path.display().to_string(),
            },
            _ => Error::Io(e),
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Error::from)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (idx, pattern) in self.bypass.patterns.iter().enumerate() {
            if let Err(e) = Matcher::new(pattern) {
                return Err(Error::config_value(
                    format!("bypass.patterns[{idx}]"),
                    e.to_string(),
                ));
            }
        }

        if let Some(ref file) = self.bypass.file {
            if file.trim().is_empty() {
                return Err(Error::config_value("bypass.file", "Must not be empty"));
            }
        }

        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_value(
                "logging.level",
                format!("Unknown level '{}'", self.logging.level),
            ));
        }

        Ok(())
    }

    /// Build a bypasser from the inline patterns.
    ///
    /// If `bypass.file` is set, the caller is expected to reload the bypasser
    /// from that file, which replaces these rules entirely.
    pub fn bypasser(&self) -> Result<Bypasser> {
        Bypasser::from_patterns(self.bypass.reverse, &self.bypass.patterns)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Bypass list settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BypassConfig {
    /// Invert the verdict
    pub reverse: bool,
    /// Inline patterns
    pub patterns: Vec<String>,
    /// Rule file in line format, reloaded live
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Enable JSON format logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.bypass.reverse);
        assert!(config.bypass.patterns.is_empty());
        assert!(config.bypass.file.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_pattern() {
        let mut config = Config::default();
        config.bypass.patterns = vec!["example.com".into(), "[broken".into()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("bypass.patterns[1]"));
    }

    #[test]
    fn test_validation_empty_file() {
        let mut config = Config::default();
        config.bypass.file = Some("  ".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_log_level() {
        let mut config = Config::default();
        config.logging.level = "DEBUG".into();
        assert!(config.validate().is_ok());
        config.logging.level = "loud".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bypasser_from_config() {
        let mut config = Config::default();
        config.bypass.reverse = true;
        config.bypass.patterns = vec!["*.example.com".into(), String::new()];

        let bp = config.bypasser().unwrap();
        assert_eq!(bp.len(), 1);
        assert!(!bp.bypass("www.example.com"));
        assert!(bp.bypass("example.org"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml("[bypass]\nreverse = true\n").unwrap();
        assert!(config.bypass.reverse);
        assert!(config.bypass.patterns.is_empty());
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/bypass.toml").unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn test_load_unreadable_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));

        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"[bypass]\n# caf\xe9\n").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
