//! Error types for bypass-core
//!
//! Centralized error handling using `thiserror` for ergonomic error definitions.
//! Matching itself never fails; only rule construction, rule sources and
//! configuration loading produce errors.

use thiserror::Error;

/// Main error type for bypass-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// A domain pattern could not be compiled into a glob
    #[error("Invalid glob pattern '{pattern}': {source}")]
    Glob {
        /// The offending pattern, as written in the rule source
        pattern: String,
        /// Underlying glob compiler error
        #[source]
        source: globset::Error,
    },

    /// A directive value was rejected by the strict rule parser
    #[error("Invalid value for '{directive}' on line {line}: {value:?}")]
    InvalidDirective {
        /// 1-based line number in the rule source
        line: usize,
        /// Directive keyword (`reload` or `reverse`)
        directive: &'static str,
        /// The rejected value
        value: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path to the missing config file
        path: String,
    },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    ConfigValue {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a glob compilation error
    pub fn glob(pattern: impl Into<String>, source: globset::Error) -> Self {
        Self::Glob {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create a strict-mode directive error
    pub fn invalid_directive(line: usize, directive: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidDirective {
            line,
            directive,
            value: value.into(),
        }
    }

    /// Create a config value error
    pub fn config_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValue {
            key: key.into(),
            message: message.into(),
        }
    }
}
