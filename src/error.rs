//! Error types for kheops-resolver.

use crate::backend::BackendError;
use crate::template::TemplateError;
use std::path::PathBuf;

/// Result type alias for kheops-resolver operations.
pub type Result<T> = std::result::Result<T, KheopsError>;

/// Errors that can occur while resolving configuration or running lookups.
#[derive(Debug, thiserror::Error)]
pub enum KheopsError {
    /// A file configuration source does not point to an existing file.
    #[error("Unable to find configuration file {}", .0.display())]
    ConfigSourceNotFound(PathBuf),

    /// A configuration source is neither a path, a mapping, nor absent,
    /// or its document is not a mapping.
    #[error("Invalid configuration source: {0}")]
    InvalidConfigSource(String),

    /// Failed to read or parse a configuration document.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A recognized option carries a value it cannot take.
    #[error("Option '{option}' is invalid: {reason}")]
    InvalidOption {
        /// The option name
        option: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Key-spec input is not a string, a sequence, or a mapping.
    #[error("Unable to process Kheops keys: {0}")]
    InvalidKeySpec(String),

    /// The configured mode is known but not implemented.
    #[error("Kheops {0} mode is not implemented")]
    UnsupportedMode(String),

    /// Evaluating a scope expression failed.
    #[error("Failed to template scope field '{field}': {source}")]
    ScopeTemplateError {
        /// The scope field being evaluated
        field: String,
        /// The underlying template failure
        #[source]
        source: TemplateError,
    },

    /// Rendering lookup results through the template engine failed.
    #[error("Failed to template lookup results: {0}")]
    ResultTemplateError(#[source] TemplateError),

    /// A templated strategy was selected but no template engine was supplied.
    #[error("A template engine is required to {0}")]
    MissingTemplateEngine(&'static str),

    /// The backend failed; passed through untouched.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// IO error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl KheopsError {
    /// Create an invalid option error.
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }
}
