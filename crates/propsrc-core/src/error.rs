//! Error types for property sources
//!
//! Provides error handling for:
//! - Positional registry mutations ([`RegistryError`])
//! - Property and placeholder resolution ([`ResolveError`])
//! - Loading sources from files ([`LoadError`])

use std::path::PathBuf;

/// Errors raised by positional operations on an ordered registry
///
/// All variants are programming/configuration errors and are reported
/// synchronously. The rendered messages are a stable contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The anchor of `add_before`/`add_after`/`replace` is absent
    #[error("PropertySource named '{0}' does not exist")]
    ReferenceNotFound(String),

    /// An entry was positioned relative to an entry of the same name
    #[error("PropertySource named '{0}' cannot be added relative to itself")]
    IllegalSelfReference(String),

    /// `replace` was given an entry named after a different existing entry
    #[error("PropertySource named '{0}' already exists")]
    DuplicateName(String),
}

impl RegistryError {
    /// Name carried by the error
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::ReferenceNotFound(name)
            | Self::IllegalSelfReference(name)
            | Self::DuplicateName(name) => name,
        }
    }
}

/// Errors during property resolution
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A required key is not present in any source
    #[error("required key '{0}' not found")]
    MissingRequiredProperty(String),

    /// Placeholder has no value and no default
    #[error("could not resolve placeholder '{placeholder}' in value \"{text}\"")]
    UnresolvablePlaceholder {
        /// Placeholder key
        placeholder: String,
        /// Text being resolved
        text: String,
    },

    /// Placeholder refers back to itself
    #[error("circular placeholder reference '{0}' in property definitions")]
    CircularPlaceholder(String),

    /// Value could not be converted to the requested type
    #[error("cannot convert value of key '{key}' to {target}: {source}")]
    Conversion {
        /// Property key
        key: String,
        /// Requested type name
        target: &'static str,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },
}

/// Errors while loading a property source from disk
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// File extension not recognised
    #[error("unsupported property source format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Invalid TOML
    #[error("invalid TOML: {0}")]
    InvalidToml(#[from] toml::de::Error),

    /// Invalid JSON
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Invalid YAML
    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    /// Document root is not a table/object
    #[error("property source '{0}' must have a table at its root")]
    NotATable(String),
}

impl LoadError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
