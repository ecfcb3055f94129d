//! Configuration error types.

use thiserror::Error;

use crate::section::SectionPath;

/// Errors raised while declaring, resolving or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required key was not supplied by any source.
    #[error("config parameter {section}.{key} not found")]
    MissingKey {
        /// Section the key was looked up in.
        section: SectionPath,
        /// Resolved (uppercased) key name.
        key: String,
    },

    /// The declared cast rejected the raw value.
    #[error("failed to cast {section}.{key}: {source}")]
    Cast {
        /// Section the key was looked up in.
        section: SectionPath,
        /// Resolved (uppercased) key name.
        key: String,
        /// The underlying cast failure.
        #[source]
        source: CastError,
    },

    /// A key has no explicit section and its config has no default section.
    #[error("section name for '{attr}' was not given by the key or by the config type")]
    NoSection {
        /// Declared member name of the key.
        attr: &'static str,
    },

    /// `replace_source` was given a source the provider does not hold.
    #[error("provider did not find the source to replace: {description}")]
    SourceNotFound {
        /// Identifying representation of the missing source.
        description: String,
    },

    /// An INI file that must exist is absent.
    #[error("could not find config file {path}")]
    FileNotFound {
        /// Path of the missing file.
        path: String,
    },

    /// An INI file exists but could not be read.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path of the file.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// INI text could not be parsed.
    #[error("failed to parse {origin}: {source}")]
    ParseError {
        /// File name or origin label of the INI text.
        origin: String,
        /// The underlying parser error.
        #[source]
        source: ini::ParseError,
    },

    /// The requested text encoding label is not known.
    #[error("unknown text encoding: {label}")]
    UnknownEncoding {
        /// The label that was requested.
        label: String,
    },

    /// A post-read override names something that cannot take it.
    #[error("invalid override for {config}.{attr}: {reason}")]
    InvalidOverride {
        /// Type name of the config the override was applied to.
        config: &'static str,
        /// The member name given in the override.
        attr: String,
        /// Why the override was rejected.
        reason: String,
    },

    /// The cached value for a key has a different Rust type than requested.
    #[error("cached value for {section}.{key} is not a {expected}")]
    TypeMismatch {
        /// Section of the cache entry.
        section: SectionPath,
        /// Key of the cache entry.
        key: String,
        /// Type name the declaration expected.
        expected: &'static str,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised by cast functions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastError {
    /// The raw value has no entry in the cast's lookup table.
    #[error("'{value}' is not one of {expected}")]
    Lookup {
        /// The raw input.
        value: String,
        /// Description of the accepted values.
        expected: String,
    },

    /// The raw value could not be converted to the target type.
    #[error("'{value}' could not be parsed: {reason}")]
    Format {
        /// The raw input.
        value: String,
        /// Parser message.
        reason: String,
    },
}
