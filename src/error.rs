//! Error types for VarInfo.
//!
//! This module provides a unified error handling approach using `thiserror`.
//! Configuration errors abort graph construction. Anomalies inside granule
//! metadata (dangling references, unmatched overrides) are never errors.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for VarInfo operations.
pub type Result<T> = std::result::Result<T, VarInfoError>;

/// Errors that can occur in VarInfo.
#[derive(Debug, Error)]
pub enum VarInfoError {
    /// A rule file was named but nothing exists at that location.
    #[error("No file in specified location: {path}")]
    ConfigFileMissing { path: PathBuf },

    /// A rule file was named but it is not a JSON or YAML document.
    #[error("\"{path}\" must be a JSON or YAML file")]
    ConfigFileInvalidFormat { path: PathBuf },

    /// The rule file has a recognized extension, but its content is malformed.
    #[error("Failed to parse configuration file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// A rule pattern is not a valid regular expression.
    #[error("Invalid variable pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Failed to open a file.
    #[error("Failed to open file: {path}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unsupported file format.
    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    /// The root element of a DMR document is not a `Dataset`.
    #[error("Unexpected root: {tag}")]
    DmrNamespace { tag: String },

    /// Malformed DMR XML.
    #[error("XML error: {0}")]
    Xml(String),

    /// Failed to read NetCDF file.
    #[error("NetCDF error: {0}")]
    NetCDF(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VarInfoError {
    /// Create a ConfigFileMissing error.
    pub fn config_file_missing(path: impl Into<PathBuf>) -> Self {
        Self::ConfigFileMissing { path: path.into() }
    }

    /// Create a ConfigFileInvalidFormat error.
    pub fn config_file_invalid_format(path: impl Into<PathBuf>) -> Self {
        Self::ConfigFileInvalidFormat { path: path.into() }
    }

    /// Create a ConfigParse error.
    pub fn config_parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::ConfigParse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create an InvalidPattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create a FileOpen error.
    pub fn file_open(path: PathBuf, source: std::io::Error) -> Self {
        Self::FileOpen { path, source }
    }

    /// Create an UnsupportedFormat error.
    pub fn unsupported_format(extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            extension: extension.into(),
        }
    }

    /// Returns true for errors caused by the rule file rather than the granule.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigFileMissing { .. }
                | Self::ConfigFileInvalidFormat { .. }
                | Self::ConfigParse { .. }
                | Self::InvalidPattern { .. }
        )
    }
}

impl From<netcdf::Error> for VarInfoError {
    fn from(err: netcdf::Error) -> Self {
        Self::NetCDF(err.to_string())
    }
}

impl From<quick_xml::Error> for VarInfoError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for VarInfoError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(err.to_string())
    }
}
