//! Error types for the resolver.
//!
//! Missing assets are not errors on the hot path: [`PathResolver::open`]
//! returns `None`. The variants here cover configuration problems, malformed
//! logical paths and callers that prefer an error value via
//! [`PathResolver::try_open`].
//!
//! [`PathResolver::open`]: crate::PathResolver::open
//! [`PathResolver::try_open`]: crate::PathResolver::try_open

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while configuring the resolver or opening assets.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// Logical path cannot be used as a search key
    #[error("Invalid logical path '{path}': {reason}")]
    InvalidPath {
        /// The rejected path
        path: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// No search root produced a stream for the path
    #[error("Asset not found: {path} ({tried} candidates tried)")]
    NotFound {
        /// Logical path that was requested
        path: String,
        /// Number of search roots consulted
        tried: usize,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to read a configuration snapshot from disk
    #[error("Failed to load configuration from {path}: {source}")]
    ConfigLoad {
        /// Path to the configuration file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration snapshot is not valid JSON
    #[error("Invalid JSON in configuration: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
