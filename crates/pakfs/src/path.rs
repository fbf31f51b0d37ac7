//! Logical asset paths.

use crate::{Result, ResolverError};
use std::fmt;

/// A relative, slash-separated asset identifier such as `ui/menu/main.rml`.
///
/// Construction rejects the empty string and absolute paths. Joining an
/// absolute path onto a search root would replace the root entirely, so such
/// a path could never be resolved relative to anything. Traversal segments
/// (`..`) are passed through; sandboxing is left to the collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogicalPath(String);

impl LogicalPath {
    /// Validate and wrap a logical path.
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();

        if path.is_empty() {
            return Err(ResolverError::InvalidPath {
                path,
                reason: "path is empty",
            });
        }

        if path.starts_with('/') || path.starts_with('\\') {
            return Err(ResolverError::InvalidPath {
                path,
                reason: "path must be relative",
            });
        }

        // Windows drive prefix ("C:/..." or "C:\...")
        let bytes = path.as_bytes();
        if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
            return Err(ResolverError::InvalidPath {
                path,
                reason: "path must not carry a drive prefix",
            });
        }

        Ok(Self(path))
    }

    /// The path as given by the caller.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LogicalPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for LogicalPath {
    type Error = ResolverError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for LogicalPath {
    type Error = ResolverError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}
