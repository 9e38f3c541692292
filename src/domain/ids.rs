//! Identifier newtypes for remote records
//!
//! Two identifiers travel with every record: the opaque ArchivesSpace URI
//! (stable across edits, used for de-duplication within a run) and the
//! human-assigned local identifier (`id_0` / `digital_object_id`, used for
//! file and directory names).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque stable ArchivesSpace URI, e.g. `/repositories/2/resources/417`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteUri(String);

impl RemoteUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The trailing numeric identifier of the URI, used by raw-export
    /// endpoints that address records by number rather than by URI.
    pub fn trailing_id(&self) -> Option<u64> {
        self.0.rsplit('/').next()?.parse().ok()
    }
}

impl fmt::Display for RemoteUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human identifier used in filenames (resource `id_0` or
/// `digital_object_id`).
///
/// Validated on construction: must be non-empty and must not contain path
/// separators or traversal segments, since it becomes a directory name under
/// the export roots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalId(String);

impl LocalId {
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("local identifier cannot be empty".to_string());
        }
        if id.contains('/') || id.contains('\\') || id == "." || id == ".." {
            return Err(format!("local identifier is not filename-safe: {id}"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_id() {
        let uri = RemoteUri::new("/repositories/2/resources/417");
        assert_eq!(uri.trailing_id(), Some(417));
    }

    #[test]
    fn test_trailing_id_non_numeric() {
        let uri = RemoteUri::new("/repositories/2/resources/abc");
        assert_eq!(uri.trailing_id(), None);
    }

    #[test]
    fn test_local_id_rejects_separators() {
        assert!(LocalId::new("FA01").is_ok());
        assert!(LocalId::new("").is_err());
        assert!(LocalId::new("  ").is_err());
        assert!(LocalId::new("FA/01").is_err());
        assert!(LocalId::new("..").is_err());
    }
}
