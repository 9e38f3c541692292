//! Watermark persistence for incremental export state
//!
//! The watermark is a single Unix epoch timestamp marking the last
//! successful run start. It is read once at run start and committed once at
//! run end, and only for modes that scan by modification time. A missing or
//! corrupt store reads as 0, which makes the next run re-export everything:
//! completeness is preferred over efficiency.

use crate::domain::errors::AspexError;
use crate::domain::Result;
use std::fs;
use std::path::PathBuf;

/// Single-value file store for the last-export timestamp
pub struct WatermarkStore {
    path: PathBuf,
}

impl WatermarkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the stored watermark.
    ///
    /// Returns 0 when no watermark exists or the store is unreadable or
    /// corrupt (fail open: the run re-covers the full history).
    pub fn read(&self) -> i64 {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No prior watermark, exporting everything");
                return 0;
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Watermark store unreadable, treating as no prior watermark"
                );
                return 0;
            }
        };

        match contents.trim().parse::<i64>() {
            Ok(t) => t,
            Err(_) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "Watermark store corrupt, treating as no prior watermark"
                );
                0
            }
        }
    }

    /// Atomically replace the stored watermark.
    ///
    /// The watermark only advances: an attempt to commit a value below the
    /// stored one is refused and logged.
    pub fn commit(&self, timestamp: i64) -> Result<()> {
        let current = self.read();
        if timestamp < current {
            tracing::warn!(
                current = current,
                attempted = timestamp,
                "Refusing to move watermark backwards"
            );
            return Ok(());
        }

        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&parent)
            .map_err(|e| AspexError::State(format!("watermark directory: {e}")))?;

        let mut temp = tempfile::NamedTempFile::new_in(&parent)
            .map_err(|e| AspexError::State(format!("watermark temp file: {e}")))?;
        use std::io::Write;
        write!(temp, "{timestamp}")
            .map_err(|e| AspexError::State(format!("watermark write: {e}")))?;
        temp.persist(&self.path)
            .map_err(|e| AspexError::State(format!("watermark replace: {e}")))?;

        tracing::debug!(timestamp = timestamp, "Watermark committed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_store_reads_zero() {
        let dir = tempdir().unwrap();
        let store = WatermarkStore::new(dir.path().join("last_export.txt"));
        assert_eq!(store.read(), 0);
    }

    #[test]
    fn test_commit_then_read() {
        let dir = tempdir().unwrap();
        let store = WatermarkStore::new(dir.path().join("last_export.txt"));
        store.commit(1439563523).unwrap();
        assert_eq!(store.read(), 1439563523);
    }

    #[test]
    fn test_corrupt_store_reads_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("last_export.txt");
        fs::write(&path, "not a number").unwrap();
        let store = WatermarkStore::new(&path);
        assert_eq!(store.read(), 0);
    }

    #[test]
    fn test_watermark_never_goes_backwards() {
        let dir = tempdir().unwrap();
        let store = WatermarkStore::new(dir.path().join("last_export.txt"));
        store.commit(2000).unwrap();
        store.commit(1000).unwrap();
        assert_eq!(store.read(), 2000);
    }

    #[test]
    fn test_commit_overwrites_forward() {
        let dir = tempdir().unwrap();
        let store = WatermarkStore::new(dir.path().join("last_export.txt"));
        store.commit(1000).unwrap();
        store.commit(1500).unwrap();
        assert_eq!(store.read(), 1500);
    }
}
