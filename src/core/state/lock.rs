//! Single-instance PID lock
//!
//! A liveness-checked PID marker prevents two scheduled invocations from
//! running simultaneously. The check is whether the recorded process is
//! still alive (signal 0), not a file-locking primitive; the window between
//! check and overwrite is accepted for a scheduled batch job.

use crate::domain::errors::AspexError;
use crate::domain::Result;
use std::fs;
use std::path::PathBuf;

/// Guard for the PID marker file; releases on drop.
#[derive(Debug)]
pub struct PidLock {
    path: PathBuf,
    released: bool,
}

impl PidLock {
    /// Acquire the lock.
    ///
    /// Fails with [`AspexError::AlreadyRunning`] when an existing marker
    /// points to a live process; a stale marker (dead PID or unparseable
    /// contents) is overwritten.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Ok(contents) = fs::read_to_string(&path) {
            if let Ok(pid) = contents.trim().parse::<u32>() {
                if process_alive(pid) {
                    tracing::error!(pid = pid, "Process is already running");
                    return Err(AspexError::AlreadyRunning { pid });
                }
                tracing::debug!(pid = pid, "Stale PID marker, overwriting");
            } else {
                tracing::warn!(path = %path.display(), "Unparseable PID marker, overwriting");
            }
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| AspexError::State(format!("PID lock directory: {e}")))?;
        }
        fs::write(&path, std::process::id().to_string())
            .map_err(|e| AspexError::State(format!("PID lock write: {e}")))?;

        Ok(Self {
            path,
            released: false,
        })
    }

    /// Remove the marker. Idempotent; also runs on drop.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove PID marker");
            }
        }
        self.released = true;
    }
}

impl Drop for PidLock {
    fn drop(&mut self) {
        self.release();
    }
}

/// Probe whether a process is alive without signalling it.
///
/// EPERM means the PID exists but belongs to another user, which still
/// counts as alive.
#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    // A marker beyond pid_t range cannot name a live process; a negative
    // cast would probe a process group instead.
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    let result = unsafe { libc::kill(pid, 0) };
    result == 0 || std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    // No portable liveness probe; treat the marker as stale.
    false
}
