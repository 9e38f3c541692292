//! Versioning collaborator
//!
//! After a run that changed anything, the export trees are staged,
//! committed, and pushed. The core only decides whether to invoke this and
//! whether it errored; exported files are never rolled back on a
//! versioning failure, so a push can be retried outside the tool.

use crate::domain::errors::AspexError;
use crate::domain::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Stages, commits, and pushes the given root directories.
#[async_trait]
pub trait Versioner: Send + Sync {
    async fn version(&self, roots: &[PathBuf]) -> Result<()>;
}

/// Git-backed versioner running `git add`/`commit`/`push` in each root.
pub struct GitVersioner {
    commit_message: String,
}

impl GitVersioner {
    pub fn new(commit_message: impl Into<String>) -> Self {
        Self {
            commit_message: commit_message.into(),
        }
    }

    async fn run_git(&self, root: &Path, args: &[&str]) -> Result<std::process::Output> {
        Command::new("git")
            .current_dir(root)
            .args(args)
            .output()
            .await
            .map_err(|e| AspexError::Versioning(format!("failed to run git: {e}")))
    }
}

#[async_trait]
impl Versioner for GitVersioner {
    async fn version(&self, roots: &[PathBuf]) -> Result<()> {
        for root in roots {
            tracing::info!(root = %root.display(), "Versioning export tree");

            let add = self.run_git(root, &["add", "-A"]).await?;
            if !add.status.success() {
                return Err(AspexError::Versioning(format!(
                    "git add failed in {}: {}",
                    root.display(),
                    String::from_utf8_lossy(&add.stderr).trim()
                )));
            }

            let commit = self
                .run_git(root, &["commit", "-m", &self.commit_message])
                .await?;
            if !commit.status.success() {
                let stdout = String::from_utf8_lossy(&commit.stdout);
                // A root may be unchanged this run even though the other one
                // changed; that is not an error.
                if stdout.contains("nothing to commit") {
                    tracing::debug!(root = %root.display(), "Nothing to commit");
                    continue;
                }
                return Err(AspexError::Versioning(format!(
                    "git commit failed in {}: {}",
                    root.display(),
                    String::from_utf8_lossy(&commit.stderr).trim()
                )));
            }

            let push = self.run_git(root, &["push"]).await?;
            if !push.status.success() {
                return Err(AspexError::Versioning(format!(
                    "git push failed in {}: {}",
                    root.display(),
                    String::from_utf8_lossy(&push.stderr).trim()
                )));
            }
        }
        Ok(())
    }
}
