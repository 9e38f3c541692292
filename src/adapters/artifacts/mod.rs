//! Derived-artifact tooling
//!
//! PDF rendering and the EAD-to-MODS transform are external collaborators;
//! the core drives them through narrow traits. The production
//! implementations shell out to configured commands (a FOP-style renderer
//! jar and an XSLT processor), checking exit status and treating any
//! failure as a per-record error.

use crate::config::ArtifactsConfig;
use crate::domain::errors::AspexError;
use crate::domain::Result;
use async_trait::async_trait;
use std::io::Write;
use std::path::Path;
use tokio::process::Command;

/// Renders a finding-aid PDF from a well-formed EAD file on disk.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, ead_xml: &Path, pdf_out: &Path) -> Result<()>;
}

/// Transforms an EAD document into MODS.
#[async_trait]
pub trait ModsTransformer: Send + Sync {
    async fn transform(&self, ead_xml: &[u8]) -> Result<Vec<u8>>;
}

/// PDF renderer invoking an external command as
/// `{command} {args...} {input.xml} {output.pdf}`.
pub struct CommandPdfRenderer {
    command: String,
    args: Vec<String>,
}

impl CommandPdfRenderer {
    pub fn new(config: &ArtifactsConfig) -> Self {
        Self {
            command: config.pdf_command.clone(),
            args: config.pdf_args.clone(),
        }
    }
}

#[async_trait]
impl PdfRenderer for CommandPdfRenderer {
    async fn render(&self, ead_xml: &Path, pdf_out: &Path) -> Result<()> {
        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(ead_xml)
            .arg(pdf_out)
            .output()
            .await
            .map_err(|e| AspexError::Pdf(format!("failed to run {}: {e}", self.command)))?;

        if !output.status.success() {
            return Err(AspexError::Pdf(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

/// XSLT-based transformer invoking an external processor as
/// `{command} {stylesheet} {input.xml}`, capturing MODS from stdout.
pub struct XsltModsTransformer {
    command: String,
    stylesheet: std::path::PathBuf,
}

impl XsltModsTransformer {
    pub fn new(config: &ArtifactsConfig) -> Self {
        Self {
            command: config.xslt_command.clone(),
            stylesheet: config.stylesheet.clone(),
        }
    }
}

#[async_trait]
impl ModsTransformer for XsltModsTransformer {
    async fn transform(&self, ead_xml: &[u8]) -> Result<Vec<u8>> {
        // The processor reads a file path, so stage the input in a temp file.
        let mut input = tempfile::NamedTempFile::new()
            .map_err(|e| AspexError::Transform(format!("temp file: {e}")))?;
        input
            .write_all(ead_xml)
            .map_err(|e| AspexError::Transform(format!("temp file write: {e}")))?;
        input
            .flush()
            .map_err(|e| AspexError::Transform(format!("temp file flush: {e}")))?;

        let output = Command::new(&self.command)
            .arg(&self.stylesheet)
            .arg(input.path())
            .output()
            .await
            .map_err(|e| AspexError::Transform(format!("failed to run {}: {e}", self.command)))?;

        if !output.status.success() {
            return Err(AspexError::Transform(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        if output.stdout.is_empty() {
            return Err(AspexError::Transform(
                "transform produced empty output".to_string(),
            ));
        }
        Ok(output.stdout)
    }
}
