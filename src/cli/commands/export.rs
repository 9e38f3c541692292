//! Export command implementation
//!
//! Builds the run controller from configuration and executes exactly one
//! run mode. The mode flags are mutually exclusive except for
//! `--archival-only`/`--library-only`, which may be combined.

use crate::adapters::archivesspace::ArchivesSpaceClient;
use crate::adapters::artifacts::{CommandPdfRenderer, XsltModsTransformer};
use crate::adapters::versioning::GitVersioner;
use crate::config::load_config;
use crate::core::classify::Classifier;
use crate::core::reconcile::{Exporter, Reconciler};
use crate::core::runner::{RunController, RunMode};
use crate::core::state::WatermarkStore;
use crate::domain::AspexError;
use clap::Args;
use std::sync::Arc;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Commit the watermark and exit without exporting anything
    #[arg(
        long,
        conflicts_with_all = ["archival_only", "library_only", "digital_only", "resource", "resource_digital"]
    )]
    pub update_time: bool,

    /// Export archival finding aids only
    #[arg(
        long,
        conflicts_with_all = ["update_time", "digital_only", "resource", "resource_digital"]
    )]
    pub archival_only: bool,

    /// Export library records only
    #[arg(
        long,
        conflicts_with_all = ["update_time", "digital_only", "resource", "resource_digital"]
    )]
    pub library_only: bool,

    /// Export modified digital objects only
    #[arg(
        long,
        conflicts_with_all = ["update_time", "archival_only", "library_only", "resource", "resource_digital"]
    )]
    pub digital_only: bool,

    /// Export a single resource record only
    #[arg(
        long,
        value_name = "ID",
        conflicts_with_all = ["update_time", "archival_only", "library_only", "digital_only", "resource_digital"]
    )]
    pub resource: Option<u64>,

    /// Export the digital objects of a single resource record only
    #[arg(
        long,
        value_name = "ID",
        conflicts_with_all = ["update_time", "archival_only", "library_only", "digital_only", "resource"]
    )]
    pub resource_digital: Option<u64>,
}

impl ExportArgs {
    /// Select the run mode from the flags, first match wins.
    pub fn run_mode(&self) -> RunMode {
        if self.update_time {
            RunMode::UpdateTimeOnly
        } else if self.archival_only || self.library_only {
            RunMode::Filtered {
                archival: self.archival_only,
                library: self.library_only,
            }
        } else if self.digital_only {
            RunMode::Digital { resource: None }
        } else if let Some(id) = self.resource_digital {
            RunMode::Digital { resource: Some(id) }
        } else if let Some(id) = self.resource {
            RunMode::SingleResource(id)
        } else {
            RunMode::FullSync
        }
    }

    /// Execute the export command, returning the process exit code.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Error: {e}");
                return Ok(e.exit_code());
            }
        };

        let controller = build_controller(&config)?;
        let mode = self.run_mode();

        match controller.run(mode).await {
            Ok(summary) => {
                println!(
                    "Run finished: {} exported, {} removed{}",
                    summary.resources_exported + summary.digital_exported,
                    summary.resources_deleted + summary.digital_deleted,
                    if summary.versioned { ", changes versioned" } else { "" }
                );
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, "Run failed");
                eprintln!("Error: {e}");
                Ok(e.exit_code())
            }
        }
    }
}

/// Wire the production collaborators into a run controller.
fn build_controller(config: &crate::config::AspexConfig) -> Result<RunController, AspexError> {
    let client = Arc::new(ArchivesSpaceClient::new(config.archivesspace.clone()));
    let classifier = Classifier::new(&config.classification)?;
    let exporter = Exporter::new(
        client.clone(),
        Arc::new(CommandPdfRenderer::new(&config.artifacts)),
        Arc::new(XsltModsTransformer::new(&config.artifacts)),
        config.destinations.data_root.clone(),
        config.destinations.pdf_root.clone(),
        config.ead.clone(),
    );
    let reconciler = Reconciler::new(client.clone(), classifier, exporter);
    let watermark = WatermarkStore::new(config.state.last_export_path.clone());
    let versioner = Arc::new(GitVersioner::new(config.versioning.commit_message.clone()));

    Ok(RunController::new(
        config.clone(),
        client,
        reconciler,
        watermark,
        versioner,
    ))
}
