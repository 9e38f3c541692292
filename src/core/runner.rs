//! Run controller
//!
//! Selects exactly one run mode per invocation, enforces single-instance
//! execution, drives the reconciliation passes, commits the watermark for
//! time-scanning modes, and triggers versioning when anything changed.

use crate::adapters::archivesspace::ArchivesClient;
use crate::adapters::versioning::Versioner;
use crate::config::AspexConfig;
use crate::core::classify::CategoryFilter;
use crate::core::reconcile::{Reconciler, RunContext};
use crate::core::state::{PidLock, WatermarkStore};
use crate::domain::Result;
use std::sync::Arc;

/// Mutually exclusive run modes, first CLI match wins
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Commit the watermark and exit without exporting
    UpdateTimeOnly,
    /// Archival and/or library resources only (still watermark-filtered,
    /// but the watermark is not advanced)
    Filtered { archival: bool, library: bool },
    /// Digital objects only: the modified feed, or one resource's tree
    Digital { resource: Option<u64> },
    /// One resource fetched directly by id
    SingleResource(u64),
    /// Default full incremental sync
    FullSync,
}

/// Outcome of one run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub resources_exported: usize,
    pub resources_deleted: usize,
    pub digital_exported: usize,
    pub digital_deleted: usize,
    pub versioned: bool,
}

impl RunSummary {
    fn from_context(ctx: &RunContext, versioned: bool) -> Self {
        Self {
            resources_exported: ctx.resources_exported.len(),
            resources_deleted: ctx.resources_deleted.len(),
            digital_exported: ctx.digital_exported.len(),
            digital_deleted: ctx.digital_deleted.len(),
            versioned,
        }
    }

    pub fn total_changes(&self) -> usize {
        self.resources_exported
            + self.resources_deleted
            + self.digital_exported
            + self.digital_deleted
    }

    pub fn log_summary(&self) {
        tracing::info!(
            resources_exported = self.resources_exported,
            resources_deleted = self.resources_deleted,
            digital_exported = self.digital_exported,
            digital_deleted = self.digital_deleted,
            versioned = self.versioned,
            "Run finished, {} objects changed",
            self.total_changes()
        );
    }
}

/// Orchestrates one batch invocation
pub struct RunController {
    config: AspexConfig,
    client: Arc<dyn ArchivesClient>,
    reconciler: Reconciler,
    watermark: WatermarkStore,
    versioner: Arc<dyn Versioner>,
}

impl RunController {
    pub fn new(
        config: AspexConfig,
        client: Arc<dyn ArchivesClient>,
        reconciler: Reconciler,
        watermark: WatermarkStore,
        versioner: Arc<dyn Versioner>,
    ) -> Self {
        Self {
            config,
            client,
            reconciler,
            watermark,
            versioner,
        }
    }

    /// Execute one run in the given mode.
    ///
    /// Setup failures (lock conflict, unreachable API) abort before any
    /// export. A versioning failure propagates after all passes, leaving
    /// exported files and the committed watermark in place.
    pub async fn run(&self, mode: RunMode) -> Result<RunSummary> {
        let mut lock = PidLock::acquire(&self.config.state.pid_path)?;

        tracing::info!(mode = ?mode, "Export run started");
        self.client.authenticate().await?;
        self.ensure_destinations()?;

        // Captured before the passes so edits landing mid-run fall into the
        // next run's window.
        let start_time = chrono::Utc::now().timestamp();
        let watermark = self.watermark.read();

        let mut ctx = RunContext::new();

        match &mode {
            RunMode::UpdateTimeOnly => {
                self.watermark.commit(start_time)?;
                tracing::info!(timestamp = start_time, "Watermark updated, nothing exported");
            }
            RunMode::Filtered { archival, library } => {
                let filter = match (archival, library) {
                    (true, false) => CategoryFilter::ArchivalOnly,
                    (false, true) => CategoryFilter::LibraryOnly,
                    _ => CategoryFilter::ArchivalAndLibrary,
                };
                self.reconciler
                    .pass_resources(watermark, filter, &mut ctx)
                    .await?;
                self.reconciler
                    .pass_promoted_components(watermark, filter, &mut ctx)
                    .await?;
            }
            RunMode::Digital { resource: None } => {
                self.reconciler
                    .pass_digital_objects(watermark, &mut ctx)
                    .await?;
            }
            RunMode::Digital {
                resource: Some(resource_id),
            } => {
                self.reconciler
                    .pass_digital_for_resource(*resource_id, &mut ctx)
                    .await?;
            }
            RunMode::SingleResource(resource_id) => {
                self.reconciler
                    .reconcile_single_resource(*resource_id, &mut ctx)
                    .await?;
            }
            RunMode::FullSync => {
                self.reconciler
                    .pass_resources(watermark, CategoryFilter::All, &mut ctx)
                    .await?;
                self.reconciler
                    .pass_promoted_components(watermark, CategoryFilter::All, &mut ctx)
                    .await?;
                self.reconciler
                    .pass_digital_objects(watermark, &mut ctx)
                    .await?;
                if ctx.changed() {
                    self.reconciler.pass_associated_digital(&mut ctx).await?;
                } else {
                    tracing::info!("Nothing was exported");
                }
                self.watermark.commit(start_time)?;
            }
        }

        let versioned = if ctx.changed() && self.config.versioning.enabled {
            self.versioner
                .version(&[
                    self.config.destinations.data_root.clone(),
                    self.config.destinations.pdf_root.clone(),
                ])
                .await?;
            true
        } else {
            false
        };

        let summary = RunSummary::from_context(&ctx, versioned);
        summary.log_summary();

        lock.release();
        Ok(summary)
    }

    /// Create the destination trees before any pass runs.
    fn ensure_destinations(&self) -> Result<()> {
        let data_root = &self.config.destinations.data_root;
        for subdir in ["ead", "mods", "mets"] {
            std::fs::create_dir_all(data_root.join(subdir))?;
        }
        std::fs::create_dir_all(&self.config.destinations.pdf_root)?;
        Ok(())
    }
}
