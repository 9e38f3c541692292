//! Export and remove actions
//!
//! One action per record: fetch the remote representation, stage it in a
//! temp file inside the target directory, and promote it to the final path
//! only on a fully successful read, so a partial download is never visible
//! at the final path. Any failure along the way falls back to removal of
//! the existing local copy (fail-safe: a possibly-stale copy is worse than
//! an absent one).

use crate::adapters::archivesspace::ArchivesClient;
use crate::adapters::artifacts::{ModsTransformer, PdfRenderer};
use crate::config::EadOptions;
use crate::core::reconcile::context::RunContext;
use crate::domain::errors::AspexError;
use crate::domain::record::{ExportRecord, PublishState, RecordKind};
use crate::domain::Result;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Performs export-or-remove actions for classified records
pub struct Exporter {
    client: Arc<dyn ArchivesClient>,
    pdf: Arc<dyn PdfRenderer>,
    mods: Arc<dyn ModsTransformer>,
    data_root: PathBuf,
    pdf_root: PathBuf,
    ead_options: EadOptions,
}

impl Exporter {
    pub fn new(
        client: Arc<dyn ArchivesClient>,
        pdf: Arc<dyn PdfRenderer>,
        mods: Arc<dyn ModsTransformer>,
        data_root: PathBuf,
        pdf_root: PathBuf,
        ead_options: EadOptions,
    ) -> Self {
        Self {
            client,
            pdf,
            mods,
            data_root,
            pdf_root,
            ead_options,
        }
    }

    /// Apply the export-or-remove decision for one record and record the
    /// outcome in the run context.
    ///
    /// Published records are exported; unpublished and unknown-publish
    /// records are removed. An export failure is logged and recovered by
    /// removing the existing local copy, with the URI landing in the delete
    /// set instead of the export set.
    pub async fn export_or_remove(&self, record: &ExportRecord, ctx: &mut RunContext) {
        match record.publish {
            PublishState::Published => self.export_record(record, ctx).await,
            PublishState::Unpublished | PublishState::Unknown => {
                if record.publish == PublishState::Unknown {
                    tracing::warn!(
                        local_id = %record.local_id,
                        "Publish state unknown, treating as unpublished"
                    );
                }
                self.remove_record(record, ctx);
            }
        }
    }

    /// Export the record, falling back to removal on any failure.
    ///
    /// On the failure path the URI goes into the delete set even when no
    /// file existed, marking the record as handled for later passes.
    pub async fn export_record(&self, record: &ExportRecord, ctx: &mut RunContext) {
        match self.export(record).await {
            Ok(()) => {
                tracing::info!(
                    local_id = %record.local_id,
                    kind = ?record.kind,
                    "Exported"
                );
                self.mark_exported(record, ctx);
            }
            Err(e) => {
                tracing::error!(
                    local_id = %record.local_id,
                    error = %e,
                    "Export failed, removing local copy"
                );
                if let Err(e) = self.remove(record) {
                    tracing::error!(
                        local_id = %record.local_id,
                        error = %e,
                        "Removal after failed export also failed"
                    );
                }
                self.mark_deleted(record, ctx);
            }
        }
    }

    /// Remove the record's local copy, marking the delete set only when
    /// something was actually removed (a no-op removal is not a change).
    pub fn remove_record(&self, record: &ExportRecord, ctx: &mut RunContext) {
        match self.remove(record) {
            Ok(true) => {
                tracing::info!(
                    local_id = %record.local_id,
                    kind = ?record.kind,
                    "Local copy removed"
                );
                self.mark_deleted(record, ctx);
            }
            Ok(false) => {
                tracing::debug!(
                    local_id = %record.local_id,
                    "No local copy to remove"
                );
            }
            Err(e) => {
                tracing::error!(
                    local_id = %record.local_id,
                    error = %e,
                    "Removal failed"
                );
            }
        }
    }

    /// Fetch and write the record's representation.
    async fn export(&self, record: &ExportRecord) -> Result<()> {
        let remote_id = record.remote_uri.trailing_id().ok_or_else(|| {
            AspexError::Fetch(format!(
                "URI has no numeric identifier: {}",
                record.remote_uri
            ))
        })?;

        match record.kind {
            RecordKind::FindingAid => {
                let ead = self.client.fetch_ead(remote_id, &self.ead_options).await?;
                if !xml_well_formed(&ead) {
                    return Err(AspexError::Transform(format!(
                        "EAD for {} is not well-formed XML",
                        record.local_id
                    )));
                }
                let target = record.target_file(&self.data_root);
                write_atomic(&record.target_dir(&self.data_root), &target, &ead)?;
                self.render_pdf(record, &target).await;
            }
            RecordKind::LibraryRecord => {
                let ead = self.client.fetch_ead(remote_id, &self.ead_options).await?;
                let mods = self.mods.transform(&ead).await?;
                write_atomic(
                    &record.target_dir(&self.data_root),
                    &record.target_file(&self.data_root),
                    &mods,
                )?;
            }
            RecordKind::DigitalObject => {
                let mets = self.client.fetch_mets(remote_id).await?;
                write_atomic(
                    &record.target_dir(&self.data_root),
                    &record.target_file(&self.data_root),
                    &mets,
                )?;
            }
        }
        Ok(())
    }

    /// Render the derived PDF for a finding aid.
    ///
    /// The PDF is a derived artifact: a rendering failure leaves the
    /// exported XML in place and is only logged.
    async fn render_pdf(&self, record: &ExportRecord, xml_path: &Path) {
        let pdf_dir = record.pdf_dir(&self.pdf_root);
        if let Err(e) = fs::create_dir_all(&pdf_dir) {
            tracing::error!(local_id = %record.local_id, error = %e, "Cannot create PDF directory");
            return;
        }
        let pdf_path = record.pdf_file(&self.pdf_root);
        match self.pdf.render(xml_path, &pdf_path).await {
            Ok(()) => {
                tracing::info!(local_id = %record.local_id, pdf = %pdf_path.display(), "PDF created");
            }
            Err(e) => {
                tracing::error!(local_id = %record.local_id, error = %e, "PDF rendering failed");
            }
        }
    }

    /// Delete the record's file, its containing directory, and (for finding
    /// aids) the mirrored PDF directory.
    ///
    /// Returns whether anything was removed. Idempotent: absent paths are a
    /// successful no-op.
    pub fn remove(&self, record: &ExportRecord) -> Result<bool> {
        let mut removed = false;

        let target = record.target_file(&self.data_root);
        if target.is_file() {
            fs::remove_file(&target)?;
            removed = true;
            let dir = record.target_dir(&self.data_root);
            if let Err(e) = fs::remove_dir(&dir) {
                // The directory holds only the artifact; anything else in it
                // is unexpected but not worth failing the removal over.
                tracing::warn!(dir = %dir.display(), error = %e, "Could not remove artifact directory");
            }
        }

        if record.kind == RecordKind::FindingAid {
            let pdf_dir = record.pdf_dir(&self.pdf_root);
            if pdf_dir.is_dir() {
                fs::remove_dir_all(&pdf_dir)?;
                removed = true;
            }
        }

        Ok(removed)
    }

    fn mark_exported(&self, record: &ExportRecord, ctx: &mut RunContext) {
        match record.kind {
            RecordKind::DigitalObject => {
                ctx.digital_exported.insert(record.remote_uri.clone());
            }
            _ => {
                ctx.resources_exported.insert(record.remote_uri.clone());
            }
        }
    }

    fn mark_deleted(&self, record: &ExportRecord, ctx: &mut RunContext) {
        match record.kind {
            RecordKind::DigitalObject => {
                ctx.digital_deleted.insert(record.remote_uri.clone());
            }
            _ => {
                ctx.resources_deleted.insert(record.remote_uri.clone());
            }
        }
    }
}

/// Atomically publish `bytes` at `final_path` via a temp file in `dir`.
fn write_atomic(dir: &Path, final_path: &Path, bytes: &[u8]) -> Result<()> {
    fs::create_dir_all(dir)?;
    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| AspexError::Io(format!("temp file in {}: {e}", dir.display())))?;
    temp.write_all(bytes)
        .map_err(|e| AspexError::Io(format!("write {}: {e}", final_path.display())))?;
    temp.persist(final_path)
        .map_err(|e| AspexError::Io(format!("promote {}: {e}", final_path.display())))?;
    Ok(())
}

/// Cheap well-formedness gate: the document must parse to EOF and contain
/// at least one element. This rejects truncated downloads and JSON error
/// bodies served with a 200.
pub fn xml_well_formed(bytes: &[u8]) -> bool {
    let mut reader = quick_xml::Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut saw_element = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Eof) => return saw_element,
            Ok(quick_xml::events::Event::Start(_))
            | Ok(quick_xml::events::Event::Empty(_)) => saw_element = true,
            Ok(_) => {}
            Err(_) => return false,
        }
        buf.clear();
    }
}
