//! Incremental-sync reconciliation
//!
//! The reconciler walks up to four change feeds per invocation and turns
//! each record's publish state into an idempotent export-or-remove action.
//! All passes thread an explicit [`RunContext`] whose seen-sets prevent a
//! record reachable via multiple feeds from being handled twice:
//!
//! 1. resources modified since the watermark;
//! 2. modified child components, promoted to their owning resource (a
//!    component edit does not touch the parent's modification time in the
//!    source system, yet must re-export the parent's finding aid);
//! 3. modified digital objects, or the digital objects reachable from one
//!    resource's component tree;
//! 4. in full runs that changed anything, all digital objects re-checked
//!    against the resource seen-sets, catching objects whose own timestamp
//!    never moved but whose owning resource flipped publish state.
//!
//! A per-record fetch or parse failure is logged with the record's local
//! identifier and routed to the removal path; the pass continues.

pub mod actions;
pub mod context;

pub use actions::Exporter;
pub use context::RunContext;

use crate::adapters::archivesspace::models::{DigitalObject, Resource};
use crate::adapters::archivesspace::ArchivesClient;
use crate::core::classify::{CategoryFilter, Classifier};
use crate::domain::ids::{LocalId, RemoteUri};
use crate::domain::record::{ExportRecord, PublishState, RecordKind};
use crate::domain::Result;
use std::sync::Arc;

const DIGITAL_OBJECT_INSTANCE: &str = "digital_object";
const RESOURCE_MODEL_TYPE: &str = "resource";

/// Drives the per-run reconciliation passes
pub struct Reconciler {
    client: Arc<dyn ArchivesClient>,
    classifier: Classifier,
    exporter: Exporter,
}

impl Reconciler {
    pub fn new(client: Arc<dyn ArchivesClient>, classifier: Classifier, exporter: Exporter) -> Self {
        Self {
            client,
            classifier,
            exporter,
        }
    }

    /// Pass 1: resources modified at or after the watermark.
    pub async fn pass_resources(
        &self,
        since: i64,
        filter: CategoryFilter,
        ctx: &mut RunContext,
    ) -> Result<()> {
        let ids = self.client.list_resource_ids(since_param(since)).await?;
        tracing::info!(count = ids.len(), since = since, "Checking resources");

        for id in ids {
            let resource = match self.client.get_resource(id).await {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(resource_id = id, error = %e, "Skipping unreadable resource");
                    continue;
                }
            };
            if let Some(record) = self.resource_record(&resource, filter) {
                self.exporter.export_or_remove(&record, ctx).await;
            }
        }
        Ok(())
    }

    /// Pass 2: modified child components promoted to their owning resource.
    ///
    /// Skips resources already handled by pass 1 (or by an earlier
    /// component of the same resource in this pass).
    pub async fn pass_promoted_components(
        &self,
        since: i64,
        filter: CategoryFilter,
        ctx: &mut RunContext,
    ) -> Result<()> {
        let ids = self
            .client
            .list_archival_object_ids(since_param(since))
            .await?;
        tracing::info!(count = ids.len(), since = since, "Checking archival objects");

        for id in ids {
            let component = match self.client.get_archival_object(id).await {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(archival_object_id = id, error = %e, "Skipping unreadable component");
                    continue;
                }
            };
            let Some(parent_ref) = component.resource else {
                tracing::debug!(archival_object_id = id, "Component has no owning resource");
                continue;
            };

            let parent_uri = RemoteUri::new(parent_ref.reference.clone());
            if ctx.resource_seen(&parent_uri) {
                continue;
            }

            let Some(resource_id) = parent_uri.trailing_id() else {
                tracing::warn!(uri = %parent_uri, "Owning resource ref has no numeric id");
                continue;
            };
            let resource = match self.client.get_resource(resource_id).await {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(resource_id = resource_id, error = %e, "Skipping unreadable owning resource");
                    continue;
                }
            };
            if let Some(record) = self.resource_record(&resource, filter) {
                self.exporter.export_or_remove(&record, ctx).await;
            }
        }
        Ok(())
    }

    /// Pass 3 (feed variant): digital objects modified since the watermark.
    pub async fn pass_digital_objects(&self, since: i64, ctx: &mut RunContext) -> Result<()> {
        let ids = self
            .client
            .list_digital_object_ids(since_param(since))
            .await?;
        tracing::info!(count = ids.len(), since = since, "Checking digital objects");

        for id in ids {
            let digital = match self.client.get_digital_object(id).await {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!(digital_object_id = id, error = %e, "Skipping unreadable digital object");
                    continue;
                }
            };
            self.handle_digital_by_publish(&digital, ctx).await;
        }
        Ok(())
    }

    /// Pass 3 (tree variant): digital objects reachable from one resource.
    pub async fn pass_digital_for_resource(
        &self,
        resource_id: u64,
        ctx: &mut RunContext,
    ) -> Result<()> {
        tracing::info!(resource_id = resource_id, "Walking resource tree for digital objects");
        let components = self.client.walk_tree(resource_id).await?;

        for component in components {
            for instance in &component.instances {
                if instance.instance_type != DIGITAL_OBJECT_INSTANCE {
                    continue;
                }
                let Some(link) = &instance.digital_object else {
                    continue;
                };
                let digital = match self.client.get_digital_object_by_ref(&link.reference).await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!(uri = %link.reference, error = %e, "Skipping unreadable digital object");
                        continue;
                    }
                };
                self.handle_digital_by_publish(&digital, ctx).await;
            }
        }
        Ok(())
    }

    /// Pass 4: re-scan all digital objects against the resource seen-sets.
    ///
    /// Catches digital objects that were not themselves modified but whose
    /// owning resource was exported or deleted this run.
    pub async fn pass_associated_digital(&self, ctx: &mut RunContext) -> Result<()> {
        let ids = self.client.list_digital_object_ids(None).await?;
        tracing::info!(count = ids.len(), "Checking associated digital objects");

        for id in ids {
            let digital = match self.client.get_digital_object(id).await {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!(digital_object_id = id, error = %e, "Skipping unreadable digital object");
                    continue;
                }
            };
            let record = match self.digital_record(&digital) {
                Some(r) => r,
                None => continue,
            };
            if ctx.digital_seen(&record.remote_uri) {
                continue;
            }

            if !record.publish.is_published() {
                self.exporter.remove_record(&record, ctx);
                continue;
            }

            let Some(resource_uri) = self.owning_resource_uri(&digital).await else {
                continue;
            };
            if ctx.resources_exported.contains(&resource_uri) {
                self.exporter.export_record(&record, ctx).await;
            } else if ctx.resources_deleted.contains(&resource_uri) {
                self.exporter.remove_record(&record, ctx);
            }
        }
        Ok(())
    }

    /// Reconcile one resource fetched directly by id (single-resource mode).
    pub async fn reconcile_single_resource(
        &self,
        resource_id: u64,
        ctx: &mut RunContext,
    ) -> Result<()> {
        let resource = self.client.get_resource(resource_id).await?;
        if let Some(record) = self.resource_record(&resource, CategoryFilter::All) {
            self.exporter.export_or_remove(&record, ctx).await;
        }
        Ok(())
    }

    /// Export-or-remove a digital object per its own publish flag,
    /// de-duplicated against the digital seen-sets.
    async fn handle_digital_by_publish(&self, digital: &DigitalObject, ctx: &mut RunContext) {
        let Some(record) = self.digital_record(digital) else {
            return;
        };
        if ctx.digital_seen(&record.remote_uri) {
            return;
        }
        self.exporter.export_or_remove(&record, ctx).await;
    }

    /// Resolve the resource a digital object hangs off.
    ///
    /// Follows the first linked instance. When the resolved record is
    /// itself a resource, its URI is taken directly rather than traversing
    /// one level further; otherwise the component's owning resource ref is
    /// used.
    async fn owning_resource_uri(&self, digital: &DigitalObject) -> Option<RemoteUri> {
        let link = digital.linked_instances.first()?;
        let resolved = match self.client.resolve_ref(&link.reference).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(
                    digital_object_id = %digital.digital_object_id,
                    uri = %link.reference,
                    error = %e,
                    "Cannot resolve linked instance"
                );
                return None;
            }
        };
        if resolved.jsonmodel_type == RESOURCE_MODEL_TYPE {
            Some(RemoteUri::new(link.reference.clone()))
        } else {
            resolved
                .resource
                .map(|r| RemoteUri::new(r.reference))
                .or_else(|| {
                    tracing::debug!(
                        digital_object_id = %digital.digital_object_id,
                        "Linked component has no owning resource"
                    );
                    None
                })
        }
    }

    /// Build the export record for a resource under the given filter.
    fn resource_record(&self, resource: &Resource, filter: CategoryFilter) -> Option<ExportRecord> {
        let kind = self.classifier.export_kind(&resource.id_0, filter)?;
        let local_id = match LocalId::new(resource.id_0.clone()) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(uri = %resource.uri, error = %e, "Skipping resource with unusable identifier");
                return None;
            }
        };
        Some(ExportRecord {
            remote_uri: RemoteUri::new(resource.uri.clone()),
            local_id,
            kind,
            publish: PublishState::from_flag(resource.publish),
            category: self.classifier.classify(&resource.id_0),
        })
    }

    fn digital_record(&self, digital: &DigitalObject) -> Option<ExportRecord> {
        let local_id = match LocalId::new(digital.digital_object_id.clone()) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(uri = %digital.uri, error = %e, "Skipping digital object with unusable identifier");
                return None;
            }
        };
        Some(ExportRecord {
            remote_uri: RemoteUri::new(digital.uri.clone()),
            local_id,
            kind: RecordKind::DigitalObject,
            publish: PublishState::from_flag(digital.publish),
            category: None,
        })
    }
}

/// A watermark of 0 means no prior run: list without a modified-since filter.
fn since_param(since: i64) -> Option<i64> {
    if since > 0 {
        Some(since)
    } else {
        None
    }
}
