//! Shared test doubles and harness for the integration tests
//!
//! The reconciliation tests run the real controller, reconciler, exporter,
//! watermark store, and PID lock against an in-memory archive and fake
//! artifact tooling, so the only things faked are the process boundaries.

#![allow(dead_code)]

use aspex::adapters::archivesspace::models::{
    ArchivalObject, DigitalObject, RefLink, ResolvedRecord, Resource, TreeComponent,
};
use aspex::adapters::archivesspace::ArchivesClient;
use aspex::adapters::artifacts::{ModsTransformer, PdfRenderer};
use aspex::adapters::versioning::Versioner;
use aspex::config::{AspexConfig, EadOptions};
use aspex::core::classify::Classifier;
use aspex::core::reconcile::{Exporter, Reconciler};
use aspex::core::runner::RunController;
use aspex::core::state::WatermarkStore;
use aspex::domain::errors::{ApiError, AspexError};
use aspex::domain::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const MODS_OUTPUT: &[u8] = b"<mods xmlns=\"http://www.loc.gov/mods/v3\"/>";

/// In-memory archive backing the [`ArchivesClient`] trait.
///
/// Records carry a modification timestamp so the `modified_since` list
/// filters behave like the real feeds. State is mutable between runs to
/// simulate remote edits.
#[derive(Default)]
pub struct FakeArchives {
    state: Mutex<ArchiveState>,
}

#[derive(Default)]
struct ArchiveState {
    resources: HashMap<u64, (i64, Resource)>,
    archival_objects: HashMap<u64, (i64, ArchivalObject)>,
    digital_objects: HashMap<u64, (i64, DigitalObject)>,
    trees: HashMap<u64, Vec<TreeComponent>>,
    ead: HashMap<u64, Vec<u8>>,
    mets: HashMap<u64, Vec<u8>>,
    resolved: HashMap<String, ResolvedRecord>,
    resource_fetches: HashMap<u64, usize>,
    mets_fetches: HashMap<u64, usize>,
}

pub fn resource_uri(id: u64) -> String {
    format!("/repositories/2/resources/{id}")
}

pub fn digital_uri(id: u64) -> String {
    format!("/repositories/2/digital_objects/{id}")
}

impl FakeArchives {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_resource(&self, id: u64, modified: i64, id_0: &str, publish: Option<bool>) {
        let mut state = self.state.lock().unwrap();
        state.resources.insert(
            id,
            (
                modified,
                Resource {
                    uri: resource_uri(id),
                    id_0: id_0.to_string(),
                    publish,
                },
            ),
        );
        state.ead.insert(
            id,
            format!("<ead><eadheader><eadid>{id_0}</eadid></eadheader></ead>").into_bytes(),
        );
    }

    pub fn set_resource_publish(&self, id: u64, publish: Option<bool>, modified: i64) {
        let mut state = self.state.lock().unwrap();
        let entry = state.resources.get_mut(&id).expect("resource not seeded");
        entry.0 = modified;
        entry.1.publish = publish;
    }

    pub fn add_archival_object(
        &self,
        id: u64,
        modified: i64,
        owning_resource: Option<u64>,
        publish: Option<bool>,
    ) {
        let mut state = self.state.lock().unwrap();
        state.archival_objects.insert(
            id,
            (
                modified,
                ArchivalObject {
                    uri: format!("/repositories/2/archival_objects/{id}"),
                    publish,
                    resource: owning_resource.map(|r| RefLink {
                        reference: resource_uri(r),
                    }),
                },
            ),
        );
    }

    pub fn add_digital_object(
        &self,
        id: u64,
        modified: i64,
        digital_object_id: &str,
        publish: Option<bool>,
        linked_instance: Option<&str>,
    ) {
        let mut state = self.state.lock().unwrap();
        state.digital_objects.insert(
            id,
            (
                modified,
                DigitalObject {
                    uri: digital_uri(id),
                    digital_object_id: digital_object_id.to_string(),
                    publish,
                    linked_instances: linked_instance
                        .map(|uri| {
                            vec![RefLink {
                                reference: uri.to_string(),
                            }]
                        })
                        .unwrap_or_default(),
                },
            ),
        );
        state.mets.insert(
            id,
            format!("<mets><metsHdr ID=\"{digital_object_id}\"/></mets>").into_bytes(),
        );
    }

    pub fn set_digital_publish(&self, id: u64, publish: Option<bool>, modified: i64) {
        let mut state = self.state.lock().unwrap();
        let entry = state
            .digital_objects
            .get_mut(&id)
            .expect("digital object not seeded");
        entry.0 = modified;
        entry.1.publish = publish;
    }

    /// Register the typed view returned when a linked instance is resolved.
    pub fn add_resolved(
        &self,
        uri: &str,
        jsonmodel_type: &str,
        owning_resource: Option<u64>,
    ) {
        let mut state = self.state.lock().unwrap();
        state.resolved.insert(
            uri.to_string(),
            ResolvedRecord {
                uri: uri.to_string(),
                jsonmodel_type: jsonmodel_type.to_string(),
                publish: Some(true),
                resource: owning_resource.map(|r| RefLink {
                    reference: resource_uri(r),
                }),
            },
        );
    }

    pub fn add_tree(&self, resource_id: u64, components: Vec<TreeComponent>) {
        self.state
            .lock()
            .unwrap()
            .trees
            .insert(resource_id, components);
    }

    /// Replace the EAD document served for a resource.
    pub fn set_ead(&self, id: u64, bytes: &[u8]) {
        self.state.lock().unwrap().ead.insert(id, bytes.to_vec());
    }

    /// Drop the EAD document so the next fetch fails.
    pub fn remove_ead(&self, id: u64) {
        self.state.lock().unwrap().ead.remove(&id);
    }

    pub fn resource_fetch_count(&self, id: u64) -> usize {
        self.state
            .lock()
            .unwrap()
            .resource_fetches
            .get(&id)
            .copied()
            .unwrap_or(0)
    }

    pub fn mets_fetch_count(&self, id: u64) -> usize {
        self.state
            .lock()
            .unwrap()
            .mets_fetches
            .get(&id)
            .copied()
            .unwrap_or(0)
    }

    fn list<T>(map: &HashMap<u64, (i64, T)>, modified_since: Option<i64>) -> Vec<u64> {
        let mut ids: Vec<u64> = map
            .iter()
            .filter(|(_, (modified, _))| modified_since.map_or(true, |since| *modified >= since))
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

#[async_trait]
impl ArchivesClient for FakeArchives {
    async fn authenticate(&self) -> Result<()> {
        Ok(())
    }

    async fn list_resource_ids(&self, modified_since: Option<i64>) -> Result<Vec<u64>> {
        Ok(Self::list(
            &self.state.lock().unwrap().resources,
            modified_since,
        ))
    }

    async fn list_archival_object_ids(&self, modified_since: Option<i64>) -> Result<Vec<u64>> {
        Ok(Self::list(
            &self.state.lock().unwrap().archival_objects,
            modified_since,
        ))
    }

    async fn list_digital_object_ids(&self, modified_since: Option<i64>) -> Result<Vec<u64>> {
        Ok(Self::list(
            &self.state.lock().unwrap().digital_objects,
            modified_since,
        ))
    }

    async fn get_resource(&self, id: u64) -> Result<Resource> {
        let mut state = self.state.lock().unwrap();
        *state.resource_fetches.entry(id).or_insert(0) += 1;
        state
            .resources
            .get(&id)
            .map(|(_, r)| r.clone())
            .ok_or_else(|| ApiError::NotFound(resource_uri(id)).into())
    }

    async fn get_archival_object(&self, id: u64) -> Result<ArchivalObject> {
        self.state
            .lock()
            .unwrap()
            .archival_objects
            .get(&id)
            .map(|(_, a)| a.clone())
            .ok_or_else(|| {
                ApiError::NotFound(format!("/repositories/2/archival_objects/{id}")).into()
            })
    }

    async fn get_digital_object(&self, id: u64) -> Result<DigitalObject> {
        self.state
            .lock()
            .unwrap()
            .digital_objects
            .get(&id)
            .map(|(_, d)| d.clone())
            .ok_or_else(|| ApiError::NotFound(digital_uri(id)).into())
    }

    async fn get_digital_object_by_ref(&self, uri: &str) -> Result<DigitalObject> {
        self.state
            .lock()
            .unwrap()
            .digital_objects
            .values()
            .find(|(_, d)| d.uri == uri)
            .map(|(_, d)| d.clone())
            .ok_or_else(|| ApiError::NotFound(uri.to_string()).into())
    }

    async fn resolve_ref(&self, uri: &str) -> Result<ResolvedRecord> {
        self.state
            .lock()
            .unwrap()
            .resolved
            .get(uri)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(uri.to_string()).into())
    }

    async fn fetch_ead(&self, resource_id: u64, _options: &EadOptions) -> Result<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .ead
            .get(&resource_id)
            .cloned()
            .ok_or_else(|| {
                ApiError::NotFound(format!("resource_descriptions/{resource_id}.xml")).into()
            })
    }

    async fn fetch_mets(&self, digital_object_id: u64) -> Result<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        *state.mets_fetches.entry(digital_object_id).or_insert(0) += 1;
        state
            .mets
            .get(&digital_object_id)
            .cloned()
            .ok_or_else(|| {
                ApiError::NotFound(format!("digital_objects/mets/{digital_object_id}.xml")).into()
            })
    }

    async fn walk_tree(&self, resource_id: u64) -> Result<Vec<TreeComponent>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .trees
            .get(&resource_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// PDF renderer that writes a stub file and records every render.
#[derive(Default)]
pub struct FakePdf {
    pub rendered: Mutex<Vec<PathBuf>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl PdfRenderer for FakePdf {
    async fn render(&self, _ead_xml: &Path, pdf_out: &Path) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AspexError::Pdf("renderer unavailable".to_string()));
        }
        std::fs::write(pdf_out, b"%PDF-1.4 stub")?;
        self.rendered.lock().unwrap().push(pdf_out.to_path_buf());
        Ok(())
    }
}

/// Transformer returning a fixed MODS document.
pub struct FakeMods;

#[async_trait]
impl ModsTransformer for FakeMods {
    async fn transform(&self, _ead_xml: &[u8]) -> Result<Vec<u8>> {
        Ok(MODS_OUTPUT.to_vec())
    }
}

/// Versioner recording the roots of every invocation.
#[derive(Default)]
pub struct FakeVersioner {
    pub calls: Mutex<Vec<Vec<PathBuf>>>,
}

#[async_trait]
impl Versioner for FakeVersioner {
    async fn version(&self, roots: &[PathBuf]) -> Result<()> {
        self.calls.lock().unwrap().push(roots.to_vec());
        Ok(())
    }
}

/// One temp workspace wiring the real components around the fakes.
pub struct Harness {
    pub dir: TempDir,
    pub config: AspexConfig,
    pub archives: Arc<FakeArchives>,
    pub pdf: Arc<FakePdf>,
    pub versioner: Arc<FakeVersioner>,
}

impl Harness {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let toml_content = format!(
            r#"
[archivesspace]
base_url = "http://localhost:8089"
repository = "2"
username = "admin"
password = "admin"

[destinations]
data_root = "{data}"
pdf_root = "{pdf}"

[state]
last_export_path = "{watermark}"
pid_path = "{pid}"
"#,
            data = dir.path().join("data").display(),
            pdf = dir.path().join("pdf").display(),
            watermark = dir.path().join("last_export.txt").display(),
            pid = dir.path().join("aspex.pid").display(),
        );
        let config: AspexConfig = toml::from_str(&toml_content).unwrap();
        config.validate().unwrap();

        Self {
            dir,
            config,
            archives: FakeArchives::new(),
            pdf: Arc::new(FakePdf::default()),
            versioner: Arc::new(FakeVersioner::default()),
        }
    }

    /// Build a controller over the current config and fakes. Each run gets
    /// a fresh controller, like each cron invocation gets a fresh process.
    pub fn controller(&self) -> RunController {
        let client: Arc<dyn ArchivesClient> = self.archives.clone();
        let classifier = Classifier::new(&self.config.classification).unwrap();
        let exporter = Exporter::new(
            client.clone(),
            self.pdf.clone(),
            Arc::new(FakeMods),
            self.config.destinations.data_root.clone(),
            self.config.destinations.pdf_root.clone(),
            self.config.ead.clone(),
        );
        let reconciler = Reconciler::new(client.clone(), classifier, exporter);
        let watermark = WatermarkStore::new(self.config.state.last_export_path.clone());
        RunController::new(
            self.config.clone(),
            client,
            reconciler,
            watermark,
            self.versioner.clone(),
        )
    }

    pub fn data_path(&self, rel: &str) -> PathBuf {
        self.dir.path().join("data").join(rel)
    }

    pub fn pdf_path(&self, rel: &str) -> PathBuf {
        self.dir.path().join("pdf").join(rel)
    }

    pub fn set_watermark(&self, timestamp: i64) {
        WatermarkStore::new(self.config.state.last_export_path.clone())
            .commit(timestamp)
            .unwrap();
    }

    pub fn watermark(&self) -> i64 {
        WatermarkStore::new(self.config.state.last_export_path.clone()).read()
    }

    pub fn version_calls(&self) -> usize {
        self.versioner.calls.lock().unwrap().len()
    }
}
