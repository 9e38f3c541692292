//! ArchivesSpace client trait definition
//!
//! The reconciler drives the remote API exclusively through this trait,
//! which keeps the algorithmic core testable against an in-memory fake and
//! independent of the HTTP implementation.

use crate::adapters::archivesspace::models::{
    ArchivalObject, DigitalObject, Resource, ResolvedRecord, TreeComponent,
};
use crate::config::EadOptions;
use crate::domain::Result;
use async_trait::async_trait;

/// Interface to the remote archival-description API
///
/// List operations return all identifiers within the configured repository,
/// optionally filtered to records modified at or after the given epoch
/// timestamp (`None` means no filter). Raw-export operations return the
/// serialized representation as bytes.
#[async_trait]
pub trait ArchivesClient: Send + Sync {
    /// Establish an authenticated session.
    ///
    /// Fatal when it fails at run start: an unreachable or unauthenticated
    /// API aborts before any export.
    async fn authenticate(&self) -> Result<()>;

    async fn list_resource_ids(&self, modified_since: Option<i64>) -> Result<Vec<u64>>;

    async fn list_archival_object_ids(&self, modified_since: Option<i64>) -> Result<Vec<u64>>;

    async fn list_digital_object_ids(&self, modified_since: Option<i64>) -> Result<Vec<u64>>;

    async fn get_resource(&self, id: u64) -> Result<Resource>;

    async fn get_archival_object(&self, id: u64) -> Result<ArchivalObject>;

    async fn get_digital_object(&self, id: u64) -> Result<DigitalObject>;

    /// Fetch a digital object addressed by URI (as found in tree instances).
    async fn get_digital_object_by_ref(&self, uri: &str) -> Result<DigitalObject>;

    /// Resolve an arbitrary record reference to a typed view.
    async fn resolve_ref(&self, uri: &str) -> Result<ResolvedRecord>;

    /// Fetch the raw EAD finding-aid document for a resource.
    async fn fetch_ead(&self, resource_id: u64, options: &EadOptions) -> Result<Vec<u8>>;

    /// Fetch the raw METS document for a digital object.
    async fn fetch_mets(&self, digital_object_id: u64) -> Result<Vec<u8>>;

    /// Walk a resource's component tree, returning each component with its
    /// instances (used to find digital objects reachable from one resource).
    async fn walk_tree(&self, resource_id: u64) -> Result<Vec<TreeComponent>>;
}
