//! ArchivesSpace API response models
//!
//! Thin serde views over the JSON records the backend API returns. Only the
//! fields the reconciler consumes are modeled; unknown fields are ignored.
//! `publish` is optional everywhere so a missing flag surfaces as an
//! explicit unknown state instead of a deserialization failure.

use serde::Deserialize;

/// A `{"ref": "/repositories/2/resources/1"}` reference object
#[derive(Debug, Clone, Deserialize)]
pub struct RefLink {
    #[serde(rename = "ref")]
    pub reference: String,
}

/// Session token returned by the login endpoint
#[derive(Debug, Deserialize)]
pub struct SessionResponse {
    pub session: String,
}

/// Top-level archival resource record
#[derive(Debug, Clone, Deserialize)]
pub struct Resource {
    pub uri: String,
    pub id_0: String,
    pub publish: Option<bool>,
}

/// Child archival component record
#[derive(Debug, Clone, Deserialize)]
pub struct ArchivalObject {
    pub uri: String,
    pub publish: Option<bool>,
    /// Owning top-level resource
    pub resource: Option<RefLink>,
}

/// Digital object record
#[derive(Debug, Clone, Deserialize)]
pub struct DigitalObject {
    pub uri: String,
    pub digital_object_id: String,
    pub publish: Option<bool>,
    #[serde(default)]
    pub linked_instances: Vec<RefLink>,
}

/// A record resolved by reference, typed by `jsonmodel_type`
///
/// Used when following a digital object's linked instance: the target may be
/// a resource itself or a component whose `resource` ref points one level up.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolvedRecord {
    pub uri: String,
    pub jsonmodel_type: String,
    pub publish: Option<bool>,
    pub resource: Option<RefLink>,
}

/// Node in a resource's component tree
#[derive(Debug, Clone, Deserialize)]
pub struct TreeNode {
    pub record_uri: Option<String>,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Flatten the tree into record URIs, depth-first, root included.
    pub fn record_uris(&self) -> Vec<String> {
        let mut uris = Vec::new();
        self.collect_uris(&mut uris);
        uris
    }

    fn collect_uris(&self, out: &mut Vec<String>) {
        if let Some(uri) = &self.record_uri {
            out.push(uri.clone());
        }
        for child in &self.children {
            child.collect_uris(out);
        }
    }
}

/// Component record as seen during a tree walk, carrying its instances
#[derive(Debug, Clone, Deserialize)]
pub struct TreeComponent {
    #[serde(default)]
    pub instances: Vec<Instance>,
}

/// An instance attached to a component (container, digital object, ...)
#[derive(Debug, Clone, Deserialize)]
pub struct Instance {
    pub instance_type: String,
    pub digital_object: Option<RefLink>,
}
