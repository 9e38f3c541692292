//! Per-run reconciliation context
//!
//! The seen-sets live in an explicit value threaded through every pass
//! rather than as hidden state on the reconciler. Later passes consult the
//! sets that earlier passes filled: the promoted-component pass skips
//! resources already handled, and the associated-digital pass keys its
//! export/remove decision off the resource sets.

use crate::domain::ids::RemoteUri;
use std::collections::HashSet;

/// Seen-sets for one reconciliation run
#[derive(Debug, Default)]
pub struct RunContext {
    pub resources_exported: HashSet<RemoteUri>,
    pub resources_deleted: HashSet<RemoteUri>,
    pub digital_exported: HashSet<RemoteUri>,
    pub digital_deleted: HashSet<RemoteUri>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a resource was already exported or deleted this run.
    pub fn resource_seen(&self, uri: &RemoteUri) -> bool {
        self.resources_exported.contains(uri) || self.resources_deleted.contains(uri)
    }

    /// Whether a digital object was already exported or deleted this run.
    pub fn digital_seen(&self, uri: &RemoteUri) -> bool {
        self.digital_exported.contains(uri) || self.digital_deleted.contains(uri)
    }

    /// Whether this run changed anything at all.
    pub fn changed(&self) -> bool {
        !self.resources_exported.is_empty()
            || !self.resources_deleted.is_empty()
            || !self.digital_exported.is_empty()
            || !self.digital_deleted.is_empty()
    }

    pub fn total_changes(&self) -> usize {
        self.resources_exported.len()
            + self.resources_deleted.len()
            + self.digital_exported.len()
            + self.digital_deleted.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_context_is_unchanged() {
        let ctx = RunContext::new();
        assert!(!ctx.changed());
        assert_eq!(ctx.total_changes(), 0);
    }

    #[test]
    fn test_seen_covers_both_outcomes() {
        let mut ctx = RunContext::new();
        let exported = RemoteUri::new("/repositories/2/resources/1");
        let deleted = RemoteUri::new("/repositories/2/resources/2");
        let unseen = RemoteUri::new("/repositories/2/resources/3");

        ctx.resources_exported.insert(exported.clone());
        ctx.resources_deleted.insert(deleted.clone());

        assert!(ctx.resource_seen(&exported));
        assert!(ctx.resource_seen(&deleted));
        assert!(!ctx.resource_seen(&unseen));
        assert!(ctx.changed());
        assert_eq!(ctx.total_changes(), 2);
    }

    #[test]
    fn test_digital_sets_tracked_separately() {
        let mut ctx = RunContext::new();
        let uri = RemoteUri::new("/repositories/2/digital_objects/7");
        ctx.digital_exported.insert(uri.clone());
        assert!(ctx.digital_seen(&uri));
        assert!(!ctx.resource_seen(&uri));
    }
}
