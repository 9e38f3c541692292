//! Record classifier
//!
//! Maps a resource's local identifier to a category through the configured
//! prefix tables. Two checks are exposed: the strict category (used by
//! filtered runs, where an unmatched resource is skipped) and the default
//! export kind (used by full runs, where an unmatched resource is still
//! exported as plain EAD). Digital objects never pass through here; their
//! kind is fixed by the source feed.

use crate::config::ClassificationConfig;
use crate::domain::record::{Category, RecordKind};
use crate::domain::Result;

/// Prefix-table classifier, validated at construction
#[derive(Debug, Clone)]
pub struct Classifier {
    finding_aid_prefixes: Vec<String>,
    library_prefixes: Vec<String>,
}

/// Category filter applied by the run mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Full/default mode: everything eligible, unmatched prefixes as plain EAD
    All,
    /// `--archival-only`
    ArchivalOnly,
    /// `--library-only`
    LibraryOnly,
    /// `--archival-only --library-only`
    ArchivalAndLibrary,
}

impl CategoryFilter {
    fn admits(&self, category: Option<Category>) -> bool {
        match (self, category) {
            (CategoryFilter::All, _) => true,
            (CategoryFilter::ArchivalOnly, Some(Category::FindingAid)) => true,
            (CategoryFilter::LibraryOnly, Some(Category::Library)) => true,
            (CategoryFilter::ArchivalAndLibrary, Some(_)) => true,
            _ => false,
        }
    }
}

impl Classifier {
    pub fn new(config: &ClassificationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            finding_aid_prefixes: config.finding_aid_prefixes.clone(),
            library_prefixes: config.library_prefixes.clone(),
        })
    }

    /// Strict category by identifier prefix; `None` when no table matches.
    pub fn classify(&self, local_id: &str) -> Option<Category> {
        if self
            .finding_aid_prefixes
            .iter()
            .any(|p| local_id.starts_with(p.as_str()))
        {
            return Some(Category::FindingAid);
        }
        if self
            .library_prefixes
            .iter()
            .any(|p| local_id.starts_with(p.as_str()))
        {
            return Some(Category::Library);
        }
        None
    }

    /// The export kind for a resource under the given filter.
    ///
    /// Returns `None` when the filter excludes the record. Under
    /// [`CategoryFilter::All`], an identifier matching neither table is
    /// still eligible and exports as plain EAD.
    pub fn export_kind(&self, local_id: &str, filter: CategoryFilter) -> Option<RecordKind> {
        let category = self.classify(local_id);
        if !filter.admits(category) {
            return None;
        }
        match category {
            Some(Category::Library) => Some(RecordKind::LibraryRecord),
            Some(Category::FindingAid) | None => Some(RecordKind::FindingAid),
        }
    }
}
