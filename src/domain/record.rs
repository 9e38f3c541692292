//! The unit of work for reconciliation
//!
//! An [`ExportRecord`] is constructed fresh from each API fetch, classified
//! once, acted on once, and discarded. It is never mutated after
//! construction.

use crate::domain::ids::{LocalId, RemoteUri};
use std::path::{Path, PathBuf};

/// The export format a record maps to on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Archival resource exported as an EAD finding aid (plus derived PDF).
    FindingAid,
    /// Library-classified resource exported as MODS via the EAD transform.
    LibraryRecord,
    /// Digital object exported as a METS wrapper.
    DigitalObject,
}

impl RecordKind {
    /// Subdirectory under the data root holding this kind's exports.
    pub fn dir_name(&self) -> &'static str {
        match self {
            RecordKind::FindingAid => "ead",
            RecordKind::LibraryRecord => "mods",
            RecordKind::DigitalObject => "mets",
        }
    }
}

/// Strict prefix-derived category of a resource record.
///
/// Digital objects are categorized by their source feed, never by prefix,
/// and therefore carry no category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    FindingAid,
    Library,
}

/// Explicit tri-state publish flag.
///
/// The remote API omits the `publish` field on some record shapes; rather
/// than treating a missing field as an incidental falsy value, `Unknown` is
/// its own state and maps deterministically to the removal path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    Published,
    Unpublished,
    Unknown,
}

impl PublishState {
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => PublishState::Published,
            Some(false) => PublishState::Unpublished,
            None => PublishState::Unknown,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, PublishState::Published)
    }
}

/// A classified remote record ready for an export-or-remove decision.
#[derive(Debug, Clone)]
pub struct ExportRecord {
    /// Opaque stable identifier, used for per-run de-duplication.
    pub remote_uri: RemoteUri,
    /// Human identifier used in filenames.
    pub local_id: LocalId,
    pub kind: RecordKind,
    pub publish: PublishState,
    /// Strict prefix category; `None` for digital objects and for resources
    /// matching no configured prefix.
    pub category: Option<Category>,
}

impl ExportRecord {
    /// Directory holding this record's artifact:
    /// `{data_root}/{ead|mods|mets}/{local_id}`.
    pub fn target_dir(&self, data_root: &Path) -> PathBuf {
        data_root
            .join(self.kind.dir_name())
            .join(self.local_id.as_str())
    }

    /// Final artifact path: `{target_dir}/{local_id}.xml`.
    pub fn target_file(&self, data_root: &Path) -> PathBuf {
        self.target_dir(data_root)
            .join(format!("{}.xml", self.local_id))
    }

    /// Mirrored PDF directory for finding aids: `{pdf_root}/{local_id}`.
    pub fn pdf_dir(&self, pdf_root: &Path) -> PathBuf {
        pdf_root.join(self.local_id.as_str())
    }

    /// Derived PDF path: `{pdf_root}/{local_id}/{local_id}.pdf`.
    pub fn pdf_file(&self, pdf_root: &Path) -> PathBuf {
        self.pdf_dir(pdf_root).join(format!("{}.pdf", self.local_id))
    }
}
