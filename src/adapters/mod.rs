//! External integrations
//!
//! Narrow interfaces to the collaborators the core treats as external: the
//! ArchivesSpace API, derived-artifact tooling (PDF, XSLT), and the
//! revision-control versioner.

pub mod archivesspace;
pub mod artifacts;
pub mod versioning;
