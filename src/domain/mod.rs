//! Core domain types
//!
//! This module contains the domain model shared by the reconciler and the
//! adapters: the export record and its classification enums, identifier
//! newtypes, and the crate-wide error hierarchy.

pub mod errors;
pub mod ids;
pub mod record;
pub mod result;

pub use errors::{ApiError, AspexError};
pub use ids::{LocalId, RemoteUri};
pub use record::{Category, ExportRecord, PublishState, RecordKind};
pub use result::Result;
