//! ArchivesSpace backend API adapter

pub mod client;
pub mod models;
pub mod traits;

pub use client::ArchivesSpaceClient;
pub use traits::ArchivesClient;
