//! Configuration management
//!
//! TOML-based configuration with environment variable substitution and
//! `ASPEX_*` overrides. See [`schema::AspexConfig`] for the full layout.

pub mod loader;
pub mod schema;

pub use loader::load_config;
pub use schema::{
    ArchivesSpaceConfig, ArtifactsConfig, AspexConfig, ClassificationConfig,
    DestinationsConfig, EadOptions, LoggingConfig, StateConfig, VersioningConfig,
};
