//! Configuration schema
//!
//! Defines the TOML configuration structure for aspex with serde defaults
//! and startup validation. The classification prefix tables are validated
//! here so that identifier categorization is a checked mapping rather than
//! scattered string checks.

use crate::domain::errors::AspexError;
use crate::domain::result::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level aspex configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AspexConfig {
    #[serde(default)]
    pub application: ApplicationConfig,

    pub archivesspace: ArchivesSpaceConfig,

    pub destinations: DestinationsConfig,

    #[serde(default)]
    pub ead: EadOptions,

    #[serde(default)]
    pub classification: ClassificationConfig,

    #[serde(default)]
    pub state: StateConfig,

    #[serde(default)]
    pub versioning: VersioningConfig,

    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Application-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Default log level when not overridden on the CLI
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// ArchivesSpace backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivesSpaceConfig {
    /// Base URL of the ArchivesSpace backend API, e.g. `http://localhost:8089`
    pub base_url: String,

    /// Repository id within the ArchivesSpace installation
    pub repository: String,

    pub username: String,

    /// Password; supports `${VAR}` substitution in the TOML file
    pub password: String,
}

/// Export destination roots
///
/// XML artifacts land under `data_root/{ead|mods|mets}/{id}/{id}.xml`;
/// derived PDFs under `pdf_root/{id}/{id}.pdf`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationsConfig {
    pub data_root: PathBuf,
    pub pdf_root: PathBuf,
}

/// Options forwarded to the EAD raw-export endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EadOptions {
    #[serde(default)]
    pub include_unpublished: bool,

    #[serde(default = "default_true")]
    pub include_daos: bool,

    #[serde(default)]
    pub numbered_cs: bool,
}

impl Default for EadOptions {
    fn default() -> Self {
        Self {
            include_unpublished: false,
            include_daos: true,
            numbered_cs: false,
        }
    }
}

/// Identifier prefix tables mapping local identifiers to categories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationConfig {
    /// Prefixes marking a resource as an archival finding aid (EAD)
    #[serde(default = "default_finding_aid_prefixes")]
    pub finding_aid_prefixes: Vec<String>,

    /// Prefixes marking a resource as a library record (MODS, no PDF)
    #[serde(default = "default_library_prefixes")]
    pub library_prefixes: Vec<String>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            finding_aid_prefixes: default_finding_aid_prefixes(),
            library_prefixes: default_library_prefixes(),
        }
    }
}

/// Persisted run state locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Single-value watermark file holding a decimal epoch timestamp
    #[serde(default = "default_last_export_path")]
    pub last_export_path: PathBuf,

    /// PID marker file for single-instance enforcement
    #[serde(default = "default_pid_path")]
    pub pid_path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            last_export_path: default_last_export_path(),
            pid_path: default_pid_path(),
        }
    }
}

/// Versioning collaborator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersioningConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_commit_message")]
    pub commit_message: String,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            commit_message: default_commit_message(),
        }
    }
}

/// External artifact tooling (PDF renderer and EAD-to-MODS stylesheet)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Command used to render a finding aid PDF; invoked as
    /// `{pdf_command} {pdf_args...} {input.xml} {output.pdf}`
    #[serde(default = "default_pdf_command")]
    pub pdf_command: String,

    #[serde(default = "default_pdf_args")]
    pub pdf_args: Vec<String>,

    /// XSLT processor invoked as `{xslt_command} {stylesheet} {input.xml}`
    /// with the MODS document captured from stdout
    #[serde(default = "default_xslt_command")]
    pub xslt_command: String,

    #[serde(default = "default_stylesheet")]
    pub stylesheet: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            pdf_command: default_pdf_command(),
            pdf_args: default_pdf_args(),
            xslt_command: default_xslt_command(),
            stylesheet: default_stylesheet(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging in addition to console output
    #[serde(default)]
    pub local_enabled: bool,

    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Rotation policy: "daily" or "hourly"
    #[serde(default = "default_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_rotation(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_finding_aid_prefixes() -> Vec<String> {
    vec!["FA".to_string()]
}

fn default_library_prefixes() -> Vec<String> {
    vec!["LI".to_string()]
}

fn default_last_export_path() -> PathBuf {
    PathBuf::from("last_export.txt")
}

fn default_pid_path() -> PathBuf {
    PathBuf::from("aspex.pid")
}

fn default_commit_message() -> String {
    "Update exported finding aids and digital object records".to_string()
}

fn default_pdf_command() -> String {
    "java".to_string()
}

fn default_pdf_args() -> Vec<String> {
    vec!["-jar".to_string(), "ead2pdf.jar".to_string()]
}

fn default_xslt_command() -> String {
    "xsltproc".to_string()
}

fn default_stylesheet() -> PathBuf {
    PathBuf::from("ead2mods.xsl")
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl AspexConfig {
    /// Validate the configuration at startup
    ///
    /// # Errors
    ///
    /// Returns `AspexError::Configuration` when the base URL does not parse,
    /// connection settings are blank, destination roots are empty, or the
    /// classification prefix tables are empty or overlapping.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.archivesspace.base_url).map_err(|e| {
            AspexError::Configuration(format!(
                "archivesspace.base_url is not a valid URL: {e}"
            ))
        })?;

        if self.archivesspace.repository.trim().is_empty() {
            return Err(AspexError::Configuration(
                "archivesspace.repository must not be empty".to_string(),
            ));
        }

        if self.archivesspace.username.trim().is_empty() {
            return Err(AspexError::Configuration(
                "archivesspace.username must not be empty".to_string(),
            ));
        }

        if self.destinations.data_root.as_os_str().is_empty() {
            return Err(AspexError::Configuration(
                "destinations.data_root must not be empty".to_string(),
            ));
        }

        if self.destinations.pdf_root.as_os_str().is_empty() {
            return Err(AspexError::Configuration(
                "destinations.pdf_root must not be empty".to_string(),
            ));
        }

        self.classification.validate()?;

        match self.logging.local_rotation.as_str() {
            "daily" | "hourly" => {}
            other => {
                return Err(AspexError::Configuration(format!(
                    "logging.local_rotation must be 'daily' or 'hourly', got '{other}'"
                )))
            }
        }

        Ok(())
    }
}

impl ClassificationConfig {
    /// Validate the prefix tables: both non-empty, no blank entries, and no
    /// prefix may appear in (or be a prefix of an entry in) both tables,
    /// which would make categorization ambiguous.
    pub fn validate(&self) -> Result<()> {
        if self.finding_aid_prefixes.is_empty() {
            return Err(AspexError::Configuration(
                "classification.finding_aid_prefixes must not be empty".to_string(),
            ));
        }
        if self.library_prefixes.is_empty() {
            return Err(AspexError::Configuration(
                "classification.library_prefixes must not be empty".to_string(),
            ));
        }
        for p in self
            .finding_aid_prefixes
            .iter()
            .chain(self.library_prefixes.iter())
        {
            if p.trim().is_empty() {
                return Err(AspexError::Configuration(
                    "classification prefixes must not be blank".to_string(),
                ));
            }
        }
        for fa in &self.finding_aid_prefixes {
            for li in &self.library_prefixes {
                if fa.starts_with(li.as_str()) || li.starts_with(fa.as_str()) {
                    return Err(AspexError::Configuration(format!(
                        "classification prefixes '{fa}' and '{li}' overlap"
                    )));
                }
            }
        }
        Ok(())
    }
}
