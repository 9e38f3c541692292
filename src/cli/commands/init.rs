//! Init command implementation
//!
//! Writes a commented sample configuration file.

use clap::Args;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Output path for the sample configuration
    #[arg(short, long, default_value = "aspex.toml")]
    pub output: String,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

const SAMPLE_CONFIG: &str = r#"# aspex configuration

[application]
log_level = "info"

[archivesspace]
# Base URL of the ArchivesSpace backend API
base_url = "http://localhost:8089"
# Repository id within the installation
repository = "2"
username = "admin"
# ${VAR} placeholders are substituted from the environment at load time
password = "${ASPEX_AS_PASSWORD}"

[destinations]
# XML exports land under {data_root}/{ead|mods|mets}/{id}/{id}.xml
data_root = "/var/aspex/data"
# Derived finding-aid PDFs land under {pdf_root}/{id}/{id}.pdf
pdf_root = "/var/aspex/pdf"

[ead]
include_unpublished = false
include_daos = true
numbered_cs = false

[classification]
# Identifier prefixes deciding how a resource is exported
finding_aid_prefixes = ["FA"]
library_prefixes = ["LI"]

[state]
last_export_path = "/var/aspex/last_export.txt"
pid_path = "/var/aspex/aspex.pid"

[versioning]
enabled = true
commit_message = "Update exported finding aids and digital object records"

[artifacts]
pdf_command = "java"
pdf_args = ["-jar", "ead2pdf.jar"]
xslt_command = "xsltproc"
stylesheet = "ead2mods.xsl"

[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"
"#;

impl InitArgs {
    /// Write the sample configuration, returning the exit code.
    pub async fn execute(&self) -> anyhow::Result<i32> {
        let path = Path::new(&self.output);
        if path.exists() && !self.force {
            eprintln!(
                "{} already exists, use --force to overwrite",
                path.display()
            );
            return Ok(2);
        }
        std::fs::write(path, SAMPLE_CONFIG)?;
        println!("Wrote sample configuration to {}", path.display());
        Ok(0)
    }
}
