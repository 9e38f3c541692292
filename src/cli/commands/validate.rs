//! Validate-config command implementation

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Load and validate the configuration, returning the exit code.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        match load_config(config_path) {
            Ok(config) => {
                println!("Configuration is valid: {config_path}");
                println!("  ArchivesSpace: {}", config.archivesspace.base_url);
                println!("  Repository:    {}", config.archivesspace.repository);
                println!(
                    "  Data root:     {}",
                    config.destinations.data_root.display()
                );
                println!(
                    "  PDF root:      {}",
                    config.destinations.pdf_root.display()
                );
                Ok(0)
            }
            Err(e) => {
                eprintln!("Configuration is invalid: {e}");
                Ok(e.exit_code())
            }
        }
    }
}
