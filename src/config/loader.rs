//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::AspexConfig;
use crate::domain::errors::AspexError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`AspexConfig`]
/// 4. Applies environment variable overrides (`ASPEX_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, TOML parsing fails, a
/// referenced environment variable is missing, or validation fails.
pub fn load_config(path: impl AsRef<Path>) -> Result<AspexConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(AspexError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        AspexError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: AspexConfig = toml::from_str(&contents)
        .map_err(|e| AspexError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        AspexError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched. Returns an error listing every
/// referenced variable that is not set.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(AspexError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the `ASPEX_*` prefix
///
/// Variables follow the pattern `ASPEX_<SECTION>_<KEY>`, e.g.
/// `ASPEX_ARCHIVESSPACE_BASE_URL` or `ASPEX_VERSIONING_ENABLED`.
fn apply_env_overrides(config: &mut AspexConfig) {
    if let Ok(val) = std::env::var("ASPEX_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("ASPEX_ARCHIVESSPACE_BASE_URL") {
        config.archivesspace.base_url = val;
    }
    if let Ok(val) = std::env::var("ASPEX_ARCHIVESSPACE_REPOSITORY") {
        config.archivesspace.repository = val;
    }
    if let Ok(val) = std::env::var("ASPEX_ARCHIVESSPACE_USERNAME") {
        config.archivesspace.username = val;
    }
    if let Ok(val) = std::env::var("ASPEX_ARCHIVESSPACE_PASSWORD") {
        config.archivesspace.password = val;
    }

    if let Ok(val) = std::env::var("ASPEX_DESTINATIONS_DATA_ROOT") {
        config.destinations.data_root = val.into();
    }
    if let Ok(val) = std::env::var("ASPEX_DESTINATIONS_PDF_ROOT") {
        config.destinations.pdf_root = val.into();
    }

    if let Ok(val) = std::env::var("ASPEX_STATE_LAST_EXPORT_PATH") {
        config.state.last_export_path = val.into();
    }
    if let Ok(val) = std::env::var("ASPEX_STATE_PID_PATH") {
        config.state.pid_path = val.into();
    }

    if let Ok(val) = std::env::var("ASPEX_VERSIONING_ENABLED") {
        match val.parse() {
            Ok(enabled) => config.versioning.enabled = enabled,
            Err(_) => {
                tracing::warn!(
                    value = %val,
                    "Ignoring unparseable ASPEX_VERSIONING_ENABLED, keeping configured value"
                );
            }
        }
    }

    if let Ok(val) = std::env::var("ASPEX_LOGGING_LOCAL_ENABLED") {
        match val.parse() {
            Ok(enabled) => config.logging.local_enabled = enabled,
            Err(_) => {
                tracing::warn!(
                    value = %val,
                    "Ignoring unparseable ASPEX_LOGGING_LOCAL_ENABLED, keeping configured value"
                );
            }
        }
    }
    if let Ok(val) = std::env::var("ASPEX_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
