//! Configuration loading integration tests

use aspex::config::load_config;
use aspex::domain::AspexError;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_full_config_file() {
    let file = write_config(
        r#"
[application]
log_level = "debug"

[archivesspace]
base_url = "http://aspace.example.edu:8089"
repository = "3"
username = "exporter"
password = "secret"

[destinations]
data_root = "/srv/exports/data"
pdf_root = "/srv/exports/pdf"

[ead]
include_unpublished = true
include_daos = false
numbered_cs = true

[classification]
finding_aid_prefixes = ["FA", "MS"]
library_prefixes = ["LI"]

[state]
last_export_path = "/srv/exports/last_export.txt"
pid_path = "/srv/exports/aspex.pid"

[artifacts]
pdf_command = "/usr/bin/java"
pdf_args = ["-jar", "/opt/ead2pdf/ead2pdf.jar"]
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.archivesspace.base_url, "http://aspace.example.edu:8089");
    assert_eq!(config.archivesspace.repository, "3");
    assert!(config.ead.include_unpublished);
    assert!(!config.ead.include_daos);
    assert_eq!(config.classification.finding_aid_prefixes, vec!["FA", "MS"]);
    assert_eq!(config.artifacts.pdf_command, "/usr/bin/java");
    // Unspecified sections fall back to defaults.
    assert_eq!(config.logging.local_rotation, "daily");
}

#[test]
fn test_env_substitution_applied() {
    std::env::set_var("ASPEX_IT_SUBST_PASSWORD", "from_env");
    let file = write_config(
        r#"
[archivesspace]
base_url = "http://localhost:8089"
repository = "2"
username = "admin"
password = "${ASPEX_IT_SUBST_PASSWORD}"

[destinations]
data_root = "/var/aspex/data"
pdf_root = "/var/aspex/pdf"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.archivesspace.password, "from_env");
    std::env::remove_var("ASPEX_IT_SUBST_PASSWORD");
}

#[test]
fn test_missing_env_var_is_a_configuration_error() {
    std::env::remove_var("ASPEX_IT_UNSET_PASSWORD");
    let file = write_config(
        r#"
[archivesspace]
base_url = "http://localhost:8089"
repository = "2"
username = "admin"
password = "${ASPEX_IT_UNSET_PASSWORD}"

[destinations]
data_root = "/var/aspex/data"
pdf_root = "/var/aspex/pdf"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, AspexError::Configuration(_)));
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("ASPEX_IT_UNSET_PASSWORD"));
}

#[test]
fn test_env_override_wins_over_file() {
    // An override no other test reads, since tests share the environment.
    std::env::set_var("ASPEX_STATE_PID_PATH", "/run/aspex/override.pid");
    let file = write_config(
        r#"
[archivesspace]
base_url = "http://localhost:8089"
repository = "2"
username = "admin"
password = "admin"

[destinations]
data_root = "/var/aspex/data"
pdf_root = "/var/aspex/pdf"

[state]
pid_path = "/var/aspex/from_file.pid"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(
        config.state.pid_path,
        std::path::PathBuf::from("/run/aspex/override.pid")
    );
    std::env::remove_var("ASPEX_STATE_PID_PATH");
}

#[test]
fn test_missing_file_is_a_configuration_error() {
    let err = load_config("/nonexistent/aspex.toml").unwrap_err();
    assert!(matches!(err, AspexError::Configuration(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_invalid_toml_rejected() {
    let file = write_config("this is not toml [[[");
    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, AspexError::Configuration(_)));
}

#[test]
fn test_overlapping_prefixes_fail_validation() {
    let file = write_config(
        r#"
[archivesspace]
base_url = "http://localhost:8089"
repository = "2"
username = "admin"
password = "admin"

[destinations]
data_root = "/var/aspex/data"
pdf_root = "/var/aspex/pdf"

[classification]
finding_aid_prefixes = ["FA"]
library_prefixes = ["FAX"]
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("overlap"));
}
