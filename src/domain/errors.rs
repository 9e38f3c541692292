//! Domain error types
//!
//! All errors are domain-specific and don't expose third-party types.
//! The variants follow the run's failure taxonomy: setup errors abort
//! before any export, per-record fetch/transform errors are recovered by
//! the reconciler, and versioning errors are fatal only to the run's tail.

use thiserror::Error;

/// Main aspex error type
#[derive(Debug, Error)]
pub enum AspexError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Fatal setup errors that abort before any export
    #[error("Setup error: {0}")]
    Setup(String),

    /// Another invocation holds the PID lock
    #[error("Process is already running with PID {pid}")]
    AlreadyRunning { pid: u32 },

    /// ArchivesSpace API errors
    #[error("ArchivesSpace error: {0}")]
    Api(#[from] ApiError),

    /// Per-record fetch failures (recovered by the reconciler)
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// XML validation or EAD-to-MODS transform failures (recovered)
    #[error("Transform error: {0}")]
    Transform(String),

    /// PDF rendering failures
    #[error("PDF rendering error: {0}")]
    Pdf(String),

    /// Versioning collaborator failures (fatal to the run's tail;
    /// exported files are not rolled back)
    #[error("Versioning error: {0}")]
    Versioning(String),

    /// Watermark or lock store errors
    #[error("State error: {0}")]
    State(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl AspexError {
    /// Process exit code for this error when it reaches `main`.
    ///
    /// A clean run (including a clean run with zero changes) exits 0;
    /// these codes distinguish the unrecoverable setup classes.
    pub fn exit_code(&self) -> i32 {
        match self {
            AspexError::Configuration(_) => 2,
            AspexError::AlreadyRunning { .. } => 3,
            AspexError::Setup(_) | AspexError::Api(_) => 4,
            _ => 1,
        }
    }
}

/// ArchivesSpace API errors
///
/// These errors don't expose the underlying HTTP client types.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Failed to connect to the ArchivesSpace backend
    #[error("Failed to connect to ArchivesSpace: {0}")]
    ConnectionFailed(String),

    /// Session authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Response body could not be parsed
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Record not found (404)
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },
}

impl From<std::io::Error> for AspexError {
    fn from(err: std::io::Error) -> Self {
        AspexError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AspexError {
    fn from(err: serde_json::Error) -> Self {
        AspexError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for AspexError {
    fn from(err: toml::de::Error) -> Self {
        AspexError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AspexError::Configuration("bad prefix table".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad prefix table");
    }

    #[test]
    fn test_api_error_conversion() {
        let api_err = ApiError::AuthenticationFailed("403".to_string());
        let err: AspexError = api_err.into();
        assert!(matches!(err, AspexError::Api(_)));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(AspexError::Configuration("x".into()).exit_code(), 2);
        assert_eq!(AspexError::AlreadyRunning { pid: 42 }.exit_code(), 3);
        assert_eq!(AspexError::Setup("x".into()).exit_code(), 4);
        assert_eq!(
            AspexError::Api(ApiError::ConnectionFailed("x".into())).exit_code(),
            4
        );
        assert_eq!(AspexError::Versioning("x".into()).exit_code(), 1);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AspexError = io_err.into();
        assert!(matches!(err, AspexError::Io(_)));
    }

    #[test]
    fn test_implements_std_error() {
        let err = AspexError::State("corrupt watermark".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
