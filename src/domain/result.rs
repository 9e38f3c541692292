//! Result type alias used throughout the crate

use crate::domain::errors::AspexError;

/// Convenience alias for `Result<T, AspexError>`
pub type Result<T> = std::result::Result<T, AspexError>;
