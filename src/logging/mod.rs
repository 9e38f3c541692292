//! Logging and observability
//!
//! Structured logging with configurable levels, console output, and an
//! optional JSON file layer with rotation for scheduled batch runs.

pub mod structured;

pub use structured::{init_logging, LoggingGuard};
