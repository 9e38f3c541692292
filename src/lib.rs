// aspex - ArchivesSpace incremental export mirror
// Licensed under the MIT License

//! # aspex - ArchivesSpace incremental export mirror
//!
//! aspex incrementally exports archival description records from an
//! ArchivesSpace backend into local EAD, MODS, and METS files (plus derived
//! finding-aid PDFs), keeps the local mirror in sync with remote
//! publish/unpublish state, and versions the mirror into a git remote.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and run-mode selection
//! - [`core`] - Reconciliation logic (classification, passes, run state)
//! - [`adapters`] - External collaborators (ArchivesSpace API, PDF/XSLT
//!   tooling, git versioning)
//! - [`domain`] - Export records, identifiers, and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## How a run works
//!
//! Each invocation is a single-shot batch: acquire the PID lock, read the
//! watermark (the last successful run start time), walk the change feeds
//! for the selected run mode, and apply an idempotent export-or-remove
//! action per record. Per-run seen-sets prevent a record reachable through
//! multiple feeds from being handled twice. The watermark is committed only
//! after a full run completes, so a failed run is retried from the old
//! watermark. If anything changed, the export trees are committed and
//! pushed.
//!
//! ```rust,no_run
//! use aspex::cli::commands::export::ExportArgs;
//! # async fn example(args: ExportArgs) -> anyhow::Result<()> {
//! let exit_code = args.execute("aspex.toml").await?;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
