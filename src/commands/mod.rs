//! Command implementations
//!
//! Each module corresponds to something the CLI can run.

pub mod views;

pub use views::{export_ranked_links, run as views_run, ExportOptions, ExportSummary};
