//! CLI command implementations for chrome-info-exporter.
//!
//! This module provides implementations for all CLI subcommands:
//! - `scan`: One-shot scan printing the report
//! - `check`: System validation
//! - `config`: Configuration file generation

pub mod check;
pub mod config;
pub mod scan;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use scan::command_scan;
