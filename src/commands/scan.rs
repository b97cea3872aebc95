//! Scan command implementation.
//!
//! Runs a single scan into a fresh snapshot and prints what a reader of
//! `/chrome_info` would see.

use chrome_info_exporter::scanner::SNAPSHOT_CAPACITY;
use chrome_info_exporter::{parse_report, SnapshotBuffer};

use crate::config::Config;
use crate::state::TableSource;

/// Runs one scan and prints the report, or the parsed records as JSON.
pub fn command_scan(parsed: bool, config: &Config) -> anyhow::Result<()> {
    let source = TableSource::from_config(config)?;
    let snapshot = SnapshotBuffer::new(SNAPSHOT_CAPACITY);

    let summary = source
        .scan(&snapshot)
        .ok_or_else(|| anyhow::anyhow!("snapshot is already being written"))?;

    let report = String::from_utf8_lossy(&snapshot.contents()).to_string();
    if parsed {
        println!("{}", serde_json::to_string_pretty(&parse_report(&report))?);
    } else {
        print!("{}", report);
    }

    eprintln!(
        "{} processes scanned, {} matched, {} bytes{}",
        summary.scanned,
        summary.matched,
        summary.bytes,
        if summary.truncated { " (truncated)" } else { "" }
    );
    Ok(())
}
