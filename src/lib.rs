//! Chrome Info Exporter Library
//!
//! Periodically scans the process table for processes named `chrome`,
//! records their anonymous resident memory and virtual size, and keeps the
//! latest plain-text report in a lock-free snapshot buffer that any number
//! of readers can copy from while the next scan is being written.
//!
//! # Features
//!
//! - **Snapshot Buffer**: fixed-capacity, single-writer/multi-reader, never blocks
//! - **Scanner**: one pass over any [`ProcessTable`] with silent truncation
//! - **Scan Timer**: cooperative re-arm-after-run scheduling on tokio
//! - **Report Parsing**: turns a published report back into records
//! - **Buffer Health**: fill-level thresholds for the snapshot
//!
//! # Usage
//!
//! ```rust
//! use chrome_info_exporter::{scan, FixtureProcess, FixtureTable, SnapshotBuffer};
//! use chrome_info_exporter::scanner::SNAPSHOT_CAPACITY;
//!
//! let table = FixtureTable::new(4096, vec![
//!     FixtureProcess::with_memory(4321, "chrome", 2560, 100),
//! ]);
//! let snapshot = SnapshotBuffer::new(SNAPSHOT_CAPACITY);
//! scan(&table, &snapshot);
//!
//! let report = String::from_utf8_lossy(&snapshot.contents()).to_string();
//! assert_eq!(
//!     report,
//!     "Scanning Chrome processes...\n\
//!      Found Chrome process: PID: 4321, Name: chrome, RSS: 10240, virt_mem: 0\n"
//! );
//! ```

pub mod health;
pub mod health_config;
pub mod health_stats;
pub mod process;
pub mod report;
pub mod scanner;
pub mod snapshot;
pub mod timer;

// Re-export main types for convenience
pub use health::{BufferHealth, HealthResponse, HealthState};
pub use health_config::{AppConfig, BufferHealthConfig};
pub use health_stats::HealthStats;
pub use process::{
    FixtureProcess, FixtureTable, MemoryDescriptor, ProcessEntry, ProcessTable, ProcfsTable,
};
pub use report::{parse_line, parse_report, ProcessRecord};
pub use scanner::{format_record, scan, ScanSummary};
pub use snapshot::{SnapshotBuffer, SnapshotWriter};
pub use timer::ScanTimer;
