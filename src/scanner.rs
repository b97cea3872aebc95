//! The periodic scan that rebuilds the snapshot from the process table.
//!
//! One pass resets the snapshot cursor, writes the header, walks the table,
//! reports every process named exactly [`TARGET_NAME`] that has an address
//! space, then publishes the new length. Output that does not fit is
//! clipped silently.

use std::time::{Duration, Instant};
use tracing::{debug, instrument, trace};

use crate::process::{ProcessEntry, ProcessTable};
use crate::report::ProcessRecord;
use crate::snapshot::SnapshotBuffer;

/// Exact process name a scan reports on.
pub const TARGET_NAME: &str = "chrome";

/// Delay between the end of one scan and the start of the next.
pub const SCAN_INTERVAL: Duration = Duration::from_millis(3000);

/// Physical size of the snapshot buffer in bytes.
pub const SNAPSHOT_CAPACITY: usize = 8192;

/// First line of every report.
pub const REPORT_HEADER: &str = "Scanning Chrome processes...\n";

/// Outcome of a single scan pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Processes enumerated.
    pub scanned: usize,
    /// Processes whose name matched.
    pub matched: usize,
    /// Matches that produced a report line (possibly clipped).
    pub reported: usize,
    /// Matches skipped because no memory descriptor could be resolved.
    pub without_memory: usize,
    /// Published report length in bytes.
    pub bytes: usize,
    /// Length the report would have had without clipping.
    pub required_bytes: usize,
    /// Whether any output was clipped at capacity.
    pub truncated: bool,
    pub duration: Duration,
}

/// Formats one report line for a record.
pub fn format_record(record: &ProcessRecord) -> String {
    format!(
        "Found Chrome process: PID: {}, Name: {}, RSS: {}, virt_mem: {}\n",
        record.pid, record.name, record.resident_kb, record.virtual_mb
    )
}

/// Runs one scan of `table` into `snapshot`.
///
/// Returns `None` without touching the snapshot if another scan is
/// currently writing it.
#[instrument(skip_all)]
pub fn scan<T>(table: &T, snapshot: &SnapshotBuffer) -> Option<ScanSummary>
where
    T: ProcessTable + ?Sized,
{
    let start = Instant::now();
    let Some(mut writer) = snapshot.try_begin() else {
        debug!("Snapshot is being written by another scan, skipping");
        return None;
    };

    let mut summary = ScanSummary::default();
    writer.append_str(REPORT_HEADER);
    summary.required_bytes = REPORT_HEADER.len();

    let page_size = table.page_size();
    for process in table.processes() {
        summary.scanned += 1;
        if process.name() != TARGET_NAME {
            continue;
        }
        summary.matched += 1;

        let Some(mem) = process.memory_descriptor() else {
            trace!(pid = process.pid(), "No memory descriptor, skipping");
            summary.without_memory += 1;
            continue;
        };
        let record =
            ProcessRecord::from_descriptor(process.pid(), process.name(), &mem, page_size);
        // Release the descriptor before formatting.
        drop(mem);

        debug!(
            pid = record.pid,
            resident_kb = record.resident_kb,
            virtual_mb = record.virtual_mb,
            "Found {} process",
            TARGET_NAME
        );
        let line = format_record(&record);
        writer.append_str(&line);
        summary.required_bytes += line.len();
        summary.reported += 1;
    }

    summary.truncated = writer.truncated();
    summary.bytes = writer.finish();
    summary.duration = start.elapsed();

    debug!(
        scanned = summary.scanned,
        matched = summary.matched,
        bytes = summary.bytes,
        truncated = summary.truncated,
        "Scan completed in {:.3} ms",
        summary.duration.as_secs_f64() * 1000.0
    );
    Some(summary)
}
