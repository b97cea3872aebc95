//! Per-process records and parsing of published reports.
//!
//! A [`ProcessRecord`] is produced transiently for every matching process
//! during a scan. The same record can be recovered from the text report by
//! consumers, which is what [`parse_report`] does.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::process::MemoryDescriptor;

/// Memory usage of one matching process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessRecord {
    pub pid: i32,
    pub name: String,
    /// Resident anonymous memory in KiB.
    pub resident_kb: u64,
    /// Total virtual memory in MiB, truncated.
    pub virtual_mb: u64,
}

impl ProcessRecord {
    /// Converts raw page counters using truncating integer arithmetic.
    ///
    /// `resident_kb = anon_pages * (page_size / 1024)` and
    /// `virtual_mb = total_vm_pages * page_size / (1024 * 1024)`.
    pub fn from_pages(
        pid: i32,
        name: &str,
        anon_pages: u64,
        total_vm_pages: u64,
        page_size: u64,
    ) -> Self {
        Self {
            pid,
            name: name.to_string(),
            resident_kb: anon_pages.saturating_mul(page_size / 1024),
            virtual_mb: total_vm_pages.saturating_mul(page_size) / (1024 * 1024),
        }
    }

    pub fn from_descriptor<M: MemoryDescriptor>(
        pid: i32,
        name: &str,
        mem: &M,
        page_size: u64,
    ) -> Self {
        Self::from_pages(pid, name, mem.anon_pages(), mem.total_vm_pages(), page_size)
    }
}

static LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^Found Chrome process: PID: (-?\d+), Name: (.*), RSS: (\d+), virt_mem: (\d+)$",
    )
    .expect("report line regex is valid")
});

/// Parses a single `Found Chrome process: ...` line.
///
/// Returns `None` for the header, blank lines and lines cut short by
/// truncation.
pub fn parse_line(line: &str) -> Option<ProcessRecord> {
    let caps = LINE_RE.captures(line.trim_end_matches(['\n', '\r']))?;
    Some(ProcessRecord {
        pid: caps[1].parse().ok()?,
        name: caps[2].to_string(),
        resident_kb: caps[3].parse().ok()?,
        virtual_mb: caps[4].parse().ok()?,
    })
}

/// Parses every complete record line of a report.
///
/// Content after the first NUL is ignored. The final line only counts if it
/// is newline-terminated, since an unterminated tail may have been clipped.
pub fn parse_report(report: &str) -> Vec<ProcessRecord> {
    let body = report.split('\0').next().unwrap_or_default();
    let complete = match body.rfind('\n') {
        Some(end) => &body[..=end],
        None => "",
    };
    complete.lines().filter_map(parse_line).collect()
}
