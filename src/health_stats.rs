//! Health statistics and monitoring for the scanner.
//!
//! This module provides types for tracking scan performance, match counts,
//! truncation and HTTP request activity, and renders them as a plain-text
//! table for the `/health` endpoint.

use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock as StdRwLock};
use std::time::{Duration, Instant};

use crate::scanner::ScanSummary;

/// How long endpoint hits are retained.
const HIT_RETENTION: Duration = Duration::from_secs(600);

/// One per-scan figure aggregated over every completed scan.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FigureSummary {
    /// Value from the most recent scan.
    pub last: f64,
    pub avg: f64,
    pub max: f64,
    pub min: f64,
    /// Number of scans that contributed.
    pub scans: u64,
}

#[derive(Clone, Copy, Default)]
struct FigureTotals {
    scans: u64,
    sum: f64,
    min: f64,
    max: f64,
    last: f64,
}

impl FigureTotals {
    fn observe(&mut self, value: f64) {
        let first = self.scans == 0;
        self.scans += 1;
        self.sum += value;
        self.last = value;
        self.min = if first { value } else { self.min.min(value) };
        self.max = if first { value } else { self.max.max(value) };
    }

    fn summary(&self) -> FigureSummary {
        let avg = match self.scans {
            0 => 0.0,
            n => self.sum / n as f64,
        };
        FigureSummary {
            last: self.last,
            avg,
            max: self.max,
            min: self.min,
            scans: self.scans,
        }
    }
}

/// A figure the scan job reports once per scan (processes seen, matched or
/// reported, snapshot bytes, scan duration), read by `/health`.
#[derive(Default)]
pub struct ScanFigure {
    totals: Mutex<FigureTotals>,
}

impl ScanFigure {
    pub fn observe(&self, value: f64) {
        if let Ok(mut totals) = self.totals.lock() {
            totals.observe(value);
        }
    }

    pub fn summary(&self) -> FigureSummary {
        self.totals
            .lock()
            .map(|totals| totals.summary())
            .unwrap_or_default()
    }
}

/// Arrival times of HTTP requests on the exporter's endpoints.
pub struct EndpointHits {
    times: Mutex<VecDeque<Instant>>,
}

impl Default for EndpointHits {
    fn default() -> Self {
        Self {
            times: Mutex::new(VecDeque::with_capacity(256)),
        }
    }
}

impl EndpointHits {
    pub fn record(&self) {
        let Ok(mut times) = self.times.lock() else {
            return;
        };
        let now = Instant::now();
        times.push_back(now);
        if let Some(cutoff) = now.checked_sub(HIT_RETENTION) {
            while times.front().is_some_and(|&t| t < cutoff) {
                times.pop_front();
            }
        }
    }

    /// Hits recorded within `window` of now. Windows longer than the
    /// retention period count only what is still retained.
    pub fn within(&self, window: Duration) -> u64 {
        let Ok(times) = self.times.lock() else {
            return 0;
        };
        match Instant::now().checked_sub(window) {
            Some(cutoff) => times.iter().rev().take_while(|&&t| t >= cutoff).count() as u64,
            None => times.len() as u64,
        }
    }
}

/// Scanner statistics shared between the scan job and HTTP handlers.
pub struct HealthStats {
    pub scanned_processes: ScanFigure,
    pub matched_processes: ScanFigure,
    pub reported_processes: ScanFigure,
    pub snapshot_bytes: ScanFigure,
    pub scan_duration_seconds: ScanFigure,

    pub total_scans: AtomicU64,
    pub skipped_scans: AtomicU64,
    pub truncated_scans: AtomicU64,
    pub without_memory_total: AtomicU64,

    pub endpoint_hits: EndpointHits,
    pub status_endpoint_calls: AtomicU64,

    pub start_time: Instant,
    pub last_scan_time: StdRwLock<Option<DateTime<Local>>>,
}

impl Default for HealthStats {
    fn default() -> Self {
        Self {
            scanned_processes: ScanFigure::default(),
            matched_processes: ScanFigure::default(),
            reported_processes: ScanFigure::default(),
            snapshot_bytes: ScanFigure::default(),
            scan_duration_seconds: ScanFigure::default(),
            total_scans: AtomicU64::new(0),
            skipped_scans: AtomicU64::new(0),
            truncated_scans: AtomicU64::new(0),
            without_memory_total: AtomicU64::new(0),
            endpoint_hits: EndpointHits::default(),
            status_endpoint_calls: AtomicU64::new(0),
            start_time: Instant::now(),
            last_scan_time: StdRwLock::new(None),
        }
    }
}

impl HealthStats {
    pub fn new() -> Self {
        Default::default()
    }

    /// Records the outcome of a completed scan.
    pub fn record_scan(&self, summary: &ScanSummary) {
        self.scanned_processes.observe(summary.scanned as f64);
        self.matched_processes.observe(summary.matched as f64);
        self.reported_processes.observe(summary.reported as f64);
        self.snapshot_bytes.observe(summary.bytes as f64);
        self.scan_duration_seconds
            .observe(summary.duration.as_secs_f64());
        self.total_scans.fetch_add(1, Ordering::Relaxed);
        self.without_memory_total
            .fetch_add(summary.without_memory as u64, Ordering::Relaxed);
        if summary.truncated {
            self.truncated_scans.fetch_add(1, Ordering::Relaxed);
        }
        self.update_last_scan_time();
    }

    /// Records a scan that did not run because the snapshot was busy.
    pub fn record_skipped_scan(&self) {
        self.skipped_scans.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_http_request(&self) {
        self.endpoint_hits.record();
    }

    pub fn record_status_endpoint_call(&self) {
        self.status_endpoint_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn update_last_scan_time(&self) {
        if let Ok(mut guard) = self.last_scan_time.write() {
            *guard = Some(Local::now());
        }
    }

    pub fn has_scanned(&self) -> bool {
        self.total_scans.load(Ordering::Relaxed) > 0
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn get_last_scan_time_str(&self) -> String {
        if let Ok(guard) = self.last_scan_time.read() {
            if let Some(last_scan) = guard.as_ref() {
                return last_scan.format("%H:%M:%S").to_string();
            }
        }
        "N/A".to_string()
    }

    pub fn render_table(&self) -> String {
        let rows = [
            ("scanned_processes", self.scanned_processes.summary(), 0usize),
            ("matched_processes", self.matched_processes.summary(), 0),
            ("reported_processes", self.reported_processes.summary(), 0),
            ("snapshot_bytes", self.snapshot_bytes.summary(), 0),
            ("scan_duration (s)", self.scan_duration_seconds.summary(), 4),
        ];

        let left_col = 26usize;
        let col_w = 12usize;

        let mut out = String::new();

        writeln!(out, "HEALTH ENDPOINT - SCANNER INTERNAL STATS").ok();
        writeln!(out, "=========================================").ok();
        writeln!(out).ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "",
            "current",
            "average",
            "max",
            "min",
            left = left_col,
            col = col_w
        )
        .ok();
        writeln!(out, "{}", "-".repeat(left_col + 4 * (col_w + 3))).ok();

        for (name, figure, precision) in rows {
            writeln!(
                out,
                "{:left$} | {:>col$.p$} | {:>col$.p$} | {:>col$.p$} | {:>col$.p$}",
                name,
                figure.last,
                figure.avg,
                figure.max,
                figure.min,
                left = left_col,
                col = col_w,
                p = precision
            )
            .ok();
        }

        writeln!(out).ok();
        writeln!(
            out,
            "{:left$} : {}",
            "total_scans",
            self.total_scans.load(Ordering::Relaxed),
            left = left_col
        )
        .ok();
        writeln!(
            out,
            "{:left$} : {}",
            "skipped_scans",
            self.skipped_scans.load(Ordering::Relaxed),
            left = left_col
        )
        .ok();
        writeln!(
            out,
            "{:left$} : {}",
            "truncated_scans",
            self.truncated_scans.load(Ordering::Relaxed),
            left = left_col
        )
        .ok();
        writeln!(
            out,
            "{:left$} : {}",
            "matches_without_memory",
            self.without_memory_total.load(Ordering::Relaxed),
            left = left_col
        )
        .ok();
        writeln!(
            out,
            "{:left$} : {}",
            "status_endpoint_calls",
            self.status_endpoint_calls.load(Ordering::Relaxed),
            left = left_col
        )
        .ok();
        writeln!(
            out,
            "{:left$} : {}",
            "http_requests_last_minute",
            self.endpoint_hits.within(Duration::from_secs(60)),
            left = left_col
        )
        .ok();
        writeln!(
            out,
            "{:left$} : {}",
            "last_scan",
            self.get_last_scan_time_str(),
            left = left_col
        )
        .ok();

        out
    }
}
