//! Prometheus metrics definitions for chrome-info-exporter.
//!
//! Only scanner-level figures are exposed. Per-process data lives in the
//! plain-text report, not in labels.

use chrome_info_exporter::ScanSummary;
use prometheus::{Counter, Gauge, Registry};

/// Collection of Prometheus metrics describing the scan loop.
#[derive(Clone)]
pub struct ScannerMetrics {
    pub scans_total: Counter,
    pub skipped_scans_total: Counter,
    pub truncated_scans_total: Counter,
    pub scanned_processes: Gauge,
    pub matched_processes: Gauge,
    pub reported_processes: Gauge,
    pub snapshot_bytes: Gauge,
    pub report_required_bytes: Gauge,
    pub scan_duration_seconds: Gauge,
    pub last_scan_timestamp_seconds: Gauge,
}

impl ScannerMetrics {
    pub fn new(registry: &Registry) -> Result<Self, Box<dyn std::error::Error>> {
        let scans_total = Counter::new(
            "chrome_info_scans_total",
            "Number of completed scans of the process table",
        )?;
        let skipped_scans_total = Counter::new(
            "chrome_info_skipped_scans_total",
            "Number of scans skipped because the snapshot was still being written",
        )?;
        let truncated_scans_total = Counter::new(
            "chrome_info_truncated_scans_total",
            "Number of scans whose report was clipped at the snapshot capacity",
        )?;
        let scanned_processes = Gauge::new(
            "chrome_info_scanned_processes",
            "Processes enumerated by the last scan",
        )?;
        let matched_processes = Gauge::new(
            "chrome_info_matched_processes",
            "Processes named chrome found by the last scan",
        )?;
        let reported_processes = Gauge::new(
            "chrome_info_reported_processes",
            "Report lines written by the last scan",
        )?;
        let snapshot_bytes = Gauge::new(
            "chrome_info_snapshot_bytes",
            "Published length of the snapshot report in bytes",
        )?;
        let report_required_bytes = Gauge::new(
            "chrome_info_report_required_bytes",
            "Length the last report would have had without clipping",
        )?;
        let scan_duration_seconds = Gauge::new(
            "chrome_info_scan_duration_seconds",
            "Duration of the last scan in seconds",
        )?;
        let last_scan_timestamp_seconds = Gauge::new(
            "chrome_info_last_scan_timestamp_seconds",
            "Unix timestamp of the last completed scan",
        )?;

        registry.register(Box::new(scans_total.clone()))?;
        registry.register(Box::new(skipped_scans_total.clone()))?;
        registry.register(Box::new(truncated_scans_total.clone()))?;
        registry.register(Box::new(scanned_processes.clone()))?;
        registry.register(Box::new(matched_processes.clone()))?;
        registry.register(Box::new(reported_processes.clone()))?;
        registry.register(Box::new(snapshot_bytes.clone()))?;
        registry.register(Box::new(report_required_bytes.clone()))?;
        registry.register(Box::new(scan_duration_seconds.clone()))?;
        registry.register(Box::new(last_scan_timestamp_seconds.clone()))?;

        Ok(Self {
            scans_total,
            skipped_scans_total,
            truncated_scans_total,
            scanned_processes,
            matched_processes,
            reported_processes,
            snapshot_bytes,
            report_required_bytes,
            scan_duration_seconds,
            last_scan_timestamp_seconds,
        })
    }

    /// Applies the outcome of one scan.
    pub fn observe(&self, summary: &ScanSummary) {
        self.scans_total.inc();
        if summary.truncated {
            self.truncated_scans_total.inc();
        }
        self.scanned_processes.set(summary.scanned as f64);
        self.matched_processes.set(summary.matched as f64);
        self.reported_processes.set(summary.reported as f64);
        self.snapshot_bytes.set(summary.bytes as f64);
        self.report_required_bytes.set(summary.required_bytes as f64);
        self.scan_duration_seconds
            .set(summary.duration.as_secs_f64());
        self.last_scan_timestamp_seconds
            .set(chrono::Utc::now().timestamp() as f64);
    }

    pub fn observe_skipped(&self) {
        self.skipped_scans_total.inc();
    }
}
