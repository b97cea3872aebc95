//! Application state management for the exporter.
//!
//! This module defines the process-wide context shared by the HTTP handlers
//! and the periodic scan job. It is constructed once at startup and dropped
//! at shutdown after the scan timer has been cancelled.

use anyhow::Context;
use chrome_info_exporter::scanner::SNAPSHOT_CAPACITY;
use chrome_info_exporter::{
    scan, AppConfig as HealthAppConfig, FixtureTable, HealthState, HealthStats, ProcfsTable,
    ScanSummary, SnapshotBuffer,
};
use prometheus::Registry;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::metrics::ScannerMetrics;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Process table the scan job reads from.
#[derive(Debug, Clone)]
pub enum TableSource {
    Procfs(ProcfsTable),
    /// Synthetic table loaded from `test_data_file`.
    Fixture(FixtureTable),
}

impl TableSource {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        match &config.test_data_file {
            Some(path) => {
                let table = FixtureTable::load(path)
                    .with_context(|| format!("loading test data from {}", path.display()))?;
                info!(
                    "Using test data file {} ({} processes)",
                    path.display(),
                    table.processes.len()
                );
                Ok(Self::Fixture(table))
            }
            None => {
                let root = config.proc_root();
                debug!("Scanning process table under {}", root.display());
                Ok(Self::Procfs(ProcfsTable::new(root)))
            }
        }
    }

    /// Runs one scan of this table into `snapshot`.
    pub fn scan(&self, snapshot: &SnapshotBuffer) -> Option<ScanSummary> {
        match self {
            Self::Procfs(table) => scan(table, snapshot),
            Self::Fixture(table) => scan(table, snapshot),
        }
    }
}

/// Global application state shared across requests and the scan job.
pub struct AppState {
    pub registry: Registry,
    pub metrics: ScannerMetrics,
    /// Latest report. Written only by the scan job, read without locking.
    pub snapshot: Arc<SnapshotBuffer>,
    pub config: Arc<Config>,
    pub health_stats: Arc<HealthStats>,
    /// Health state for snapshot buffer fill monitoring.
    pub health_state: Arc<HealthState>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Builds the state with an empty snapshot and metrics registered on a
    /// fresh registry.
    pub fn new(config: Config) -> anyhow::Result<SharedState> {
        let registry = Registry::new();
        let metrics = ScannerMetrics::new(&registry)
            .map_err(|e| anyhow::anyhow!("failed to register metrics: {}", e))?;

        Ok(Arc::new(Self {
            registry,
            metrics,
            snapshot: Arc::new(SnapshotBuffer::new(SNAPSHOT_CAPACITY)),
            config: Arc::new(config),
            health_stats: Arc::new(HealthStats::new()),
            health_state: Arc::new(HealthState::new(HealthAppConfig::default())),
            start_time: Instant::now(),
        }))
    }

    /// Runs one scan into the snapshot and records its outcome.
    pub fn run_scan(&self, source: &TableSource) -> Option<ScanSummary> {
        let Some(summary) = source.scan(&self.snapshot) else {
            warn!("Previous scan still writing the snapshot, skipping this run");
            self.health_stats.record_skipped_scan();
            self.metrics.observe_skipped();
            return None;
        };

        self.health_stats.record_scan(&summary);
        self.health_state.update_snapshot_bytes(summary.bytes);
        self.health_state
            .update_report_demand_bytes(summary.required_bytes);
        self.metrics.observe(&summary);

        if summary.truncated {
            warn!(
                "Report needed {} bytes but snapshot holds {}; later lines dropped",
                summary.required_bytes,
                self.snapshot.capacity()
            );
        }
        if summary.matched > 0 {
            info!(
                "Scan found {} chrome processes ({} reported)",
                summary.matched, summary.reported
            );
        } else {
            debug!("Scan found no chrome processes");
        }
        Some(summary)
    }
}
