//! HTTP endpoint handlers for the exporter.
//!
//! This module provides handlers for all HTTP endpoints:
//! - `/chrome_info`: bounded read of the latest report
//! - `/processes`: the latest report parsed into JSON records
//! - `/metrics`: Prometheus metrics endpoint
//! - `/health`: Health check endpoint
//! - `/`: plain-text index

pub mod chrome_info;
pub mod health;
pub mod metrics;
pub mod processes;
pub mod root;

// Re-export handlers
pub use chrome_info::chrome_info_handler;
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use processes::processes_handler;
pub use root::root_handler;
