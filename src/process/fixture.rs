//! Synthetic process table loaded from a JSON file.
//!
//! Lets the exporter run without a real /proc (demo setups, tests). The
//! file looks like:
//!
//! ```json
//! {
//!   "page_size": 4096,
//!   "processes": [
//!     { "pid": 4321, "name": "chrome", "anon_pages": 2560, "total_vm_pages": 100 },
//!     { "pid": 2, "name": "kthreadd" }
//!   ]
//! }
//! ```
//!
//! A process without both counters has no memory descriptor.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::process::memory::StatusMemory;
use crate::process::table::{ProcessEntry, ProcessTable};

fn default_page_size() -> u64 {
    4096
}

/// Errors while loading a fixture file.
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Failed to read fixture file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse fixture file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Fixture page_size must be positive")]
    InvalidPageSize,
}

/// One synthetic process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FixtureProcess {
    pub pid: i32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anon_pages: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_vm_pages: Option<u64>,
}

impl FixtureProcess {
    /// A process with an address space.
    pub fn with_memory(pid: i32, name: &str, anon_pages: u64, total_vm_pages: u64) -> Self {
        Self {
            pid,
            name: name.to_string(),
            anon_pages: Some(anon_pages),
            total_vm_pages: Some(total_vm_pages),
        }
    }

    /// A process whose memory descriptor cannot be resolved.
    pub fn without_memory(pid: i32, name: &str) -> Self {
        Self {
            pid,
            name: name.to_string(),
            anon_pages: None,
            total_vm_pages: None,
        }
    }
}

impl ProcessEntry for FixtureProcess {
    type Memory = StatusMemory;

    fn pid(&self) -> i32 {
        self.pid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn memory_descriptor(&self) -> Option<StatusMemory> {
        Some(StatusMemory {
            anon_pages: self.anon_pages?,
            total_vm_pages: self.total_vm_pages?,
        })
    }
}

/// In-memory process table, enumerated in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FixtureTable {
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    #[serde(default)]
    pub processes: Vec<FixtureProcess>,
}

impl Default for FixtureTable {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            processes: Vec::new(),
        }
    }
}

impl FixtureTable {
    pub fn new(page_size: u64, processes: Vec<FixtureProcess>) -> Self {
        Self {
            page_size,
            processes,
        }
    }

    /// Loads a fixture table from a JSON file.
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let content = fs::read_to_string(path).map_err(|source| FixtureError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let table: FixtureTable =
            serde_json::from_str(&content).map_err(|source| FixtureError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if table.page_size == 0 {
            return Err(FixtureError::InvalidPageSize);
        }
        Ok(table)
    }
}

impl ProcessTable for FixtureTable {
    type Process = FixtureProcess;

    fn processes(&self) -> Box<dyn Iterator<Item = FixtureProcess> + '_> {
        Box::new(self.processes.iter().cloned())
    }

    fn page_size(&self) -> u64 {
        self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_order_preserved() {
        let table = FixtureTable::new(
            4096,
            vec![
                FixtureProcess::with_memory(30, "chrome", 1, 1),
                FixtureProcess::with_memory(10, "chrome", 1, 1),
                FixtureProcess::with_memory(20, "chrome", 1, 1),
            ],
        );
        let pids: Vec<i32> = table.processes().map(|p| p.pid()).collect();
        assert_eq!(pids, vec![30, 10, 20]);
    }

    #[test]
    fn test_partial_counters_have_no_descriptor() {
        let proc = FixtureProcess {
            pid: 5,
            name: "chrome".into(),
            anon_pages: Some(10),
            total_vm_pages: None,
        };
        assert!(proc.memory_descriptor().is_none());
    }

    #[test]
    fn test_load_defaults_page_size() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        fs::write(
            tmp.path(),
            r#"{"processes":[{"pid":1,"name":"chrome","anon_pages":2,"total_vm_pages":3}]}"#,
        )
        .unwrap();

        let table = FixtureTable::load(tmp.path()).expect("valid fixture");
        assert_eq!(table.page_size, 4096);
        assert_eq!(table.processes.len(), 1);
    }

    #[test]
    fn test_load_rejects_zero_page_size() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        fs::write(tmp.path(), r#"{"page_size":0,"processes":[]}"#).unwrap();
        assert!(matches!(
            FixtureTable::load(tmp.path()),
            Err(FixtureError::InvalidPageSize)
        ));
    }

    #[test]
    fn test_load_reports_parse_error() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        fs::write(tmp.path(), "not json").unwrap();
        assert!(matches!(
            FixtureTable::load(tmp.path()),
            Err(FixtureError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = FixtureTable::load(Path::new("/nonexistent/fixture.json")).unwrap_err();
        assert!(matches!(err, FixtureError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/fixture.json"));
    }
}
