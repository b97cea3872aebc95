//! Live process table backed by the /proc filesystem.
//!
//! Enumeration walks the numeric directories of the proc root lazily, so a
//! process that exits mid-scan simply drops out of the sequence.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

use crate::process::memory::{read_status_memory, StatusMemory, PAGE_SIZE};
use crate::process::table::{ProcessEntry, ProcessTable};

/// Default location of the proc filesystem.
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Process table reading `<root>/<pid>/{comm,status}`.
#[derive(Debug, Clone)]
pub struct ProcfsTable {
    root: PathBuf,
    page_size: u64,
}

impl ProcfsTable {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_page_size(root, *PAGE_SIZE)
    }

    pub fn with_page_size(root: impl Into<PathBuf>, page_size: u64) -> Self {
        Self {
            root: root.into(),
            page_size,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for ProcfsTable {
    fn default() -> Self {
        Self::new(DEFAULT_PROC_ROOT)
    }
}

/// Process entry representing a directory in /proc filesystem.
#[derive(Debug, Clone)]
pub struct ProcfsProcess {
    pid: i32,
    name: String,
    proc_path: PathBuf,
    page_size: u64,
}

impl ProcfsProcess {
    pub fn proc_path(&self) -> &Path {
        &self.proc_path
    }
}

impl ProcessEntry for ProcfsProcess {
    type Memory = StatusMemory;

    fn pid(&self) -> i32 {
        self.pid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn memory_descriptor(&self) -> Option<StatusMemory> {
        read_status_memory(&self.proc_path, self.page_size)
    }
}

impl ProcessTable for ProcfsTable {
    type Process = ProcfsProcess;

    fn processes(&self) -> Box<dyn Iterator<Item = ProcfsProcess> + '_> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                trace!("Cannot read {}: {}", self.root.display(), e);
                return Box::new(std::iter::empty());
            }
        };

        let page_size = self.page_size;
        Box::new(entries.flatten().filter_map(move |entry| {
            let proc_path = entry.path();
            let pid: i32 = proc_path.file_name()?.to_str()?.parse().ok()?;
            let name = read_comm(&proc_path)?;
            Some(ProcfsProcess {
                pid,
                name,
                proc_path,
                page_size,
            })
        }))
    }

    fn page_size(&self) -> u64 {
        self.page_size
    }
}

/// Reads the command name from `comm`, without the trailing newline.
pub fn read_comm(proc_path: &Path) -> Option<String> {
    let s = fs::read_to_string(proc_path.join("comm")).ok()?;
    Some(s.strip_suffix('\n').unwrap_or(&s).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::table::MemoryDescriptor;

    fn write_proc(root: &Path, pid: &str, comm: &str, status: Option<&str>) {
        let dir = root.join(pid);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("comm"), format!("{comm}\n")).unwrap();
        if let Some(status) = status {
            fs::write(dir.join("status"), status).unwrap();
        }
    }

    #[test]
    fn test_enumerates_numeric_dirs_only() {
        let tmp = tempfile::tempdir().unwrap();
        write_proc(tmp.path(), "1", "systemd", None);
        write_proc(tmp.path(), "42", "chrome", None);
        fs::create_dir_all(tmp.path().join("self")).unwrap();
        fs::write(tmp.path().join("meminfo"), "MemTotal: 1 kB\n").unwrap();

        let table = ProcfsTable::with_page_size(tmp.path(), 4096);
        let mut pids: Vec<i32> = table.processes().map(|p| p.pid()).collect();
        pids.sort();
        assert_eq!(pids, vec![1, 42]);
    }

    #[test]
    fn test_comm_newline_trimmed() {
        let tmp = tempfile::tempdir().unwrap();
        write_proc(tmp.path(), "7", "Web Content", None);

        let table = ProcfsTable::with_page_size(tmp.path(), 4096);
        let proc = table.processes().next().expect("one process");
        assert_eq!(proc.name(), "Web Content");
    }

    #[test]
    fn test_missing_comm_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("99")).unwrap();

        let table = ProcfsTable::with_page_size(tmp.path(), 4096);
        assert_eq!(table.processes().count(), 0);
    }

    #[test]
    fn test_memory_descriptor_resolution() {
        let tmp = tempfile::tempdir().unwrap();
        write_proc(
            tmp.path(),
            "4321",
            "chrome",
            Some("Name:\tchrome\nVmSize:\t400 kB\nRssAnon:\t10240 kB\n"),
        );
        write_proc(tmp.path(), "2", "kthreadd", Some("Name:\tkthreadd\n"));
        write_proc(tmp.path(), "3", "gone", None);

        let table = ProcfsTable::with_page_size(tmp.path(), 4096);
        for proc in table.processes() {
            let mem = proc.memory_descriptor();
            match proc.pid() {
                4321 => {
                    let mem = mem.expect("descriptor");
                    assert_eq!(mem.anon_pages(), 2560);
                    assert_eq!(mem.total_vm_pages(), 100);
                }
                _ => assert!(mem.is_none()),
            }
        }
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let table = ProcfsTable::with_page_size("/nonexistent/proc/root", 4096);
        assert_eq!(table.processes().count(), 0);
    }
}
