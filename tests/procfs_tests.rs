//! Integration tests for the procfs-backed process table.
//!
//! A fake proc tree is built in a temporary directory so the tests do not
//! depend on what is running on the host.

use chrome_info_exporter::process::{read_comm, ProcfsTable};
use chrome_info_exporter::scanner::SNAPSHOT_CAPACITY;
use chrome_info_exporter::{
    parse_report, scan, MemoryDescriptor, ProcessEntry, ProcessTable, SnapshotBuffer,
};
use std::fs;
use std::path::Path;

fn status(rss_anon_kb: u64, vm_size_kb: u64) -> String {
    format!(
        "Name:\tchrome\nState:\tS (sleeping)\nVmPeak:\t{vm} kB\nVmSize:\t{vm} kB\n\
         VmRSS:\t{rss} kB\nRssAnon:\t{rss} kB\nRssFile:\t0 kB\nThreads:\t12\n",
        vm = vm_size_kb,
        rss = rss_anon_kb
    )
}

fn add_process(root: &Path, pid: &str, comm: &str, status: Option<String>) {
    let dir = root.join(pid);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("comm"), format!("{comm}\n")).unwrap();
    if let Some(status) = status {
        fs::write(dir.join("status"), status).unwrap();
    }
}

#[test]
fn test_table_lists_numeric_entries() {
    let root = tempfile::tempdir().unwrap();
    add_process(root.path(), "1", "systemd", Some(status(100, 1000)));
    add_process(root.path(), "4321", "chrome", Some(status(10240, 409600)));
    fs::create_dir_all(root.path().join("sys")).unwrap();
    fs::write(root.path().join("uptime"), "1.0 1.0\n").unwrap();

    let table = ProcfsTable::with_page_size(root.path(), 4096);
    let mut pids: Vec<i32> = table.processes().map(|p| p.pid()).collect();
    pids.sort_unstable();
    assert_eq!(pids, vec![1, 4321]);
}

#[test]
fn test_comm_newline_is_stripped() {
    let root = tempfile::tempdir().unwrap();
    add_process(root.path(), "77", "chrome", None);
    assert_eq!(read_comm(&root.path().join("77")).as_deref(), Some("chrome"));
}

#[test]
fn test_memory_descriptor_from_status() {
    let root = tempfile::tempdir().unwrap();
    add_process(root.path(), "4321", "chrome", Some(status(10240, 409600)));

    let table = ProcfsTable::with_page_size(root.path(), 4096);
    let process = table.processes().next().unwrap();
    let mem = process.memory_descriptor().unwrap();
    assert_eq!(mem.anon_pages(), 2560);
    assert_eq!(mem.total_vm_pages(), 102400);
}

#[test]
fn test_kernel_thread_has_no_descriptor() {
    let root = tempfile::tempdir().unwrap();
    add_process(
        root.path(),
        "2",
        "chrome",
        Some("Name:\tkthreadd\nState:\tS (sleeping)\nThreads:\t1\n".to_string()),
    );
    add_process(root.path(), "3", "chrome", None);

    let table = ProcfsTable::with_page_size(root.path(), 4096);
    assert!(table.processes().all(|p| p.memory_descriptor().is_none()));
}

#[test]
fn test_missing_root_yields_empty_table() {
    let table = ProcfsTable::with_page_size("/nonexistent/proc", 4096);
    assert_eq!(table.processes().count(), 0);
}

#[test]
fn test_scan_over_fake_proc() {
    let root = tempfile::tempdir().unwrap();
    add_process(root.path(), "1", "systemd", Some(status(4000, 160000)));
    add_process(root.path(), "4321", "chrome", Some(status(10240, 409600)));
    add_process(root.path(), "4400", "chrome", None);

    let table = ProcfsTable::with_page_size(root.path(), 4096);
    let snapshot = SnapshotBuffer::new(SNAPSHOT_CAPACITY);
    let summary = scan(&table, &snapshot).unwrap();

    assert_eq!(summary.scanned, 3);
    assert_eq!(summary.matched, 2);
    assert_eq!(summary.without_memory, 1);

    let records = parse_report(&String::from_utf8_lossy(&snapshot.contents()));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].pid, 4321);
    assert_eq!(records[0].resident_kb, 10240);
    assert_eq!(records[0].virtual_mb, 400);
}
