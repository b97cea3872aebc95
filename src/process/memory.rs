//! Memory accounting parsed from `/proc/<pid>/status`.
//!
//! Kernel threads have no `mm_struct`, and their status file carries no
//! `VmSize:`/`RssAnon:` lines. That absence is how a missing memory
//! descriptor shows up from userspace.

use once_cell::sync::Lazy;
use std::fs;
use std::path::Path;

use crate::process::table::MemoryDescriptor;

/// Get system page size in bytes (usually 4096).
fn get_page_size() -> u64 {
    #[cfg(unix)]
    {
        // SAFETY: sysconf is safe to call with _SC_PAGESIZE
        // Returns -1 on error - handled by the > 0 check
        unsafe {
            let size = libc::sysconf(libc::_SC_PAGESIZE);
            if size > 0 {
                return size as u64;
            }
        }
    }
    4096
}

/// System page size in bytes.
pub static PAGE_SIZE: Lazy<u64> = Lazy::new(get_page_size);

/// Memory descriptor resolved from a status file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMemory {
    pub anon_pages: u64,
    pub total_vm_pages: u64,
}

impl MemoryDescriptor for StatusMemory {
    fn anon_pages(&self) -> u64 {
        self.anon_pages
    }

    fn total_vm_pages(&self) -> u64 {
        self.total_vm_pages
    }
}

/// Parses kilobyte values from status file lines.
pub fn parse_kb_value(v: &str) -> Option<u64> {
    v.split_whitespace().next()?.parse().ok()
}

/// Extracts `RssAnon` and `VmSize` from status content and converts them to
/// pages. Returns `None` unless both are present.
pub fn parse_status_memory(content: &str, page_size: u64) -> Option<StatusMemory> {
    let page_size = page_size.max(1);
    let mut rss_anon_kb = None;
    let mut vm_size_kb = None;

    for line in content.lines() {
        if let Some(v) = line.strip_prefix("RssAnon:") {
            rss_anon_kb = parse_kb_value(v);
        } else if let Some(v) = line.strip_prefix("VmSize:") {
            vm_size_kb = parse_kb_value(v);
        }

        if rss_anon_kb.is_some() && vm_size_kb.is_some() {
            break;
        }
    }

    Some(StatusMemory {
        anon_pages: rss_anon_kb?.saturating_mul(1024) / page_size,
        total_vm_pages: vm_size_kb?.saturating_mul(1024) / page_size,
    })
}

/// Reads the status file of a process directory and resolves its memory.
pub fn read_status_memory(proc_path: &Path, page_size: u64) -> Option<StatusMemory> {
    let content = fs::read_to_string(proc_path.join("status")).ok()?;
    parse_status_memory(&content, page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_STATUS: &str = "Name:\tchrome\n\
        Umask:\t0022\n\
        State:\tS (sleeping)\n\
        Pid:\t4321\n\
        VmPeak:\t  412000 kB\n\
        VmSize:\t  409600 kB\n\
        VmRSS:\t   20480 kB\n\
        RssAnon:\t   10240 kB\n\
        RssFile:\t   10240 kB\n\
        RssShmem:\t       0 kB\n\
        Threads:\t12\n";

    const KTHREAD_STATUS: &str = "Name:\tkworker/0:1\n\
        State:\tI (idle)\n\
        Pid:\t17\n\
        Threads:\t1\n";

    #[test]
    fn test_parse_kb_value() {
        assert_eq!(parse_kb_value("       1234 kB"), Some(1234));
        assert_eq!(parse_kb_value("0 kB"), Some(0));
        assert_eq!(parse_kb_value("  42  "), Some(42));
        assert_eq!(parse_kb_value(""), None);
        assert_eq!(parse_kb_value("kB"), None);
        assert_eq!(parse_kb_value("-1 kB"), None);
    }

    #[test]
    fn test_parse_status_memory_user_process() {
        let mem = parse_status_memory(USER_STATUS, 4096).expect("descriptor");
        assert_eq!(mem.anon_pages, 2560);
        assert_eq!(mem.total_vm_pages, 102400);
    }

    #[test]
    fn test_parse_status_memory_huge_values_saturate() {
        let status = "RssAnon:\t18446744073709551615 kB\nVmSize:\t18014398509481984 kB\n";
        let mem = parse_status_memory(status, 4096).expect("descriptor");
        assert_eq!(mem.anon_pages, u64::MAX / 4096);
        assert_eq!(mem.total_vm_pages, u64::MAX / 4096);
    }

    #[test]
    fn test_parse_status_memory_kernel_thread() {
        assert_eq!(parse_status_memory(KTHREAD_STATUS, 4096), None);
    }

    #[test]
    fn test_parse_status_memory_requires_both_fields() {
        assert_eq!(parse_status_memory("VmSize:\t100 kB\n", 4096), None);
        assert_eq!(parse_status_memory("RssAnon:\t100 kB\n", 4096), None);
    }

    #[test]
    fn test_parse_status_memory_other_page_size() {
        let mem = parse_status_memory(USER_STATUS, 16384).expect("descriptor");
        assert_eq!(mem.anon_pages, 640);
        assert_eq!(mem.total_vm_pages, 25600);
    }

    #[test]
    fn test_page_size_is_positive() {
        assert!(*PAGE_SIZE > 0);
    }
}
