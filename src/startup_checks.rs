//! Startup requirement validation for chrome-info-exporter.
//!
//! This module validates that the exporter can read the process table
//! before the scan timer is armed.

use nix::unistd::geteuid;
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

/// Validate all runtime requirements for scanning `proc_root`.
pub fn validate_requirements(proc_root: &Path) -> Result<(), ValidationError> {
    info!("🔍 Validating runtime requirements...");

    check_user_privileges();
    check_proc_access(proc_root)?;

    info!("✅ All runtime requirements validated");
    Ok(())
}

/// Non-root users only see the memory of their own processes.
fn check_user_privileges() {
    if !geteuid().is_root() {
        warn!("⚠️  Not running as root - other users' chrome processes may lack memory data");
    } else {
        info!("✅ Running as root (uid=0)");
    }
}

/// Check that the proc root can be enumerated and pid 1 inspected.
fn check_proc_access(proc_root: &Path) -> Result<(), ValidationError> {
    if let Err(e) = fs::read_dir(proc_root) {
        error!("❌ Cannot list {}: {}", proc_root.display(), e);
        return Err(ValidationError::ProcRootUnreadable(
            proc_root.display().to_string(),
            e.to_string(),
        ));
    }

    let test_file = proc_root.join("1").join("status");
    match fs::metadata(&test_file) {
        Ok(_) => {
            info!("✅ {} access: Can inspect processes", proc_root.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            error!("❌ Cannot read {} - insufficient permissions", test_file.display());
            error!("   Run as root or grant cap_dac_read_search,cap_sys_ptrace+ep");
            Err(ValidationError::InsufficientPermissions(e.to_string()))
        }
        Err(e) => {
            warn!("⚠️  Could not test {} access: {}", test_file.display(), e);
            Ok(())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Insufficient permissions: {0}")]
    InsufficientPermissions(String),

    #[error("Cannot read proc root {0}: {1}")]
    ProcRootUnreadable(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_root_is_rejected() {
        let err = validate_requirements(Path::new("/nonexistent/proc")).unwrap_err();
        assert!(matches!(err, ValidationError::ProcRootUnreadable(..)));
    }

    #[test]
    fn test_root_without_init_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_requirements(dir.path()).is_ok());
    }
}
