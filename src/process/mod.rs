//! Process table abstractions and their implementations.
//!
//! This module provides:
//! - `table`: the `ProcessTable` / `ProcessEntry` / `MemoryDescriptor` traits
//! - `memory`: memory accounting parsed from `/proc/<pid>/status`
//! - `procfs`: the live table backed by the /proc filesystem
//! - `fixture`: a synthetic table loaded from a JSON file

pub mod fixture;
pub mod memory;
pub mod procfs;
pub mod table;

// Re-export commonly used types
pub use fixture::{FixtureError, FixtureProcess, FixtureTable};
pub use memory::{
    parse_kb_value, parse_status_memory, read_status_memory, StatusMemory, PAGE_SIZE,
};
pub use procfs::{read_comm, ProcfsProcess, ProcfsTable, DEFAULT_PROC_ROOT};
pub use table::{MemoryDescriptor, ProcessEntry, ProcessTable};
