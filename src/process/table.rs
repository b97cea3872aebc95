//! Interfaces between the scanner and whatever supplies process data.

/// Per-process address-space accounting.
///
/// Counters are in pages. Releasing the descriptor is dropping it.
pub trait MemoryDescriptor {
    /// Resident anonymous pages.
    fn anon_pages(&self) -> u64;
    /// Total mapped virtual pages.
    fn total_vm_pages(&self) -> u64;
}

/// One live process as seen during enumeration.
pub trait ProcessEntry {
    type Memory: MemoryDescriptor;

    fn pid(&self) -> i32;
    fn name(&self) -> &str;

    /// Resolves the memory descriptor.
    ///
    /// `None` means the process has no address space (kernel thread) or is
    /// already gone. Callers treat that as "nothing to report".
    fn memory_descriptor(&self) -> Option<Self::Memory>;
}

/// A source of live processes.
pub trait ProcessTable {
    type Process: ProcessEntry;

    /// Lazy, finite sequence of all processes in the table's natural order.
    fn processes(&self) -> Box<dyn Iterator<Item = Self::Process> + '_>;

    /// Page size in bytes used to convert the descriptor counters.
    fn page_size(&self) -> u64;
}
