//! Lock-free snapshot buffer holding the latest formatted scan report.
//!
//! The buffer has exactly one producer (the scanner) and any number of
//! concurrent readers. No mutex guards the bytes: every byte is an
//! `AtomicU8`, the published length is an `AtomicUsize` and a generation
//! counter (odd while a write is in flight) lets readers detect torn reads
//! when they care. Plain `read_at` is best-effort and may observe a mix of
//! the previous and the in-progress report; that is accepted because the
//! report is informational only.

use std::sync::atomic::{fence, AtomicBool, AtomicU64, AtomicU8, AtomicUsize, Ordering};

/// Number of optimistic attempts `read_stable` makes before giving up on
/// a consistent copy.
const STABLE_READ_ATTEMPTS: usize = 3;

/// Fixed-capacity, single-writer/multi-reader text buffer.
pub struct SnapshotBuffer {
    bytes: Box<[AtomicU8]>,
    len: AtomicUsize,
    generation: AtomicU64,
    writing: AtomicBool,
}

impl SnapshotBuffer {
    /// Allocates a zeroed buffer with the given physical capacity.
    pub fn new(capacity: usize) -> Self {
        let bytes = (0..capacity.max(1)).map(|_| AtomicU8::new(0)).collect();
        Self {
            bytes,
            len: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
            writing: AtomicBool::new(false),
        }
    }

    /// Physical capacity in bytes (including the trailing NUL slot).
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Currently published content length.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire).min(self.capacity())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Generation counter. Odd while a writer is active, even otherwise.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Starts a new overwrite of the buffer.
    ///
    /// Returns `None` when another writer is still active, so at most one
    /// producer mutates the bytes at any time.
    pub fn try_begin(&self) -> Option<SnapshotWriter<'_>> {
        if self
            .writing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        self.generation.fetch_add(1, Ordering::AcqRel);
        // Byte stores must not become visible before the odd generation.
        fence(Ordering::Release);
        Some(SnapshotWriter {
            buffer: self,
            cursor: 0,
            truncated: false,
            finished: false,
        })
    }

    /// Copies up to `dest.len()` bytes starting at `offset` into `dest`.
    ///
    /// The published length is the exclusive upper bound. Returns the number
    /// of bytes copied; 0 at or past the end of content.
    pub fn read_at(&self, offset: usize, dest: &mut [u8]) -> usize {
        let len = self.len();
        if offset >= len {
            return 0;
        }
        let n = dest.len().min(len - offset);
        for (slot, byte) in dest[..n].iter_mut().zip(&self.bytes[offset..offset + n]) {
            *slot = byte.load(Ordering::Relaxed);
        }
        n
    }

    /// Copies the whole published content, best-effort.
    pub fn contents(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.len()];
        let n = self.read_at(0, &mut out);
        out.truncate(n);
        out
    }

    /// Copies the whole published content if no write overlapped the copy.
    ///
    /// Makes up to three attempts and returns `None` if every one of them
    /// raced a writer. Never blocks the writer.
    pub fn try_read_consistent(&self) -> Option<Vec<u8>> {
        for _ in 0..STABLE_READ_ATTEMPTS {
            let before = self.generation();
            if before % 2 == 0 {
                let out = self.contents();
                // Byte loads must complete before the generation is re-checked.
                fence(Ordering::Acquire);
                if self.generation.load(Ordering::Relaxed) == before {
                    return Some(out);
                }
            }
            std::hint::spin_loop();
        }
        None
    }

    /// Like [`try_read_consistent`](Self::try_read_consistent), but falls
    /// back to a best-effort copy, which may be torn under constant
    /// rewriting.
    pub fn read_stable(&self) -> Vec<u8> {
        self.try_read_consistent()
            .unwrap_or_else(|| self.contents())
    }

    /// Number of bytes the current report occupies, as seen by readers.
    pub fn fill_bytes(&self) -> usize {
        self.len()
    }

    fn store(&self, index: usize, byte: u8) {
        self.bytes[index].store(byte, Ordering::Relaxed);
    }
}

/// Write cursor over a [`SnapshotBuffer`] with bounded, clipping appends.
///
/// Dropping the writer publishes whatever has been written so far.
pub struct SnapshotWriter<'a> {
    buffer: &'a SnapshotBuffer,
    cursor: usize,
    truncated: bool,
    finished: bool,
}

impl SnapshotWriter<'_> {
    /// Appends `data` at the cursor, clipped to the remaining capacity.
    ///
    /// At most `capacity - 1 - cursor` bytes are copied and a NUL is written
    /// right after them. Returns the number of bytes copied.
    pub fn append(&mut self, data: &[u8]) -> usize {
        let limit = self.buffer.capacity() - 1;
        let room = limit.saturating_sub(self.cursor);
        let n = data.len().min(room);
        if n < data.len() {
            self.truncated = true;
        }
        for (i, &byte) in data[..n].iter().enumerate() {
            self.buffer.store(self.cursor + i, byte);
        }
        self.cursor += n;
        self.buffer.store(self.cursor.min(limit), 0);
        n
    }

    pub fn append_str(&mut self, s: &str) -> usize {
        self.append(s.as_bytes())
    }

    /// Bytes written so far in this pass.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Whether any append was clipped.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Publishes the written content and returns its length.
    pub fn finish(mut self) -> usize {
        self.publish();
        self.cursor
    }

    fn publish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        let last = self.buffer.capacity() - 1;
        self.buffer.store(last, 0);
        self.buffer.len.store(self.cursor, Ordering::Release);
        self.buffer.generation.fetch_add(1, Ordering::AcqRel);
        self.buffer.writing.store(false, Ordering::Release);
    }
}

impl Drop for SnapshotWriter<'_> {
    fn drop(&mut self) {
        self.publish();
    }
}
