//! Page handles: the caller-held reference produced by `pin_page`.

use crate::frame::SlotId;
use crate::page_file::{PageBuf, PageNo};
use parking_lot::Mutex;
use std::sync::Arc;

/// A thin reference to one pinned frame. Valid only between the
/// `pin_page` that produced it and the matching `unpin_page` — the pool
/// enforces this by checking `generation` against the frame's current
/// generation on every subsequent call, rather than trusting `page_no`
/// equality (which is ambiguous across re-residency of the same slot).
#[derive(Debug, Clone)]
pub struct PageHandle {
    pub(crate) slot: SlotId,
    pub(crate) generation: u64,
    page_no: PageNo,
    buffer: Arc<Mutex<PageBuf>>,
}

impl PageHandle {
    pub(crate) fn new(slot: SlotId, generation: u64, page_no: PageNo, buffer: Arc<Mutex<PageBuf>>) -> Self {
        Self {
            slot,
            generation,
            page_no,
            buffer,
        }
    }

    pub fn page_no(&self) -> PageNo {
        self.page_no
    }

    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// Read the page's bytes under the frame's buffer lock.
    pub fn read<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        let guard = self.buffer.lock();
        f(guard.as_slice())
    }

    /// Write the page's bytes under the frame's buffer lock. Does not by
    /// itself mark the page dirty — callers must still call
    /// `BufferPoolManager::mark_dirty` to record that the buffer no
    /// longer matches disk.
    pub fn write(&self, f: impl FnOnce(&mut [u8])) {
        let mut guard = self.buffer.lock();
        f(guard.as_mut_slice());
    }
}
