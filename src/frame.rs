//! Frame table: the fixed array of frame slots and their metadata.

use crate::page_file::{new_page_buf, PageBuf, PageNo, NO_PAGE};
use parking_lot::Mutex;
use std::sync::Arc;

pub type SlotId = usize;

/// Per-frame metadata, guarded by the pool's single metadata mutex. The
/// page bytes themselves live behind their own lock (see
/// [`Frame::buffer`]) so the metadata mutex can be released across disk
/// I/O without exposing an unlocked buffer to a second thread.
#[derive(Debug)]
pub struct Frame {
    pub slot_index: SlotId,
    pub page_no: PageNo,
    pub dirty: bool,
    pub fix_count: u32,
    /// Set while a miss-path eviction/admission is in flight for this
    /// slot and the metadata mutex has been released. Frames with
    /// `in_transit = true` are never chosen as victims.
    pub in_transit: bool,
    /// Bumped on every admission; handles carry the generation they were
    /// issued under so a stale handle from a prior residency is rejected
    /// instead of silently operating on the wrong page.
    pub generation: u64,
    pub buffer: Arc<Mutex<PageBuf>>,
}

impl Frame {
    pub fn new(slot_index: SlotId) -> Self {
        Self {
            slot_index,
            page_no: NO_PAGE,
            dirty: false,
            fix_count: 0,
            in_transit: false,
            generation: 0,
            buffer: Arc::new(Mutex::new(new_page_buf())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.page_no == NO_PAGE
    }

    pub fn is_pinned(&self) -> bool {
        self.fix_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_frame_is_clean_empty() {
        let frame = Frame::new(3);
        assert_eq!(frame.slot_index, 3);
        assert!(frame.is_empty());
        assert!(!frame.is_pinned());
        assert!(!frame.dirty);
        assert_eq!(frame.generation, 0);
    }
}
