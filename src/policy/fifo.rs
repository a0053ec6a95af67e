use super::{evictable, Replacer};
use crate::frame::{Frame, SlotId};
use crate::page_file::PageNo;
use std::collections::HashMap;

/// FIFO: evict the resident, unpinned frame that has been resident the
/// longest, regardless of how recently it was re-pinned. `timer` is a
/// strictly-increasing counter so ties never occur.
#[derive(Debug, Default)]
pub struct Fifo {
    timer: u64,
    admitted_at: HashMap<SlotId, u64>,
}

impl Fifo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Replacer for Fifo {
    fn on_admit(&mut self, slot: SlotId, _page_no: PageNo) {
        self.timer += 1;
        self.admitted_at.insert(slot, self.timer);
    }

    fn on_hit(&mut self, _slot: SlotId) {
        // FIFO ignores hits: admission order is the only thing that matters.
    }

    fn choose_victim(&mut self, frames: &[Frame]) -> Option<SlotId> {
        frames
            .iter()
            .filter(|f| evictable(f))
            .filter_map(|f| self.admitted_at.get(&f.slot_index).map(|ts| (*ts, f.slot_index)))
            .min()
            .map(|(_, slot)| slot)
    }

    fn on_evict(&mut self, slot: SlotId) {
        self.admitted_at.remove(&slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;

    fn frame_with(slot: SlotId, page_no: PageNo, fix_count: u32) -> Frame {
        let mut f = Frame::new(slot);
        f.page_no = page_no;
        f.fix_count = fix_count;
        f
    }

    #[test]
    fn evicts_oldest_admission_regardless_of_hits() {
        let mut fifo = Fifo::new();
        fifo.on_admit(0, 1);
        fifo.on_admit(1, 2);
        fifo.on_admit(2, 3);
        fifo.on_hit(0); // should not change eviction order

        let frames = vec![
            frame_with(0, 1, 0),
            frame_with(1, 2, 0),
            frame_with(2, 3, 0),
        ];

        assert_eq!(fifo.choose_victim(&frames), Some(0));
    }

    #[test]
    fn skips_pinned_frames() {
        let mut fifo = Fifo::new();
        fifo.on_admit(0, 1);
        fifo.on_admit(1, 2);

        let frames = vec![frame_with(0, 1, 1), frame_with(1, 2, 0)];
        assert_eq!(fifo.choose_victim(&frames), Some(1));
    }
}
