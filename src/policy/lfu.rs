use super::{evictable, Replacer};
use crate::frame::{Frame, SlotId};
use crate::page_file::PageNo;
use std::collections::HashMap;

/// LFU: evict the resident, unpinned frame with the fewest hits, ties
/// broken by smallest slot index.
#[derive(Debug, Default)]
pub struct Lfu {
    hit_count: HashMap<SlotId, u64>,
}

impl Lfu {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Replacer for Lfu {
    fn on_admit(&mut self, slot: SlotId, _page_no: PageNo) {
        self.hit_count.insert(slot, 1);
    }

    fn on_hit(&mut self, slot: SlotId) {
        *self.hit_count.entry(slot).or_insert(0) += 1;
    }

    fn choose_victim(&mut self, frames: &[Frame]) -> Option<SlotId> {
        frames
            .iter()
            .filter(|f| evictable(f))
            .map(|f| {
                let count = self.hit_count.get(&f.slot_index).copied().unwrap_or(0);
                (count, f.slot_index)
            })
            .min()
            .map(|(_, slot)| slot)
    }

    fn on_evict(&mut self, slot: SlotId) {
        self.hit_count.remove(&slot);
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
    fn frame_hit_twice_survives_over_frame_hit_once() {
        let mut lfu = Lfu::new();
        lfu.on_admit(0, 1);
        lfu.on_admit(1, 2);
        lfu.on_admit(2, 3);
        lfu.on_hit(0);
        lfu.on_hit(0); // frame 0: 3 hits total, frame 1 and 2: 1 each

        let frames = vec![
            frame_with(0, 1, 0),
            frame_with(1, 2, 0),
            frame_with(2, 3, 0),
        ];

        // tie between 1 and 2, smaller slot index wins
        assert_eq!(lfu.choose_victim(&frames), Some(1));
    }
}
