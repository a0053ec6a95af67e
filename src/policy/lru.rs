use super::{evictable, Replacer};
use crate::frame::{Frame, SlotId};
use crate::page_file::PageNo;
use priority_queue::PriorityQueue;

/// LRU: a max-heap keyed by the negated last-use timestamp, so the
/// smallest timestamp (the least recently used frame) always pops
/// first. Pinned frames stay in the heap too (cheaper than shuffling
/// them in and out on every pin/unpin) — `choose_victim` simply skips
/// any heap entry that isn't currently evictable.
#[derive(Debug)]
pub struct Lru {
    timestamp: i64,
    heap: PriorityQueue<SlotId, i64>,
}

impl Lru {
    pub fn new(num_frames: usize) -> Self {
        Self {
            timestamp: 0,
            heap: PriorityQueue::with_capacity(num_frames),
        }
    }

    fn touch(&mut self, slot: SlotId) {
        self.timestamp += 1;
        self.heap.push_decrease(slot, -self.timestamp);
    }
}

impl Replacer for Lru {
    fn on_admit(&mut self, slot: SlotId, _page_no: PageNo) {
        self.touch(slot);
    }

    fn on_hit(&mut self, slot: SlotId) {
        self.touch(slot);
    }

    fn choose_victim(&mut self, frames: &[Frame]) -> Option<SlotId> {
        self.heap
            .iter()
            .filter(|(slot, _)| frames.iter().any(|f| f.slot_index == **slot && evictable(f)))
            .max_by_key(|(_, prio)| **prio)
            .map(|(slot, _)| *slot)
    }

    fn on_evict(&mut self, slot: SlotId) {
        self.heap.remove(&slot);
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
    fn evicts_least_recently_used() {
        let mut lru = Lru::new(3);
        lru.on_admit(0, 1);
        lru.on_admit(1, 2);
        lru.on_admit(2, 3);
        lru.on_hit(0); // 0 is now most recently used; 1 is now the LRU victim

        let frames = vec![
            frame_with(0, 1, 0),
            frame_with(1, 2, 0),
            frame_with(2, 3, 0),
        ];

        assert_eq!(lru.choose_victim(&frames), Some(1));
    }

    #[test]
    fn pinned_frames_are_never_returned() {
        let mut lru = Lru::new(2);
        lru.on_admit(0, 1);
        lru.on_admit(1, 2);

        let frames = vec![frame_with(0, 1, 1), frame_with(1, 2, 0)];
        assert_eq!(lru.choose_victim(&frames), Some(1));
    }
}
