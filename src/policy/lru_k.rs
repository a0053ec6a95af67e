use super::{evictable, Replacer};
use crate::frame::{Frame, SlotId};
use crate::page_file::PageNo;
use std::collections::{HashMap, VecDeque};

/// LRU-K: evict the frame whose K-th most recent access is furthest in
/// the past. Frames with fewer than K recorded accesses have an infinite
/// backward distance and are preferred over any frame with a full K-deep
/// history, tie-broken among themselves by least-recent timestamp.
#[derive(Debug)]
pub struct LruK {
    k: usize,
    clock: u64,
    history: HashMap<SlotId, VecDeque<u64>>,
}

impl LruK {
    pub fn new(k: usize) -> Self {
        assert!(k >= 1, "LRU-K requires k >= 1");
        Self {
            k,
            clock: 0,
            history: HashMap::new(),
        }
    }

    fn record(&mut self, slot: SlotId) {
        self.clock += 1;
        let ts = self.clock;
        let hist = self.history.entry(slot).or_default();
        hist.push_back(ts);
        if hist.len() > self.k {
            hist.pop_front();
        }
    }

    /// `(has_full_history, distance_metric)`. Smaller sorts first: an
    /// incomplete history (`false`) always beats a complete one (`true`),
    /// and within a group the smaller (older) metric wins.
    fn priority(&self, slot: SlotId) -> (bool, u64) {
        match self.history.get(&slot) {
            None => (false, 0),
            Some(hist) if hist.len() < self.k => (false, *hist.front().unwrap_or(&0)),
            Some(hist) => (true, *hist.front().expect("full history is non-empty")),
        }
    }
}

impl Replacer for LruK {
    fn on_admit(&mut self, slot: SlotId, _page_no: PageNo) {
        self.history.remove(&slot);
        self.record(slot);
    }

    fn on_hit(&mut self, slot: SlotId) {
        self.record(slot);
    }

    fn choose_victim(&mut self, frames: &[Frame]) -> Option<SlotId> {
        frames
            .iter()
            .filter(|f| evictable(f))
            .map(|f| (self.priority(f.slot_index), f.slot_index))
            .min()
            .map(|(_, slot)| slot)
    }

    fn on_evict(&mut self, slot: SlotId) {
        self.history.remove(&slot);
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
    fn incomplete_history_is_evicted_before_full_history() {
        // Access trace 1,2,3,1,4 with K=2 on N=3.
        let mut lru_k = LruK::new(2);
        lru_k.on_admit(0, 1); // page 1
        lru_k.on_admit(1, 2); // page 2
        lru_k.on_admit(2, 3); // page 3
        lru_k.on_hit(0); // re-access page 1 -> slot 0 now has 2 recorded accesses

        let frames = vec![
            frame_with(0, 1, 0),
            frame_with(1, 2, 0),
            frame_with(2, 3, 0),
        ];

        // slot 0 has a full K=2 history; slots 1 and 2 have only 1 access
        // each (incomplete) and slot 1's access is older, so it's chosen.
        assert_eq!(lru_k.choose_victim(&frames), Some(1));
    }

    #[test]
    fn full_histories_compare_by_kth_most_recent_access() {
        let mut lru_k = LruK::new(2);
        lru_k.on_admit(0, 1);
        lru_k.on_admit(1, 2);
        lru_k.on_hit(0);
        lru_k.on_hit(1);
        lru_k.on_hit(0);
        lru_k.on_hit(1);
        // slot 0 accesses: admit(t1), hit(t3), hit(t5) -> kept [t3, t5]
        // slot 1 accesses: admit(t2), hit(t4), hit(t6) -> kept [t4, t6]
        // slot 0's 2nd-most-recent (t3) is older than slot 1's (t4).

        let frames = vec![frame_with(0, 1, 0), frame_with(1, 2, 0)];
        assert_eq!(lru_k.choose_victim(&frames), Some(0));
    }
}
