//! Pool Controller: the public operations (`init`/`shutdown`/`pin_page`/
//! `unpin_page`/`mark_dirty`/`force_page`/`force_flush_pool`) plus the
//! Statistics View. This is the one component every other module exists
//! to serve — frames, the page file adapter, and the replacement policy
//! are all leaves this orchestrates.
//!
//! A frame table, a page-to-slot index, a pluggable replacer and I/O
//! counters all behind one lock, except that the lock is released across
//! disk I/O during a miss: the target slot is leased to the incoming
//! page before the read/write runs so other slots' pins aren't blocked
//! behind one page's I/O (the frame-lease protocol below).

use crate::errors::Error;
use crate::frame::{Frame, SlotId};
use crate::handle::PageHandle;
use crate::page_file::{PageFileManager, PageNo, NO_PAGE};
use crate::policy::{Replacer, Strategy};
use crate::printdbg;
use anyhow::{bail, Result};
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;

/// Point-in-time snapshot of pool state, ordered by `slot_index`. Callers
/// must not rely on it surviving concurrent pool mutation.
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub frame_contents: Vec<PageNo>,
    pub dirty_flags: Vec<bool>,
    pub fix_counts: Vec<u32>,
    pub num_read_io: u64,
    pub num_write_io: u64,
}

/// Configuration accepted by [`BufferPoolManager::init`]. `strategy`
/// carries its own parameter (`k` for LRU-K) inline rather than through a
/// separate "strategy_config" slot — see DESIGN.md.
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub num_frames: usize,
    pub strategy: Strategy,
}

struct Inner {
    frames: Vec<Frame>,
    page_index: HashMap<PageNo, SlotId>,
    replacer: Box<dyn Replacer>,
    num_read_io: u64,
    num_write_io: u64,
}

impl Inner {
    fn free_slot(&self) -> Option<SlotId> {
        self.frames
            .iter()
            .find(|f| f.is_empty() && !f.in_transit)
            .map(|f| f.slot_index)
    }
}

/// The buffer pool manager. One mutex guards all metadata (frame table,
/// `page_index`, replacer, counters); each frame's bytes live behind
/// their own lock inside [`crate::frame::Frame::buffer`] so the metadata
/// mutex can be released across disk I/O (the frame-lease protocol
/// below). The page file itself sits behind its own mutex — disk I/O is
/// naturally serialized per file, but that serialization is now disjoint
/// from the metadata mutex, which is what lets other slots' pins
/// proceed while one slot's I/O is in flight. One condvar per slot lets
/// other threads wait out an in-flight admission/eviction of that slot
/// instead of issuing a second, redundant disk read for the same page.
pub struct BufferPoolManager {
    file: Mutex<Box<dyn PageFileManager>>,
    inner: Mutex<Inner>,
    transit_cv: Vec<Condvar>,
}

impl BufferPoolManager {
    /// Allocates `config.num_frames` empty frames over `file` and fails
    /// fast on an invalid configuration. The missing-file check lives in
    /// the page file adapter's own `open`/`create` constructors — by the
    /// time a [`PageFileManager`] reaches `init` it is already known to
    /// exist.
    pub fn init(file: Box<dyn PageFileManager>, config: PoolConfig) -> Result<Self> {
        if config.num_frames == 0 {
            bail!(Error::InvalidParam("num_frames must be >= 1".into()));
        }
        if let Strategy::LruK { k } = config.strategy {
            if k == 0 {
                bail!(Error::InvalidParam("LRU-K requires k >= 1".into()));
            }
        }

        let frames = (0..config.num_frames).map(Frame::new).collect::<Vec<_>>();
        let transit_cv = (0..config.num_frames).map(|_| Condvar::new()).collect();

        printdbg!(
            "buffer pool initialized: {} frames, strategy {}",
            config.num_frames,
            config.strategy.name()
        );

        Ok(Self {
            file: Mutex::new(file),
            inner: Mutex::new(Inner {
                frames,
                page_index: HashMap::new(),
                replacer: config.strategy.build(config.num_frames),
                num_read_io: 0,
                num_write_io: 0,
            }),
            transit_cv,
        })
    }

    pub fn num_frames(&self) -> usize {
        self.inner.lock().frames.len()
    }

    /// Fails with [`Error::PoolHasPinnedPages`] if any frame is still
    /// pinned. Otherwise flushes every dirty frame and returns; there is
    /// no separate teardown step beyond that — frame buffers and policy
    /// state are owned by `self` and drop with it.
    pub fn shutdown(&self) -> Result<()> {
        {
            let guard = self.inner.lock();
            let pinned = guard.frames.iter().filter(|f| f.is_pinned()).count();
            if pinned > 0 {
                bail!(Error::PoolHasPinnedPages(pinned));
            }
        }
        self.force_flush_pool()
    }

    /// Writes back every dirty, unpinned frame and clears its dirty flag.
    /// Pinned frames are skipped — their dirtiness is the pinner's
    /// responsibility until they unpin. Never evicts.
    pub fn force_flush_pool(&self) -> Result<()> {
        let mut guard = self.inner.lock();
        let targets: Vec<SlotId> = guard
            .frames
            .iter()
            .filter(|f| f.dirty && !f.is_pinned())
            .map(|f| f.slot_index)
            .collect();

        for slot in targets {
            let (page_no, buffer) = {
                let frame = &guard.frames[slot];
                (frame.page_no, frame.buffer.clone())
            };
            let data = buffer.lock();
            self.file.lock().write_block(page_no, &data)?;
            drop(data);
            guard.num_write_io += 1;
            guard.frames[slot].dirty = false;
            printdbg!("forceFlushPool: wrote back page {} (slot {})", page_no, slot);
        }

        Ok(())
    }

    /// Sets `dirty` on the handle's frame. Fails with
    /// [`Error::PageNotPinned`] if the frame isn't pinned or the handle's
    /// generation is stale.
    pub fn mark_dirty(&self, handle: &PageHandle) -> Result<()> {
        let mut guard = self.inner.lock();
        let frame = &mut guard.frames[handle.slot];
        if !frame.is_pinned() || frame.generation != handle.generation {
            bail!(Error::PageNotPinned(handle.page_no()));
        }
        frame.dirty = true;
        Ok(())
    }

    /// Decrements the frame's fix count and notifies the replacer.
    /// Fails with [`Error::PageNotPinned`] on underflow or a stale
    /// handle.
    pub fn unpin_page(&self, handle: &PageHandle) -> Result<()> {
        let mut guard = self.inner.lock();
        let frame = &mut guard.frames[handle.slot];
        if frame.fix_count == 0 || frame.generation != handle.generation {
            bail!(Error::PageNotPinned(handle.page_no()));
        }
        frame.fix_count -= 1;
        let slot = frame.slot_index;
        if frame.fix_count == 0 {
            guard.replacer.on_unpin(slot);
        }
        Ok(())
    }

    /// Writes the frame's buffer to disk and clears `dirty`, regardless
    /// of fix count.
    pub fn force_page(&self, handle: &PageHandle) -> Result<()> {
        let (page_no, buffer) = {
            let guard = self.inner.lock();
            let frame = &guard.frames[handle.slot];
            if frame.generation != handle.generation {
                bail!(Error::PageNotPinned(handle.page_no()));
            }
            (frame.page_no, frame.buffer.clone())
        };

        let data = buffer.lock();
        self.file.lock().write_block(page_no, &data)?;
        drop(data);

        let mut guard = self.inner.lock();
        guard.num_write_io += 1;
        guard.frames[handle.slot].dirty = false;
        Ok(())
    }

    /// The central algorithm: hit path bumps the fix count in place;
    /// miss path picks a victim, evicts it if dirty, reads the requested
    /// page, and admits it. The metadata mutex is released across both
    /// the eviction write and the admission read via the frame-lease
    /// protocol below so concurrent pins of *other* pages aren't blocked
    /// behind this page's disk I/O while it's in flight.
    pub fn pin_page(&self, page_no: PageNo) -> Result<PageHandle> {
        let mut guard = self.inner.lock();

        // Hit path.
        if let Some(&slot) = guard.page_index.get(&page_no) {
            loop {
                if !guard.frames[slot].in_transit {
                    break;
                }
                self.transit_cv[slot].wait(&mut guard);
                // The slot may have finished transit into a *different*
                // page (e.g. our target lost a race to another admitter
                // and was itself evicted again); re-check the index below
                // rather than assuming `slot` still holds `page_no`.
            }
            if guard.page_index.get(&page_no) != Some(&slot) {
                drop(guard);
                return self.pin_page(page_no);
            }
            let frame = &mut guard.frames[slot];
            frame.fix_count += 1;
            guard.replacer.on_hit(slot);
            let frame = &guard.frames[slot];
            printdbg!("pin_page: hit on page {} (slot {})", page_no, slot);
            return Ok(PageHandle::new(slot, frame.generation, page_no, frame.buffer.clone()));
        }

        // Miss path: prefer an empty slot, else ask the replacer.
        let slot = match guard.free_slot() {
            Some(slot) => slot,
            None => match guard.replacer.choose_victim(&guard.frames) {
                Some(slot) => slot,
                None => bail!(Error::NoFreeFrame),
            },
        };

        let was_resident = !guard.frames[slot].is_empty();
        let evicted_page_no = guard.frames[slot].page_no;
        let needs_writeback = was_resident && guard.frames[slot].dirty;
        let buffer = guard.frames[slot].buffer.clone();

        // Enter transit: lease the slot to the incoming page and release
        // the metadata mutex across I/O. `page_index` already maps
        // `page_no` to this slot before any I/O runs, so a second thread
        // racing a pin of the *same* page_no takes the hit/wait path
        // below instead of independently reading it into a different
        // slot. `frame.page_no`/`dirty` are set to their post-admission
        // values now too; only `generation` and the replacer callback
        // wait for a confirmed admission.
        guard.frames[slot].in_transit = true;
        guard.frames[slot].fix_count = 1;
        guard.frames[slot].page_no = page_no;
        guard.frames[slot].dirty = false;
        if was_resident {
            guard.page_index.remove(&evicted_page_no);
        }
        guard.page_index.insert(page_no, slot);
        drop(guard);

        let writeback_result = if needs_writeback {
            let data = buffer.lock();
            let res = self.file.lock().write_block(evicted_page_no, &data);
            drop(data);
            res
        } else {
            Ok(())
        };

        if let Err(e) = writeback_result {
            // Abandon the eviction: victim stays resident and dirty, the
            // pin fails. Restore the slot to its pre-transit state.
            let mut guard = self.inner.lock();
            guard.frames[slot].in_transit = false;
            guard.frames[slot].fix_count = 0;
            guard.frames[slot].page_no = evicted_page_no;
            guard.frames[slot].dirty = true;
            guard.page_index.remove(&page_no);
            guard.page_index.insert(evicted_page_no, slot);
            self.transit_cv[slot].notify_all();
            return Err(e);
        }

        if was_resident {
            let mut guard = self.inner.lock();
            guard.num_write_io += 1;
            guard.replacer.on_evict(slot);
            drop(guard);
        }

        let read_result = {
            let mut data = buffer.lock();
            self.file.lock().read_block(page_no, &mut data)
        };

        let mut guard = self.inner.lock();
        match read_result {
            Ok(()) => {
                guard.num_read_io += 1;
                let frame = &mut guard.frames[slot];
                frame.in_transit = false;
                frame.generation += 1;
                let generation = frame.generation;
                guard.replacer.on_admit(slot, page_no);
                self.transit_cv[slot].notify_all();
                printdbg!("pin_page: admitted page {} into slot {}", page_no, slot);
                Ok(PageHandle::new(slot, generation, page_no, buffer))
            }
            Err(e) => {
                // Roll back to clean-empty; the speculative page_index
                // entry for `page_no` does not survive a failed read.
                guard.page_index.remove(&page_no);
                let frame = &mut guard.frames[slot];
                frame.page_no = NO_PAGE;
                frame.dirty = false;
                frame.fix_count = 0;
                frame.in_transit = false;
                self.transit_cv[slot].notify_all();
                Err(e)
            }
        }
    }

    /// Read-only snapshot of frame contents, dirty flags, fix counts and
    /// I/O counters, ordered by slot index.
    pub fn stats(&self) -> PoolStats {
        let guard = self.inner.lock();
        PoolStats {
            frame_contents: guard.frames.iter().map(|f| f.page_no).collect(),
            dirty_flags: guard.frames.iter().map(|f| f.dirty).collect(),
            fix_counts: guard.frames.iter().map(|f| f.fix_count).collect(),
            num_read_io: guard.num_read_io,
            num_write_io: guard.num_write_io,
        }
    }

    pub fn num_read_io(&self) -> u64 {
        self.inner.lock().num_read_io
    }

    pub fn num_write_io(&self) -> u64 {
        self.inner.lock().num_write_io
    }
}
