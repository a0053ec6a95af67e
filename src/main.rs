use anyhow::Result;
use keelson::page_file::DiskPageFile;
use keelson::policy::Strategy;
use keelson::pool::{BufferPoolManager, PoolConfig};

const PAGE_FILE: &str = "data/keelson-demo.db";

fn main() -> Result<()> {
    let mut file = DiskPageFile::create(PAGE_FILE)?;
    file.ensure_capacity(8)?;

    let bpm = BufferPoolManager::init(
        Box::new(file),
        PoolConfig {
            num_frames: 3,
            strategy: Strategy::Lru,
        },
    )?;

    let handle = bpm.pin_page(0)?;
    handle.write(|buf| buf[0..5].copy_from_slice(b"hello"));
    bpm.mark_dirty(&handle)?;
    bpm.unpin_page(&handle)?;

    // Pin two more pages to push page 0 out of the pool and back to disk.
    let h1 = bpm.pin_page(1)?;
    let h2 = bpm.pin_page(2)?;

    let stats = bpm.stats();
    println!("frame contents: {:?}", stats.frame_contents);
    println!("dirty flags:    {:?}", stats.dirty_flags);
    println!("fix counts:     {:?}", stats.fix_counts);
    println!(
        "reads: {}, writes: {}",
        stats.num_read_io, stats.num_write_io
    );

    bpm.unpin_page(&h1)?;
    bpm.unpin_page(&h2)?;

    // Page 0 was written back on eviction; re-pin it and read the bytes back.
    let handle = bpm.pin_page(0)?;
    handle.read(|buf| {
        println!("page 0 bytes: {:?}", &buf[0..5]);
    });
    bpm.unpin_page(&handle)?;

    bpm.shutdown()?;

    Ok(())
}
