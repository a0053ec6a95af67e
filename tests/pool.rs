use anyhow::Result;
use keelson::page_file::DiskPageFile;
use keelson::policy::Strategy;
use keelson::pool::{BufferPoolManager, PoolConfig};
use uuid::Uuid;

fn test_path() -> String {
    format!("data/test/test_{}.db", Uuid::new_v4())
}

fn pool_with(num_pages: usize, num_frames: usize, strategy: Strategy) -> (BufferPoolManager, String) {
    let path = test_path();
    let mut file = DiskPageFile::create(&path).unwrap();
    file.ensure_capacity(num_pages).unwrap();
    let bpm = BufferPoolManager::init(Box::new(file), PoolConfig { num_frames, strategy }).unwrap();
    (bpm, path)
}

/// Runs a trace of page numbers against a fresh pool, pinning then
/// immediately unpinning each one (no page is ever held across the next
/// access).
fn run_trace(bpm: &BufferPoolManager, trace: &[i64]) -> Result<()> {
    for &page_no in trace {
        let handle = bpm.pin_page(page_no)?;
        bpm.unpin_page(&handle)?;
    }
    Ok(())
}

#[test]
fn fifo_trace_matches_reference_counts() -> Result<()> {
    let (bpm, path) = pool_with(8, 3, Strategy::Fifo);
    run_trace(&bpm, &[1, 2, 3, 4, 1, 2, 5, 1, 2, 3, 4, 5])?;

    let stats = bpm.stats();
    let mut resident: Vec<i64> = stats.frame_contents.into_iter().filter(|&p| p >= 0).collect();
    resident.sort();
    assert_eq!(resident, vec![3, 4, 5]);
    assert_eq!(stats.num_read_io, 9);

    std::fs::remove_file(&path).ok();
    Ok(())
}

#[test]
fn lru_trace_matches_reference_counts() -> Result<()> {
    let (bpm, path) = pool_with(8, 3, Strategy::Lru);
    run_trace(&bpm, &[1, 2, 3, 4, 1, 2, 5, 1, 2, 3, 4, 5])?;

    let stats = bpm.stats();
    let mut resident: Vec<i64> = stats.frame_contents.into_iter().filter(|&p| p >= 0).collect();
    resident.sort();
    assert_eq!(resident, vec![3, 4, 5]);
    assert_eq!(stats.num_read_io, 10);

    std::fs::remove_file(&path).ok();
    Ok(())
}

#[test]
fn clock_reference_bit_saves_frame_from_next_sweep() -> Result<()> {
    let (bpm, path) = pool_with(8, 3, Strategy::Clock);

    // Fill all three frames; the hand starts at slot 0 and a full sweep
    // clears every bit on the way around, so this first eviction always
    // takes whichever page landed in slot 0 (page 0 here).
    run_trace(&bpm, &[0, 1, 2])?;
    let h3 = bpm.pin_page(3)?;
    bpm.unpin_page(&h3)?;
    assert!(!bpm.stats().frame_contents.contains(&0));

    // Re-touch page 1, which now occupies the slot the hand already
    // passed once. Its reference bit is set again before the hand gets
    // back around to it, so it survives the next sweep while page 2
    // (whose bit is still clear from the first sweep) does not.
    let h1 = bpm.pin_page(1)?;
    bpm.unpin_page(&h1)?;
    let h4 = bpm.pin_page(4)?;
    bpm.unpin_page(&h4)?;

    let resident = bpm.stats().frame_contents;
    assert!(resident.contains(&1), "re-accessed page should survive: {resident:?}");
    assert!(resident.contains(&3));
    assert!(resident.contains(&4));
    assert!(!resident.contains(&2));

    std::fs::remove_file(&path).ok();
    Ok(())
}

#[test]
fn lfu_frame_hit_twice_survives_first_eviction() -> Result<()> {
    let (bpm, path) = pool_with(8, 2, Strategy::Lfu);

    let h0 = bpm.pin_page(0)?;
    bpm.unpin_page(&h0)?;
    let h1 = bpm.pin_page(1)?;
    bpm.unpin_page(&h1)?;

    // Page 0 gets a second hit while page 1 stays at one.
    let h0 = bpm.pin_page(0)?;
    bpm.unpin_page(&h0)?;

    bpm.pin_page(2)?;

    let resident = bpm.stats().frame_contents;
    assert!(resident.contains(&0));
    assert!(resident.contains(&2));
    assert!(!resident.contains(&1));

    std::fs::remove_file(&path).ok();
    Ok(())
}

#[test]
fn read_past_end_of_file_fails_without_corrupting_pool() -> Result<()> {
    let (bpm, path) = pool_with(1, 2, Strategy::Fifo);

    assert!(bpm.pin_page(5).is_err());
    // The failed admission must not leave a dangling page_index entry or
    // a stuck in-transit frame behind; a fresh pin of a valid page still
    // works afterwards.
    bpm.pin_page(0)?;

    std::fs::remove_file(&path).ok();
    Ok(())
}
