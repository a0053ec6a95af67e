//! The page file adapter: a thin wrapper over a block-addressable file.
//!
//! The pool only ever talks to the file through [`PageFileManager`]. The
//! concrete [`DiskPageFile`] below is one reasonable implementation (a
//! single growable file, blocks laid out back to back) good enough to
//! back the demo binary and the test suite; a production deployment could
//! swap in a different implementation (mmap'd, O_DIRECT, sharded) without
//! the pool noticing.

use crate::errors::Error;
use crate::printdbg;
use anyhow::Result;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

pub const PAGE_SIZE: usize = 4096;
pub type PageNo = i64;
pub const NO_PAGE: PageNo = -1;

/// One page worth of bytes, boxed so frames don't carry 4KB inline.
pub type PageBuf = Box<[u8; PAGE_SIZE]>;

pub fn new_page_buf() -> PageBuf {
    Box::new([0u8; PAGE_SIZE])
}

/// The interface the pool controller uses to talk to disk, kept as a
/// trait so the pool is testable against fakes and so a real deployment
/// can pick its own I/O strategy without the pool noticing.
pub trait PageFileManager: Send + Sync {
    /// Ensure the file has at least `n` blocks, zero-filling any growth.
    fn ensure_capacity(&mut self, n: usize) -> Result<()>;
    /// Copy block `page_no` from disk into `buf`.
    fn read_block(&mut self, page_no: PageNo, buf: &mut [u8; PAGE_SIZE]) -> Result<()>;
    /// Copy `buf` to block `page_no`, extending the file first if needed.
    fn write_block(&mut self, page_no: PageNo, buf: &[u8; PAGE_SIZE]) -> Result<()>;
    /// Number of blocks currently in the file.
    fn num_blocks(&self) -> usize;
}

/// A single growable file, blocks laid out at `[i*PAGE_SIZE, (i+1)*PAGE_SIZE)`.
#[derive(Debug)]
pub struct DiskPageFile {
    file: File,
    num_blocks: usize,
}

impl DiskPageFile {
    /// Opens an existing page file. Fails with [`Error::FileNotFound`] if
    /// it doesn't exist — `init` relies on this to reject a missing file
    /// rather than silently creating one.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(Error::FileNotFound(path.display().to_string()).into());
        }

        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        let len = file.metadata()?.len() as usize;
        let num_blocks = len / PAGE_SIZE;

        printdbg!("opened page file {:?} with {} blocks", path, num_blocks);

        Ok(Self { file, num_blocks })
    }

    /// Creates an empty page file at `path`, used by the demo and by
    /// tests that want a fresh file rather than a pre-seeded one.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        Self::open(path)
    }
}

impl PageFileManager for DiskPageFile {
    fn ensure_capacity(&mut self, n: usize) -> Result<()> {
        if n <= self.num_blocks {
            return Ok(());
        }

        let zeros = [0u8; PAGE_SIZE];
        self.file.seek(SeekFrom::End(0))?;
        for _ in self.num_blocks..n {
            self.file.write_all(&zeros)?;
        }
        self.file.flush()?;
        self.num_blocks = n;

        Ok(())
    }

    fn read_block(&mut self, page_no: PageNo, buf: &mut [u8; PAGE_SIZE]) -> Result<()> {
        if page_no < 0 || page_no as usize >= self.num_blocks {
            return Err(Error::ReadNonExistingPage(page_no).into());
        }

        self.file
            .seek(SeekFrom::Start(page_no as u64 * PAGE_SIZE as u64))?;
        self.file.read_exact(buf)?;

        Ok(())
    }

    fn write_block(&mut self, page_no: PageNo, buf: &[u8; PAGE_SIZE]) -> Result<()> {
        if page_no < 0 {
            return Err(Error::InvalidParam(format!("negative page number {page_no}")).into());
        }
        let needed = page_no as usize + 1;
        if needed > self.num_blocks {
            self.ensure_capacity(needed)?;
        }

        self.file
            .seek(SeekFrom::Start(page_no as u64 * PAGE_SIZE as u64))
            .map_err(|_| Error::WriteFailed(page_no))?;
        self.file
            .write_all(buf)
            .map_err(|_| Error::WriteFailed(page_no))?;
        self.file.flush().map_err(|_| Error::WriteFailed(page_no))?;

        Ok(())
    }

    fn num_blocks(&self) -> usize {
        self.num_blocks
    }
}

#[cfg(test)]
pub fn test_path() -> String {
    use uuid::Uuid;
    format!("data/test/test_{}.db", Uuid::new_v4())
}
