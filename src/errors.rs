use crate::page_file::PageNo;

/// Error taxonomy for the pool's public operations. Raised with
/// `anyhow::bail!` and matched by callers via
/// `err.downcast_ref::<Error>()` rather than a string comparison.
#[derive(Debug)]
pub enum Error {
    FileNotFound(String),
    ReadNonExistingPage(PageNo),
    WriteFailed(PageNo),
    PoolHasPinnedPages(usize),
    NoFreeFrame,
    PageNotPinned(PageNo),
    InvalidParam(String),
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::FileNotFound(path) => write!(f, "page file not found: {path}"),
            Error::ReadNonExistingPage(page_no) => {
                write!(f, "attempted to read page {page_no} beyond end of file")
            }
            Error::WriteFailed(page_no) => write!(f, "failed to write page {page_no} to disk"),
            Error::PoolHasPinnedPages(n) => {
                write!(f, "pool has {n} pinned page(s), cannot shut down")
            }
            Error::NoFreeFrame => write!(f, "no free frame: every frame is pinned"),
            Error::PageNotPinned(page_no) => write!(f, "page {page_no} is not pinned"),
            Error::InvalidParam(what) => write!(f, "invalid parameter: {what}"),
            Error::Io(e) => write!(f, "i/o error: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
