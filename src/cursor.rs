//! Random access over a seekable byte source
use std::io::{self, Read, Seek, SeekFrom};

/// A byte cursor over a seekable source that tracks its own offset
///
/// Every reader goes through a `ByteCursor`, so the current offset and the
/// number of bytes left are always known without asking the operating
/// system.
#[derive(Debug)]
pub struct ByteCursor<T> {
    inner: T,
    offset: u64,
    len: u64,
}

impl<T: Read + Seek> ByteCursor<T> {
    /// Wrap `inner`, positioning the cursor at the start of the source
    pub fn new(mut inner: T) -> io::Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(ByteCursor {
            inner,
            offset: 0,
            len,
        })
    }

    /// The current offset from the start of the source
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The total length of the source
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the source holds no bytes at all
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes between the current offset and the end of the source
    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.offset)
    }

    /// Move to an absolute offset
    pub fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        self.offset = self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Move relative to the current offset
    pub fn seek_by(&mut self, delta: i64) -> io::Result<()> {
        let target = self.offset.checked_add_signed(delta).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cannot seek by {} from offset {}", delta, self.offset),
            )
        })?;
        self.seek_to(target)
    }

    /// Read exactly `n` bytes, advancing the cursor
    ///
    /// A short read leaves the cursor where the read stopped and returns an
    /// [`io::ErrorKind::UnexpectedEof`] error.
    pub fn read_exact(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        let mut filled = 0;
        while filled < n {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(k) => filled += k,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        self.offset += filled as u64;
        if filled < n {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("wanted {} bytes at offset {}, got {}", n, self.offset - filled as u64, filled),
            ));
        }
        Ok(buf)
    }

    /// Read `n` bytes at `offset` without disturbing the current position
    pub fn read_at(&mut self, offset: u64, n: usize) -> io::Result<Vec<u8>> {
        let saved = self.offset;
        self.seek_to(offset)?;
        let bytes = self.read_exact(n);
        self.seek_to(saved)?;
        bytes
    }

    /// Read everything from the current offset to the end of the source
    pub fn read_to_end(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        let n = self.inner.read_to_end(&mut buf)?;
        self.offset += n as u64;
        Ok(buf)
    }

    /// Give back the wrapped source
    pub fn into_inner(self) -> T {
        self.inner
    }
}
