//! Sequential readers over datagram files
//!
//! A [`Reader`] walks a file record by record using only the common header
//! of each record. Payloads are decoded on request, so callers that only
//! need the type and time of a record never pay for a full decode.
use crate::cursor::ByteCursor;
use crate::{Error, Result};
use binrw::io::{Read, Seek};
use std::fmt::Debug;
use std::marker::PhantomData;

/// A datagram stream family
pub trait Format {
    /// The common header shared by every record of the family
    type Header: Clone + Debug;

    /// Per-file state that turns headers into absolute timestamps
    type Clock: Debug;

    /// Human readable name of the family
    const NAME: &'static str;

    /// Read the common header at the cursor without consuming the record
    ///
    /// Returns `Ok(None)` when the cursor is exactly at the end of the
    /// source. On success the cursor is back at the record start.
    ///
    /// # Errors
    ///
    /// [`Error::CorruptHeader`] if the header is short or its sync marker
    /// is wrong.
    fn peek_header<T: Read + Seek>(cursor: &mut ByteCursor<T>) -> Result<Option<Self::Header>>;

    /// The full on-disk span of the record, including any length field
    fn record_length(header: &Self::Header) -> u64;

    /// Absolute time of the record in unix seconds
    fn timestamp(header: &Self::Header, clock: &mut Self::Clock) -> f64;
}

/// A record located by the reader but not yet decoded
#[derive(Debug, Clone, PartialEq)]
pub struct RecordHandle<H> {
    /// Offset of the first byte of the record
    pub offset: u64,
    /// On-disk length of the record
    pub length: u64,
    /// Absolute time of the record in unix seconds
    pub timestamp: f64,
    /// The decoded common header
    pub header: H,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Scanning,
    /// Scanning stopped at a record whose declared length ran past the end
    /// of the file
    Truncated(u64),
    EndOfFile,
}

/// A sequential reader over one datagram file
///
/// Readers are iterators over [`RecordHandle`]s. Iteration stops after the
/// first error; a truncated final record leaves its bytes available through
/// [`Reader::tail`].
#[derive(Debug)]
pub struct Reader<F: Format, T> {
    cursor: ByteCursor<T>,
    clock: F::Clock,
    state: State,
    _format: PhantomData<F>,
}

impl<F: Format, T: Read + Seek> Reader<F, T> {
    /// Create a reader positioned at the start of `inner`
    pub fn new(inner: T, clock: F::Clock) -> Result<Self> {
        Ok(Reader {
            cursor: ByteCursor::new(inner)?,
            clock,
            state: State::Scanning,
            _format: PhantomData,
        })
    }

    /// Locate the next record without decoding its payload
    ///
    /// # Errors
    ///
    /// [`Error::CorruptHeader`] if the next header cannot be read, or
    /// [`Error::TruncatedPayload`] if the record extends past the end of the
    /// file. Either error ends the scan.
    pub fn read_next(&mut self) -> Result<Option<RecordHandle<F::Header>>> {
        if self.state != State::Scanning {
            return Ok(None);
        }

        let offset = self.cursor.offset();
        let header = match F::peek_header(&mut self.cursor) {
            Ok(Some(header)) => header,
            Ok(None) => {
                self.state = State::EndOfFile;
                return Ok(None);
            }
            Err(e) => {
                self.state = State::EndOfFile;
                return Err(e);
            }
        };

        let length = F::record_length(&header);
        let available = self.cursor.remaining();
        if length > available {
            log::warn!(
                "{} record at offset {} declares {} bytes but only {} remain",
                F::NAME,
                offset,
                length,
                available
            );
            self.state = State::Truncated(offset);
            return Err(Error::TruncatedPayload {
                offset,
                declared: length,
                available,
            });
        }

        let timestamp = F::timestamp(&header, &mut self.clock);
        self.cursor.seek_to(offset + length)?;
        log::trace!("{} record at {} ({} bytes)", F::NAME, offset, length);
        Ok(Some(RecordHandle {
            offset,
            length,
            timestamp,
            header,
        }))
    }

    /// The verbatim bytes of a located record
    ///
    /// The reader's own position is unchanged.
    pub fn raw_bytes(&mut self, handle: &RecordHandle<F::Header>) -> Result<Vec<u8>> {
        self.read_at(handle.offset, handle.length)
    }

    /// Read `length` bytes at `offset` without disturbing the scan
    pub fn read_at(&mut self, offset: u64, length: u64) -> Result<Vec<u8>> {
        let length = usize::try_from(length).map_err(|_| Error::TruncatedPayload {
            offset,
            declared: length,
            available: self.cursor.len().saturating_sub(offset),
        })?;
        Ok(self.cursor.read_at(offset, length)?)
    }

    /// The bytes of an abandoned, truncated record through to the end of
    /// the file
    ///
    /// Empty unless the scan stopped on [`Error::TruncatedPayload`].
    pub fn tail(&mut self) -> Result<Vec<u8>> {
        match self.state {
            State::Truncated(offset) => {
                let length = self.cursor.len() - offset;
                self.read_at(offset, length)
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Return to the start of the file
    pub fn rewind(&mut self) -> Result<()> {
        self.cursor.seek_to(0)?;
        self.state = State::Scanning;
        Ok(())
    }

    /// Count records with a header-only scan of the whole file
    ///
    /// The reader's position and state are restored afterwards.
    ///
    /// # Errors
    ///
    /// The first error met while scanning.
    pub fn record_count(&mut self) -> Result<usize> {
        let saved = (self.cursor.offset(), self.state);
        self.cursor.seek_to(0)?;
        self.state = State::Scanning;

        let mut count = 0;
        let result = loop {
            let offset = self.cursor.offset();
            match F::peek_header(&mut self.cursor) {
                Ok(Some(header)) => {
                    let length = F::record_length(&header);
                    if length > self.cursor.remaining() {
                        break Err(Error::TruncatedPayload {
                            offset,
                            declared: length,
                            available: self.cursor.remaining(),
                        });
                    }
                    self.cursor.seek_to(offset + length)?;
                    count += 1;
                }
                Ok(None) => break Ok(count),
                Err(e) => break Err(e),
            }
        };

        self.cursor.seek_to(saved.0)?;
        self.state = saved.1;
        result
    }

    /// Offset of the next record to be read
    pub fn offset(&self) -> u64 {
        self.cursor.offset()
    }

    /// Length of the underlying file
    pub fn len(&self) -> u64 {
        self.cursor.len()
    }

    /// Whether the underlying file is empty
    pub fn is_empty(&self) -> bool {
        self.cursor.is_empty()
    }

    /// The per-file clock
    pub fn clock(&self) -> &F::Clock {
        &self.clock
    }

    pub(crate) fn clock_mut(&mut self) -> &mut F::Clock {
        &mut self.clock
    }

    /// Release the underlying file
    pub fn into_inner(self) -> T {
        self.cursor.into_inner()
    }
}

impl<F: Format, T: Read + Seek> Iterator for Reader<F, T> {
    type Item = Result<RecordHandle<F::Header>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}
