//! Errors raised while reading, writing and conditioning datagram streams
use std::path::PathBuf;

/// Errors produced by the codecs, readers and the conditioner
///
/// Unknown record types are never an error: they decode to a pass-through
/// record. An uncalibrated time origin is reported as a flag on
/// [`TimeOrigin`](crate::parser::pos::TimeOrigin), not as an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error from the underlying file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The common header could not be read or its sync marker is wrong
    ///
    /// Fatal for the current file: without a trustworthy length the
    /// reader cannot resynchronise.
    #[error("corrupt record header at offset {offset}: {reason}")]
    CorruptHeader {
        /// Byte offset of the candidate record start
        offset: u64,
        /// What was wrong with it
        reason: String,
    },

    /// A record claims more bytes than remain in the file or in the record
    #[error("truncated record at offset {offset}: {declared} bytes declared, {available} available")]
    TruncatedPayload {
        /// Byte offset of the record start
        offset: u64,
        /// Bytes the record (or an array inside it) requires
        declared: u64,
        /// Bytes actually available
        available: u64,
    },

    /// A record body failed to parse
    #[error("failed to decode record at offset {offset}: {source}")]
    Decode {
        /// Byte offset of the record start
        offset: u64,
        /// The underlying parse error
        #[source]
        source: binrw::Error,
    },

    /// A record could not be encoded
    #[error("failed to encode {record} record: {reason}")]
    Encode {
        /// Name of the record kind
        record: &'static str,
        /// What went wrong
        reason: String,
    },

    /// An injection source file does not exist
    #[error("injection source not found: {0}")]
    InjectionSourceMissing(PathBuf),

    /// An injection source file holds no usable records
    #[error("injection source is empty: {0}")]
    InjectionSourceEmpty(PathBuf),

    /// A row of a text injection source could not be parsed
    #[error("invalid row {line} in {path}: {reason}")]
    InvalidInjectionRow {
        /// The source file
        path: PathBuf,
        /// One-based line number
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// A conditioning configuration file could not be parsed
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    /// Shift record-relative offsets by `base`
    ///
    /// Codecs work on one record's bytes and report offsets relative to the
    /// record start; readers rebase them to absolute file offsets.
    pub fn rebase(self, base: u64) -> Error {
        match self {
            Error::CorruptHeader { offset, reason } => Error::CorruptHeader {
                offset: offset + base,
                reason,
            },
            Error::TruncatedPayload {
                offset,
                declared,
                available,
            } => Error::TruncatedPayload {
                offset: offset + base,
                declared,
                available,
            },
            Error::Decode { offset, source } => Error::Decode {
                offset: offset + base,
                source,
            },
            e => e,
        }
    }

    /// Whether the error should stop the scan of the current file
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Error::InjectionSourceMissing(_)
                | Error::InjectionSourceEmpty(_)
                | Error::InvalidInjectionRow { .. }
        )
    }
}

impl From<binrw::Error> for Error {
    fn from(source: binrw::Error) -> Self {
        match source {
            binrw::Error::Io(e) => Error::Io(e),
            source => Error::Decode { offset: 0, source },
        }
    }
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
