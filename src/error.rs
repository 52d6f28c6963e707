use crate::priv_util::SliceReadError;
use thiserror_no_std::Error;

/// The reason a candidate header was rejected.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum HeaderFault {
    /// Fewer bytes remain than the fixed header occupies.
    #[error("buffer of {len} bytes is too short to hold a header")]
    TooShort { len: usize },

    /// The magic number FDT_MAGIC was not found at the start of the header.
    #[error("bad magic {0:#010x}")]
    BadMagic(u32),

    /// The device tree version is newer than this library supports.
    #[error("version {0} is not supported")]
    VersionTooNew(u32),

    #[error("last compatible version {0} is not supported")]
    LastCompVersionTooNew(u32),

    /// `totalsize` does not fit strictly inside the buffer.
    #[error("totalsize {0:#x} exceeds the buffer")]
    TotalSizeOutOfRange(u32),

    #[error("structure block offset {0:#x} exceeds the buffer")]
    StructOffsetOutOfRange(u32),

    #[error("strings block offset {0:#x} exceeds the buffer")]
    StringsOffsetOutOfRange(u32),
}

/// An error describing why a blob could not be decoded.
///
/// Offsets are relative to the start of the blob (its header), except for
/// [`DecodeError::InvalidHeader`] raised while scanning, where no blob origin exists yet.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The header failed validation.
    #[error("invalid header at offset {offset:#x}: {fault}")]
    InvalidHeader { offset: usize, fault: HeaderFault },

    /// A read ran past the end of the blob.
    #[error("blob ends before the read at offset {offset:#x}")]
    BufferTooShort { offset: usize },

    /// Scan mode exhausted the buffer without finding a valid header.
    #[error("could not locate fdt magic")]
    NotFound,

    /// The structure block holds a token this library does not know.
    #[error("unknown tag {tag:#010x} at offset {offset:#x}")]
    UnknownTag { offset: usize, tag: u32 },

    /// A property name offset points outside of the blob.
    #[error("property name offset {name_offset:#x} resolves to {offset:#x}, outside of the blob")]
    StringOffsetOutOfRange { offset: usize, name_offset: usize },

    /// An end-node token was found with no node open.
    #[error("end of node at offset {offset:#x} without a matching begin")]
    UnbalancedNesting { offset: usize },

    /// The end token was reached with nodes still open.
    #[error("end of structure at offset {offset:#x} with {depth} node(s) still open")]
    UnclosedNodes { offset: usize, depth: usize },

    /// The memory reservation map ran off the blob before its (0, 0) terminator.
    #[error("memory reservation map is not terminated (entry at offset {offset:#x})")]
    UnterminatedReserveMap { offset: usize },

    /// A node or property name was not valid UTF-8.
    #[error("name at offset {offset:#x} is not valid UTF-8")]
    InvalidString { offset: usize },

    /// The output sink refused a write.
    #[error("failed to write output")]
    Output,
}

impl From<SliceReadError> for DecodeError {
    fn from(e: SliceReadError) -> DecodeError {
        DecodeError::BufferTooShort { offset: e.0 }
    }
}

impl From<core::fmt::Error> for DecodeError {
    fn from(_: core::fmt::Error) -> DecodeError {
        DecodeError::Output
    }
}
