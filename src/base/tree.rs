use core::str::from_utf8;

use crate::error::{DecodeError, HeaderFault};
use crate::prelude::*;
use crate::spec::FDT_MAGIC;

use super::header::{validate_header, FdtHeader, MIN_HEADER_SIZE};
use super::iters::DevTreeReserveEntryIter;
use super::walk::DevTreeWalker;

/// A validated Flattened Device Tree.
///
/// The view is narrowed to the header's `totalsize`; every read made through it is bounded by
/// that size rather than by the buffer it was created from.
#[derive(Copy, Clone, Debug)]
pub struct DevTree<'a> {
    buf: &'a [u8],
    header: FdtHeader,
}

impl<'a> DevTree<'a> {
    pub const MIN_HEADER_SIZE: usize = MIN_HEADER_SIZE;

    /// Convenience for sizing a blob before it is copied or mapped: checks the magic and
    /// returns the header's `totalsize` without any of the other [`validate_header`] checks.
    ///
    /// ```
    /// # use fdt_dump::DevTree;
    /// # let buf = fdt_dump::doctest::FDT;
    /// let size = DevTree::read_totalsize(buf)?;
    /// # assert_eq!(size, 0x12ab);
    /// let dt = DevTree::new(&buf[..size + 4])?;
    /// # assert_eq!(dt.version(), 17);
    /// # Ok::<(), fdt_dump::DecodeError>(())
    /// ```
    pub fn read_totalsize(buf: &[u8]) -> Result<usize, DecodeError> {
        let header = FdtHeader::read(buf)?;
        if header.magic != FDT_MAGIC {
            return Err(DecodeError::InvalidHeader {
                offset: 0,
                fault: HeaderFault::BadMagic(header.magic),
            });
        }
        Ok(header.total_size as usize)
    }

    /// Validate the header at the start of `buf` and construct the parseable DevTree.
    ///
    /// `buf` may extend past the blob; it must however be strictly longer than the blob's
    /// `totalsize`.
    pub fn new(buf: &'a [u8]) -> Result<Self, DecodeError> {
        validate_header(buf).map_err(|fault| DecodeError::InvalidHeader { offset: 0, fault })?;
        let header = FdtHeader::read(buf)?;
        let size = header.total_size as usize;
        let buf = buf
            .get(..size)
            .ok_or(DecodeError::BufferTooShort { offset: size })?;
        Ok(Self { buf, header })
    }

    #[inline]
    #[must_use]
    pub fn header(&self) -> &FdtHeader {
        &self.header
    }

    /// Returns the totalsize field of the Device Tree
    #[inline]
    #[must_use]
    pub fn totalsize(&self) -> usize {
        self.header.total_size as usize
    }

    /// Offset of the memory reservation block
    #[inline]
    #[must_use]
    pub fn off_mem_rsvmap(&self) -> usize {
        self.header.off_mem_rsvmap as usize
    }

    /// Offset of the structure block
    #[inline]
    #[must_use]
    pub fn off_dt_struct(&self) -> usize {
        self.header.off_dt_struct as usize
    }

    /// Offset of the strings block
    #[inline]
    #[must_use]
    pub fn off_dt_strings(&self) -> usize {
        self.header.off_dt_strings as usize
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u32 {
        self.header.version
    }

    /// Resolve a property name offset through the strings block.
    ///
    /// Only the single NUL-terminated name is read; the strings block is never copied.
    pub fn string_at(&self, name_offset: usize) -> Result<&'a str, DecodeError> {
        let offset = self.off_dt_strings().saturating_add(name_offset);
        if offset >= self.buf.len() {
            return Err(DecodeError::StringOffsetOutOfRange {
                offset,
                name_offset,
            });
        }
        let name = self.buf.read_bstring0(offset)?;
        from_utf8(name).map_err(|_| DecodeError::InvalidString { offset })
    }

    /// Returns an iterator over the memory reservation block entries.
    #[inline]
    #[must_use]
    pub fn reserved_entries(&self) -> DevTreeReserveEntryIter<'a> {
        DevTreeReserveEntryIter::new(self)
    }

    /// Returns a walker over the structure block.
    ///
    /// With `strict` set, reaching the end token while nodes are still open is an error.
    #[inline]
    #[must_use]
    pub fn walk(&self, strict: bool) -> DevTreeWalker<'a> {
        DevTreeWalker::new(*self, strict)
    }

    #[inline]
    pub fn buf(&self) -> &'a [u8] {
        self.buf
    }
}
