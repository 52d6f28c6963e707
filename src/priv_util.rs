//! Bounds-checked big-endian readers over a byte slice.
use core::convert::TryInto;
use core::mem::size_of;

/// A read would have run past the end of the slice. Holds the offset the read started at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceReadError(pub usize);

pub trait SliceRead {
    fn read_be_u32(&self, pos: usize) -> Result<u32, SliceReadError>;
    fn read_be_u64(&self, pos: usize) -> Result<u64, SliceReadError>;
    /// Returns the bytes from `pos` up to (not including) the next NUL.
    fn read_bstring0(&self, pos: usize) -> Result<&[u8], SliceReadError>;
}

impl SliceRead for [u8] {
    #[inline]
    fn read_be_u32(&self, pos: usize) -> Result<u32, SliceReadError> {
        pos.checked_add(size_of::<u32>())
            .and_then(|end| self.get(pos..end))
            .and_then(|b| b.try_into().ok())
            .map(u32::from_be_bytes)
            .ok_or(SliceReadError(pos))
    }

    #[inline]
    fn read_be_u64(&self, pos: usize) -> Result<u64, SliceReadError> {
        pos.checked_add(size_of::<u64>())
            .and_then(|end| self.get(pos..end))
            .and_then(|b| b.try_into().ok())
            .map(u64::from_be_bytes)
            .ok_or(SliceReadError(pos))
    }

    fn read_bstring0(&self, pos: usize) -> Result<&[u8], SliceReadError> {
        let tail = self.get(pos..).ok_or(SliceReadError(pos))?;
        match tail.iter().position(|&b| b == 0) {
            Some(len) => Ok(&tail[..len]),
            None => Err(SliceReadError(pos)),
        }
    }
}

/// Round `n` up to the next multiple of `align` (a power of two).
#[inline]
pub const fn align_up(n: usize, align: usize) -> usize {
    (n + align - 1) & !(align - 1)
}
