//! Iteration over the memory reservation block of a [`DevTree`].
use core::iter::FusedIterator;
use core::mem::size_of;

use crate::base::DevTree;
use crate::error::DecodeError;
use crate::prelude::*;
use crate::spec::fdt_reserve_entry;

/// One region of the memory reservation block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReserveEntry {
    pub address: u64,
    pub size: u64,
}

/// An iterator over [`ReserveEntry`] objects within the FDT.
///
/// A fresh iterator from [`DevTree::reserved_entries`] always starts again at the first entry.
/// Reading stops silently at the `(0, 0)` terminator. If the blob
/// ends first a single [`DecodeError::UnterminatedReserveMap`] is yielded and the iterator is
/// fused.
#[derive(Clone, Debug)]
pub struct DevTreeReserveEntryIter<'a> {
    offset: usize,
    buf: &'a [u8],
    done: bool,
}

impl<'a> DevTreeReserveEntryIter<'a> {
    pub(crate) fn new(fdt: &DevTree<'a>) -> Self {
        Self {
            offset: fdt.off_mem_rsvmap(),
            buf: fdt.buf(),
            done: false,
        }
    }

    fn read(&self) -> Result<ReserveEntry, DecodeError> {
        let unterminated = |_| DecodeError::UnterminatedReserveMap {
            offset: self.offset,
        };
        let base = self.offset;
        Ok(ReserveEntry {
            address: self
                .buf
                .read_be_u64(base + offset_of!(fdt_reserve_entry, address))
                .map_err(unterminated)?,
            size: self
                .buf
                .read_be_u64(base + offset_of!(fdt_reserve_entry, size))
                .map_err(unterminated)?,
        })
    }
}

impl<'a> Iterator for DevTreeReserveEntryIter<'a> {
    type Item = Result<ReserveEntry, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read() {
            Ok(ReserveEntry {
                address: 0,
                size: 0,
            }) => {
                self.done = true;
                None
            }
            Ok(entry) => {
                self.offset += size_of::<fdt_reserve_entry>();
                Some(Ok(entry))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for DevTreeReserveEntryIter<'_> {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_util::FdtBuilder;
    use std::vec::Vec;

    #[test]
    fn empty_map_yields_nothing() {
        let blob = FdtBuilder::new().begin_node("").end_node().finish();
        let fdt = DevTree::new(&blob).unwrap();
        assert_eq!(fdt.reserved_entries().count(), 0);
    }

    #[test]
    fn entries_in_order_and_restartable() {
        let blob = FdtBuilder::new()
            .reserve(0x4200_0000, 0x1000)
            .reserve(0, 0x10)
            .begin_node("")
            .end_node()
            .finish();
        let fdt = DevTree::new(&blob).unwrap();
        let iter = fdt.reserved_entries();
        let first: Vec<_> = iter.clone().collect();
        let second: Vec<_> = iter.collect();
        assert_eq!(first, second);
        assert_eq!(
            first,
            [
                Ok(ReserveEntry {
                    address: 0x4200_0000,
                    size: 0x1000
                }),
                Ok(ReserveEntry {
                    address: 0,
                    size: 0x10
                }),
            ]
        );
    }

    #[test]
    fn missing_terminator_is_reported_once() {
        let mut blob = FdtBuilder::new().begin_node("").end_node().finish();
        // Point the map at the last 8 bytes of the blob: no room for a full entry.
        let total = u32::from_be_bytes([blob[4], blob[5], blob[6], blob[7]]);
        let off = total - 8;
        blob[16..20].copy_from_slice(&off.to_be_bytes());
        let fdt = DevTree::new(&blob).unwrap();

        let mut iter = fdt.reserved_entries();
        assert_eq!(
            iter.next(),
            Some(Err(DecodeError::UnterminatedReserveMap {
                offset: off as usize
            }))
        );
        assert_eq!(iter.next(), None);
    }
}
