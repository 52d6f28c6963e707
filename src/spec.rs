//! Wire-level definitions of the flattened device tree format.
//!
//! These structs are never read through a pointer cast. They only describe the layout so that
//! field offsets and record sizes can be handed to the slice readers.
#![allow(non_camel_case_types)]

use core::mem::size_of;

use endian_type::types::{u32_be, u64_be};
use num_derive::FromPrimitive;

pub const FDT_MAGIC: u32 = 0xd00d_feed;
pub const FDT_MAGIC_SIZE: usize = size_of::<u32>();

/// Newest blob version this decoder understands.
pub const MAX_VERSION: u32 = 17;

/// Blobs older than this version 8-byte align property values of 8 or more bytes.
pub const PROP_REALIGN_VERSION: u32 = 16;

#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FdtTok {
    BeginNode = 0x1,
    EndNode = 0x2,
    Prop = 0x3,
    Nop = 0x4,
    End = 0x9,
}

impl FdtTok {
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            FdtTok::BeginNode => "FDT_BEGIN_NODE",
            FdtTok::EndNode => "FDT_END_NODE",
            FdtTok::Prop => "FDT_PROP",
            FdtTok::Nop => "FDT_NOP",
            FdtTok::End => "FDT_END",
        }
    }
}

/// Name of a raw tag value as used in trace output.
#[must_use]
pub fn tag_name(tag: u32) -> &'static str {
    match num_traits::FromPrimitive::from_u32(tag) {
        Some(tok) => FdtTok::name(tok),
        None => "FDT_???",
    }
}

// On-wire layouts, all fields big-endian.
#[repr(C)]
pub struct fdt_header {
    pub magic: u32_be,
    pub totalsize: u32_be,
    pub off_dt_struct: u32_be,
    pub off_dt_strings: u32_be,
    pub off_mem_rsvmap: u32_be,
    pub version: u32_be,
    pub last_comp_version: u32_be,
    pub boot_cpuid_phys: u32_be,
    pub size_dt_strings: u32_be,
    pub size_dt_struct: u32_be,
}

#[repr(C)]
pub struct fdt_prop_header {
    pub len: u32_be,
    pub nameoff: u32_be,
}

#[repr(C)]
pub struct fdt_reserve_entry {
    pub address: u64_be,
    pub size: u64_be,
}

assert_eq_size!(fdt_header, [u8; 40]);
assert_eq_size!(fdt_prop_header, [u8; 8]);
assert_eq_size!(fdt_reserve_entry, [u8; 16]);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tag_names_match_trace_format() {
        assert_eq!(tag_name(1), "FDT_BEGIN_NODE");
        assert_eq!(tag_name(2), "FDT_END_NODE");
        assert_eq!(tag_name(3), "FDT_PROP");
        assert_eq!(tag_name(4), "FDT_NOP");
        assert_eq!(tag_name(9), "FDT_END");
        assert_eq!(tag_name(0), "FDT_???");
        assert_eq!(tag_name(5), "FDT_???");
        assert_eq!(tag_name(0xdead_beef), "FDT_???");
    }

    #[test]
    fn header_field_offsets() {
        assert_eq!(offset_of!(fdt_header, totalsize), 4);
        assert_eq!(offset_of!(fdt_header, version), 20);
        assert_eq!(offset_of!(fdt_header, size_dt_struct), 36);
        assert_eq!(offset_of!(fdt_prop_header, nameoff), 4);
        assert_eq!(offset_of!(fdt_reserve_entry, size), 8);
    }
}
