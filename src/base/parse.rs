//! Low level flattened device tree parsing.
//!
//! [`next_devtree_token`] decodes exactly one token of the structure block. Higher level walkers
//! are built by calling it in a loop with the offset it hands back.

use core::mem::size_of;

use num_traits::FromPrimitive;

use crate::error::DecodeError;
use crate::prelude::*;
use crate::priv_util::align_up;
use crate::spec::{fdt_prop_header, FdtTok, PROP_REALIGN_VERSION};

/// Decode the token at `*off` and advance `*off` past it (and its padding).
///
/// Returns `Ok(None)` once the end token is reached. `version` selects the legacy property
/// alignment used by blobs older than version 16.
pub fn next_devtree_token<'a>(
    buf: &'a [u8],
    off: &mut usize,
    version: u32,
) -> Result<Option<ParsedTok<'a>>, DecodeError> {
    let tok_off = *off;
    let fdt_tok_val = buf.read_be_u32(tok_off)?;
    *off += size_of::<u32>();

    match FromPrimitive::from_u32(fdt_tok_val) {
        Some(FdtTok::BeginNode) => {
            let name = buf.read_bstring0(*off)?;
            let name_offset = *off;

            // Move to the end of name (adding null byte) and align back to u32.
            *off = align_up(*off + name.len() + 1, size_of::<u32>());

            Ok(Some(ParsedTok::BeginNode(ParsedBeginNode { name, name_offset })))
        }
        Some(FdtTok::Prop) => {
            let prop_len = buf.read_be_u32(*off + offset_of!(fdt_prop_header, len))? as usize;
            let name_offset = buf.read_be_u32(*off + offset_of!(fdt_prop_header, nameoff))? as usize;
            *off += size_of::<fdt_prop_header>();

            if version < PROP_REALIGN_VERSION && prop_len >= 8 {
                *off = align_up(*off, 8);
            }

            let value_offset = *off;
            let prop_buf = value_offset
                .checked_add(prop_len)
                .and_then(|end| buf.get(value_offset..end))
                .ok_or(DecodeError::BufferTooShort {
                    offset: value_offset,
                })?;

            *off = align_up(value_offset + prop_len, size_of::<u32>());

            Ok(Some(ParsedTok::Prop(ParsedProp {
                name_offset,
                value_offset,
                prop_buf,
            })))
        }
        Some(FdtTok::EndNode) => Ok(Some(ParsedTok::EndNode)),
        Some(FdtTok::Nop) => Ok(Some(ParsedTok::Nop)),
        Some(FdtTok::End) => Ok(None),
        None => Err(DecodeError::UnknownTag {
            offset: tok_off,
            tag: fdt_tok_val,
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedBeginNode<'a> {
    pub name: &'a [u8],
    /// Offset of the name within the blob.
    pub name_offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedProp<'a> {
    pub prop_buf: &'a [u8],
    /// Offset of the name relative to the strings block.
    pub name_offset: usize,
    /// Offset of the value within the blob.
    pub value_offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedTok<'a> {
    BeginNode(ParsedBeginNode<'a>),
    EndNode,
    Prop(ParsedProp<'a>),
    Nop,
}

#[cfg(test)]
mod test {
    use super::*;

    fn words(w: &[u32]) -> std::vec::Vec<u8> {
        w.iter().flat_map(|w| w.to_be_bytes().to_vec()).collect()
    }

    #[test]
    fn begin_node_name_is_padded() {
        let mut buf = words(&[1]);
        buf.extend_from_slice(b"cpus\0\0\0\0");
        buf.extend(words(&[2]));
        let mut off = 0;
        let tok = next_devtree_token(&buf, &mut off, 17).unwrap();
        assert_eq!(
            tok,
            Some(ParsedTok::BeginNode(ParsedBeginNode {
                name: b"cpus",
                name_offset: 4
            }))
        );
        assert_eq!(off, 12);
        assert_eq!(
            next_devtree_token(&buf, &mut off, 17).unwrap(),
            Some(ParsedTok::EndNode)
        );
    }

    #[test]
    fn prop_value_is_padded() {
        let mut buf = words(&[3, 3, 0x10]);
        buf.extend_from_slice(&[1, 2, 3, 0]);
        buf.extend(words(&[9]));
        let mut off = 0;
        match next_devtree_token(&buf, &mut off, 17).unwrap() {
            Some(ParsedTok::Prop(p)) => {
                assert_eq!(p.prop_buf, &[1, 2, 3]);
                assert_eq!(p.name_offset, 0x10);
                assert_eq!(p.value_offset, 12);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(off, 16);
        assert_eq!(next_devtree_token(&buf, &mut off, 17).unwrap(), None);
    }

    #[test]
    fn legacy_versions_realign_long_values() {
        // Value would start at 12; version 15 pushes it to 16.
        let mut buf = words(&[3, 8, 0, 0]);
        buf.extend(words(&[0xaabb_ccdd, 0x1122_3344, 9]));
        let mut off = 0;
        match next_devtree_token(&buf, &mut off, 15).unwrap() {
            Some(ParsedTok::Prop(p)) => {
                assert_eq!(p.value_offset, 16);
                assert_eq!(p.prop_buf, &[0xaa, 0xbb, 0xcc, 0xdd, 0x11, 0x22, 0x33, 0x44]);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(off, 24);

        // Version 16 and later read the value in place.
        let mut off = 0;
        match next_devtree_token(&buf, &mut off, 16).unwrap() {
            Some(ParsedTok::Prop(p)) => assert_eq!(p.value_offset, 12),
            other => panic!("unexpected {:?}", other),
        }

        // Short values are never realigned.
        let buf = words(&[3, 4, 0, 0xdead_beef, 9]);
        let mut off = 0;
        match next_devtree_token(&buf, &mut off, 15).unwrap() {
            Some(ParsedTok::Prop(p)) => assert_eq!(p.value_offset, 12),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unknown_tag_reports_offset() {
        let buf = words(&[4, 7]);
        let mut off = 0;
        assert_eq!(
            next_devtree_token(&buf, &mut off, 17).unwrap(),
            Some(ParsedTok::Nop)
        );
        assert_eq!(
            next_devtree_token(&buf, &mut off, 17),
            Err(DecodeError::UnknownTag { offset: 4, tag: 7 })
        );
    }

    #[test]
    fn truncated_value_is_an_error() {
        let buf = words(&[3, 0x100, 0]);
        let mut off = 0;
        assert_eq!(
            next_devtree_token(&buf, &mut off, 17),
            Err(DecodeError::BufferTooShort { offset: 12 })
        );
    }
}
