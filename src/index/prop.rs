use crate::base::WalkProp;
use crate::error::DecodeError;
use crate::fdt_util::value::PropValue;
use crate::prelude::*;

use super::node::DevTreeIndexNode;
use super::tree::{DevTreeIndex, NodeId};

/// A handle to a [`DevTreeIndexNode`]'s property.
#[derive(Clone, Copy, Debug)]
pub struct DevTreeIndexProp<'i, 'dt> {
    index: &'i DevTreeIndex<'dt>,
    node: NodeId,
    prop: &'i WalkProp<'dt>,
}

impl<'i, 'dt> DevTreeIndexProp<'i, 'dt> {
    pub(super) fn new(index: &'i DevTreeIndex<'dt>, node: NodeId, prop: &'i WalkProp<'dt>) -> Self {
        Self { index, node, prop }
    }

    /// Returns the node which this property is attached to
    #[must_use]
    pub fn node(&self) -> DevTreeIndexNode<'i, 'dt> {
        DevTreeIndexNode::new(self.index, self.node)
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &'dt str {
        self.prop.name
    }

    #[inline]
    #[must_use]
    pub fn raw(&self) -> &'dt [u8] {
        self.prop.value
    }

    /// Returns the length of the property value within the device tree
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.prop.value.len()
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> PropValue<'dt> {
        PropValue::classify(self.prop.value)
    }

    /// Read a big-endian [`u32`] from the provided offset in this property's value.
    ///
    /// Offsets are relative to the value; out of range reads fail with
    /// [`DecodeError::BufferTooShort`] carrying the blob offset of the attempted read.
    pub fn get_u32(&self, offset: usize) -> Result<u32, DecodeError> {
        self.prop
            .value
            .read_be_u32(offset)
            .map_err(|_| DecodeError::BufferTooShort {
                offset: self.prop.value_offset + offset,
            })
    }

    /// Read a big-endian [`u64`] from the provided offset in this property's value.
    pub fn get_u64(&self, offset: usize) -> Result<u64, DecodeError> {
        self.prop
            .value
            .read_be_u64(offset)
            .map_err(|_| DecodeError::BufferTooShort {
                offset: self.prop.value_offset + offset,
            })
    }
}
