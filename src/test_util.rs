//! A tiny blob writer for unit tests.
use std::vec::Vec;

use crate::priv_util::align_up;
use crate::spec::{FdtTok, FDT_MAGIC, PROP_REALIGN_VERSION};

/// Lays out a blob as header, reservation map, structure block, strings block, followed by 4
/// bytes of slack so that `totalsize` is strictly smaller than the returned buffer.
pub struct FdtBuilder {
    version: u32,
    reserved: Vec<(u64, u64)>,
    structure: Vec<u8>,
    strings: Vec<u8>,
}

impl FdtBuilder {
    pub fn new() -> Self {
        Self {
            version: 17,
            reserved: Vec::new(),
            structure: Vec::new(),
            strings: Vec::new(),
        }
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Must be called before any token is added.
    pub fn reserve(mut self, address: u64, size: u64) -> Self {
        assert!(self.structure.is_empty());
        self.reserved.push((address, size));
        self
    }

    fn struct_base(&self) -> usize {
        40 + 16 * (self.reserved.len() + 1)
    }

    fn word(&mut self, w: u32) {
        self.structure.extend_from_slice(&w.to_be_bytes());
    }

    fn pad_to(&mut self, align: usize) {
        let abs = self.struct_base() + self.structure.len();
        self.structure.resize(self.structure.len() + align_up(abs, align) - abs, 0);
    }

    pub fn raw_tag(mut self, tag: u32) -> Self {
        self.word(tag);
        self
    }

    pub fn begin_node(mut self, name: &str) -> Self {
        self.word(FdtTok::BeginNode as u32);
        self.structure.extend_from_slice(name.as_bytes());
        self.structure.push(0);
        self.pad_to(4);
        self
    }

    pub fn end_node(self) -> Self {
        self.raw_tag(FdtTok::EndNode as u32)
    }

    pub fn nop(self) -> Self {
        self.raw_tag(FdtTok::Nop as u32)
    }

    pub fn prop(mut self, name: &str, value: &[u8]) -> Self {
        let nameoff = self.strings.len() as u32;
        self.strings.extend_from_slice(name.as_bytes());
        self.strings.push(0);

        self.word(FdtTok::Prop as u32);
        self.word(value.len() as u32);
        self.word(nameoff);
        if self.version < PROP_REALIGN_VERSION && value.len() >= 8 {
            self.pad_to(8);
        }
        self.structure.extend_from_slice(value);
        self.pad_to(4);
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.word(FdtTok::End as u32);

        let off_rsvmap = 40;
        let off_struct = self.struct_base();
        let off_strings = off_struct + self.structure.len();
        let total = off_strings + self.strings.len();

        let header = [
            FDT_MAGIC,
            total as u32,
            off_struct as u32,
            off_strings as u32,
            off_rsvmap as u32,
            self.version,
            16u32.min(self.version),
            0,
            self.strings.len() as u32,
            self.structure.len() as u32,
        ];
        let mut blob = Vec::with_capacity(total + 4);
        for field in header.iter() {
            blob.extend_from_slice(&field.to_be_bytes());
        }
        for &(address, size) in self.reserved.iter().chain(core::iter::once(&(0, 0))) {
            blob.extend_from_slice(&address.to_be_bytes());
            blob.extend_from_slice(&size.to_be_bytes());
        }
        blob.extend_from_slice(&self.structure);
        blob.extend_from_slice(&self.strings);
        blob.extend_from_slice(&[0; 4]);
        blob
    }
}
