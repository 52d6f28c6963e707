use alloc::vec::Vec;
use core::fmt::Write;

use log::warn;

use crate::base::{DevTree, WalkEvent, WalkProp};
use crate::dump::write_event;
use crate::error::DecodeError;

use super::DevTreeIndexNode;

/// Position of a node within a [`DevTreeIndex`].
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct DTINode<'dt> {
    pub(super) offset: usize,
    pub(super) name: &'dt str,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
    pub(super) props: Vec<WalkProp<'dt>>,
}

/// An in-memory index of a device tree's nodes and properties.
///
/// Nodes live in a single arena and refer to each other by [`NodeId`]. Names and values borrow
/// from the blob; nothing is copied out of it. `FDT_NOP` tokens are not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevTreeIndex<'dt> {
    nodes: Vec<DTINode<'dt>>,
    roots: Vec<NodeId>,
}

impl<'dt> DevTreeIndex<'dt> {
    /// Walk `fdt` once and build the index.
    pub fn new(fdt: &DevTree<'dt>, strict: bool) -> Result<Self, DecodeError> {
        let mut index = Self {
            nodes: Vec::new(),
            roots: Vec::new(),
        };
        let mut open: Vec<NodeId> = Vec::new();

        for event in fdt.walk(strict) {
            match event? {
                WalkEvent::BeginNode { offset, name, .. } => {
                    let id = index.nodes.len();
                    let parent = open.last().copied();
                    index.nodes.push(DTINode {
                        offset,
                        name,
                        parent,
                        children: Vec::new(),
                        props: Vec::new(),
                    });
                    match parent {
                        Some(p) => index.nodes[p].children.push(id),
                        None => index.roots.push(id),
                    }
                    open.push(id);
                }
                WalkEvent::EndNode { .. } => {
                    open.pop();
                }
                WalkEvent::Prop(p) => match open.last() {
                    Some(&id) => index.nodes[id].props.push(p),
                    None => warn!("{:#06x}: property {} outside of any node", p.offset, p.name),
                },
                WalkEvent::Nop { .. } => {}
            }
        }
        Ok(index)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The first top-level node, normally `/`.
    #[must_use]
    pub fn root(&self) -> Option<DevTreeIndexNode<'_, 'dt>> {
        self.roots.first().map(|&id| DevTreeIndexNode::new(self, id))
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<DevTreeIndexNode<'_, 'dt>> {
        if id < self.nodes.len() {
            Some(DevTreeIndexNode::new(self, id))
        } else {
            None
        }
    }

    /// All nodes in depth-first (blob) order.
    pub fn nodes(&self) -> impl Iterator<Item = DevTreeIndexNode<'_, 'dt>> {
        (0..self.nodes.len()).map(move |id| DevTreeIndexNode::new(self, id))
    }

    /// Find a node by its absolute path, such as `/soc/wifi@0`.
    ///
    /// Path components are compared against full unit names.
    #[must_use]
    pub fn find_path(&self, path: &str) -> Option<DevTreeIndexNode<'_, 'dt>> {
        let mut cur = self.root()?;
        for component in path.split('/').filter(|c| !c.is_empty()) {
            cur = cur.children().find(|child| child.name() == component)?;
        }
        Some(cur)
    }

    /// Returns the first node carrying a `compatible` entry equal to `string`.
    #[must_use]
    pub fn find_first_compatible_node(&self, string: &str) -> Option<DevTreeIndexNode<'_, 'dt>> {
        self.nodes().find(|node| {
            node.prop("compatible")
                .map_or(false, |p| p.value().strings().any(|s| s == string.as_bytes()))
        })
    }

    /// Write the indexed nodes and properties in the same layout as the streaming printer.
    pub fn render<W: Write>(&self, indent: usize, out: &mut W) -> Result<(), DecodeError> {
        // (node, depth, next child to visit)
        let mut stack: Vec<(NodeId, usize, usize)> = Vec::new();
        for &root in &self.roots {
            self.render_open(root, 0, indent, out)?;
            stack.push((root, 0, 0));

            while let Some(top) = stack.last_mut() {
                let (id, depth, next) = *top;
                match self.nodes[id].children.get(next) {
                    Some(&child) => {
                        top.2 += 1;
                        self.render_open(child, depth + 1, indent, out)?;
                        stack.push((child, depth + 1, 0));
                    }
                    None => {
                        stack.pop();
                        let end = WalkEvent::EndNode {
                            offset: self.nodes[id].offset,
                            depth,
                        };
                        write_event(&end, indent, false, out)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Node line followed by its properties.
    fn render_open<W: Write>(
        &self,
        id: NodeId,
        depth: usize,
        indent: usize,
        out: &mut W,
    ) -> Result<(), DecodeError> {
        let node = &self.nodes[id];
        let begin = WalkEvent::BeginNode {
            offset: node.offset,
            name: node.name,
            depth,
        };
        write_event(&begin, indent, false, out)?;
        for prop in &node.props {
            let prop = WalkProp {
                depth: depth + 1,
                ..*prop
            };
            write_event(&WalkEvent::Prop(prop), indent, false, out)?;
        }
        Ok(())
    }

    pub(super) fn raw_node(&self, id: NodeId) -> &DTINode<'dt> {
        &self.nodes[id]
    }
}
