//! The structure block walker.
//!
//! [`DevTreeWalker`] drives [`next_devtree_token`] over the structure block and turns the raw
//! tokens into [`WalkEvent`]s annotated with their nesting depth. It owns a single cursor and
//! never looks back; decoding a blob is one left-to-right pass.

use core::iter::FusedIterator;
use core::str::from_utf8;

use log::{trace, warn};

use crate::base::parse::{next_devtree_token, ParsedTok};
use crate::base::DevTree;
use crate::error::DecodeError;
use crate::spec::FdtTok;

/// A property as seen by the walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkProp<'a> {
    /// Offset of the `FDT_PROP` token.
    pub offset: usize,
    pub name: &'a str,
    /// Offset of the name within the blob (strings block offset included).
    pub name_offset: usize,
    /// Offset of the value within the blob.
    pub value_offset: usize,
    pub value: &'a [u8],
    pub depth: usize,
}

/// One step of the walk. Every event carries the offset of the token that produced it.
///
/// `depth` is the nesting level the event is rendered at: a node's opening and closing both
/// report the depth of the node itself (0 for the root), its properties report one more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEvent<'a> {
    BeginNode {
        offset: usize,
        /// The unit name, `"/"` for the unnamed root.
        name: &'a str,
        depth: usize,
    },
    EndNode {
        offset: usize,
        depth: usize,
    },
    Prop(WalkProp<'a>),
    Nop {
        offset: usize,
        depth: usize,
    },
}

impl<'a> WalkEvent<'a> {
    #[must_use]
    pub fn offset(&self) -> usize {
        match *self {
            WalkEvent::BeginNode { offset, .. }
            | WalkEvent::EndNode { offset, .. }
            | WalkEvent::Nop { offset, .. } => offset,
            WalkEvent::Prop(ref p) => p.offset,
        }
    }

    #[must_use]
    pub fn tag(&self) -> FdtTok {
        match self {
            WalkEvent::BeginNode { .. } => FdtTok::BeginNode,
            WalkEvent::EndNode { .. } => FdtTok::EndNode,
            WalkEvent::Prop(_) => FdtTok::Prop,
            WalkEvent::Nop { .. } => FdtTok::Nop,
        }
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        match *self {
            WalkEvent::BeginNode { depth, .. }
            | WalkEvent::EndNode { depth, .. }
            | WalkEvent::Nop { depth, .. } => depth,
            WalkEvent::Prop(ref p) => p.depth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkState {
    ReadingTag,
    Done,
    Error,
}

/// An iterator over the [`WalkEvent`]s of a [`DevTree`]'s structure block.
///
/// The walk ends normally only at the end token; running out of blob before it is an error.
/// After the first error the walker yields nothing more.
#[derive(Clone, Debug)]
pub struct DevTreeWalker<'a> {
    fdt: DevTree<'a>,
    offset: usize,
    depth: usize,
    strict: bool,
    state: WalkState,
}

impl<'a> DevTreeWalker<'a> {
    pub(crate) fn new(fdt: DevTree<'a>, strict: bool) -> Self {
        Self {
            offset: fdt.off_dt_struct(),
            fdt,
            depth: 0,
            strict,
            state: WalkState::ReadingTag,
        }
    }

    /// Current nesting depth: the number of nodes opened and not yet closed.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Offset of the next token to be read.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn step(&mut self) -> Result<Option<WalkEvent<'a>>, DecodeError> {
        let offset = self.offset;
        let tok = next_devtree_token(self.fdt.buf(), &mut self.offset, self.fdt.version())?;

        let event = match tok {
            None => {
                if self.depth != 0 {
                    if self.strict {
                        return Err(DecodeError::UnclosedNodes {
                            offset,
                            depth: self.depth,
                        });
                    }
                    warn!(
                        "{:#06x}: end of structure with {} node(s) open",
                        offset, self.depth
                    );
                }
                return Ok(None);
            }
            Some(ParsedTok::BeginNode(node)) => {
                let name = from_utf8(node.name).map_err(|_| DecodeError::InvalidString {
                    offset: node.name_offset,
                })?;
                let depth = self.depth;
                self.depth += 1;
                WalkEvent::BeginNode {
                    offset,
                    name: if name.is_empty() { "/" } else { name },
                    depth,
                }
            }
            Some(ParsedTok::EndNode) => {
                self.depth = self
                    .depth
                    .checked_sub(1)
                    .ok_or(DecodeError::UnbalancedNesting { offset })?;
                WalkEvent::EndNode {
                    offset,
                    depth: self.depth,
                }
            }
            Some(ParsedTok::Nop) => WalkEvent::Nop {
                offset,
                depth: self.depth,
            },
            Some(ParsedTok::Prop(prop)) => WalkEvent::Prop(WalkProp {
                offset,
                name: self.fdt.string_at(prop.name_offset)?,
                name_offset: self.fdt.off_dt_strings() + prop.name_offset,
                value_offset: prop.value_offset,
                value: prop.prop_buf,
                depth: self.depth,
            }),
        };
        trace!("{:#06x}: {:?} depth {}", offset, event.tag(), event.depth());
        Ok(Some(event))
    }
}

impl<'a> Iterator for DevTreeWalker<'a> {
    type Item = Result<WalkEvent<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state != WalkState::ReadingTag {
            return None;
        }
        match self.step() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.state = WalkState::Done;
                None
            }
            Err(e) => {
                self.state = WalkState::Error;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for DevTreeWalker<'_> {}
