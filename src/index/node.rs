use super::prop::DevTreeIndexProp;
use super::tree::{DevTreeIndex, NodeId};

/// A handle to a node within a [`DevTreeIndex`].
#[derive(Clone, Copy, Debug)]
pub struct DevTreeIndexNode<'i, 'dt> {
    index: &'i DevTreeIndex<'dt>,
    id: NodeId,
}

impl<'i, 'dt> DevTreeIndexNode<'i, 'dt> {
    pub(super) fn new(index: &'i DevTreeIndex<'dt>, id: NodeId) -> Self {
        Self { index, id }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the name of the node (including unit address), `"/"` for the root.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'dt str {
        self.index.raw_node(self.id).name
    }

    /// Offset of the node's `FDT_BEGIN_NODE` token within the blob.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> usize {
        self.index.raw_node(self.id).offset
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let index = self.index;
        index
            .raw_node(self.id)
            .parent
            .map(|id| DevTreeIndexNode::new(index, id))
    }

    pub fn children(&self) -> impl Iterator<Item = DevTreeIndexNode<'i, 'dt>> + 'i {
        let index = self.index;
        index
            .raw_node(self.id)
            .children
            .iter()
            .map(move |&id| DevTreeIndexNode::new(index, id))
    }

    /// Returns an iterator over this node's properties, in blob order.
    pub fn props(&self) -> impl Iterator<Item = DevTreeIndexProp<'i, 'dt>> + 'i {
        let index = self.index;
        let node = self.id;
        index
            .raw_node(node)
            .props
            .iter()
            .map(move |prop| DevTreeIndexProp::new(index, node, prop))
    }

    /// Returns the first property called `name`.
    #[must_use]
    pub fn prop(&self, name: &str) -> Option<DevTreeIndexProp<'i, 'dt>> {
        self.props().find(|p| p.name() == name)
    }
}
