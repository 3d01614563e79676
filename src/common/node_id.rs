//! Node handle type.

use std::fmt;

/// Identifies a node in a tree's node arena.
///
/// Using `usize` because nodes are stored in a `Vec` and the id is the slot
/// index. Parent links and child lists hold `NodeId`s instead of references,
/// so the child-to-parent edge never owns anything.
///
/// A `NodeId` is only meaningful for the tree that produced it. Slots are
/// reused after a merge releases a node.
///
/// # Example
/// ```
/// use pagetree::NodeId;
///
/// let node_id = NodeId::new(5);
/// assert_eq!(node_id.0, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Create a new NodeId.
    #[inline]
    pub fn new(id: usize) -> Self {
        NodeId(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_equality() {
        assert_eq!(NodeId::new(5), NodeId::new(5));
        assert_ne!(NodeId::new(5), NodeId::new(6));
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(format!("{}", NodeId::new(42)), "Node(42)");
    }
}
