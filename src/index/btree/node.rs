//! B-tree node - sorted keys, owned children, and a parent back-reference.

use crate::common::{Error, NodeId, Result};

/// A single B-tree node.
///
/// # Invariants
/// - `keys` is strictly ascending and holds at most `max_keys` keys between
///   operations (`max_keys + 1` only while a split is pending).
/// - A leaf has no children; an internal node has `keys.len() + 1`.
/// - `parent` names the node whose `children` contains this node, or `None`
///   for the root and for detached nodes.
///
/// Operations that touch siblings or the parent live on the node arena,
/// since a node cannot reach other nodes by itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(super) keys: Vec<i32>,
    pub(super) children: Vec<NodeId>,
    pub(super) parent: Option<NodeId>,
    max_keys: usize,
}

impl Node {
    /// Create an empty, detached leaf.
    pub fn new(max_keys: usize) -> Self {
        Self {
            keys: Vec::new(),
            children: Vec::new(),
            parent: None,
            max_keys,
        }
    }

    /// Create a detached leaf holding `keys`.
    ///
    /// # Errors
    /// - `Error::InvalidState` if `keys` is not strictly ascending
    /// - `Error::TooManyKeys` if there are more than `max_keys` keys
    pub fn leaf_with_keys(max_keys: usize, keys: Vec<i32>) -> Result<Self> {
        if keys.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(Error::InvalidState("leaf keys must be strictly ascending"));
        }
        if keys.len() > max_keys {
            return Err(Error::TooManyKeys {
                count: keys.len(),
                max_keys,
            });
        }

        Ok(Self {
            keys,
            children: Vec::new(),
            parent: None,
            max_keys,
        })
    }

    #[inline]
    pub fn keys(&self) -> &[i32] {
        &self.keys
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn max_keys(&self) -> usize {
        self.max_keys
    }

    /// Minimum keys a non-root node keeps after a delete.
    #[inline]
    pub fn min_keys(&self) -> usize {
        self.max_keys / 2
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// No room for another key without overflowing.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.keys.len() >= self.max_keys
    }

    /// Holds `max_keys + 1` keys and must be split.
    #[inline]
    pub fn is_overflowing(&self) -> bool {
        self.keys.len() > self.max_keys
    }

    #[inline]
    pub fn is_underflowing(&self) -> bool {
        self.keys.len() < self.min_keys()
    }

    /// Has a key to spare for an underflowing sibling.
    #[inline]
    pub fn can_lend(&self) -> bool {
        self.keys.len() > self.min_keys()
    }

    /// Binary search over the keys.
    ///
    /// `Ok(i)` is the index of an exact match. `Err(i)` is the insertion
    /// point, which is also the index of the child to descend into.
    #[inline]
    pub fn find(&self, key: i32) -> std::result::Result<usize, usize> {
        self.keys.binary_search(&key)
    }

    /// Insert `key` at its sorted position and return that position.
    ///
    /// # Errors
    /// Returns `Error::DuplicateKey` if `key` is already in this node.
    pub fn add_key(&mut self, key: i32) -> Result<usize> {
        match self.find(key) {
            Ok(_) => Err(Error::DuplicateKey(key)),
            Err(index) => {
                self.keys.insert(index, key);
                Ok(index)
            }
        }
    }

    /// Insert a promoted median with the two halves of the node it came from.
    ///
    /// The halves land at `index` and `index + 1` around the key. The caller
    /// must already have removed the pre-split node from `children`.
    pub fn add_key_and_children(&mut self, key: i32, left: NodeId, right: NodeId) -> Result<usize> {
        let index = self.add_key(key)?;

        let index_left = index.min(self.children.len());
        self.children.insert(index_left, left);
        self.children.insert(index_left + 1, right);

        Ok(index)
    }

    /// Remove `key` from a leaf.
    ///
    /// # Errors
    /// - `Error::InvalidState` if this node is not a leaf
    /// - `Error::KeyNotFound` if `key` is not in this node
    pub fn delete_key(&mut self, key: i32) -> Result<()> {
        if !self.is_leaf() {
            return Err(Error::InvalidState("cannot delete a key directly from an internal node"));
        }

        let index = self.find(key).map_err(|_| Error::KeyNotFound(key))?;
        self.keys.remove(index);
        Ok(())
    }

    /// Remove a child by identity. Returns the slot it occupied.
    pub fn remove_child_by_reference(&mut self, child: NodeId) -> Option<usize> {
        let index = self.children.iter().position(|&c| c == child)?;
        self.children.remove(index);
        Some(index)
    }

    /// Index of `child` in `children`, trying one of its keys first.
    ///
    /// Keys never repeat across the tree, so `hint` (any key of the child)
    /// brackets exactly one slot. The slot is only trusted when the id there
    /// is `child`; otherwise the children are scanned by identity.
    pub(super) fn child_index(&self, child: NodeId, hint: Option<i32>) -> Option<usize> {
        if let Some(Err(index)) = hint.map(|key| self.find(key)) {
            if self.children.get(index) == Some(&child) {
                return Some(index);
            }
        }
        self.children.iter().position(|&c| c == child)
    }
}
