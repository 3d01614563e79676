//! B-tree over unique `i32` keys.

use std::ops::Index;

use tracing::{debug, trace};

use crate::common::config::BTreeConfig;
use crate::common::{Error, NodeId, Result};

use super::arena::NodeArena;
use super::node::Node;
use super::validator;

/// An in-memory B-tree of unique `i32` keys.
///
/// # Structure
/// ```text
///                 ┌────────┐
///                 │ 10  20 │            root (internal)
///                 └┬───┬──┬┘
///          ┌───────┘   │  └────────┐
///     ┌────┴───┐  ┌────┴───┐  ┌────┴───┐
///     │ 2  5 7 │  │ 12  15 │  │ 21  30 │ leaves
///     └────────┘  └────────┘  └────────┘
/// ```
///
/// Nodes hold at most `max_keys` keys and split on the `max_keys + 1`-th.
/// Every node except the root keeps at least `max_keys / 2` keys; a delete
/// that drops below that borrows from a sibling or merges with one.
///
/// # Thread Safety
/// `BTree` is single-threaded: a write touches parents and siblings of the
/// node it starts from. Use [`SharedBTree`](super::SharedBTree) to share one
/// between threads.
///
/// # Example
/// ```
/// use pagetree::BTree;
///
/// let mut tree = BTree::new(3).unwrap();
/// for key in 1..=10 {
///     tree.insert(key).unwrap();
/// }
///
/// assert_eq!(tree.search(7), Some(7));
/// assert_eq!(tree.search(11), None);
///
/// tree.delete(7).unwrap();
/// assert_eq!(tree.search(7), None);
/// assert!(tree.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct BTree {
    arena: NodeArena,
    root: NodeId,
    config: BTreeConfig,
    len: usize,
}

impl BTree {
    /// Create an empty tree of the given order.
    ///
    /// # Errors
    /// Returns `Error::InvalidOrder` if `max_keys <= 2`.
    pub fn new(max_keys: usize) -> Result<Self> {
        Self::with_config(BTreeConfig::new().with_max_keys(max_keys))
    }

    /// Create an empty tree from a full configuration.
    pub fn with_config(config: BTreeConfig) -> Result<Self> {
        config.validate()?;

        let mut arena = NodeArena::new();
        let root = arena.alloc(Node::new(config.max_keys));

        Ok(Self {
            arena,
            root,
            config,
            len: 0,
        })
    }

    /// Create a single-node tree whose root is `leaf`.
    ///
    /// The order is taken from the leaf.
    ///
    /// # Errors
    /// - `Error::InvalidOrder` if the leaf's `max_keys <= 2`
    /// - `Error::InvalidState` if `leaf` has children
    /// - `Error::TooManyKeys` if `leaf` holds more than its `max_keys`
    pub fn from_leaf(mut leaf: Node) -> Result<Self> {
        if !leaf.is_leaf() {
            return Err(Error::InvalidState("a tree can only be built from a leaf"));
        }
        if leaf.keys.len() > leaf.max_keys() {
            return Err(Error::TooManyKeys {
                count: leaf.keys.len(),
                max_keys: leaf.max_keys(),
            });
        }
        let config = BTreeConfig::new().with_max_keys(leaf.max_keys());
        config.validate()?;

        leaf.parent = None;
        let len = leaf.keys.len();
        let mut arena = NodeArena::new();
        let root = arena.alloc(leaf);

        Ok(Self {
            arena,
            root,
            config,
            len,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn max_keys(&self) -> usize {
        self.config.max_keys
    }

    #[inline]
    pub fn config(&self) -> &BTreeConfig {
        &self.config
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a node by id. `None` if the id is not live in this tree.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id).ok()
    }

    /// Number of keys in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Number of levels; a lone root leaf has height 1.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut id = self.root;
        while let Some(&first) = self[id].children.first() {
            height += 1;
            id = first;
        }
        height
    }

    /// Bytes needed to store every key as a 4-byte little-endian payload.
    pub fn key_bytes(&self) -> usize {
        self.len * std::mem::size_of::<i32>()
    }

    /// All keys in ascending order.
    pub fn keys(&self) -> Vec<i32> {
        let mut out = Vec::with_capacity(self.len);
        self.collect_keys(self.root, &mut out);
        out
    }

    fn collect_keys(&self, id: NodeId, out: &mut Vec<i32>) {
        let node = &self[id];
        for (i, &key) in node.keys.iter().enumerate() {
            if let Some(&child) = node.children.get(i) {
                self.collect_keys(child, out);
            }
            out.push(key);
        }
        if let Some(&last) = node.children.get(node.keys.len()) {
            self.collect_keys(last, out);
        }
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Return `Some(key)` if `key` is in the tree.
    pub fn search(&self, key: i32) -> Option<i32> {
        self.locate(key).map(|_| key)
    }

    #[inline]
    pub fn contains(&self, key: i32) -> bool {
        self.locate(key).is_some()
    }

    /// Node holding `key`, if any.
    fn locate(&self, key: i32) -> Option<NodeId> {
        let mut id = self.root;
        loop {
            let node = &self[id];
            match node.find(key) {
                Ok(_) => return Some(id),
                Err(_) if node.is_leaf() => return None,
                Err(child) => id = node.children[child],
            }
        }
    }

    // ========================================================================
    // Insert
    // ========================================================================

    /// Insert a key.
    ///
    /// # Errors
    /// Returns `Error::DuplicateKey` if the key is already present. The tree
    /// is not modified in that case.
    pub fn insert(&mut self, key: i32) -> Result<()> {
        let leaf = self.leaf_for_insert(key)?;
        self.arena.get_mut(leaf)?.add_key(key)?;
        self.len += 1;
        trace!(key, leaf = %leaf, "inserted key");

        let mut current = leaf;
        while self.arena.get(current)?.is_overflowing() {
            current = self.split(current)?;
        }

        while let Some(parent) = self.arena.get(current)?.parent {
            current = parent;
        }
        if current != self.root {
            debug!(old_root = %self.root, new_root = %current, "root split, tree grew");
            self.root = current;
        }

        self.check_paranoid()
    }

    /// Descend to the leaf where `key` belongs, rejecting it if any node on
    /// the way already holds it.
    fn leaf_for_insert(&self, key: i32) -> Result<NodeId> {
        let mut id = self.root;
        loop {
            let node = &self[id];
            match node.find(key) {
                Ok(_) => return Err(Error::DuplicateKey(key)),
                Err(_) if node.is_leaf() => return Ok(id),
                Err(child) => id = node.children[child],
            }
        }
    }

    /// Split an overflowing node around its median and push the median into
    /// the parent, creating a new root if needed. Returns the parent.
    ///
    /// The node keeps `keys[..median]` and its id; a new right sibling takes
    /// `keys[median + 1..]` and, for internal nodes, the matching children.
    fn split(&mut self, id: NodeId) -> Result<NodeId> {
        let median_index = self.config.max_keys / 2;

        let node = self.arena.get_mut(id)?;
        let right_keys = node.keys.split_off(median_index + 1);
        let median = node
            .keys
            .pop()
            .ok_or(Error::InvalidState("split of a node without a median"))?;
        let right_children = if node.is_leaf() {
            Vec::new()
        } else {
            node.children.split_off(median_index + 1)
        };
        let parent = node.parent;

        let parent_id = match parent {
            Some(parent_id) => parent_id,
            None => self.arena.alloc(Node::new(self.config.max_keys)),
        };

        let mut right = Node::new(self.config.max_keys);
        right.keys = right_keys;
        right.parent = Some(parent_id);
        let right_id = self.arena.alloc(right);
        self.arena.adopt(right_id, &right_children)?;
        self.arena.get_mut(right_id)?.children = right_children;
        self.arena.get_mut(id)?.parent = Some(parent_id);

        let parent_node = self.arena.get_mut(parent_id)?;
        if parent_node.remove_child_by_reference(id).is_none() && parent.is_some() {
            return Err(Error::InvalidState(
                "split node is missing from its parent's children",
            ));
        }
        parent_node.add_key_and_children(median, id, right_id)?;

        debug!(node = %id, right = %right_id, parent = %parent_id, median, "split node");
        Ok(parent_id)
    }

    // ========================================================================
    // Delete
    // ========================================================================

    /// Delete a key.
    ///
    /// # Errors
    /// Returns `Error::KeyNotFound` if the key is not present. The tree is
    /// not modified in that case.
    pub fn delete(&mut self, key: i32) -> Result<()> {
        let id = self.locate(key).ok_or(Error::KeyNotFound(key))?;

        let leaf = if self[id].is_leaf() {
            self.arena.get_mut(id)?.delete_key(key)?;
            id
        } else {
            self.arena
                .replace_key_with_rightmost_key_of_left_subtree(id, key)?
        };
        self.len -= 1;
        trace!(key, node = %id, leaf = %leaf, "deleted key");

        self.rebalance_after_delete(leaf)?;
        self.check_paranoid()
    }

    /// Restore the minimum fill from `leaf` upwards.
    fn rebalance_after_delete(&mut self, leaf: NodeId) -> Result<()> {
        let mut current = leaf;

        while current != self.root && self.arena.get(current)?.is_underflowing() {
            if self.arena.try_borrow_from_sibling(current)? {
                break;
            }

            if !self.arena.try_merge_with_sibling_and_parent_key(current)? {
                return Err(Error::InvalidState(
                    "underflowing node has no sibling to merge with",
                ));
            }

            let parent = self
                .arena
                .get(current)?
                .parent
                .ok_or(Error::InvalidState("merged node lost its parent"))?;

            if parent == self.root && self.arena.get(parent)?.keys.is_empty() {
                self.arena.release(parent)?;
                self.arena.get_mut(current)?.parent = None;
                debug!(old_root = %parent, new_root = %current, "root emptied, tree shrank");
                self.root = current;
                break;
            }

            current = parent;
        }

        Ok(())
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check every structural invariant against this tree's own order.
    pub fn validate(&self) -> Result<()> {
        validator::validate(self, self.config.max_keys)
    }

    fn check_paranoid(&self) -> Result<()> {
        if self.config.paranoid {
            self.validate()?;
        }
        Ok(())
    }

    /// Mutate a node in place, bypassing every invariant.
    #[cfg(test)]
    pub(crate) fn corrupt(&mut self, id: NodeId, f: impl FnOnce(&mut Node)) {
        f(self.arena.get_mut(id).unwrap());
    }
}

/// Panics on an id that is not live in this tree, like slice indexing.
impl Index<NodeId> for BTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.arena.get(id) {
            Ok(node) => node,
            Err(_) => panic!("{} is not a live node of this tree", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(max_keys: usize, keys: impl IntoIterator<Item = i32>) -> BTree {
        let mut tree = BTree::new(max_keys).unwrap();
        for key in keys {
            tree.insert(key).unwrap();
        }
        tree
    }

    #[test]
    fn test_new_rejects_small_order() {
        assert!(matches!(BTree::new(2), Err(Error::InvalidOrder(2))));
        assert!(matches!(BTree::new(0), Err(Error::InvalidOrder(0))));
        assert!(BTree::new(3).is_ok());
    }

    #[test]
    fn test_empty_tree() {
        let tree = BTree::new(4).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.search(1), None);
        assert!(tree[tree.root()].is_leaf());
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_no_split_until_overflow() {
        let tree = tree_with(4, [4, 2, 1, 3]);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree[tree.root()].keys(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_root_split() {
        let tree = tree_with(4, 1..=5);

        let root = &tree[tree.root()];
        assert_eq!(root.keys(), &[3]);
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.parent(), None);

        let left = &tree[root.children()[0]];
        let right = &tree[root.children()[1]];
        assert_eq!(left.keys(), &[1, 2]);
        assert_eq!(right.keys(), &[4, 5]);
        assert_eq!(left.parent(), Some(tree.root()));
        assert_eq!(right.parent(), Some(tree.root()));
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn test_split_odd_order() {
        let tree = tree_with(3, 1..=4);
        let root = &tree[tree.root()];
        assert_eq!(root.keys(), &[2]);
        assert_eq!(tree[root.children()[0]].keys(), &[1]);
        assert_eq!(tree[root.children()[1]].keys(), &[3, 4]);
    }

    #[test]
    fn test_internal_split_moves_children() {
        let tree = tree_with(3, 1..=10);
        assert!(tree.validate().is_ok());
        assert_eq!(tree.height(), 3);
        assert_eq!(tree.keys(), (1..=10).collect::<Vec<_>>());

        // Every child must point back at the node listing it.
        let mut stack = vec![tree.root()];
        while let Some(id) = stack.pop() {
            for &child in tree[id].children() {
                assert_eq!(tree[child].parent(), Some(id));
                stack.push(child);
            }
        }
    }

    #[test]
    fn test_duplicate_insert_leaves_tree_unchanged() {
        let mut tree = tree_with(3, 1..=10);
        let before = tree.keys();
        let nodes_before = tree.node_count();

        // 4 sits in an internal node; 10 in a leaf.
        assert!(matches!(tree.insert(4), Err(Error::DuplicateKey(4))));
        assert!(matches!(tree.insert(10), Err(Error::DuplicateKey(10))));

        assert_eq!(tree.keys(), before);
        assert_eq!(tree.len(), 10);
        assert_eq!(tree.node_count(), nodes_before);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_delete_missing_key() {
        let mut tree = tree_with(3, 1..=5);
        assert!(matches!(tree.delete(42), Err(Error::KeyNotFound(42))));
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_delete_from_leaf_without_underflow() {
        let mut tree = tree_with(4, [1, 2, 3]);
        tree.delete(2).unwrap();
        assert_eq!(tree.keys(), vec![1, 3]);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_delete_internal_key_uses_predecessor() {
        let mut tree = tree_with(4, 1..=7);
        // root [3], leaves [1 2] [4 5 6 7]
        assert_eq!(tree[tree.root()].keys(), &[3]);

        tree.delete(3).unwrap();

        // Predecessor 2 moves up; left leaf underflows and borrows 4 back
        // through the root.
        assert_eq!(tree[tree.root()].keys(), &[4]);
        assert_eq!(tree.keys(), vec![1, 2, 4, 5, 6, 7]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_merge_collapses_root() {
        let mut tree = tree_with(4, 1..=5);
        assert_eq!(tree.height(), 2);

        tree.delete(5).unwrap();

        assert_eq!(tree.height(), 1);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree[tree.root()].keys(), &[1, 2, 3, 4]);
        assert_eq!(tree[tree.root()].parent(), None);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_delete_everything() {
        let mut tree = tree_with(3, 1..=50);
        for key in (1..=50).rev() {
            tree.delete(key).unwrap();
            tree.validate().unwrap();
        }
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 1);
        assert!(tree[tree.root()].keys().is_empty());
    }

    #[test]
    fn test_reinsert_after_delete() {
        let mut tree = tree_with(5, 0..100);
        for key in (0..100).step_by(2) {
            tree.delete(key).unwrap();
        }
        for key in (0..100).step_by(2) {
            tree.insert(key).unwrap();
        }
        assert_eq!(tree.keys(), (0..100).collect::<Vec<_>>());
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_negative_and_extreme_keys() {
        let keys = [i32::MIN, -1, 0, 1, i32::MAX, -500, 500];
        let tree = tree_with(3, keys);
        let mut expected = keys.to_vec();
        expected.sort();
        assert_eq!(tree.keys(), expected);
        assert_eq!(tree.search(i32::MIN), Some(i32::MIN));
        assert_eq!(tree.search(i32::MAX), Some(i32::MAX));
    }

    #[test]
    fn test_key_bytes() {
        let tree = tree_with(3, 1..=10);
        assert_eq!(tree.key_bytes(), 40);
    }

    #[test]
    fn test_from_leaf() {
        let leaf = Node::leaf_with_keys(4, vec![1, 5, 9]).unwrap();
        let mut tree = BTree::from_leaf(leaf).unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.max_keys(), 4);

        tree.insert(3).unwrap();
        tree.insert(7).unwrap();
        assert_eq!(tree.height(), 2);
        assert!(tree.validate().is_ok());

        let small = Node::leaf_with_keys(2, vec![1]).unwrap();
        assert!(matches!(BTree::from_leaf(small), Err(Error::InvalidOrder(2))));
    }

    #[test]
    fn test_from_leaf_rejects_overfull_node() {
        let mut overfull = Node::new(3);
        for key in 0..10 {
            overfull.add_key(key).unwrap();
        }
        assert!(matches!(
            BTree::from_leaf(overfull),
            Err(Error::TooManyKeys {
                count: 10,
                max_keys: 3
            })
        ));

        let mut full = Node::new(3);
        for key in 0..3 {
            full.add_key(key).unwrap();
        }
        let mut tree = BTree::from_leaf(full).unwrap();
        tree.insert(100).unwrap();
        assert_eq!(tree.height(), 2);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_split_fails_when_parent_does_not_list_node() {
        // Order 3 over 1..=4: root [2], leaves [1] and [3, 4].
        let mut tree = tree_with(3, 1..=4);
        let root = tree.root();
        let left = tree[root].children()[0];
        let right = tree[root].children()[1];
        tree.corrupt(left, |node| node.parent = Some(right));

        tree.insert(0).unwrap();
        tree.insert(-1).unwrap();
        assert!(matches!(tree.insert(-2), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_paranoid_mode_validates() {
        let config = BTreeConfig::new().with_max_keys(3).with_paranoid(true);
        let mut tree = BTree::with_config(config).unwrap();
        for key in 0..64 {
            tree.insert(key).unwrap();
        }
        for key in (0..64).step_by(3) {
            tree.delete(key).unwrap();
        }
        assert!(tree.config().paranoid);
    }
}
