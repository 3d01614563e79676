//! Node arena and the rebalancing steps that span several nodes.
//!
//! Every node of a tree lives in one [`NodeArena`]. Child lists and parent
//! links are [`NodeId`]s into it, so moving a child between nodes is a move
//! of its id plus an update of its parent link, done together.

use tracing::debug;

use crate::common::{Error, NodeId, Result};

use super::node::Node;

/// Slot storage for the nodes of one tree.
///
/// Released slots go on a free list and are reused by the next allocation.
#[derive(Debug, Clone)]
pub(crate) struct NodeArena {
    slots: Vec<Option<Node>>,
    free_list: Vec<NodeId>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    /// Store a node and return its id.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        match self.free_list.pop() {
            Some(id) => {
                self.slots[id.0] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                NodeId::new(self.slots.len() - 1)
            }
        }
    }

    /// Remove a node from the arena and hand it back by value.
    pub fn release(&mut self, id: NodeId) -> Result<Node> {
        let node = self
            .slots
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(Error::InvalidState("released a node that is not live"))?;
        self.free_list.push(id);
        Ok(node)
    }

    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.slots
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(Error::InvalidState("dangling node id"))
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(Error::InvalidState("dangling node id"))
    }

    /// Point the parent link of each of `children` at `parent`.
    pub fn adopt(&mut self, parent: NodeId, children: &[NodeId]) -> Result<()> {
        for &child in children {
            self.get_mut(child)?.parent = Some(parent);
        }
        Ok(())
    }

    /// Slot of `id` within its parent's children.
    fn position_in_parent(&self, parent_id: NodeId, id: NodeId) -> Result<usize> {
        let hint = self.get(id)?.keys.first().copied();
        self.get(parent_id)?
            .child_index(id, hint)
            .ok_or(Error::InvalidState("node is missing from its parent's children"))
    }

    /// Move one key into `id` from an adjacent sibling through the parent.
    ///
    /// The left sibling is tried first, then the right one. A sibling only
    /// lends if it holds more than the minimum number of keys. When the
    /// sibling is internal, its boundary child moves along with the key.
    ///
    /// Returns `false` if no sibling could lend (or `id` is the root).
    pub fn try_borrow_from_sibling(&mut self, id: NodeId) -> Result<bool> {
        let Some(parent_id) = self.get(id)?.parent else {
            return Ok(false);
        };
        let index = self.position_in_parent(parent_id, id)?;

        let parent = self.get(parent_id)?;
        let left = index.checked_sub(1).map(|i| parent.children[i]);
        let right = parent.children.get(index + 1).copied();

        if let Some(left_id) = left {
            if self.get(left_id)?.can_lend() {
                self.rotate_from_left(parent_id, index - 1, left_id, id)?;
                return Ok(true);
            }
        }

        if let Some(right_id) = right {
            if self.get(right_id)?.can_lend() {
                self.rotate_from_right(parent_id, index, right_id, id)?;
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Separator moves down to the front of `id`; the left sibling's last
    /// key moves up to replace it.
    fn rotate_from_left(
        &mut self,
        parent_id: NodeId,
        separator_index: usize,
        left_id: NodeId,
        id: NodeId,
    ) -> Result<()> {
        let left = self.get_mut(left_id)?;
        let lent_key = left
            .keys
            .pop()
            .ok_or(Error::InvalidState("lending sibling has no keys"))?;
        let lent_child = left.children.pop();

        let separator = std::mem::replace(
            &mut self.get_mut(parent_id)?.keys[separator_index],
            lent_key,
        );

        let node = self.get_mut(id)?;
        node.keys.insert(0, separator);
        if let Some(child) = lent_child {
            node.children.insert(0, child);
            self.get_mut(child)?.parent = Some(id);
        }

        debug!(node = %id, sibling = %left_id, separator, lent_key, "borrowed from left sibling");
        Ok(())
    }

    /// Separator moves down to the back of `id`; the right sibling's first
    /// key moves up to replace it.
    fn rotate_from_right(
        &mut self,
        parent_id: NodeId,
        separator_index: usize,
        right_id: NodeId,
        id: NodeId,
    ) -> Result<()> {
        let right = self.get_mut(right_id)?;
        if right.keys.is_empty() {
            return Err(Error::InvalidState("lending sibling has no keys"));
        }
        let lent_key = right.keys.remove(0);
        let lent_child = if right.children.is_empty() {
            None
        } else {
            Some(right.children.remove(0))
        };

        let separator = std::mem::replace(
            &mut self.get_mut(parent_id)?.keys[separator_index],
            lent_key,
        );

        let node = self.get_mut(id)?;
        node.keys.push(separator);
        if let Some(child) = lent_child {
            node.children.push(child);
            self.get_mut(child)?.parent = Some(id);
        }

        debug!(node = %id, sibling = %right_id, separator, lent_key, "borrowed from right sibling");
        Ok(())
    }

    /// Fold an adjacent sibling and the separating parent key into `id`.
    ///
    /// The left sibling is preferred. `id` survives; the sibling is released
    /// and the parent loses one key and one child.
    ///
    /// Returns `false` only if `id` has no sibling (or no parent).
    pub fn try_merge_with_sibling_and_parent_key(&mut self, id: NodeId) -> Result<bool> {
        let Some(parent_id) = self.get(id)?.parent else {
            return Ok(false);
        };
        let index = self.position_in_parent(parent_id, id)?;

        let parent = self.get_mut(parent_id)?;
        let (separator, sibling_id, from_left) = if index > 0 {
            let separator = parent.keys.remove(index - 1);
            (separator, parent.children.remove(index - 1), true)
        } else if index + 1 < parent.children.len() {
            let separator = parent.keys.remove(index);
            (separator, parent.children.remove(index + 1), false)
        } else {
            return Ok(false);
        };

        let sibling = self.release(sibling_id)?;
        self.adopt(id, &sibling.children)?;

        let node = self.get_mut(id)?;
        if from_left {
            let mut keys = sibling.keys;
            keys.push(separator);
            keys.append(&mut node.keys);
            node.keys = keys;

            let mut children = sibling.children;
            children.append(&mut node.children);
            node.children = children;
        } else {
            node.keys.push(separator);
            node.keys.extend(sibling.keys);
            node.children.extend(sibling.children);
        }

        debug!(
            node = %id,
            sibling = %sibling_id,
            separator,
            from_left,
            keys = node.keys.len(),
            "merged with sibling"
        );
        Ok(true)
    }

    /// Replace `key` in internal node `id` with its in-order predecessor.
    ///
    /// Walks down the left child of `key` to its rightmost leaf, takes that
    /// leaf's largest key, and writes it over `key`. Returns the leaf, which
    /// now has one key fewer and may need rebalancing.
    pub fn replace_key_with_rightmost_key_of_left_subtree(
        &mut self,
        id: NodeId,
        key: i32,
    ) -> Result<NodeId> {
        let node = self.get(id)?;
        let index = node.find(key).map_err(|_| Error::KeyNotFound(key))?;
        let mut leaf = *node
            .children
            .get(index)
            .ok_or(Error::InvalidState("key has no left subtree"))?;

        while let Some(&last) = self.get(leaf)?.children.last() {
            leaf = last;
        }

        let predecessor = self
            .get_mut(leaf)?
            .keys
            .pop()
            .ok_or(Error::InvalidState("rightmost leaf of left subtree is empty"))?;
        self.get_mut(id)?.keys[index] = predecessor;

        Ok(leaf)
    }
}
