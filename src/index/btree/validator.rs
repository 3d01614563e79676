//! Structural validator - the correctness oracle for [`BTree`].
//!
//! Checks, for the whole tree:
//! 1. Keys within each node are strictly ascending.
//! 2. No node has more than `max_keys + 1` children.
//! 3. The root has at least 2 children unless it is a leaf.
//! 4. Every other internal node has at least `ceil((max_keys + 1) / 2)` children.
//! 5. An internal node with `K` children has `K - 1` keys.
//! 6. All leaves are at the same depth.
//! 7. The last key of `children[i]` is `<= keys[i]`.
//! 8. The first key of `children[i + 1]` is `> keys[i]`.
//!
//! It also checks that each child's parent link names the node that lists
//! it. The first violation found is returned.
//!
//! This is a full traversal and is never called on the hot path (unless
//! the tree is configured as paranoid).

use crate::common::{Error, NodeId, Result, TreeViolation};

use super::node::Node;
use super::tree::BTree;

/// Validate `tree` against the invariants of a B-tree of order `max_keys`.
///
/// # Errors
/// Returns `Error::InvalidTree` describing the first broken rule.
pub fn validate(tree: &BTree, max_keys: usize) -> Result<()> {
    let max_children = max_keys + 1;
    let min_children = max_children.div_ceil(2);

    let root = tree.root();
    let root_node = node_of(tree, root)?;
    if !root_node.is_leaf() && root_node.children().len() < 2 {
        return Err(TreeViolation::RootUnderfilled {
            children: root_node.children().len(),
        }
        .into());
    }

    let mut leaf_depth: Option<usize> = None;
    let mut stack = vec![(root, 0usize)];

    while let Some((id, depth)) = stack.pop() {
        let node = node_of(tree, id)?;

        if node.keys().windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(TreeViolation::KeysNotAscending { node: id }.into());
        }

        let children = node.children();
        if children.len() > max_children {
            return Err(TreeViolation::TooManyChildren {
                node: id,
                children: children.len(),
                max: max_children,
            }
            .into());
        }

        if node.is_leaf() {
            match leaf_depth {
                None => leaf_depth = Some(depth),
                Some(expected) if expected != depth => {
                    return Err(TreeViolation::UnevenLeafDepth {
                        node: id,
                        depth,
                        expected,
                    }
                    .into());
                }
                Some(_) => {}
            }
            continue;
        }

        if id != root && children.len() < min_children {
            return Err(TreeViolation::InternalUnderfilled {
                node: id,
                children: children.len(),
                min: min_children,
            }
            .into());
        }

        if children.len() != node.keys().len() + 1 {
            return Err(TreeViolation::KeyCountMismatch {
                node: id,
                children: children.len(),
                keys: node.keys().len(),
            }
            .into());
        }

        for &child in children {
            let recorded = node_of(tree, child)?.parent();
            if recorded != Some(id) {
                return Err(TreeViolation::ParentLinkBroken {
                    child,
                    parent: id,
                    recorded,
                }
                .into());
            }
        }

        check_separators(tree, id, node)?;

        // Reverse so the leftmost child is visited first.
        stack.extend(children.iter().rev().map(|&child| (child, depth + 1)));
    }

    Ok(())
}

/// Rules 7 and 8 for one internal node.
fn check_separators(tree: &BTree, id: NodeId, node: &Node) -> Result<()> {
    for (i, &key) in node.keys().iter().enumerate() {
        let left = node_of(tree, node.children()[i])?;
        if !matches!(left.keys().last(), Some(&last) if last <= key) {
            return Err(TreeViolation::LeftSubtreeOutOfOrder { node: id, key }.into());
        }

        let right = node_of(tree, node.children()[i + 1])?;
        if !matches!(right.keys().first(), Some(&first) if first > key) {
            return Err(TreeViolation::RightSubtreeOutOfOrder { node: id, key }.into());
        }
    }
    Ok(())
}

fn node_of(tree: &BTree, id: NodeId) -> Result<&Node> {
    tree.node(id)
        .ok_or(Error::InvalidState("validator reached a dangling node id"))
}
