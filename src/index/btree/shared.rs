//! Thread-safe handle around a single [`BTree`].

use parking_lot::RwLock;

use crate::common::Result;

use super::tree::BTree;

/// A [`BTree`] guarded by one reader-writer lock.
///
/// Rebalancing touches parents and siblings well away from the key being
/// written, so the whole tree is the unit of locking: any number of
/// concurrent searches, or exactly one insert/delete.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use std::thread;
/// use pagetree::{BTree, SharedBTree};
///
/// let shared = Arc::new(SharedBTree::new(BTree::new(4).unwrap()));
///
/// let handles: Vec<_> = (0..4)
///     .map(|t| {
///         let shared = Arc::clone(&shared);
///         thread::spawn(move || {
///             for i in 0..25 {
///                 shared.insert(t * 100 + i).unwrap();
///             }
///         })
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
///
/// assert_eq!(shared.len(), 100);
/// ```
#[derive(Debug)]
pub struct SharedBTree {
    tree: RwLock<BTree>,
}

impl SharedBTree {
    pub fn new(tree: BTree) -> Self {
        Self {
            tree: RwLock::new(tree),
        }
    }

    pub fn search(&self, key: i32) -> Option<i32> {
        self.tree.read().search(key)
    }

    pub fn insert(&self, key: i32) -> Result<()> {
        self.tree.write().insert(key)
    }

    pub fn delete(&self, key: i32) -> Result<()> {
        self.tree.write().delete(key)
    }

    pub fn validate(&self) -> Result<()> {
        self.tree.read().validate()
    }

    pub fn len(&self) -> usize {
        self.tree.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.read().is_empty()
    }

    /// Run `f` against the tree under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&BTree) -> R) -> R {
        f(&self.tree.read())
    }

    /// Take the tree back out.
    pub fn into_inner(self) -> BTree {
        self.tree.into_inner()
    }
}
