//! Error types for pagetree.

use thiserror::Error;

use crate::common::NodeId;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in pagetree.
///
/// `DuplicateKey` and `KeyNotFound` are raised before the tree is touched,
/// so the tree is unchanged when they are returned. `InvalidState` means an
/// internal invariant was broken mid-operation; the tree must be considered
/// corrupt after it.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from page file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Insert of a key that is already present.
    #[error("duplicate key {0}")]
    DuplicateKey(i32),

    /// Delete of a key that is not present.
    #[error("key {0} not found")]
    KeyNotFound(i32),

    /// An operation was called on a node that cannot support it, or a
    /// structural invariant failed mid-operation.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// The validator found a structural violation.
    #[error("invalid tree: {0}")]
    InvalidTree(#[from] TreeViolation),

    /// The tree order is too small.
    #[error("max_keys must be greater than 2, got {0}")]
    InvalidOrder(usize),

    /// The keys do not fit in a single page.
    #[error("page overflow: {keys} keys need {required} bytes, {available} available")]
    PageOverflow {
        keys: usize,
        required: usize,
        available: usize,
    },

    /// A decoded page holds more keys than the requested order allows.
    #[error("page holds {count} keys, more than max_keys {max_keys}")]
    TooManyKeys { count: usize, max_keys: usize },

    /// The page bytes do not describe a valid slotted page.
    #[error("corrupt page: {0}")]
    CorruptPage(String),

    /// Stored checksum does not match the page contents.
    #[error("page checksum mismatch: stored {stored:#06x}, computed {computed:#06x}")]
    ChecksumMismatch { stored: u16, computed: u16 },
}

/// A broken B-tree invariant, as reported by the validator.
///
/// Rule numbers follow the usual B-tree definition with no duplicate keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeViolation {
    /// Rule 1.
    #[error("keys of {node} are not in ascending order")]
    KeysNotAscending { node: NodeId },

    /// Rule 2.
    #[error("{node} has {children} children, more than the maximum {max}")]
    TooManyChildren {
        node: NodeId,
        children: usize,
        max: usize,
    },

    /// Rule 3.
    #[error("root has {children} children, needs at least 2 unless it is a leaf")]
    RootUnderfilled { children: usize },

    /// Rule 4.
    #[error("{node} has {children} children, fewer than the minimum {min}")]
    InternalUnderfilled {
        node: NodeId,
        children: usize,
        min: usize,
    },

    /// Rule 5.
    #[error("{node} has {children} children but {keys} keys")]
    KeyCountMismatch {
        node: NodeId,
        children: usize,
        keys: usize,
    },

    /// Rule 6.
    #[error("leaf {node} is at depth {depth}, expected {expected}")]
    UnevenLeafDepth {
        node: NodeId,
        depth: usize,
        expected: usize,
    },

    /// Rule 7.
    #[error("left subtree of key {key} in {node} holds a greater key")]
    LeftSubtreeOutOfOrder { node: NodeId, key: i32 },

    /// Rule 8.
    #[error("right subtree of key {key} in {node} holds a key not greater than it")]
    RightSubtreeOutOfOrder { node: NodeId, key: i32 },

    /// A child's back-reference does not name its actual parent.
    #[error("{child} is a child of {parent} but points to {recorded:?}")]
    ParentLinkBroken {
        child: NodeId,
        parent: NodeId,
        recorded: Option<NodeId>,
    },
}
