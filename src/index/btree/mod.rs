//! B-tree index over unique `i32` keys.
//!
//! # Components
//! - [`BTree`] - search, insert, delete; owns the root
//! - [`Node`] - sorted keys, child ids, parent back-reference
//! - [`validate`] - structural invariant checker used as a test oracle
//! - [`SharedBTree`] - a tree behind a single reader-writer lock
//!
//! Nodes are stored in an arena and refer to each other by
//! [`NodeId`](crate::common::NodeId). A node owns the ids in its child list; its
//! parent id is a plain back-reference that is rewritten whenever a split,
//! merge, or borrow moves it.

mod arena;
mod display;
mod node;
mod shared;
mod tree;
mod validator;

pub use node::Node;
pub use shared::SharedBTree;
pub use tree::BTree;
pub use validator::validate;
