//! pagetree - an in-memory B-tree index with a slotted-page codec.
//!
//! # Architecture
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Index Layer (index/btree)                               │
//! │   BTree ── NodeArena ── Node        SharedBTree (RwLock) │
//! │     │                                                    │
//! │     └── validate: structural oracle                      │
//! └──────────────────────────────────────────────────────────┘
//!                         ↓ one node's keys
//! ┌──────────────────────────────────────────────────────────┐
//! │  Storage Layer (storage/)                                │
//! │   slotted encode/decode ── Page + PageHeaderData         │
//! │   ItemIdData line pointers ── Cell                       │
//! │   write_page / read_page / read_tree                     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (NodeId, PageId, Error, config)
//! - [`index`] - The B-tree, its validator and pretty-printer
//! - [`storage`] - Page formats and page file I/O
//!
//! # Quick Start
//! ```no_run
//! use pagetree::{read_page, write_page, BTree};
//!
//! let mut tree = BTree::new(4).unwrap();
//! for key in [5, 1, 9, 3] {
//!     tree.insert(key).unwrap();
//! }
//! assert!(tree.validate().is_ok());
//! println!("{tree}");
//!
//! // Persist a single leaf's keys as one 8KB page.
//! let root = tree.node(tree.root()).unwrap();
//! write_page("root.page", root).unwrap();
//! let leaf = read_page("root.page", 4).unwrap();
//! assert_eq!(leaf.keys(), &[1, 3, 5, 9]);
//! ```

pub mod common;
pub mod index;
pub mod storage;

pub use common::config::{BTreeConfig, PAGE_SIZE};
pub use common::{Error, NodeId, PageId, Result, TreeViolation};

pub use index::btree::{validate, BTree, Node, SharedBTree};
pub use storage::page::{Cell, ItemIdData, Page, PageHeaderData};
pub use storage::{read_page, read_tree, write_page};
