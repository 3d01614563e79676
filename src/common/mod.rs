//! Common types and utilities shared across pagetree.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and [`BTreeConfig`](config::BTreeConfig)
//! - Error types
//! - Identifiers (NodeId, PageId)

pub mod config;
pub mod error;
mod node_id;
mod page_id;

pub use error::{Error, Result, TreeViolation};
pub use node_id::NodeId;
pub use page_id::PageId;
