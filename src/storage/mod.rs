//! Storage layer - page formats and page file I/O.
//!
//! - [`page`] - Page, header, line pointer and cell layouts
//! - [`write_page`] / [`read_page`] / [`read_tree`] - one node per file

pub mod page;
mod page_file;

pub use page_file::{read_page, read_tree, write_page};
