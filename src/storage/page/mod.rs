//! Page types and the slotted-page layout.
//!
//! This module contains:
//! - [`Page`] - The raw 8KB data container
//! - [`PageHeaderData`] - The 24-byte header at the start of every page
//! - [`ItemIdData`] - Packed line pointers that index the cells
//! - [`Cell`] - One key entry in the cell area
//! - [`slotted`] - Encoding a node's keys into a page and back

mod cell;
mod item_id;
#[allow(clippy::module_inception)]
mod page;
mod page_header;
pub mod slotted;

pub use cell::{Cell, CellHeader};
pub use item_id::{ItemIdData, ItemIdFlags};
pub use page::Page;
pub use page_header::{PageFlags, PageHeaderData, PageXLogRecPtr};
