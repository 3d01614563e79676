//! Page files - persist one node's keys as a single 8KB page.
//!
//! # File Layout
//! A page file is exactly one page:
//! ```text
//! ┌────────┬───────────────┬────────────┬──────────────┐
//! │ header │ line pointers │ zero bytes │ key cells    │
//! └────────┴───────────────┴────────────┴──────────────┘
//! 0                                                  8192
//! ```
//!
//! Only a node's flat key list is stored; child links are not. A multi-level
//! tree cannot be written, and [`read_tree`] always yields a single-leaf tree.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::debug;

use crate::common::{Error, Result};
use crate::index::btree::{BTree, Node};
use crate::storage::page::{slotted, Cell, Page, PageHeaderData};

/// Write `node`'s keys to `path` as one page, replacing any existing file.
///
/// The file is `fsync`ed before returning. Returns the header and the cells
/// (in key order) that were written.
///
/// # Errors
/// - `Error::PageOverflow` if the keys do not fit in one page; nothing is
///   written
/// - `Error::Io` if the file cannot be created or written
pub fn write_page<P: AsRef<Path>>(path: P, node: &Node) -> Result<(PageHeaderData, Vec<Cell>)> {
    let path = path.as_ref();
    let (page, header, cells) = slotted::encode(node)?;

    let mut file = File::create(path)?;
    file.write_all(page.as_slice())?;
    file.sync_all()?;

    debug!(
        path = %path.display(),
        keys = cells.len(),
        lower = header.lower,
        upper = header.upper,
        "wrote page"
    );
    Ok((header, cells))
}

/// Read a page file back into a leaf node of order `max_keys`.
///
/// # Errors
/// - `Error::Io` if the file is missing or shorter than a page
/// - `Error::ChecksumMismatch` / `Error::CorruptPage` if the page is damaged
/// - `Error::TooManyKeys` if the page holds more than `max_keys` keys
pub fn read_page<P: AsRef<Path>>(path: P, max_keys: usize) -> Result<Node> {
    let path = path.as_ref();
    let mut page = Page::new();
    File::open(path)?.read_exact(page.as_mut_slice())?;

    let keys = slotted::decode_keys(&page)?;
    debug!(path = %path.display(), keys = keys.len(), "read page");

    if keys.len() > max_keys {
        return Err(Error::TooManyKeys {
            count: keys.len(),
            max_keys,
        });
    }
    Node::leaf_with_keys(max_keys, keys)
}

/// Read a page file into a tree whose root is the stored leaf.
///
/// # Errors
/// Everything [`read_page`] returns, plus `Error::InvalidOrder` if
/// `max_keys` is too small for a tree.
pub fn read_tree<P: AsRef<Path>>(path: P, max_keys: usize) -> Result<BTree> {
    BTree::from_leaf(read_page(path, max_keys)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_and_read_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("node.page");

        let node = Node::leaf_with_keys(8, vec![3, 1_000, 70_000]).unwrap();
        let (header, cells) = write_page(&path, &node).unwrap();
        assert_eq!(cells.len(), 3);
        assert_eq!(header.lower, 24 + 3 * 4);

        assert_eq!(std::fs::metadata(&path).unwrap().len(), 8192);

        let read = read_page(&path, 8).unwrap();
        assert_eq!(read.keys(), &[3, 1_000, 70_000]);
        assert!(read.is_leaf());
        assert_eq!(read.max_keys(), 8);
    }

    #[test]
    fn test_overwrite_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("node.page");

        write_page(&path, &Node::leaf_with_keys(4, vec![1, 2, 3, 4]).unwrap()).unwrap();
        write_page(&path, &Node::leaf_with_keys(4, vec![9]).unwrap()).unwrap();

        assert_eq!(read_page(&path, 4).unwrap().keys(), &[9]);
    }

    #[test]
    fn test_too_many_keys_for_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("node.page");
        write_page(&path, &Node::leaf_with_keys(10, (0..10).collect()).unwrap()).unwrap();

        assert!(matches!(
            read_page(&path, 5),
            Err(Error::TooManyKeys {
                count: 10,
                max_keys: 5
            })
        ));
    }

    #[test]
    fn test_missing_and_short_files() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            read_page(dir.path().join("missing.page"), 4),
            Err(Error::Io(_))
        ));

        let short = dir.path().join("short.page");
        std::fs::write(&short, [0u8; 100]).unwrap();
        assert!(matches!(read_page(&short, 4), Err(Error::Io(_))));
    }

    #[test]
    fn test_read_tree() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("node.page");
        write_page(&path, &Node::leaf_with_keys(5, vec![2, 4, 6]).unwrap()).unwrap();

        let mut tree = read_tree(&path, 5).unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.search(4), Some(4));

        for key in [1, 3, 5, 7, 8] {
            tree.insert(key).unwrap();
        }
        assert!(tree.validate().is_ok());
        assert_eq!(tree.keys(), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }
}
