//! Page - the fixed 8KB unit written to and read from disk.

use crate::common::config::PAGE_SIZE;

use super::page_header::PageHeaderData;

/// A raw page of data (8KB, 8KB-aligned).
///
/// # Memory Layout
/// ```text
/// 0        24                lower          upper             8192
/// ┌────────┬─────────────────┬──────────────┬─────────────────┐
/// │ header │ line pointers → │  free space  │ ← cells         │
/// └────────┴─────────────────┴──────────────┴─────────────────┘
/// ```
///
/// `Page` is not `Clone` outside of tests; copying 8KB should be explicit.
///
/// # Example
/// ```
/// use pagetree::storage::page::Page;
///
/// let mut page = Page::new();
/// page.as_mut_slice()[0] = 0xFF;
/// assert_eq!(page.as_slice()[0], 0xFF);
/// ```
#[repr(align(8192))]
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// Create a new zeroed page.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Zero out the entire page.
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    #[inline]
    pub const fn size() -> usize {
        PAGE_SIZE
    }

    /// Read the page header.
    pub fn header(&self) -> PageHeaderData {
        PageHeaderData::from_bytes(&self.data)
    }

    /// Write a page header, leaving the stored checksum as given.
    pub fn set_header(&mut self, header: &PageHeaderData) {
        header.write_to(&mut self.data);
    }

    /// Compute and store the checksum in the header.
    ///
    /// Call this after all modifications to the page are complete.
    pub fn update_checksum(&mut self) -> u16 {
        let checksum = PageHeaderData::compute_checksum(&self.data);
        self.data[PageHeaderData::OFFSET_CHECKSUM..PageHeaderData::OFFSET_CHECKSUM + 2]
            .copy_from_slice(&checksum.to_le_bytes());
        checksum
    }

    /// Verify the page checksum is valid.
    pub fn verify_checksum(&self) -> bool {
        self.header().verify_checksum(&self.data)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page").field("header", &self.header()).finish()
    }
}

#[cfg(test)]
impl Clone for Page {
    fn clone(&self) -> Self {
        let mut new_page = Page::new();
        new_page.data.copy_from_slice(&self.data);
        new_page
    }
}
