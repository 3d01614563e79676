//! Page identifier type.

use std::fmt;

/// Identifies a page on disk.
///
/// Stored in every cell header as the page holding keys smaller than the
/// cell's key. Page 0 is reserved: a zero page number on disk always means
/// "no page". Single-page persistence never links pages, so every cell
/// written today carries [`PageId::NULL`].
///
/// # Example
/// ```
/// use pagetree::PageId;
///
/// let page_id = PageId::new(42);
/// assert!(!page_id.is_null());
/// assert!(PageId::NULL.is_null());
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// The "no page" value.
    pub const NULL: PageId = PageId(0);

    /// Create a new PageId.
    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    /// Check if this is the "no page" value.
    #[inline]
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Page(NULL)")
        } else {
            write!(f, "Page({})", self.0)
        }
    }
}
