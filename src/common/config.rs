//! Configuration constants and tree settings.

use crate::common::{Error, Result};

/// Size of an on-disk page in bytes (8KB).
///
/// Line pointers store offsets and lengths in 15 bits, so a page can never
/// be larger than 32KB.
pub const PAGE_SIZE: usize = 8192;

/// Layout version stored in the low byte of `pagesize_version`.
pub const PAGE_LAYOUT_VERSION: u8 = 1;

/// Smallest accepted `max_keys`. Anything lower cannot split into two
/// non-empty halves around a median.
pub const MIN_MAX_KEYS: usize = 3;

/// Order used when none is given.
pub const DEFAULT_MAX_KEYS: usize = 32;

/// Settings for a [`BTree`](crate::index::btree::BTree).
///
/// # Example
/// ```
/// use pagetree::common::config::BTreeConfig;
///
/// let config = BTreeConfig::new().with_max_keys(4).with_paranoid(true);
/// assert_eq!(config.max_keys, 4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BTreeConfig {
    /// Maximum number of keys a node holds before it splits.
    pub max_keys: usize,

    /// Run the structural validator after every successful insert/delete.
    ///
    /// Costs a full traversal per mutation. Meant for tests and debugging.
    pub paranoid: bool,
}

impl Default for BTreeConfig {
    fn default() -> Self {
        Self {
            max_keys: DEFAULT_MAX_KEYS,
            paranoid: false,
        }
    }
}

impl BTreeConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the order.
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys;
        self
    }

    /// Enables or disables post-mutation validation.
    pub fn with_paranoid(mut self, paranoid: bool) -> Self {
        self.paranoid = paranoid;
        self
    }

    /// Minimum keys a non-root node must keep.
    #[inline]
    pub fn min_keys(&self) -> usize {
        self.max_keys / 2
    }

    /// Check that the order is usable.
    ///
    /// # Errors
    /// Returns `Error::InvalidOrder` if `max_keys < MIN_MAX_KEYS`.
    pub fn validate(&self) -> Result<()> {
        if self.max_keys < MIN_MAX_KEYS {
            return Err(Error::InvalidOrder(self.max_keys));
        }
        Ok(())
    }
}
