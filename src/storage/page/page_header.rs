//! Page header: the fixed 24-byte prefix of every page.
//!
//! The layout follows the PostgreSQL `PageHeaderData` shape: an LSN, a
//! 16-bit checksum, hint flags, and the `lower`/`upper`/`special` offsets
//! that bound the line-pointer array, free space, and cell area.

use bitflags::bitflags;

use crate::common::config::{PAGE_LAYOUT_VERSION, PAGE_SIZE};

/// Write-ahead log position of the last change to a page.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageXLogRecPtr {
    pub xlogid: u32,
    pub xrecoff: u32,
}

bitflags! {
    /// Hint bits stored in the header's `flags` field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PageFlags: u16 {
        /// There are unused line pointers before `lower`.
        const HAS_FREE_LINES = 0x0001;
        /// No further cell fits between `lower` and `upper`.
        const PAGE_FULL = 0x0002;
        /// Every cell on the page is visible.
        const ALL_VISIBLE = 0x0004;
    }
}

/// Metadata stored at the beginning of every page.
///
/// # Layout (24 bytes, little-endian)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     lsn.xlogid
/// 4       4     lsn.xrecoff
/// 8       2     checksum
/// 10      2     flags
/// 12      2     lower             end of the line-pointer array
/// 14      2     upper             start of the cell area
/// 16      2     special           start of the special space (PAGE_SIZE: none)
/// 18      2     pagesize_version  page size | layout version
/// 20      4     prune_xid
/// ```
///
/// # Checksum
/// CRC32 over the whole page with the checksum field zeroed, folded to
/// 16 bits by XOR-ing the high and low halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeaderData {
    pub lsn: PageXLogRecPtr,
    pub checksum: u16,
    pub flags: PageFlags,
    pub lower: u16,
    pub upper: u16,
    pub special: u16,
    pub pagesize_version: u16,
    pub prune_xid: u32,
}

impl PageHeaderData {
    /// Size of the fixed header in bytes, excluding line pointers.
    pub const SIZE: usize = 24;

    pub const OFFSET_LSN: usize = 0;
    pub const OFFSET_CHECKSUM: usize = 8;
    pub const OFFSET_FLAGS: usize = 10;
    pub const OFFSET_LOWER: usize = 12;
    pub const OFFSET_UPPER: usize = 14;
    pub const OFFSET_SPECIAL: usize = 16;
    pub const OFFSET_PAGESIZE_VERSION: usize = 18;
    pub const OFFSET_PRUNE_XID: usize = 20;

    /// Header of an empty page: no line pointers, no cells.
    pub fn new() -> Self {
        Self {
            lsn: PageXLogRecPtr::default(),
            checksum: 0,
            flags: PageFlags::empty(),
            lower: Self::SIZE as u16,
            upper: PAGE_SIZE as u16,
            special: PAGE_SIZE as u16,
            pagesize_version: PAGE_SIZE as u16 | PAGE_LAYOUT_VERSION as u16,
            prune_xid: 0,
        }
    }

    /// Page size recorded in the header.
    pub fn page_size(&self) -> usize {
        (self.pagesize_version & 0xFF00) as usize
    }

    /// Layout version recorded in the header.
    pub fn layout_version(&self) -> u8 {
        (self.pagesize_version & 0x00FF) as u8
    }

    /// Number of line pointers between the header and `lower`.
    pub fn line_pointer_count(&self) -> usize {
        (self.lower as usize).saturating_sub(Self::SIZE) / super::ItemIdData::SIZE
    }

    /// Bytes between the line-pointer array and the cell area.
    pub fn free_space(&self) -> usize {
        (self.upper as usize).saturating_sub(self.lower as usize)
    }

    /// Read a header from the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < PageHeaderData::SIZE`.
    pub fn from_bytes(data: &[u8]) -> Self {
        assert!(data.len() >= Self::SIZE, "buffer too small for PageHeaderData");

        let u16_at = |at: usize| u16::from_le_bytes([data[at], data[at + 1]]);
        let u32_at =
            |at: usize| u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);

        Self {
            lsn: PageXLogRecPtr {
                xlogid: u32_at(Self::OFFSET_LSN),
                xrecoff: u32_at(Self::OFFSET_LSN + 4),
            },
            checksum: u16_at(Self::OFFSET_CHECKSUM),
            flags: PageFlags::from_bits_retain(u16_at(Self::OFFSET_FLAGS)),
            lower: u16_at(Self::OFFSET_LOWER),
            upper: u16_at(Self::OFFSET_UPPER),
            special: u16_at(Self::OFFSET_SPECIAL),
            pagesize_version: u16_at(Self::OFFSET_PAGESIZE_VERSION),
            prune_xid: u32_at(Self::OFFSET_PRUNE_XID),
        }
    }

    /// Write this header to the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < PageHeaderData::SIZE`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= Self::SIZE, "buffer too small for PageHeaderData");

        data[Self::OFFSET_LSN..Self::OFFSET_LSN + 4].copy_from_slice(&self.lsn.xlogid.to_le_bytes());
        data[Self::OFFSET_LSN + 4..Self::OFFSET_LSN + 8]
            .copy_from_slice(&self.lsn.xrecoff.to_le_bytes());

        let fields = [
            (Self::OFFSET_CHECKSUM, self.checksum),
            (Self::OFFSET_FLAGS, self.flags.bits()),
            (Self::OFFSET_LOWER, self.lower),
            (Self::OFFSET_UPPER, self.upper),
            (Self::OFFSET_SPECIAL, self.special),
            (Self::OFFSET_PAGESIZE_VERSION, self.pagesize_version),
        ];
        for (at, value) in fields {
            data[at..at + 2].copy_from_slice(&value.to_le_bytes());
        }

        data[Self::OFFSET_PRUNE_XID..Self::OFFSET_PRUNE_XID + 4]
            .copy_from_slice(&self.prune_xid.to_le_bytes());
    }

    /// Compute the 16-bit checksum of a page.
    ///
    /// The checksum field itself is hashed as zeros.
    pub fn compute_checksum(page_data: &[u8]) -> u16 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&page_data[..Self::OFFSET_CHECKSUM]);
        hasher.update(&[0u8; 2]);
        hasher.update(&page_data[Self::OFFSET_CHECKSUM + 2..]);

        let crc = hasher.finalize();
        ((crc >> 16) ^ (crc & 0xFFFF)) as u16
    }

    /// Verify that the stored checksum matches the page contents.
    pub fn verify_checksum(&self, page_data: &[u8]) -> bool {
        self.checksum == Self::compute_checksum(page_data)
    }
}

impl Default for PageHeaderData {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_flags() {
        let mut flags = PageFlags::empty();
        assert!(!flags.contains(PageFlags::ALL_VISIBLE));

        flags.insert(PageFlags::ALL_VISIBLE);
        assert!(flags.contains(PageFlags::ALL_VISIBLE));
        assert!(!flags.contains(PageFlags::PAGE_FULL));

        let both = flags | PageFlags::PAGE_FULL;
        assert_eq!(both.bits(), 6);
        assert!(both.contains(PageFlags::ALL_VISIBLE | PageFlags::PAGE_FULL));
        assert!(!both.contains(PageFlags::HAS_FREE_LINES));
        assert_eq!(PageFlags::all().bits(), 0b111);
    }

    #[test]
    fn test_unknown_flag_bits_survive_roundtrip() {
        let header = PageHeaderData {
            flags: PageFlags::from_bits_retain(0x8000) | PageFlags::HAS_FREE_LINES,
            ..PageHeaderData::new()
        };
        let mut buffer = [0u8; PageHeaderData::SIZE];
        header.write_to(&mut buffer);

        let read = PageHeaderData::from_bytes(&buffer);
        assert_eq!(read.flags.bits(), 0x8001);
        assert!(read.flags.contains(PageFlags::HAS_FREE_LINES));
        assert_eq!(PageFlags::from_bits(0x8001), None);
    }

    #[test]
    fn test_empty_page_header() {
        let header = PageHeaderData::new();
        assert_eq!(header.lower, 24);
        assert_eq!(header.upper, 8192);
        assert_eq!(header.special, 8192);
        assert_eq!(header.page_size(), PAGE_SIZE);
        assert_eq!(header.layout_version(), PAGE_LAYOUT_VERSION);
        assert_eq!(header.line_pointer_count(), 0);
        assert_eq!(header.free_space(), 8192 - 24);
    }

    #[test]
    fn test_page_header_roundtrip() {
        let original = PageHeaderData {
            lsn: PageXLogRecPtr {
                xlogid: 7,
                xrecoff: 0xDEADBEEF,
            },
            checksum: 0xBEEF,
            flags: PageFlags::ALL_VISIBLE,
            lower: 32,
            upper: 8172,
            special: 8192,
            pagesize_version: 8193,
            prune_xid: 42,
        };

        let mut buffer = [0u8; PageHeaderData::SIZE];
        original.write_to(&mut buffer);
        assert_eq!(PageHeaderData::from_bytes(&buffer), original);
    }

    #[test]
    fn test_page_header_byte_layout() {
        let header = PageHeaderData {
            lsn: PageXLogRecPtr {
                xlogid: 0x04030201,
                xrecoff: 0x08070605,
            },
            checksum: 0x0A09,
            flags: PageFlags::from_bits_retain(0x0C0B),
            lower: 0x0E0D,
            upper: 0x100F,
            special: 0x1211,
            pagesize_version: 0x1413,
            prune_xid: 0x18171615,
        };

        let mut buffer = [0u8; PageHeaderData::SIZE];
        header.write_to(&mut buffer);

        let expected: Vec<u8> = (1..=24).collect();
        assert_eq!(buffer.to_vec(), expected);
    }

    #[test]
    fn test_checksum_ignores_checksum_field() {
        let mut page_data = [0u8; PAGE_SIZE];
        page_data[100] = 0xAB;
        let first = PageHeaderData::compute_checksum(&page_data);

        page_data[8] = 0xFF;
        page_data[9] = 0xFF;
        assert_eq!(PageHeaderData::compute_checksum(&page_data), first);
    }

    #[test]
    fn test_checksum_changes_with_data() {
        let mut page1 = [0u8; PAGE_SIZE];
        let mut page2 = [0u8; PAGE_SIZE];
        page1[500] = 0xFF;
        page2[500] = 0xFE;

        assert_ne!(
            PageHeaderData::compute_checksum(&page1),
            PageHeaderData::compute_checksum(&page2)
        );
    }
}
