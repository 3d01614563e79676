//! Cells: one B-tree entry as stored in the cell area of a page.

use crate::common::{Error, PageId, Result};

/// Header at the start of each cell.
///
/// ```text
/// ┌──────────┬────────────────┬───────────────────┐
/// │ size u16 │ left_child u32 │ content (size B)  │
/// └──────────┴────────────────┴───────────────────┘
/// ```
///
/// `size` counts content bytes only. `left_child` names the page holding
/// entries less than this one; [`PageId::NULL`] when there is none.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CellHeader {
    pub size: u16,
    pub left_child: PageId,
}

impl CellHeader {
    pub const SIZE: usize = 6;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let bytes: &[u8; Self::SIZE] = data
            .get(..Self::SIZE)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| Error::CorruptPage("truncated cell header".to_string()))?;

        Ok(Self {
            size: u16::from_le_bytes([bytes[0], bytes[1]]),
            left_child: PageId::new(u32::from_le_bytes([bytes[2], bytes[3], bytes[4], bytes[5]])),
        })
    }

    pub fn write_to(&self, data: &mut [u8]) {
        data[..2].copy_from_slice(&self.size.to_le_bytes());
        data[2..Self::SIZE].copy_from_slice(&self.left_child.0.to_le_bytes());
    }
}

/// A header plus its content bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub header: CellHeader,
    pub content: Vec<u8>,
}

impl Cell {
    /// Encoded size of a key cell.
    pub const KEY_CELL_SIZE: usize = CellHeader::SIZE + 4;

    /// A leaf cell holding `key` as 4 little-endian bytes.
    pub fn from_key(key: i32) -> Self {
        Self {
            header: CellHeader {
                size: 4,
                left_child: PageId::NULL,
            },
            content: key.to_le_bytes().to_vec(),
        }
    }

    /// The key stored in this cell.
    ///
    /// # Errors
    /// Returns `Error::CorruptPage` if the content is not exactly 4 bytes.
    pub fn key(&self) -> Result<i32> {
        let bytes: [u8; 4] = self.content.as_slice().try_into().map_err(|_| {
            Error::CorruptPage(format!(
                "key cell holds {} bytes, expected 4",
                self.content.len()
            ))
        })?;
        Ok(i32::from_le_bytes(bytes))
    }

    /// Header plus content length in bytes.
    pub fn encoded_len(&self) -> usize {
        CellHeader::SIZE + self.content.len()
    }

    /// Write header and content at the start of `data`.
    pub fn write_to(&self, data: &mut [u8]) {
        self.header.write_to(data);
        data[CellHeader::SIZE..self.encoded_len()].copy_from_slice(&self.content);
    }

    /// Read one cell from the start of `data`.
    ///
    /// # Errors
    /// Returns `Error::CorruptPage` if the header or content runs past the
    /// end of `data`.
    pub fn read_from(data: &[u8]) -> Result<Self> {
        let header = CellHeader::from_bytes(data)?;
        let end = CellHeader::SIZE + header.size as usize;
        let content = data
            .get(CellHeader::SIZE..end)
            .ok_or_else(|| {
                Error::CorruptPage(format!("cell content of {} bytes is truncated", header.size))
            })?
            .to_vec();
        Ok(Self { header, content })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_cell_layout() {
        let cell = Cell::from_key(0x0403_0201);
        assert_eq!(cell.encoded_len(), Cell::KEY_CELL_SIZE);

        let mut buffer = [0u8; Cell::KEY_CELL_SIZE];
        cell.write_to(&mut buffer);
        assert_eq!(buffer, [4, 0, 0, 0, 0, 0, 1, 2, 3, 4]);

        assert_eq!(Cell::read_from(&buffer).unwrap(), cell);
        assert_eq!(cell.key().unwrap(), 0x0403_0201);
    }

    #[test]
    fn test_negative_key() {
        let cell = Cell::from_key(-7);
        assert_eq!(cell.key().unwrap(), -7);
        assert!(cell.header.left_child.is_null());
    }

    #[test]
    fn test_left_child_is_stored() {
        let cell = Cell {
            header: CellHeader {
                size: 4,
                left_child: PageId::new(9),
            },
            content: 5i32.to_le_bytes().to_vec(),
        };
        let mut buffer = [0u8; Cell::KEY_CELL_SIZE];
        cell.write_to(&mut buffer);
        assert_eq!(Cell::read_from(&buffer).unwrap().header.left_child, PageId::new(9));
    }

    #[test]
    fn test_truncated_cell_rejected() {
        assert!(matches!(
            CellHeader::from_bytes(&[4, 0, 0]),
            Err(Error::CorruptPage(_))
        ));
        assert!(matches!(
            Cell::read_from(&[4, 0, 0, 0, 0, 0, 1, 2]),
            Err(Error::CorruptPage(_))
        ));
    }

    #[test]
    fn test_wrong_payload_width_rejected() {
        let cell = Cell {
            header: CellHeader {
                size: 2,
                left_child: PageId::NULL,
            },
            content: vec![1, 2],
        };
        assert!(matches!(cell.key(), Err(Error::CorruptPage(_))));
    }
}
