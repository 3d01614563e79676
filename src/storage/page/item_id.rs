//! Line pointers: one packed `u32` per cell, stored right after the header.

use crate::common::{Error, Result};

/// State of a line pointer.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ItemIdFlags {
    /// Unused; length is always zero.
    #[default]
    Unused = 0,
    /// In use; offset and length describe a cell.
    Normal = 1,
    /// Redirects to another line pointer.
    Redirect = 2,
    /// Dead; may or may not still have storage.
    Dead = 3,
}

impl ItemIdFlags {
    /// Decode a two-bit flag code. Only the low two bits are read.
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            1 => ItemIdFlags::Normal,
            2 => ItemIdFlags::Redirect,
            3 => ItemIdFlags::Dead,
            _ => ItemIdFlags::Unused,
        }
    }
}

/// Packed line pointer.
///
/// ```text
/// bit  31            17 16 15 14             0
///     ┌────────────────┬─────┬────────────────┐
///     │ length (15)    │flags│ offset (15)    │
///     └────────────────┴─────┴────────────────┘
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ItemIdData(u32);

impl ItemIdData {
    /// Encoded size in bytes.
    pub const SIZE: usize = 4;

    pub const OFFSET_BITS: u32 = 15;
    pub const FLAGS_BITS: u32 = 2;
    pub const LENGTH_BITS: u32 = 15;

    const FLAGS_SHIFT: u32 = Self::OFFSET_BITS;
    const LENGTH_SHIFT: u32 = Self::OFFSET_BITS + Self::FLAGS_BITS;

    /// Largest offset or length a line pointer can hold.
    pub const MAX_OFFSET: u16 = (1 << Self::OFFSET_BITS) - 1;
    pub const MAX_LENGTH: u16 = (1 << Self::LENGTH_BITS) - 1;

    /// Pack a line pointer.
    ///
    /// # Errors
    /// Returns `Error::CorruptPage` if `offset` or `length` does not fit
    /// in its 15-bit field.
    pub fn new(offset: u16, flags: ItemIdFlags, length: u16) -> Result<Self> {
        if offset > Self::MAX_OFFSET || length > Self::MAX_LENGTH {
            return Err(Error::CorruptPage(format!(
                "line pointer offset {offset} / length {length} exceeds 15 bits"
            )));
        }
        Ok(Self(
            offset as u32
                | (flags as u32) << Self::FLAGS_SHIFT
                | (length as u32) << Self::LENGTH_SHIFT,
        ))
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn offset(self) -> u16 {
        (self.0 & Self::MAX_OFFSET as u32) as u16
    }

    pub fn flags(self) -> ItemIdFlags {
        ItemIdFlags::from_bits(self.0 >> Self::FLAGS_SHIFT)
    }

    pub fn length(self) -> u16 {
        ((self.0 >> Self::LENGTH_SHIFT) & Self::MAX_LENGTH as u32) as u16
    }

    pub fn to_le_bytes(self) -> [u8; Self::SIZE] {
        self.0.to_le_bytes()
    }

    pub fn from_le_bytes(bytes: [u8; Self::SIZE]) -> Self {
        Self(u32::from_le_bytes(bytes))
    }
}
