//! Slotted-page codec for a node's key list.
//!
//! A node is stored as one key cell per key. Cells are packed from the end
//! of the page backward and the line-pointer array grows forward from the
//! header, so free space is always the gap between `lower` and `upper`:
//!
//! ```text
//!   header  lp[0] lp[1] .. lp[n-1]      free       cell[n-1] .. cell[1] cell[0]
//! ┌────────┬─────┬─────┬──┬───────┬──────────────┬─────────┬──┬───────┬───────┐
//! 0        24                    lower          upper                       8192
//! ```
//!
//! Key `i` lives at `PAGE_SIZE - (i + 1) * 10` and `lp[i]` points at it.
//! Only leaf cells are written; every `left_child` is [`PageId::NULL`].
//! A node that does not fit in one page is rejected; there are no overflow
//! pages.
//!
//! [`PageId::NULL`]: crate::common::PageId::NULL

use tracing::warn;

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, Result};
use crate::index::btree::Node;

use super::cell::Cell;
use super::item_id::{ItemIdData, ItemIdFlags};
use super::page::Page;
use super::page_header::{PageFlags, PageHeaderData};

/// Bytes a single key costs: its cell plus its line pointer.
const BYTES_PER_KEY: usize = Cell::KEY_CELL_SIZE + ItemIdData::SIZE;

/// Most keys that fit in one page.
pub const MAX_KEYS_PER_PAGE: usize = (PAGE_SIZE - PageHeaderData::SIZE) / BYTES_PER_KEY;

/// Serialize `node`'s keys into a fresh page.
///
/// Returns the page, the header written into it, and the cells in key
/// order.
///
/// # Errors
/// Returns `Error::PageOverflow` if the keys need more than one page.
pub fn encode(node: &Node) -> Result<(Page, PageHeaderData, Vec<Cell>)> {
    let keys = node.keys();
    let available = PAGE_SIZE - PageHeaderData::SIZE;
    let required = keys.len() * BYTES_PER_KEY;
    if required > available {
        return Err(Error::PageOverflow {
            keys: keys.len(),
            required,
            available,
        });
    }

    let mut page = Page::new();
    let mut cells = Vec::with_capacity(keys.len());
    let mut upper = PAGE_SIZE;
    let mut lower = PageHeaderData::SIZE;

    for &key in keys {
        let cell = Cell::from_key(key);
        let len = cell.encoded_len();
        upper -= len;

        let line_pointer = ItemIdData::new(upper as u16, ItemIdFlags::Normal, len as u16)?;
        let data = page.as_mut_slice();
        data[lower..lower + ItemIdData::SIZE].copy_from_slice(&line_pointer.to_le_bytes());
        cell.write_to(&mut data[upper..upper + len]);

        lower += ItemIdData::SIZE;
        cells.push(cell);
    }

    let mut flags = PageFlags::ALL_VISIBLE;
    if upper - lower < BYTES_PER_KEY {
        flags.insert(PageFlags::PAGE_FULL);
    }

    let mut header = PageHeaderData {
        flags,
        lower: lower as u16,
        upper: upper as u16,
        ..PageHeaderData::new()
    };
    page.set_header(&header);
    header.checksum = page.update_checksum();

    Ok((page, header, cells))
}

/// Parse a page written by [`encode`].
///
/// Returns the header and the cells in key order.
///
/// # Errors
/// - `Error::ChecksumMismatch` if the stored checksum is wrong
/// - `Error::CorruptPage` if offsets, line pointers or cells are inconsistent
///   or the keys are not strictly ascending
pub fn decode(page: &Page) -> Result<(PageHeaderData, Vec<Cell>)> {
    let header = page.header();
    let data = page.as_slice();

    let computed = PageHeaderData::compute_checksum(data);
    if header.checksum != computed {
        warn!(stored = header.checksum, computed, "page checksum mismatch");
        return Err(Error::ChecksumMismatch {
            stored: header.checksum,
            computed,
        });
    }

    if header.page_size() != PAGE_SIZE {
        return Err(corrupt(format!(
            "page size {} does not match {}",
            header.page_size(),
            PAGE_SIZE
        )));
    }

    let (lower, upper, special) = (
        header.lower as usize,
        header.upper as usize,
        header.special as usize,
    );
    if !(PageHeaderData::SIZE <= lower && lower <= upper && upper <= special && special <= PAGE_SIZE)
    {
        return Err(corrupt(format!(
            "bad offsets: lower {lower}, upper {upper}, special {special}"
        )));
    }
    if (lower - PageHeaderData::SIZE) % ItemIdData::SIZE != 0 {
        return Err(corrupt(format!("lower {lower} splits a line pointer")));
    }

    let line_pointers: Vec<ItemIdData> = data[PageHeaderData::SIZE..lower]
        .chunks_exact(ItemIdData::SIZE)
        .map(|chunk| ItemIdData::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    // One pass from `upper` to `special` reads cells last key first.
    let mut cells = Vec::with_capacity(line_pointers.len());
    let mut offsets = Vec::with_capacity(line_pointers.len());
    let mut position = upper;
    while position < special {
        let cell = Cell::read_from(&data[position..special])?;
        offsets.push(position);
        position += cell.encoded_len();
        cells.push(cell);
    }
    cells.reverse();
    offsets.reverse();

    if cells.len() != line_pointers.len() {
        return Err(corrupt(format!(
            "{} line pointers for {} cells",
            line_pointers.len(),
            cells.len()
        )));
    }

    for (i, ((line_pointer, cell), &offset)) in
        line_pointers.iter().zip(&cells).zip(&offsets).enumerate()
    {
        if line_pointer.flags() != ItemIdFlags::Normal
            || line_pointer.offset() as usize != offset
            || line_pointer.length() as usize != cell.encoded_len()
        {
            return Err(corrupt(format!(
                "line pointer {i} does not describe the cell at {offset}"
            )));
        }
    }

    let keys = cells.iter().map(Cell::key).collect::<Result<Vec<_>>>()?;
    if keys.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(corrupt("keys are not strictly ascending".to_string()));
    }

    Ok((header, cells))
}

/// Decode a page and return just its keys, in order.
pub fn decode_keys(page: &Page) -> Result<Vec<i32>> {
    let (_, cells) = decode(page)?;
    cells.iter().map(Cell::key).collect()
}

fn corrupt(reason: String) -> Error {
    Error::CorruptPage(reason)
}
