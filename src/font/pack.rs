//! Bit packing of glyph cells into the byte table consumed by the LCD driver.
//!
//! Layout: rows top-to-bottom, `ceil(width / 8)` bytes per row, MSB is the
//! leftmost pixel, unused low-order bits of the last byte are zero. Glyphs are
//! concatenated in charset order, so glyph `i` starts at
//! `i * bytes_per_line * height`.
//!
//! Alongside the bytes the builder keeps a C listing: a separator comment per
//! glyph and one `0xNN, ... /* |# #| */` line per row, CRLF terminated.

use std::fmt::Write as _;

use log::{debug, trace};

use super::CellSize;
use super::raster::GlyphCell;
use crate::error::FontgenError;

const LINE_END: &str = "\r\n";

#[inline(always)]
pub const fn bytes_per_line(cell_width: u32) -> usize {
    (cell_width as usize).div_ceil(8)
}

/// Packs one row of exactly `width` pixels MSB-first into
/// `bytes_per_line(width)` bytes.
pub fn pack_row(bits: &[bool], width: u32) -> Result<Vec<u8>, FontgenError> {
    if bits.len() != width as usize {
        return Err(FontgenError::RowLength {
            bits: bits.len(),
            width,
        });
    }
    let mut out = vec![0u8; bytes_per_line(width)];
    for (i, _) in bits.iter().enumerate().filter(|(_, set)| **set) {
        out[i / 8] |= 0x80 >> (i % 8);
    }
    Ok(out)
}

/// Inverse of [`pack_row`], reading `width` pixels.
pub fn unpack_row(bytes: &[u8], width: u32) -> Vec<bool> {
    (0..width as usize)
        .map(|i| bytes[i / 8] & (0x80 >> (i % 8)) != 0)
        .collect()
}

/// `#` for ink, space for background.
pub fn row_picture(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '#' } else { ' ' }).collect()
}

fn write_row_line(out: &mut String, bytes: &[u8], bits: &[bool]) {
    for b in bytes {
        let _ = write!(out, "0x{b:02X}, ");
    }
    let _ = write!(out, "/* |{}| */{LINE_END}", row_picture(bits));
}

/// Byte count emitted so far, checked against where each glyph must start.
#[derive(Debug, Clone, Copy)]
struct OffsetTracker {
    emitted: usize,
    bytes_per_glyph: usize,
}

impl OffsetTracker {
    #[inline(always)]
    fn expected(&self, glyph_index: usize) -> usize {
        glyph_index * self.bytes_per_glyph
    }

    fn check(&self, glyph_index: usize) -> Result<usize, FontgenError> {
        let expected = self.expected(glyph_index);
        if self.emitted != expected {
            return Err(FontgenError::OffsetMismatch {
                glyph_index,
                expected,
                actual: self.emitted,
            });
        }
        Ok(expected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphEntry {
    pub grapheme: String,
    pub offset: usize,
}

/// The packed table plus its C listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontTable {
    pub cell: CellSize,
    pub bytes_per_line: usize,
    pub bytes: Vec<u8>,
    pub glyphs: Vec<GlyphEntry>,
    pub listing: String,
}

impl FontTable {
    #[inline(always)]
    pub fn bytes_per_glyph(&self) -> usize {
        self.bytes_per_line * self.cell.height as usize
    }

    pub fn glyph_bytes(&self, index: usize) -> Option<&[u8]> {
        let start = self.glyphs.get(index)?.offset;
        self.bytes.get(start..start + self.bytes_per_glyph())
    }

    /// Decodes glyph `index` back into a bitmap.
    pub fn unpack_glyph(&self, index: usize) -> Option<GlyphCell> {
        let data = self.glyph_bytes(index)?;
        let rows = if self.bytes_per_line == 0 {
            vec![Vec::new(); self.cell.height as usize]
        } else {
            data.chunks(self.bytes_per_line)
                .map(|row| unpack_row(row, self.cell.width))
                .collect()
        };
        Some(GlyphCell::from_rows(self.cell.width, rows))
    }
}

/// Accumulates glyphs in charset order.
pub struct TableBuilder {
    table: FontTable,
    tracker: OffsetTracker,
}

impl TableBuilder {
    pub fn new(cell: CellSize) -> Self {
        let bpl = bytes_per_line(cell.width);
        Self {
            table: FontTable {
                cell,
                bytes_per_line: bpl,
                bytes: Vec::new(),
                glyphs: Vec::new(),
                listing: String::new(),
            },
            tracker: OffsetTracker {
                emitted: 0,
                bytes_per_glyph: bpl * cell.height as usize,
            },
        }
    }

    pub fn push(&mut self, grapheme: &str, glyph: &GlyphCell) -> Result<(), FontgenError> {
        let cell = self.table.cell;
        if glyph.width() != cell.width || glyph.height() != cell.height {
            return Err(FontgenError::GlyphSize {
                grapheme: grapheme.to_owned(),
                width: glyph.width(),
                height: glyph.height(),
                cell_width: cell.width,
                cell_height: cell.height,
            });
        }
        let index = self.table.glyphs.len();
        let offset = self.tracker.check(index)?;
        let rows = glyph
            .rows()
            .map(|bits| pack_row(bits, cell.width))
            .collect::<Result<Vec<_>, _>>()?;

        let listing = &mut self.table.listing;
        listing.push_str(LINE_END);
        let _ = write!(
            listing,
            "// @{offset} '{grapheme}' ({} pixels wide){LINE_END}",
            cell.width
        );
        for (bits, row) in glyph.rows().zip(&rows) {
            trace!("  |{}| {:02X?}", row_picture(bits), row);
            write_row_line(listing, row, bits);
            self.table.bytes.extend_from_slice(row);
            self.tracker.emitted += row.len();
        }

        self.table.glyphs.push(GlyphEntry {
            grapheme: grapheme.to_owned(),
            offset,
        });
        self.tracker.check(index + 1)?;
        debug!("Packed {:?} at @{} ({} bytes).", grapheme, offset, self.tracker.bytes_per_glyph);
        Ok(())
    }

    pub fn finish(self) -> FontTable {
        self.table
    }
}
