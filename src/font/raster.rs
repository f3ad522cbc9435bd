//! Renders one grapheme into a fixed cell and thresholds it to 1 bit per pixel.

use std::str::FromStr;

use image::GrayImage;
use log::warn;

use super::metrics::HeightPolicy;
use super::{CellSize, FontEngine, InkBox};

/// Intensity a pixel must strictly exceed to be set (0..=255 scale).
pub const DEFAULT_THRESHOLD: u8 = 128;

/// Vertical placement of a glyph inside its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlign {
    /// Ink centered in the cell.
    #[default]
    Center,
    /// Line origin at the cell top, so every glyph shares one baseline.
    Top,
}

impl VerticalAlign {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Top => "top",
        }
    }
}

impl FromStr for VerticalAlign {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "center" | "centre" => Ok(Self::Center),
            "top" | "baseline" => Ok(Self::Top),
            _ => Err(()),
        }
    }
}

/// Tunables shared by every glyph of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterOptions {
    pub threshold: u8,
    pub align: VerticalAlign,
    pub height_policy: HeightPolicy,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            align: VerticalAlign::default(),
            height_policy: HeightPolicy::default(),
        }
    }
}

/// Where a glyph's line origin goes inside its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub origin: (i32, i32),
    /// Ink did not fit; margins were clamped to zero and the overflow clipped.
    pub clamped: bool,
}

/// Centers `ink` in `cell`. Negative margins clamp to zero.
pub fn place(ink: InkBox, cell: CellSize, align: VerticalAlign) -> Placement {
    let margin_x = (cell.width as i32 - ink.width()).div_euclid(2);
    let margin_y = (cell.height as i32 - ink.height()).div_euclid(2);
    let origin_x = margin_x.max(0) - ink.left;
    let (origin_y, clipped_y) = match align {
        VerticalAlign::Center => (margin_y.max(0) - ink.top, margin_y < 0),
        VerticalAlign::Top => (
            0,
            !ink.is_empty() && (ink.top < 0 || ink.bottom > cell.height as i32),
        ),
    };
    Placement {
        origin: (origin_x, origin_y),
        clamped: margin_x < 0 || clipped_y,
    }
}

/// Binarization rule: strictly above the threshold is ink.
#[inline(always)]
pub const fn is_ink(intensity: u8, threshold: u8) -> bool {
    intensity > threshold
}

/// A binary glyph bitmap, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphCell {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl GlyphCell {
    pub fn from_rows(width: u32, rows: Vec<Vec<bool>>) -> Self {
        let height = rows.len() as u32;
        let bits: Vec<bool> = rows.into_iter().flatten().collect();
        debug_assert_eq!(bits.len(), (width * height) as usize);
        Self {
            width,
            height,
            bits,
        }
    }

    /// Reads back every canvas pixel and keeps those above `threshold`.
    pub fn from_canvas(canvas: &GrayImage, threshold: u8) -> Self {
        Self {
            width: canvas.width(),
            height: canvas.height(),
            bits: canvas
                .pixels()
                .map(|p| is_ink(p.0[0], threshold))
                .collect(),
        }
    }

    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline(always)]
    pub fn row(&self, y: u32) -> &[bool] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.bits[start..start + w]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        (0..self.height).map(|y| self.row(y))
    }

    #[inline(always)]
    pub fn is_set(&self, x: u32, y: u32) -> bool {
        self.bits[(y * self.width + x) as usize]
    }
}

/// Renders `grapheme` into a fresh cell canvas with the packer's placement.
pub fn render_cell<E: FontEngine>(
    engine: &E,
    grapheme: &str,
    cell: CellSize,
    align: VerticalAlign,
) -> GrayImage {
    let ink = engine.ink_box(grapheme);
    let placement = place(ink, cell, align);
    if placement.clamped {
        warn!(
            "Glyph {:?} ({}x{}) does not fit the {}x{} cell; clamped to the edge and clipped.",
            grapheme,
            ink.width(),
            ink.height(),
            cell.width,
            cell.height
        );
    }
    let mut canvas = GrayImage::new(cell.width, cell.height);
    engine.draw(grapheme, &mut canvas, placement.origin);
    canvas
}

/// A glyph's grayscale cell canvas and the bitmap thresholded from it.
#[derive(Debug, Clone)]
pub struct Rasterized {
    pub canvas: GrayImage,
    pub glyph: GlyphCell,
}

pub fn rasterize<E: FontEngine>(
    engine: &E,
    grapheme: &str,
    cell: CellSize,
    opts: &RasterOptions,
) -> Rasterized {
    let canvas = render_cell(engine, grapheme, cell, opts.align);
    let glyph = GlyphCell::from_canvas(&canvas, opts.threshold);
    Rasterized { canvas, glyph }
}
