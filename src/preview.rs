//! Diagnostic preview strip, one cell per glyph, saved as PNG next to the table.

use std::path::Path;
use std::str::FromStr;

use image::{GrayImage, Rgb, RgbImage};
use log::info;

use crate::error::FontgenError;
use crate::font::charset::CharacterSet;
use crate::font::pack::FontTable;
use crate::font::FontEngine;
use crate::font::raster::{VerticalAlign, place};

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const BASELINE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const INK_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewMode {
    /// Glyphs as rendered before thresholding.
    Plain,
    /// Cell outlines, ink boxes and baselines under the glyphs.
    #[default]
    Boxed,
    /// Decoded from the packed table.
    Packed,
}

impl PreviewMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Boxed => "boxed",
            Self::Packed => "packed",
        }
    }
}

impl FromStr for PreviewMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "boxed" | "box" => Ok(Self::Boxed),
            "packed" | "table" => Ok(Self::Packed),
            _ => Err(()),
        }
    }
}

/* ======================= DRAW HELPERS ======================= */

#[inline(always)]
fn put_clipped(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && x < img.width() as i32 && y < img.height() as i32 {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Outline of the inclusive rectangle `(x0, y0)..=(x1, y1)`.
fn outline(img: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
    for x in x0..=x1 {
        put_clipped(img, x, y0, color);
        put_clipped(img, x, y1, color);
    }
    for y in y0..=y1 {
        put_clipped(img, x0, y, color);
        put_clipped(img, x1, y, color);
    }
}

fn hline(img: &mut RgbImage, x0: i32, x1: i32, y: i32, color: Rgb<u8>) {
    for x in x0..=x1 {
        put_clipped(img, x, y, color);
    }
}

/// Blits grayscale coverage as white ink; black pixels leave overlays visible.
fn blit_canvas(img: &mut RgbImage, canvas: &GrayImage, x_start: i32) {
    for (x, y, px) in canvas.enumerate_pixels() {
        let v = px.0[0];
        if v != 0 {
            put_clipped(img, x_start + x as i32, y as i32, Rgb([v, v, v]));
        }
    }
}

/* ======================= API ======================= */

/// Lays out one cell per glyph. `canvases` are the grayscale cells the table
/// was thresholded from, in charset order.
pub fn render_preview<E: FontEngine>(
    engine: &E,
    charset: &CharacterSet,
    table: &FontTable,
    canvases: &[GrayImage],
    align: VerticalAlign,
    mode: PreviewMode,
) -> RgbImage {
    let cell = table.cell;
    let w = (cell.width * charset.len() as u32).max(1);
    let h = cell.height.max(1);
    let mut img = RgbImage::new(w, h);
    let cw = cell.width as i32;
    let ch = cell.height as i32;

    if mode == PreviewMode::Boxed {
        for (i, grapheme) in charset.iter().enumerate() {
            let x_start = i as i32 * cw;
            outline(&mut img, x_start, 0, x_start + cw - 1, ch - 1, BOX_COLOR);
            let ink = engine.ink_box(grapheme);
            if !ink.is_empty() {
                let (ox, oy) = place(ink, cell, align).origin;
                outline(
                    &mut img,
                    x_start + ox + ink.left,
                    oy + ink.top,
                    x_start + ox + ink.right - 1,
                    oy + ink.bottom - 1,
                    BOX_COLOR,
                );
                hline(
                    &mut img,
                    x_start,
                    x_start + cw - 1,
                    oy + engine.ascent(),
                    BASELINE_COLOR,
                );
            }
        }
    }

    match mode {
        PreviewMode::Plain | PreviewMode::Boxed => {
            for (i, canvas) in canvases.iter().enumerate() {
                blit_canvas(&mut img, canvas, i as i32 * cw);
            }
        }
        PreviewMode::Packed => {
            for i in 0..table.glyphs.len() {
                let Some(glyph) = table.unpack_glyph(i) else {
                    continue;
                };
                let x_start = i as u32 * cell.width;
                for y in 0..glyph.height() {
                    for x in 0..glyph.width() {
                        if glyph.is_set(x, y) {
                            img.put_pixel(x_start + x, y, INK_COLOR);
                        }
                    }
                }
            }
        }
    }
    img
}

pub fn save_preview(img: &RgbImage, path: &Path) -> Result<(), FontgenError> {
    img.save(path).map_err(|source| FontgenError::Preview {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        "Wrote preview '{}' ({}x{}).",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(())
}
