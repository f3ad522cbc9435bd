//! Glyph pipeline: charset splitting, metrics probing, rasterization and packing.
//!
//! Everything here talks to the typeface through [`FontEngine`], so the core
//! never depends on which rasterizer backs it.

pub mod charset;
pub mod engine;
pub mod metrics;
pub mod pack;
pub mod raster;

use image::GrayImage;

/* ======================= TYPES ======================= */

/// Tight box around a glyph's ink, in pixels.
///
/// Coordinates are relative to the drawing origin: the top-left corner of the
/// text line, y growing downward, baseline at [`FontEngine::ascent`].
/// A grapheme without ink reports the zero box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InkBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl InkBox {
    #[inline(always)]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[inline(always)]
    pub fn width(&self) -> i32 {
        (self.right - self.left).max(0)
    }

    #[inline(always)]
    pub fn height(&self) -> i32 {
        (self.bottom - self.top).max(0)
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Smallest box covering both; an empty side is ignored.
    #[inline(always)]
    pub fn union(self, other: InkBox) -> InkBox {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        InkBox {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

/// The uniform cell every glyph of a table is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellSize {
    pub width: u32,
    pub height: u32,
}

/* ======================= ENGINE ======================= */

/// Font engine capabilities the pipeline needs.
pub trait FontEngine {
    /// Ink box of one grapheme at the loaded size.
    fn ink_box(&self, grapheme: &str) -> InkBox;

    /// Distance from the line top to the baseline.
    fn ascent(&self) -> i32;

    /// Draws `grapheme` with its line origin at `origin`. Coverage is written
    /// as intensity, keeping the brighter value where glyphs overlap. Pixels
    /// outside the canvas are dropped.
    fn draw(&self, grapheme: &str, canvas: &mut GrayImage, origin: (i32, i32));
}

/// Writes `coverage` at `(x, y)` if it lands on the canvas, keeping the max.
#[inline(always)]
pub(crate) fn plot_max(canvas: &mut GrayImage, x: i32, y: i32, coverage: u8) {
    if x < 0 || y < 0 || x >= canvas.width() as i32 || y >= canvas.height() as i32 {
        return;
    }
    let px = canvas.get_pixel_mut(x as u32, y as u32);
    if coverage > px.0[0] {
        px.0[0] = coverage;
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{FontEngine, InkBox, plot_max};
    use image::GrayImage;
    use std::cell::Cell;
    use std::collections::HashMap;

    /// Engine whose glyphs are solid rectangles filling their ink box.
    pub struct BlockEngine {
        pub boxes: HashMap<String, InkBox>,
        pub intensity: u8,
        pub ascent: i32,
        /// Number of `draw` calls so far.
        pub draws: Cell<usize>,
    }

    impl BlockEngine {
        pub fn new(glyphs: &[(&str, InkBox)]) -> Self {
            Self {
                boxes: glyphs
                    .iter()
                    .map(|(g, b)| ((*g).to_string(), *b))
                    .collect(),
                intensity: 255,
                ascent: 0,
                draws: Cell::new(0),
            }
        }
    }

    impl FontEngine for BlockEngine {
        fn ink_box(&self, grapheme: &str) -> InkBox {
            self.boxes.get(grapheme).copied().unwrap_or_default()
        }

        fn ascent(&self) -> i32 {
            self.ascent
        }

        fn draw(&self, grapheme: &str, canvas: &mut GrayImage, origin: (i32, i32)) {
            self.draws.set(self.draws.get() + 1);
            let b = self.ink_box(grapheme);
            for y in b.top..b.bottom {
                for x in b.left..b.right {
                    plot_max(canvas, origin.0 + x, origin.1 + y, self.intensity);
                }
            }
        }
    }
}
