//! `fontdue`-backed font engine.
//!
//! Graphemes go through `fontdue`'s layout so clusters of several codepoints
//! (base + combining marks) are positioned together, then each positioned
//! glyph is rasterized and composited. The family name comes straight from
//! the `name` table via `ttf-parser`, since `fontdue` only exposes the full
//! name.

use std::fs;
use std::path::Path;

use fontdue::layout::{CoordinateSystem, GlyphPosition, Layout, LayoutSettings, TextStyle};
use fontdue::{Font, FontSettings};
use image::GrayImage;
use log::{debug, trace};
use ttf_parser::name_id;

use super::{FontEngine, InkBox, plot_max};
use crate::error::FontgenError;

pub struct FontdueEngine {
    font: Font,
    family: Option<String>,
    px: f32,
    ascent: i32,
}

/// Typographic family (name ID 16) when present, else the legacy family (ID 1).
fn read_family(data: &[u8], index: u32) -> Option<String> {
    let face = ttf_parser::Face::parse(data, index).ok()?;
    let lookup = |id: u16| {
        face.names()
            .into_iter()
            .filter(|n| n.name_id == id)
            .filter_map(|n| n.to_string())
            .map(|n| n.trim().to_owned())
            .find(|n| !n.is_empty())
    };
    lookup(name_id::TYPOGRAPHIC_FAMILY).or_else(|| lookup(name_id::FAMILY))
}

impl FontdueEngine {
    /// Loads face `index` of `path` at `size` pixels.
    pub fn load(path: &Path, size: u32, index: u32) -> Result<Self, FontgenError> {
        if size == 0 {
            return Err(FontgenError::InvalidOption {
                option: "--size",
                value: size.to_string(),
            });
        }
        let bytes = fs::read(path).map_err(|source| FontgenError::FontRead {
            path: path.to_path_buf(),
            source,
        })?;
        let family = read_family(&bytes, index);
        let px = size as f32;
        let settings = FontSettings {
            collection_index: index,
            scale: px,
            ..FontSettings::default()
        };
        let font = Font::from_bytes(bytes, settings).map_err(|reason| FontgenError::FontParse {
            path: path.to_path_buf(),
            index,
            reason: reason.to_string(),
        })?;
        let ascent = font
            .horizontal_line_metrics(px)
            .map_or(size as i32, |m| m.ascent.round() as i32);
        debug!(
            "Loaded '{}' #{} at {}px: family {:?}, {} glyphs, ascent {}.",
            path.display(),
            index,
            size,
            family,
            font.glyph_count(),
            ascent
        );
        Ok(Self {
            font,
            family,
            px,
            ascent,
        })
    }

    /// Family name from the font's name table, if it carries one.
    pub fn family_name(&self) -> Option<&str> {
        self.family.as_deref()
    }

    fn layout(&self, grapheme: &str) -> Vec<GlyphPosition> {
        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings::default());
        layout.append(&[&self.font], &TextStyle::new(grapheme, self.px, 0));
        layout.glyphs().clone()
    }
}

impl FontEngine for FontdueEngine {
    fn ink_box(&self, grapheme: &str) -> InkBox {
        let ink = self
            .layout(grapheme)
            .iter()
            .filter(|g| g.width > 0 && g.height > 0)
            .fold(InkBox::default(), |acc, g| {
                let left = g.x.floor() as i32;
                let top = g.y.floor() as i32;
                acc.union(InkBox::new(
                    left,
                    top,
                    left + g.width as i32,
                    top + g.height as i32,
                ))
            });
        trace!("ink_box({:?}) = {:?}", grapheme, ink);
        ink
    }

    fn ascent(&self) -> i32 {
        self.ascent
    }

    fn draw(&self, grapheme: &str, canvas: &mut GrayImage, origin: (i32, i32)) {
        for glyph in self.layout(grapheme) {
            if glyph.width == 0 || glyph.height == 0 {
                continue;
            }
            let (metrics, coverage) = self.font.rasterize_config(glyph.key);
            let x0 = origin.0 + glyph.x.floor() as i32;
            let y0 = origin.1 + glyph.y.floor() as i32;
            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let value = coverage[row * metrics.width + col];
                    if value != 0 {
                        plot_max(canvas, x0 + col as i32, y0 + row as i32, value);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FontdueEngine, read_family};
    use crate::error::ErrorKind;
    use crate::font::charset::CharacterSet;
    use crate::font::metrics::{HeightPolicy, probe_cell_size};
    use crate::font::raster::{VerticalAlign, place, render_cell};
    use crate::font::{FontEngine, InkBox};
    use image::GrayImage;
    use std::fs;
    use std::path::Path;

    const DEJAVU_DIR: &str = "/usr/share/fonts/truetype/dejavu";

    /// Loads a system DejaVu face, or `None` (test skipped) when not installed.
    fn dejavu(file: &str, size: u32) -> Option<FontdueEngine> {
        let path = Path::new(DEJAVU_DIR).join(file);
        if !path.is_file() {
            eprintln!("skipping: {} not installed", path.display());
            return None;
        }
        Some(FontdueEngine::load(&path, size, 0).expect("DejaVu loads"))
    }

    /// Bounding box of pixels with any coverage.
    fn coverage_box(canvas: &GrayImage) -> InkBox {
        canvas
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] != 0)
            .fold(InkBox::default(), |acc, (x, y, _)| {
                let (x, y) = (x as i32, y as i32);
                acc.union(InkBox::new(x, y, x + 1, y + 1))
            })
    }

    #[test]
    fn zero_size_is_rejected_before_reading() {
        let err = FontdueEngine::load(Path::new("does-not-matter.ttf"), 0, 0)
            .err()
            .expect("size 0 must fail");
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn missing_font_is_a_config_error() {
        let err = FontdueEngine::load(Path::new("/nonexistent/lcdfont/missing.ttf"), 16, 0)
            .err()
            .expect("missing font must fail");
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("missing.ttf"));
    }

    #[test]
    fn garbage_font_is_a_config_error() {
        let path = std::env::temp_dir().join(format!("lcdfont-garbage-{}.ttf", std::process::id()));
        fs::write(&path, b"definitely not a font").expect("write garbage");
        let result = FontdueEngine::load(&path, 16, 0);
        let _ = fs::remove_file(&path);
        let err = result.err().expect("garbage must fail to parse");
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(read_family(b"definitely not a font", 0), None);
    }

    #[test]
    fn family_name_drops_the_style() {
        let Some(bold) = dejavu("DejaVuSansMono-Bold.ttf", 19) else {
            return;
        };
        assert_eq!(bold.family_name(), Some("DejaVu Sans Mono"));
        let Some(regular) = dejavu("DejaVuSansMono.ttf", 19) else {
            return;
        };
        assert_eq!(regular.family_name(), bold.family_name());
    }

    #[test]
    fn drawn_ink_lands_inside_the_placed_box() {
        let Some(engine) = dejavu("DejaVuSansMono.ttf", 16) else {
            return;
        };
        let set = CharacterSet::from_text("Ag_");
        let cell = probe_cell_size(&engine, &set, HeightPolicy::BottomExtent);
        for g in set.iter() {
            let ink = engine.ink_box(g);
            assert!(!ink.is_empty(), "{g:?} has ink");
            let placement = place(ink, cell, VerticalAlign::Center);
            assert!(!placement.clamped, "{g:?} fits its cell");
            let (ox, oy) = placement.origin;
            let placed = InkBox::new(ox + ink.left, oy + ink.top, ox + ink.right, oy + ink.bottom);
            assert_eq!(placed.left, (cell.width as i32 - ink.width()) / 2, "{g:?} x margin");
            assert_eq!(placed.top, (cell.height as i32 - ink.height()) / 2, "{g:?} y margin");

            let drawn = coverage_box(&render_cell(&engine, g, cell, VerticalAlign::Center));
            assert_eq!(drawn.union(placed), placed, "{g:?} drew outside {placed:?}: {drawn:?}");
            for (edge, d, p) in [
                ("left", drawn.left, placed.left),
                ("top", drawn.top, placed.top),
                ("right", drawn.right, placed.right),
                ("bottom", drawn.bottom, placed.bottom),
            ] {
                assert!((d - p).abs() <= 1, "{g:?} {edge} edge: drawn {d}, placed {p}");
            }
        }
    }

    #[test]
    fn combining_sequence_is_laid_out_as_one_unit() {
        let Some(engine) = dejavu("DejaVuSansMono.ttf", 16) else {
            return;
        };
        let base = engine.ink_box("e");
        let accented = engine.ink_box("e\u{0301}");
        assert!(accented.top < base.top, "acute adds ink above the e");
        assert_eq!(accented.bottom, base.bottom);
        assert!(accented.left <= base.left && accented.right >= base.right);
    }
}
