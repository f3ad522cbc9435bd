//! The generation pipeline: split, probe, rasterize and pack, emit, preview.

use std::fs;
use std::path::PathBuf;

use image::GrayImage;
use log::{info, warn};

use crate::config::Config;
use crate::emit::{self, FontArtifact};
use crate::error::FontgenError;
use crate::font::charset::CharacterSet;
use crate::font::engine::FontdueEngine;
use crate::font::metrics::probe_cell_size;
use crate::font::pack::{FontTable, TableBuilder};
use crate::font::FontEngine;
use crate::font::raster::{RasterOptions, rasterize};
use crate::preview;

/// Paths written by a successful run.
#[derive(Debug, Clone)]
pub struct Outputs {
    pub table: PathBuf,
    pub preview: PathBuf,
}

/// The packed table plus the grayscale cells it was thresholded from.
#[derive(Debug, Clone)]
pub struct RenderedFont {
    pub table: FontTable,
    pub canvases: Vec<GrayImage>,
}

/// Rasterizes and packs every grapheme of `charset`, in order. Each glyph is
/// drawn exactly once.
pub fn build_font<E: FontEngine>(
    engine: &E,
    charset: &CharacterSet,
    opts: &RasterOptions,
) -> Result<RenderedFont, FontgenError> {
    let cell = probe_cell_size(engine, charset, opts.height_policy);
    let mut builder = TableBuilder::new(cell);
    let mut canvases = Vec::with_capacity(charset.len());
    for grapheme in charset.iter() {
        let rendered = rasterize(engine, grapheme, cell, opts);
        builder.push(grapheme, &rendered.glyph)?;
        canvases.push(rendered.canvas);
    }
    Ok(RenderedFont {
        table: builder.finish(),
        canvases,
    })
}

fn display_name(cfg: &Config, engine: &FontdueEngine) -> String {
    if let Some(name) = &cfg.name {
        return name.clone();
    }
    if let Some(family) = engine.family_name() {
        return family.to_owned();
    }
    let stem = cfg
        .font_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Font".to_string());
    warn!("Font has no family name; using '{}'.", stem);
    stem
}

pub fn run(cfg: &Config) -> Result<Outputs, FontgenError> {
    let charset = match &cfg.charset_path {
        Some(path) => CharacterSet::from_file(path)?,
        None => CharacterSet::default(),
    };
    if charset.is_empty() {
        warn!("Charset is empty; the table will hold no glyphs.");
    }
    let engine = FontdueEngine::load(&cfg.font_path, cfg.size, cfg.index)?;
    let name = display_name(cfg, &engine);
    info!(
        "Generating '{}' from '{}' (size {}, face {}, {} glyphs, threshold {}, align {}, preview {}).",
        name,
        cfg.font_path.display(),
        cfg.size,
        cfg.index,
        charset.len(),
        cfg.raster.threshold,
        cfg.raster.align.as_str(),
        cfg.preview.as_str()
    );

    let RenderedFont { table, canvases } = build_font(&engine, &charset, &cfg.raster)?;
    let image = preview::render_preview(
        &engine,
        &charset,
        &table,
        &canvases,
        cfg.raster.align,
        cfg.preview,
    );
    let artifact = FontArtifact { name, table };

    let table_path = emit::emit(&artifact, &cfg.out_dir, &cfg.extension, &emit::timestamp())?;
    let preview_path = cfg.out_dir.join(format!("{}.png", artifact.identifier()));
    if let Err(e) = preview::save_preview(&image, &preview_path) {
        // table and preview ship together
        if let Err(rm) = fs::remove_file(&table_path) {
            warn!("Could not remove '{}': {rm}", table_path.display());
        }
        return Err(e);
    }

    Ok(Outputs {
        table: table_path,
        preview: preview_path,
    })
}

#[cfg(test)]
mod tests {
    use super::build_font;
    use crate::emit::{FontArtifact, render_source};
    use crate::font::charset::CharacterSet;
    use crate::font::raster::{RasterOptions, VerticalAlign};
    use crate::font::testing::BlockEngine;
    use crate::font::{CellSize, InkBox};
    use crate::preview::{PreviewMode, render_preview};

    fn ab_engine() -> BlockEngine {
        BlockEngine::new(&[
            ("A", InkBox::new(0, 0, 5, 8)),
            ("B", InkBox::new(0, 0, 4, 8)),
            ("_", InkBox::new(0, 10, 5, 11)),
            ("e\u{0301}", InkBox::new(1, 0, 4, 8)),
        ])
    }

    #[test]
    fn two_glyph_table_layout() {
        let table = build_font(
            &ab_engine(),
            &CharacterSet::from_text("AB"),
            &RasterOptions::default(),
        )
        .unwrap()
        .table;
        assert_eq!(
            table.cell,
            CellSize {
                width: 5,
                height: 8
            }
        );
        assert_eq!(table.bytes_per_line, 1);
        assert_eq!(table.glyph_bytes(0), Some(&[0xF8u8; 8][..]));
        assert_eq!(table.glyph_bytes(1), Some(&[0xF0u8; 8][..]));
        assert_eq!(table.bytes.len(), 16);
    }

    #[test]
    fn every_glyph_starts_at_its_index_offset() {
        let set = CharacterSet::from_text("ABA_Be\u{0301}");
        let table = build_font(&ab_engine(), &set, &RasterOptions::default())
            .unwrap()
            .table;
        assert_eq!(table.glyphs.len(), 6, "combining sequence is one glyph");
        let per_glyph = table.bytes_per_line * table.cell.height as usize;
        for (i, entry) in table.glyphs.iter().enumerate() {
            assert_eq!(entry.offset, i * per_glyph, "glyph {i}");
        }
        assert_eq!(table.bytes.len(), set.len() * per_glyph);
        assert_eq!(table.glyph_bytes(0), table.glyph_bytes(2), "duplicates repeat data");
    }

    #[test]
    fn empty_charset_yields_empty_table() {
        let font = build_font(
            &ab_engine(),
            &CharacterSet::from_text(""),
            &RasterOptions::default(),
        )
        .unwrap();
        assert!(font.table.glyphs.is_empty());
        assert!(font.table.bytes.is_empty());
        assert!(font.canvases.is_empty());
    }

    #[test]
    fn identical_inputs_give_identical_sources() {
        let opts = RasterOptions {
            align: VerticalAlign::Top,
            ..RasterOptions::default()
        };
        let render = || {
            let table = build_font(&ab_engine(), &CharacterSet::from_text("A_B"), &opts)
                .unwrap()
                .table;
            render_source(
                &FontArtifact {
                    name: "Block".to_string(),
                    table,
                },
                "fixed",
            )
        };
        assert_eq!(render(), render());
    }

    #[test]
    fn packed_rows_unpack_to_rasterized_cells() {
        let engine = ab_engine();
        let set = CharacterSet::from_text("AB_");
        let opts = RasterOptions::default();
        let table = build_font(&engine, &set, &opts).unwrap().table;
        for (i, g) in set.iter().enumerate() {
            let expected = crate::font::raster::rasterize(&engine, g, table.cell, &opts).glyph;
            assert_eq!(table.unpack_glyph(i), Some(expected), "glyph {g:?}");
        }
    }

    #[test]
    fn each_glyph_is_drawn_once_for_table_and_preview() {
        let engine = ab_engine();
        let set = CharacterSet::from_text("AB_A");
        let font = build_font(&engine, &set, &RasterOptions::default()).unwrap();
        let _ = render_preview(
            &engine,
            &set,
            &font.table,
            &font.canvases,
            VerticalAlign::Center,
            PreviewMode::Boxed,
        );
        assert_eq!(font.canvases.len(), set.len());
        assert_eq!(engine.draws.get(), set.len(), "one draw per glyph, so one clamp warning");
    }
}
