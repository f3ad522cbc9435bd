//! C source emitter for the STM32 LCD `sFONT` descriptor.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use log::info;

use crate::error::FontgenError;
use crate::font::pack::FontTable;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const LISTING_INDENT: &str = "    ";

/// Everything the driver descriptor needs.
#[derive(Debug, Clone)]
pub struct FontArtifact {
    pub name: String,
    pub table: FontTable,
}

impl FontArtifact {
    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.table.cell.width
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.table.cell.height
    }

    pub fn identifier(&self) -> String {
        identifier(&self.name, self.height())
    }
}

/// `Font<name><height>` reduced to ASCII alphanumerics.
pub fn identifier(name: &str, height: u32) -> String {
    format!("Font{name}{height}")
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

pub fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Indents every line holding non-whitespace; blank lines stay as they are.
fn indent_listing(listing: &str) -> String {
    let mut out = String::with_capacity(listing.len() + listing.len() / 4);
    for line in listing.split_inclusive('\n') {
        if !line.trim().is_empty() {
            out.push_str(LISTING_INDENT);
        }
        out.push_str(line);
    }
    out
}

/// Renders the complete source file. Pure in (`artifact`, `generated_at`).
pub fn render_source(artifact: &FontArtifact, generated_at: &str) -> String {
    let id = artifact.identifier();
    let name = &artifact.name;
    let h = artifact.height();
    let w = artifact.width();
    let count = artifact.table.bytes.len();
    let data = indent_listing(&artifact.table.listing);
    format!(
        "/**\n\
         \x20* This file provides '{name}' [{h}px] text font\n\
         \x20* for STM32xx-EVAL's LCD driver.\n\
         \x20*\n\
         \x20* Generated on {generated_at}\n\
         \x20*/\n\
         #pragma once\n\
         \n\
         #include \"fonts.h\"\n\
         \n\
         //#define {id}_Name (\"{name} {h}px\")\n\
         \n\
         // {count} bytes\n\
         const uint8_t {id}_Table [] = {{{data}}};\n\
         \n\
         sFONT {id} = {{\n\
         \x20   {id}_Table,\n\
         \x20   {w}, /* Width */\n\
         \x20   {h}, /* Height */\n\
         }};\n"
    )
}

/// Creates (or truncates) `path` and writes `contents` in one scoped operation.
pub fn write_source(path: &Path, contents: &str) -> Result<(), FontgenError> {
    let wrap = |source| FontgenError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(wrap)?;
    let mut out = BufWriter::new(file);
    out.write_all(contents.as_bytes()).map_err(wrap)?;
    out.flush().map_err(wrap)?;
    Ok(())
}

/// Renders and writes `<dir>/<identifier>.<ext>`, returning the path.
pub fn emit(
    artifact: &FontArtifact,
    dir: &Path,
    extension: &str,
    generated_at: &str,
) -> Result<PathBuf, FontgenError> {
    let path = dir.join(format!("{}.{}", artifact.identifier(), extension));
    let source = render_source(artifact, generated_at);
    write_source(&path, &source)?;
    info!(
        "Wrote '{}' ({} glyphs, {} bytes).",
        path.display(),
        artifact.table.glyphs.len(),
        artifact.table.bytes.len()
    );
    Ok(path)
}
