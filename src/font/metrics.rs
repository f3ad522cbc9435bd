use std::str::FromStr;

use log::{debug, info};

use super::charset::CharacterSet;
use super::{CellSize, FontEngine};

/// Graphemes that sit below the baseline and would otherwise inflate the cell.
const INK_HEIGHT_GRAPHEMES: &[&str] = &["_"];

/// How each grapheme contributes to the cell height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeightPolicy {
    /// Bottom extent, except the underscore which contributes its ink height.
    #[default]
    UnderscoreInkHeight,
    /// Bottom extent for every grapheme.
    BottomExtent,
}

impl HeightPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UnderscoreInkHeight => "underscore",
            Self::BottomExtent => "bottom",
        }
    }
}

impl FromStr for HeightPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "underscore" | "ink" => Ok(Self::UnderscoreInkHeight),
            "bottom" | "extent" => Ok(Self::BottomExtent),
            _ => Err(()),
        }
    }
}

/// Smallest cell holding every glyph of `charset` without clipping.
///
/// Width is the largest right extent, height the largest bottom extent (or ink
/// height for graphemes covered by `policy`). Both are floored at zero, so an
/// empty set yields a 0x0 cell.
pub fn probe_cell_size<E: FontEngine>(
    engine: &E,
    charset: &CharacterSet,
    policy: HeightPolicy,
) -> CellSize {
    let mut width = 0i32;
    let mut height = 0i32;
    for grapheme in charset.iter() {
        let ink = engine.ink_box(grapheme);
        let contribution = match policy {
            HeightPolicy::UnderscoreInkHeight
                if INK_HEIGHT_GRAPHEMES.iter().any(|g| *g == grapheme) =>
            {
                ink.height()
            }
            _ => ink.bottom,
        };
        debug!(
            "metrics {:?}: box=({},{},{},{}) height contribution {}",
            grapheme, ink.left, ink.top, ink.right, ink.bottom, contribution
        );
        width = width.max(ink.right);
        height = height.max(contribution);
    }
    let cell = CellSize {
        width: width.max(0) as u32,
        height: height.max(0) as u32,
    };
    info!(
        "Cell size {}x{} over {} glyphs (height policy '{}').",
        cell.width,
        cell.height,
        charset.len(),
        policy.as_str()
    );
    cell
}

#[cfg(test)]
mod tests {
    use super::{HeightPolicy, probe_cell_size};
    use crate::font::charset::CharacterSet;
    use crate::font::testing::BlockEngine;
    use crate::font::{CellSize, InkBox};

    #[test]
    fn cell_is_max_right_and_max_bottom() {
        let engine = BlockEngine::new(&[
            ("A", InkBox::new(0, 0, 5, 8)),
            ("B", InkBox::new(0, 0, 4, 8)),
        ]);
        let cell = probe_cell_size(
            &engine,
            &CharacterSet::from_text("AB"),
            HeightPolicy::default(),
        );
        assert_eq!(
            cell,
            CellSize {
                width: 5,
                height: 8
            }
        );
    }

    #[test]
    fn underscore_contributes_ink_height() {
        let engine = BlockEngine::new(&[("_", InkBox::new(0, 12, 7, 14))]);
        let set = CharacterSet::from_text("_");
        let cell = probe_cell_size(&engine, &set, HeightPolicy::UnderscoreInkHeight);
        assert_eq!(cell.height, 2, "ink height, not bottom extent");
        assert_eq!(cell.width, 7);

        let cell = probe_cell_size(&engine, &set, HeightPolicy::BottomExtent);
        assert_eq!(cell.height, 14);
    }

    #[test]
    fn underscore_policy_leaves_other_descenders_alone() {
        let engine = BlockEngine::new(&[
            ("g", InkBox::new(1, 4, 6, 13)),
            ("_", InkBox::new(0, 14, 8, 15)),
        ]);
        let cell = probe_cell_size(
            &engine,
            &CharacterSet::from_text("g_"),
            HeightPolicy::UnderscoreInkHeight,
        );
        assert_eq!(
            cell,
            CellSize {
                width: 8,
                height: 13
            }
        );
    }

    #[test]
    fn empty_and_inkless_sets_give_zero_cell() {
        let engine = BlockEngine::new(&[]);
        let empty = probe_cell_size(&engine, &CharacterSet::from_text(""), HeightPolicy::default());
        assert_eq!(empty, CellSize::default());
        let spaces = probe_cell_size(&engine, &CharacterSet::from_text("  "), HeightPolicy::default());
        assert_eq!(spaces, CellSize::default());
    }

    #[test]
    fn policy_names_round_trip() {
        for policy in [HeightPolicy::UnderscoreInkHeight, HeightPolicy::BottomExtent] {
            assert_eq!(policy.as_str().parse::<HeightPolicy>(), Ok(policy));
        }
        assert!("sideways".parse::<HeightPolicy>().is_err());
    }
}
