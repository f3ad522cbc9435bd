use std::fmt;
use std::path::PathBuf;

/// Broad classification used when reporting a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad user input, caught before any output exists.
    Config,
    /// Logic defect in the packer. The table would be misaligned.
    Invariant,
    /// Failure writing an output file.
    Io,
}

impl ErrorKind {
    const fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "configuration error",
            Self::Invariant => "internal invariant violated",
            Self::Io => "I/O error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub enum FontgenError {
    FontRead {
        path: PathBuf,
        source: std::io::Error,
    },
    FontParse {
        path: PathBuf,
        index: u32,
        reason: String,
    },
    CharsetRead {
        path: PathBuf,
        source: std::io::Error,
    },
    ConfigFile {
        path: PathBuf,
        reason: String,
    },
    InvalidOption {
        option: &'static str,
        value: String,
    },
    OffsetMismatch {
        glyph_index: usize,
        expected: usize,
        actual: usize,
    },
    RowLength {
        bits: usize,
        width: u32,
    },
    GlyphSize {
        grapheme: String,
        width: u32,
        height: u32,
        cell_width: u32,
        cell_height: u32,
    },
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    Preview {
        path: PathBuf,
        source: image::ImageError,
    },
}

impl FontgenError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::FontRead { .. }
            | Self::FontParse { .. }
            | Self::CharsetRead { .. }
            | Self::ConfigFile { .. }
            | Self::InvalidOption { .. } => ErrorKind::Config,
            Self::OffsetMismatch { .. } | Self::RowLength { .. } | Self::GlyphSize { .. } => {
                ErrorKind::Invariant
            }
            Self::Write { .. } | Self::Preview { .. } => ErrorKind::Io,
        }
    }
}

impl fmt::Display for FontgenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.kind())?;
        match self {
            Self::FontRead { path, source } => {
                write!(f, "cannot read font '{}': {source}", path.display())
            }
            Self::FontParse {
                path,
                index,
                reason,
            } => write!(
                f,
                "cannot load typeface #{index} from '{}': {reason}",
                path.display()
            ),
            Self::CharsetRead { path, source } => {
                write!(f, "cannot read charset file '{}': {source}", path.display())
            }
            Self::ConfigFile { path, reason } => {
                write!(f, "bad config file '{}': {reason}", path.display())
            }
            Self::InvalidOption { option, value } => {
                write!(f, "invalid value '{value}' for {option}")
            }
            Self::OffsetMismatch {
                glyph_index,
                expected,
                actual,
            } => write!(
                f,
                "glyph {glyph_index} should start at byte {expected} but {actual} bytes were emitted"
            ),
            Self::RowLength { bits, width } => {
                write!(f, "row of {bits} bits does not match the {width}-pixel cell")
            }
            Self::GlyphSize {
                grapheme,
                width,
                height,
                cell_width,
                cell_height,
            } => write!(
                f,
                "glyph {grapheme:?} is {width}x{height} but the cell is {cell_width}x{cell_height}"
            ),
            Self::Write { path, source } => {
                write!(f, "cannot write '{}': {source}", path.display())
            }
            Self::Preview { path, source } => {
                write!(f, "cannot save preview '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for FontgenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FontRead { source, .. }
            | Self::CharsetRead { source, .. }
            | Self::Write { source, .. } => Some(source),
            Self::Preview { source, .. } => Some(source),
            _ => None,
        }
    }
}
