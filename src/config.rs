//! Run configuration: command-line flags layered over an optional INI file.
//!
//! Precedence is flag > `[Options]` key > built-in default. Enum-valued
//! options parse through the same `FromStr` impls in both layers.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::Parser;
use ini::Ini;
use log::{LevelFilter, debug};

use crate::error::FontgenError;
use crate::font::metrics::HeightPolicy;
use crate::font::raster::{DEFAULT_THRESHOLD, RasterOptions, VerticalAlign};
use crate::preview::PreviewMode;

const CONFIG_PATH: &str = "lcdfont.ini";
const SECTION: &str = "Options";

const DEFAULT_SIZE: u32 = 16;
const DEFAULT_EXTENSION: &str = "c";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Generate fixed-cell monochrome bitmap font tables for STM32 LCD drivers",
    long_about = None
)]
pub struct Args {
    /// Font file (TTF/OTF/TTC)
    #[arg(short, long, value_name = "FILE")]
    pub font: PathBuf,
    /// Font size in pixels
    #[arg(short, long)]
    pub size: Option<u32>,
    /// Typeface index within a font collection
    #[arg(short, long)]
    pub index: Option<u32>,
    /// Display name (defaults to the font family name)
    #[arg(short, long)]
    pub name: Option<String>,
    /// File whose first line replaces the default charset
    #[arg(short, long, value_name = "FILE")]
    pub charset: Option<PathBuf>,
    /// Grayscale threshold, 0-255; brighter pixels become ink
    #[arg(short, long)]
    pub threshold: Option<u8>,
    /// Directory for the generated files
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
    /// Extension of the generated source file
    #[arg(long)]
    pub ext: Option<String>,
    /// Preview image: plain, boxed or packed
    #[arg(long)]
    pub preview: Option<String>,
    /// Vertical placement in the cell: center or top
    #[arg(long)]
    pub align: Option<String>,
    /// Cell height rule: underscore or bottom
    #[arg(long)]
    pub height_policy: Option<String>,
    /// off, error, warn, info, debug or trace
    #[arg(long)]
    pub log_level: Option<String>,
    /// INI file with defaults for the options above
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const fn as_level_filter(self) -> LevelFilter {
        match self {
            Self::Off => LevelFilter::Off,
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub font_path: PathBuf,
    pub size: u32,
    pub index: u32,
    pub name: Option<String>,
    pub charset_path: Option<PathBuf>,
    pub out_dir: PathBuf,
    pub extension: String,
    pub raster: RasterOptions,
    pub preview: PreviewMode,
    pub log_level: LogLevel,
}

/* ======================= LAYERING ======================= */

fn load_ini(explicit: Option<&Path>) -> Result<Option<Ini>, FontgenError> {
    let path = match explicit {
        Some(p) => p,
        None if Path::new(CONFIG_PATH).is_file() => Path::new(CONFIG_PATH),
        None => return Ok(None),
    };
    let ini = Ini::load_from_file(path).map_err(|e| FontgenError::ConfigFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    debug!("Loaded config '{}'.", path.display());
    Ok(Some(ini))
}

/// Parses a flag given as text; `None` when the flag was not passed.
fn parse_flag<T: FromStr>(raw: Option<&str>, option: &'static str) -> Result<Option<T>, FontgenError> {
    raw.map(|v| {
        v.parse::<T>().map_err(|_| FontgenError::InvalidOption {
            option,
            value: v.to_string(),
        })
    })
    .transpose()
}

/// Flag value if present, else the INI value, else `default`.
fn layered<T: FromStr>(
    flag: Option<T>,
    ini_value: Option<&str>,
    option: &'static str,
    default: T,
) -> Result<T, FontgenError> {
    if let Some(v) = flag {
        return Ok(v);
    }
    match ini_value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw.parse::<T>().map_err(|_| FontgenError::InvalidOption {
            option,
            value: raw.to_string(),
        }),
        None => Ok(default),
    }
}

impl Config {
    pub fn resolve(args: Args) -> Result<Self, FontgenError> {
        let ini = load_ini(args.config.as_deref())?;
        let key = |k: &str| ini.as_ref().and_then(|i| i.get_from(Some(SECTION), k));

        let size = layered(args.size, key("Size"), "Size", DEFAULT_SIZE)?;
        if size == 0 {
            return Err(FontgenError::InvalidOption {
                option: "Size",
                value: size.to_string(),
            });
        }
        let index = layered(args.index, key("Index"), "Index", 0)?;
        let threshold = layered(args.threshold, key("Threshold"), "Threshold", DEFAULT_THRESHOLD)?;
        let out_dir = layered(args.out_dir, key("OutDir"), "OutDir", PathBuf::from("."))?;
        let extension = layered(
            args.ext,
            key("Extension"),
            "Extension",
            DEFAULT_EXTENSION.to_string(),
        )?;
        let extension = extension.trim_start_matches('.').to_string();

        let preview = layered(
            parse_flag(args.preview.as_deref(), "--preview")?,
            key("Preview"),
            "Preview",
            PreviewMode::default(),
        )?;
        let align = layered(
            parse_flag(args.align.as_deref(), "--align")?,
            key("Align"),
            "Align",
            VerticalAlign::default(),
        )?;
        let height_policy = layered(
            parse_flag(args.height_policy.as_deref(), "--height-policy")?,
            key("HeightPolicy"),
            "HeightPolicy",
            HeightPolicy::default(),
        )?;
        let log_level = layered(
            parse_flag(args.log_level.as_deref(), "--log-level")?,
            key("LogLevel"),
            "LogLevel",
            LogLevel::default(),
        )?;

        Ok(Self {
            font_path: args.font,
            size,
            index,
            name: args.name.filter(|n| !n.trim().is_empty()),
            charset_path: args.charset,
            out_dir,
            extension,
            raster: RasterOptions {
                threshold,
                align,
                height_policy,
            },
            preview,
            log_level,
        })
    }
}
