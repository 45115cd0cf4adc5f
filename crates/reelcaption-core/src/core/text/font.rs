//! fontdue-backed font face with system-default and built-in fallbacks.

use std::fmt;
use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};
use tracing::{info, warn};

use super::{GlyphMask, TextExtent, TextMeasurer, TextRasterizer};
use crate::core::{CoreError, CoreResult};

/// Last-resort face (Tuffy, public domain)
static BUILTIN_FONT: &[u8] = include_bytes!("../../../assets/fonts/Tuffy.ttf");

/// Where a loaded face came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontSource {
    /// Font file supplied by configuration
    File(PathBuf),
    /// System sans-serif face located through fontdb
    SystemDefault { family: String },
    /// Face embedded in the library
    Builtin,
    /// Raw bytes supplied by the caller
    Memory,
}

impl fmt::Display for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::SystemDefault { family } => write!(f, "system default ({family})"),
            Self::Builtin => write!(f, "built-in Tuffy"),
            Self::Memory => write!(f, "in-memory font"),
        }
    }
}

/// A single font face used for both measurement and rasterization
pub struct FontFace {
    font: Font,
    source: FontSource,
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFace")
            .field("source", &self.source)
            .finish()
    }
}

/// One glyph positioned on a single text line
struct PlacedGlyph {
    ch: char,
    x: f32,
}

/// Horizontal layout of a line plus its ink extents
struct LineLayout {
    glyphs: Vec<PlacedGlyph>,
    width: u32,
    ascent: i32,
    descent: i32,
}

impl FontFace {
    /// Parses a face from raw font bytes
    pub fn from_bytes(bytes: &[u8], source: FontSource) -> CoreResult<Self> {
        Self::from_bytes_indexed(bytes, 0, source)
    }

    fn from_bytes_indexed(bytes: &[u8], index: u32, source: FontSource) -> CoreResult<Self> {
        let settings = FontSettings {
            collection_index: index,
            ..FontSettings::default()
        };
        let font = Font::from_bytes(bytes, settings).map_err(|reason| CoreError::FontLoadFailed {
            path: source.to_string(),
            reason: reason.to_string(),
        })?;
        Ok(Self { font, source })
    }

    /// Loads a face from a font file
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| CoreError::FontLoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_bytes(&bytes, FontSource::File(path.to_path_buf()))
    }

    /// Locates the system sans-serif face, or any installed face if the
    /// generic family does not resolve.
    pub fn system_default() -> CoreResult<Self> {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();

        let query = fontdb::Query {
            families: &[fontdb::Family::SansSerif],
            ..fontdb::Query::default()
        };
        let id = db
            .query(&query)
            .or_else(|| db.faces().next().map(|face| face.id))
            .ok_or(CoreError::FontUnavailable)?;

        let family = db
            .face(id)
            .and_then(|face| face.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_else(|| "unknown".to_string());

        db.with_face_data(id, |data, index| {
            Self::from_bytes_indexed(data, index, FontSource::SystemDefault { family })
        })
        .ok_or(CoreError::FontUnavailable)?
    }

    /// Face compiled into the binary, always loadable
    pub fn builtin() -> CoreResult<Self> {
        Self::from_bytes(BUILTIN_FONT, FontSource::Builtin)
    }

    /// Loads the configured font, falling back to the system default and
    /// then to the built-in face.
    ///
    /// A failure of the configured or system font is logged, never
    /// returned. `FontUnavailable` means even the built-in face failed.
    pub fn load_or_default(path: Option<&Path>) -> CoreResult<Self> {
        Self::load_with_fallbacks(path, Self::system_default)
    }

    fn load_with_fallbacks(
        path: Option<&Path>,
        system: impl FnOnce() -> CoreResult<Self>,
    ) -> CoreResult<Self> {
        if let Some(path) = path {
            match Self::from_file(path) {
                Ok(face) => {
                    info!("Loaded caption font {}", path.display());
                    return Ok(face);
                }
                Err(e) => warn!("{}; falling back to system default font", e),
            }
        }

        match system() {
            Ok(face) => {
                info!("Using {}", face.source);
                return Ok(face);
            }
            Err(e) => warn!("System default font unavailable: {}; using built-in font", e),
        }

        Self::builtin().map_err(|e| {
            warn!("Built-in font failed to load: {}", e);
            CoreError::FontUnavailable
        })
    }

    /// Where this face was loaded from
    pub fn source(&self) -> &FontSource {
        &self.source
    }

    fn check_size(font_size: f32) -> CoreResult<()> {
        if !font_size.is_finite() || font_size <= 0.0 {
            return Err(CoreError::MeasurementFailed(format!(
                "invalid font size {font_size}"
            )));
        }
        Ok(())
    }

    fn layout_line(&self, text: &str, font_size: f32) -> LineLayout {
        let mut glyphs = Vec::with_capacity(text.len());
        let mut cursor = 0.0f32;
        let mut ascent = 0i32;
        let mut descent = 0i32;
        let mut prev: Option<char> = None;

        for ch in text.chars() {
            if let Some(kern) = prev.and_then(|p| self.font.horizontal_kern(p, ch, font_size)) {
                cursor += kern;
            }
            let metrics = self.font.metrics(ch, font_size);
            if metrics.width > 0 && metrics.height > 0 {
                ascent = ascent.max(metrics.height as i32 + metrics.ymin);
                descent = descent.max(-metrics.ymin);
            }
            glyphs.push(PlacedGlyph { ch, x: cursor });
            cursor += metrics.advance_width;
            prev = Some(ch);
        }

        LineLayout {
            glyphs,
            width: cursor.max(0.0).ceil() as u32,
            ascent,
            descent,
        }
    }
}

impl TextMeasurer for FontFace {
    fn measure(&self, text: &str, font_size: f32) -> CoreResult<TextExtent> {
        Self::check_size(font_size)?;
        if let Some(ch) = text
            .chars()
            .find(|c| !c.is_whitespace() && self.font.lookup_glyph_index(*c) == 0)
        {
            return Err(CoreError::MeasurementFailed(format!(
                "{} has no glyph for {:?}",
                self.source, ch
            )));
        }
        let line = self.layout_line(text, font_size);
        Ok(TextExtent::new(
            line.width,
            (line.ascent + line.descent).max(0) as u32,
        ))
    }
}

impl TextRasterizer for FontFace {
    fn rasterize(&self, text: &str, font_size: f32) -> CoreResult<GlyphMask> {
        Self::check_size(font_size)?;
        let line = self.layout_line(text, font_size);
        let height = (line.ascent + line.descent).max(0) as u32;
        let mut mask = GlyphMask::new(line.width, height);

        for glyph in &line.glyphs {
            let (metrics, bitmap) = self.font.rasterize(glyph.ch, font_size);
            if metrics.width == 0 || metrics.height == 0 {
                continue;
            }
            let gx0 = (glyph.x + metrics.xmin as f32).round() as i64;
            let gy0 = (line.ascent - (metrics.height as i32 + metrics.ymin)) as i64;
            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let value = bitmap[gy * metrics.width + gx];
                    if value > 0 {
                        mask.merge(gx0 + gx as i64, gy0 + gy as i64, value);
                    }
                }
            }
        }

        Ok(mask)
    }
}
