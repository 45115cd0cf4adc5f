//! Caption Rendering
//!
//! Converts caption groups into bordered text bitmaps on a transparent
//! background, together with their placement on the video frame.

mod layout;

pub use layout::CaptionRenderer;

use std::path::{Path, PathBuf};

use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::core::captions::{CaptionGroup, Color};
use crate::core::{fs, CoreError, CoreResult, FrameSize, Placement};

/// Fixed caption-row height before border and descender padding (px)
pub const DEFAULT_BASE_HEIGHT: u32 = 120;

/// Largest accepted border thickness (px)
pub const MAX_BORDER_SIZE: u32 = 100;

/// Largest accepted font size (px)
pub const MAX_FONT_SIZE: u32 = 1000;

/// Largest accepted caption-row height (px)
pub const MAX_BASE_HEIGHT: u32 = 4096;

// =============================================================================
// Render Spec
// =============================================================================

/// Visual parameters shared by every caption in a run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSpec {
    /// Font file; `None` selects the system default face
    pub font: Option<PathBuf>,
    /// Font size in pixels
    pub font_size: u32,
    pub text_color: Color,
    pub border_color: Color,
    /// Border thickness in pixels
    pub border_size: u32,
    pub frame: FrameSize,
    /// Caption row height independent of glyph height
    pub base_height: u32,
}

impl RenderSpec {
    /// White text with an 8px black border
    pub fn new(frame: FrameSize, font_size: u32) -> Self {
        Self {
            font: None,
            font_size,
            text_color: Color::white(),
            border_color: Color::black(),
            border_size: 8,
            frame,
            base_height: DEFAULT_BASE_HEIGHT,
        }
    }

    pub fn with_font(mut self, path: impl Into<PathBuf>) -> Self {
        self.font = Some(path.into());
        self
    }

    pub fn with_border(mut self, size: u32, color: Color) -> Self {
        self.border_size = size;
        self.border_color = color;
        self
    }

    pub fn with_text_color(mut self, color: Color) -> Self {
        self.text_color = color;
        self
    }

    /// Rejects sizes that cannot produce a sane canvas
    pub fn validate(&self) -> CoreResult<()> {
        if self.font_size == 0 || self.font_size > MAX_FONT_SIZE {
            return Err(CoreError::InvalidConfiguration(format!(
                "font size must be between 1 and {MAX_FONT_SIZE}, got {}",
                self.font_size
            )));
        }
        if self.border_size > MAX_BORDER_SIZE {
            return Err(CoreError::InvalidConfiguration(format!(
                "border size must be at most {MAX_BORDER_SIZE}, got {}",
                self.border_size
            )));
        }
        if self.base_height > MAX_BASE_HEIGHT {
            return Err(CoreError::InvalidConfiguration(format!(
                "base height must be at most {MAX_BASE_HEIGHT}, got {}",
                self.base_height
            )));
        }
        Ok(())
    }

    /// Canvas height shared by every caption:
    /// `base_height + 2 × border_size + font_size / 2`, saturating at `u32::MAX`
    pub fn canvas_height(&self) -> u32 {
        self.base_height
            .saturating_add(self.border_size.saturating_mul(2))
            .saturating_add(self.font_size / 2)
    }
}

// =============================================================================
// Rendered Caption
// =============================================================================

/// A caption bitmap and where it sits on the frame
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedCaption {
    /// RGBA raster, transparent outside the bordered text
    pub bitmap: RgbaImage,
    pub width: u32,
    pub height: u32,
    pub placement: Placement,
    pub group: CaptionGroup,
}

impl RenderedCaption {
    /// Encodes the bitmap as PNG
    pub fn encode_png(&self) -> CoreResult<Vec<u8>> {
        let mut bytes = Vec::new();
        image::codecs::png::PngEncoder::new(&mut bytes).write_image(
            self.bitmap.as_raw(),
            self.width,
            self.height,
            ExtendedColorType::Rgba8,
        )?;
        Ok(bytes)
    }

    /// Writes the bitmap to `path` as PNG
    pub fn write_png(&self, path: &Path) -> CoreResult<()> {
        let bytes = self.encode_png()?;
        fs::atomic_write_bytes(path, &bytes)
    }
}
