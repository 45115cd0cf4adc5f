//! Text Measurement and Rasterization
//!
//! Abstracts font handling behind two capabilities so the segmenter and the
//! layout engine never branch on how a font is backed:
//!
//! - [`TextMeasurer`] returns the rendered extent of a string
//! - [`TextRasterizer`] additionally produces an 8-bit coverage mask
//!
//! # Fallback chain
//!
//! ```text
//! configured font file ──fail──▶ system sans-serif ──fail──▶ FontUnavailable
//!        │                               │
//!        └───────── FontFace ◀───────────┘
//!
//! FontFace::measure ──MeasurementFailed──▶ EstimateMeasurer
//! ```

mod estimate;
mod font;

pub use estimate::{EstimateMeasurer, FallbackMeasurer};
pub use font::{FontFace, FontSource};

use serde::{Deserialize, Serialize};

use crate::core::{CoreError, CoreResult};

// =============================================================================
// Measured Extent
// =============================================================================

/// Pixel extent of a rendered string
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextExtent {
    pub width: u32,
    pub height: u32,
}

impl TextExtent {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

// =============================================================================
// Coverage Mask
// =============================================================================

/// 8-bit glyph coverage for a whole string, row-major.
///
/// The mask is exactly the measured extent of the string it was drawn from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphMask {
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<u8>,
}

impl GlyphMask {
    /// Creates an empty (fully transparent) mask
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0; width as usize * height as usize],
        }
    }

    /// Coverage at (x, y); zero outside the mask
    pub fn get(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.coverage[y as usize * self.width as usize + x as usize]
    }

    /// Merges coverage at (x, y), keeping the stronger value
    pub fn merge(&mut self, x: i64, y: i64, value: u8) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.coverage[idx] = self.coverage[idx].max(value);
    }

    pub fn extent(&self) -> TextExtent {
        TextExtent::new(self.width, self.height)
    }
}

// =============================================================================
// Capabilities
// =============================================================================

/// Measures rendered text.
///
/// Must be deterministic for a given (font, size, text) triple.
pub trait TextMeasurer: Send + Sync {
    /// Returns the pixel extent of `text` rendered at `font_size` pixels
    fn measure(&self, text: &str, font_size: f32) -> CoreResult<TextExtent>;
}

/// Measures and rasterizes text
pub trait TextRasterizer: TextMeasurer {
    /// Renders `text` into a coverage mask the size of its measured extent
    fn rasterize(&self, text: &str, font_size: f32) -> CoreResult<GlyphMask>;
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &T {
    fn measure(&self, text: &str, font_size: f32) -> CoreResult<TextExtent> {
        (**self).measure(text, font_size)
    }
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for std::sync::Arc<T> {
    fn measure(&self, text: &str, font_size: f32) -> CoreResult<TextExtent> {
        (**self).measure(text, font_size)
    }
}

impl<T: TextRasterizer + ?Sized> TextRasterizer for std::sync::Arc<T> {
    fn rasterize(&self, text: &str, font_size: f32) -> CoreResult<GlyphMask> {
        (**self).rasterize(text, font_size)
    }
}

/// Stands in when no font face could be loaded.
///
/// Measurement fails (and is absorbed by [`FallbackMeasurer`]), so
/// segmentation still runs on estimates. Rasterization is a hard
/// `FontUnavailable` error.
#[derive(Clone, Copy, Debug, Default)]
pub struct MissingFont;

impl TextMeasurer for MissingFont {
    fn measure(&self, _text: &str, _font_size: f32) -> CoreResult<TextExtent> {
        Err(CoreError::MeasurementFailed("no font loaded".to_string()))
    }
}

impl TextRasterizer for MissingFont {
    fn rasterize(&self, _text: &str, _font_size: f32) -> CoreResult<GlyphMask> {
        Err(CoreError::FontUnavailable)
    }
}

// =============================================================================
// Test Support
// =============================================================================


#[cfg(test)]
mod tests {
    use super::testing::BlockFont;
    use super::*;

    #[test]
    fn test_glyph_mask_bounds() {
        let mut mask = GlyphMask::new(3, 2);
        mask.merge(1, 1, 200);
        mask.merge(1, 1, 100);
        mask.merge(-1, 0, 255);
        mask.merge(3, 0, 255);
        assert_eq!(mask.get(1, 1), 200);
        assert_eq!(mask.get(0, 0), 0);
        assert_eq!(mask.get(5, 5), 0);
    }

    #[test]
    fn test_block_font_mask_matches_extent() {
        let font = BlockFont::new(10);
        let extent = font.measure("ab c", 20.0).unwrap();
        let mask = font.rasterize("ab c", 20.0).unwrap();
        assert_eq!(mask.extent(), extent);
        assert_eq!(mask.get(5, 5), 255);
        // the space cell stays empty
        assert_eq!(mask.get(25, 5), 0);
    }

    #[test]
    fn test_measurer_through_reference_and_arc() {
        let font = BlockFont::new(7);
        let by_ref: &dyn TextMeasurer = &font;
        let shared = std::sync::Arc::new(font.clone());
        assert_eq!(by_ref.measure("abc", 10.0).unwrap().width, 21);
        assert_eq!(shared.measure("abc", 10.0).unwrap().width, 21);
    }

    #[test]
    fn test_missing_font() {
        assert!(MissingFont.measure("abc", 40.0).is_err());
        assert!(matches!(
            MissingFont.rasterize("abc", 40.0),
            Err(CoreError::FontUnavailable)
        ));
    }
}
