//! Coarse text-width estimation used when a real measurement fails.

use tracing::warn;

use super::{TextExtent, TextMeasurer};
use crate::core::CoreResult;

/// Estimates extent from character count and font size alone
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EstimateMeasurer {
    /// Average glyph advance as a fraction of the font size
    pub avg_glyph_width_ratio: f32,
    /// Line height as a multiple of the font size
    pub line_height_ratio: f32,
}

impl Default for EstimateMeasurer {
    fn default() -> Self {
        Self {
            avg_glyph_width_ratio: 0.6,
            line_height_ratio: 1.2,
        }
    }
}

impl EstimateMeasurer {
    /// Infallible estimate
    pub fn estimate(&self, text: &str, font_size: f32) -> TextExtent {
        let size = if font_size.is_finite() {
            font_size.max(0.0)
        } else {
            0.0
        };
        let chars = text.chars().count() as f32;
        TextExtent::new(
            (chars * self.avg_glyph_width_ratio * size).ceil() as u32,
            (self.line_height_ratio * size).ceil() as u32,
        )
    }
}

impl TextMeasurer for EstimateMeasurer {
    fn measure(&self, text: &str, font_size: f32) -> CoreResult<TextExtent> {
        Ok(self.estimate(text, font_size))
    }
}

/// Wraps a measurer and absorbs its failures into an estimate.
pub struct FallbackMeasurer<M> {
    primary: M,
    estimate: EstimateMeasurer,
}

impl<M: TextMeasurer> FallbackMeasurer<M> {
    pub fn new(primary: M) -> Self {
        Self {
            primary,
            estimate: EstimateMeasurer::default(),
        }
    }

    pub fn with_estimate(mut self, estimate: EstimateMeasurer) -> Self {
        self.estimate = estimate;
        self
    }

    /// Measures with the primary measurer, falling back to the estimate
    pub fn measure_or_estimate(&self, text: &str, font_size: f32) -> TextExtent {
        match self.primary.measure(text, font_size) {
            Ok(extent) => extent,
            Err(e) => {
                let extent = self.estimate.estimate(text, font_size);
                warn!(
                    "Measurement of {:?} failed ({}); using estimate {}x{}",
                    text, e, extent.width, extent.height
                );
                extent
            }
        }
    }
}

impl<M: TextMeasurer> TextMeasurer for FallbackMeasurer<M> {
    fn measure(&self, text: &str, font_size: f32) -> CoreResult<TextExtent> {
        Ok(self.measure_or_estimate(text, font_size))
    }
}
