//! ReelCaption Core Type Definitions
//!
//! Defines fundamental types shared by the pipeline stages.

use serde::{Deserialize, Serialize};

// =============================================================================
// Time Types
// =============================================================================

/// Time in seconds (floating point), relative to the source video timeline
pub type TimeSec = f64;

/// Tolerance used when comparing times that went through float arithmetic
pub const TIME_EPSILON: TimeSec = 1e-9;

// =============================================================================
// Geometry Types
// =============================================================================

/// Frame dimensions in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Top-left anchored placement rectangle on the frame.
///
/// `x`/`y` may be negative when a caption is larger than the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Placement {
    /// Centers a `width` × `height` box on the frame
    pub fn centered(frame: FrameSize, width: u32, height: u32) -> Self {
        let x = (frame.width as f64 / 2.0 - width as f64 / 2.0).floor() as i32;
        let y = (frame.height as f64 / 2.0 - height as f64 / 2.0).floor() as i32;
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point of the rectangle in frame coordinates
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }
}
