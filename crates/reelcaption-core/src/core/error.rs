//! ReelCaption Error Definitions
//!
//! Defines error types used throughout the project.

use thiserror::Error;

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    // =========================================================================
    // Font / Measurement Errors
    // =========================================================================
    #[error("Failed to load font {path}: {reason}")]
    FontLoadFailed { path: String, reason: String },

    #[error("No usable font: configured font and system default both unavailable")]
    FontUnavailable,

    #[error("Text measurement failed: {0}")]
    MeasurementFailed(String),

    // =========================================================================
    // Transcript Errors
    // =========================================================================
    #[error("Transcript parse error: {0}")]
    TranscriptParse(String),

    // =========================================================================
    // Output Errors
    // =========================================================================
    #[error("No captions produced")]
    NoCaptions,

    #[error("Render failed: {0}")]
    RenderFailed(String),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Image encoding error: {0}")]
    ImageError(#[from] image::ImageError),
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Returns true for conditions a stage absorbs with a logged fallback
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CoreError::FontLoadFailed { .. } | CoreError::MeasurementFailed(_)
        )
    }
}
