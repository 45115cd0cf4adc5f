//! Caption Settings
//!
//! JSON configuration for a captioning run. Every section and field has a
//! default, so partial files work:
//!
//! ```json
//! {
//!   "render": { "fontPath": "fonts/Rubik-Black.ttf", "fontSize": 110 },
//!   "transitions": { "style": "crossfade" },
//!   "transcript": { "startTime": 12.5 }
//! }
//! ```
//!
//! Transition timing parameters are clamped into their working ranges by
//! [`CaptionSettings::normalize`]. Structural problems (a zero frame, a
//! negative border, an impossible width ratio) are rejected by
//! [`CaptionSettings::validate`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::captions::{Color, SegmentOptions};
use crate::core::render::{RenderSpec, DEFAULT_BASE_HEIGHT};
use crate::core::transitions::TransitionSpec;
use crate::core::{CoreError, CoreResult, FrameSize, TimeSec};

/// Run settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CaptionSettings {
    #[serde(default)]
    pub render: RenderSettings,

    #[serde(default)]
    pub segmentation: SegmentationSettings,

    #[serde(default)]
    pub transitions: TransitionSpec,

    #[serde(default)]
    pub frame: FrameSettings,

    #[serde(default)]
    pub transcript: TranscriptSettings,
}

impl CaptionSettings {
    /// Reads settings from a JSON file and normalizes them.
    ///
    /// Unlike a missing section, a missing file is an error: the path was
    /// named explicitly.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&content)?;
        info!("Loaded caption settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_json(json: &str) -> CoreResult<Self> {
        let mut settings: CaptionSettings = serde_json::from_str(json)?;
        settings.normalize();
        Ok(settings)
    }

    /// Clamps transition parameters into their supported ranges.
    ///
    /// Out-of-range timing values are corrected, never rejected.
    pub fn normalize(&mut self) {
        let t = &mut self.transitions;
        t.fade_duration = clamp_f64(t.fade_duration, 0.15, 0.25);
        t.overlap_duration = clamp_f64(t.overlap_duration, 0.10, 0.15);
        t.scale_factor = clamp_f64(t.scale_factor, 1.03, 1.05);
        t.slide_distance = clamp_f64(t.slide_distance, 30.0, 50.0);

        if let Some(start) = self.transcript.start_time {
            if !start.is_finite() || start < 0.0 {
                debug!("Ignoring invalid transcript start time {}", start);
                self.transcript.start_time = None;
            }
        }
    }

    /// Rejects settings no stage can run with
    pub fn validate(&self) -> CoreResult<()> {
        if self.render.border_size < 0 {
            return Err(CoreError::InvalidConfiguration(format!(
                "border size must not be negative, got {}",
                self.render.border_size
            )));
        }
        if self.frame.width == 0 || self.frame.height == 0 {
            return Err(CoreError::InvalidConfiguration(format!(
                "frame dimensions must be positive, got {}x{}",
                self.frame.width, self.frame.height
            )));
        }
        self.render_spec().validate()?;
        self.segment_options().validate()?;
        self.transition_spec().validate()
    }

    pub fn frame_size(&self) -> FrameSize {
        FrameSize::new(self.frame.width, self.frame.height)
    }

    pub fn segment_options(&self) -> SegmentOptions {
        SegmentOptions::new(self.frame.width, self.render.font_size as f32)
            .with_pause_threshold(self.segmentation.pause_threshold)
            .with_max_duration(self.segmentation.max_duration)
            .with_max_width_ratio(self.segmentation.max_text_width_ratio)
    }

    /// Render parameters; call [`validate`](Self::validate) first, a negative
    /// border is read as zero here
    pub fn render_spec(&self) -> RenderSpec {
        let render = &self.render;
        let mut spec = RenderSpec::new(self.frame_size(), render.font_size)
            .with_border(render.border_size.max(0) as u32, render.border_color)
            .with_text_color(render.text_color);
        spec.font = render.font_path.clone();
        spec.base_height = render.base_height;
        spec
    }

    pub fn transition_spec(&self) -> TransitionSpec {
        self.transitions.clone()
    }
}

fn clamp_f64(value: f64, min: f64, max: f64) -> f64 {
    if !value.is_finite() {
        return min;
    }
    value.clamp(min, max)
}

// =============================================================================
// Sections
// =============================================================================

/// Caption appearance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderSettings {
    /// Font file; the system sans-serif face is used when unset or unreadable
    #[serde(default)]
    pub font_path: Option<PathBuf>,

    /// Font size in pixels
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    #[serde(default = "Color::white")]
    pub text_color: Color,

    #[serde(default = "Color::black")]
    pub border_color: Color,

    /// Border thickness in pixels. Signed so a negative value can be
    /// reported instead of failing to parse.
    #[serde(default = "default_border_size")]
    pub border_size: i32,

    #[serde(default = "default_base_height")]
    pub base_height: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            font_path: None,
            font_size: default_font_size(),
            text_color: Color::white(),
            border_color: Color::black(),
            border_size: default_border_size(),
            base_height: default_base_height(),
        }
    }
}

fn default_font_size() -> u32 {
    110
}

fn default_border_size() -> i32 {
    8
}

fn default_base_height() -> u32 {
    DEFAULT_BASE_HEIGHT
}

/// Grouping constraints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationSettings {
    #[serde(default = "default_pause_threshold")]
    pub pause_threshold: TimeSec,

    #[serde(default = "default_max_duration")]
    pub max_duration: TimeSec,

    #[serde(default = "default_max_text_width_ratio")]
    pub max_text_width_ratio: f64,
}

impl Default for SegmentationSettings {
    fn default() -> Self {
        Self {
            pause_threshold: default_pause_threshold(),
            max_duration: default_max_duration(),
            max_text_width_ratio: default_max_text_width_ratio(),
        }
    }
}

fn default_pause_threshold() -> TimeSec {
    0.3
}

fn default_max_duration() -> TimeSec {
    1.5
}

fn default_max_text_width_ratio() -> f64 {
    0.9
}

/// Output frame dimensions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameSettings {
    pub width: u32,
    pub height: u32,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
        }
    }
}

/// Transcript input options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSettings {
    /// Words starting before this time (seconds) are dropped
    #[serde(default)]
    pub start_time: Option<TimeSec>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transitions::TransitionStyle;
    use crate::core::render::{MAX_BASE_HEIGHT, MAX_BORDER_SIZE, MAX_FONT_SIZE};
    use tempfile::TempDir;

    // -------------------------------------------------------------------------
    // Defaults and Parsing
    // -------------------------------------------------------------------------

    #[test]
    fn test_default_settings() {
        let settings = CaptionSettings::default();
        assert_eq!(settings.render.font_size, 110);
        assert_eq!(settings.render.border_size, 8);
        assert_eq!(settings.segmentation.pause_threshold, 0.3);
        assert_eq!(settings.segmentation.max_duration, 1.5);
        assert_eq!(settings.segmentation.max_text_width_ratio, 0.9);
        assert_eq!(settings.transitions.style, TransitionStyle::Combined);
        assert_eq!(settings.frame_size(), FrameSize::new(1080, 1920));
        assert!(settings.transcript.start_time.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults_for_missing() {
        let json = r#"{
            "render": { "fontSize": 96 },
            "transitions": { "style": "slide" },
            "transcript": { "startTime": 4.5 }
        }"#;
        let settings = CaptionSettings::from_json(json).unwrap();
        assert_eq!(settings.render.font_size, 96);
        assert_eq!(settings.render.border_size, 8);
        assert_eq!(settings.render.text_color, Color::white());
        assert_eq!(settings.transitions.style, TransitionStyle::Slide);
        assert_eq!(settings.transitions.fade_duration, 0.2);
        assert_eq!(settings.transitions.max_caption_duration, 3.0);
        assert_eq!(settings.frame.height, 1920);
        assert_eq!(settings.transcript.start_time, Some(4.5));
    }

    #[test]
    fn test_empty_object_is_default() {
        let settings = CaptionSettings::from_json("{}").unwrap();
        assert_eq!(settings, CaptionSettings::default());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(matches!(
            CaptionSettings::from_json("{ not json"),
            Err(CoreError::JsonError(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("captions.json");
        std::fs::write(&path, r#"{"frame": {"width": 720, "height": 1280}}"#).unwrap();

        let settings = CaptionSettings::load(&path).unwrap();
        assert_eq!(settings.frame_size(), FrameSize::new(720, 1280));

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            CaptionSettings::load(&missing),
            Err(CoreError::IoError(_))
        ));
    }

    // -------------------------------------------------------------------------
    // Normalization
    // -------------------------------------------------------------------------

    #[test]
    fn test_normalization_clamps_transition_ranges() {
        let mut settings = CaptionSettings::default();
        settings.transitions.fade_duration = 1.0;
        settings.transitions.overlap_duration = 0.0;
        settings.transitions.scale_factor = 2.0;
        settings.transitions.slide_distance = 5.0;
        settings.normalize();

        assert_eq!(settings.transitions.fade_duration, 0.25);
        assert_eq!(settings.transitions.overlap_duration, 0.10);
        assert_eq!(settings.transitions.scale_factor, 1.05);
        assert_eq!(settings.transitions.slide_distance, 30.0);
    }

    #[test]
    fn test_normalization_handles_nan_values() {
        let mut settings = CaptionSettings::default();
        settings.transitions.fade_duration = f64::NAN;
        settings.transitions.slide_distance = f64::INFINITY;
        settings.transcript.start_time = Some(f64::NAN);
        settings.normalize();

        assert_eq!(settings.transitions.fade_duration, 0.15);
        assert_eq!(settings.transitions.slide_distance, 30.0);
        assert_eq!(settings.transcript.start_time, None);
    }

    #[test]
    fn test_clamp_f64_handles_edge_cases() {
        assert_eq!(clamp_f64(0.2, 0.15, 0.25), 0.2);
        assert_eq!(clamp_f64(f64::NEG_INFINITY, 0.15, 0.25), 0.15);
        assert_eq!(clamp_f64(-1.0, 0.15, 0.25), 0.15);
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    #[test]
    fn test_invalid_width_ratio_rejected() {
        for ratio in [0.0, -0.5, 1.2, f64::NAN] {
            let mut settings = CaptionSettings::default();
            settings.segmentation.max_text_width_ratio = ratio;
            assert!(
                matches!(settings.validate(), Err(CoreError::InvalidConfiguration(_))),
                "ratio {ratio} accepted"
            );
        }

        let mut settings = CaptionSettings::default();
        settings.segmentation.max_text_width_ratio = 1.0;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_negative_border_rejected() {
        let settings = CaptionSettings::from_json(r#"{"render": {"borderSize": -2}}"#).unwrap();
        assert!(matches!(
            settings.validate(),
            Err(CoreError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_zero_frame_and_font_rejected() {
        let mut settings = CaptionSettings::default();
        settings.frame.height = 0;
        assert!(settings.validate().is_err());

        let mut settings = CaptionSettings::default();
        settings.render.font_size = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_oversized_render_values_rejected() {
        let mut settings = CaptionSettings::default();
        settings.render.border_size = i32::MAX;
        assert!(matches!(
            settings.validate(),
            Err(CoreError::InvalidConfiguration(_))
        ));

        let mut settings = CaptionSettings::default();
        settings.render.font_size = u32::MAX;
        assert!(settings.validate().is_err());

        let mut settings = CaptionSettings::default();
        settings.render.base_height = u32::MAX;
        assert!(settings.validate().is_err());

        let mut settings = CaptionSettings::default();
        settings.render.border_size = MAX_BORDER_SIZE as i32;
        settings.render.font_size = MAX_FONT_SIZE;
        settings.render.base_height = MAX_BASE_HEIGHT;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_min_above_max_duration_rejected() {
        let mut settings = CaptionSettings::default();
        settings.transitions.min_caption_duration = 3.5;
        assert!(settings.validate().is_err());
    }

    // -------------------------------------------------------------------------
    // Derived Views
    // -------------------------------------------------------------------------

    #[test]
    fn test_derived_views() {
        let json = r#"{
            "render": { "fontPath": "fonts/caption.ttf", "fontSize": 80, "borderSize": 4 },
            "segmentation": { "maxTextWidthRatio": 0.8 },
            "frame": { "width": 720, "height": 1280 }
        }"#;
        let settings = CaptionSettings::from_json(json).unwrap();

        let options = settings.segment_options();
        assert_eq!(options.frame_width, 720);
        assert_eq!(options.font_size, 80.0);
        assert!((options.max_text_width() - 576.0).abs() < 1e-9);

        let spec = settings.render_spec();
        assert_eq!(spec.border_size, 4);
        assert_eq!(spec.font.as_deref(), Some(Path::new("fonts/caption.ttf")));
        assert_eq!(spec.frame, FrameSize::new(720, 1280));
        // 120 + 8 + 40
        assert_eq!(spec.canvas_height(), 168);

        assert_eq!(settings.transition_spec(), TransitionSpec::default());
    }
}
