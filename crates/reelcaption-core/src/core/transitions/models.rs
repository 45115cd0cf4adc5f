//! Transition Data Models
//!
//! Defines transition styles, their timing parameters, keyframe curves and
//! the final timed clip handed to the compositor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::render::RenderedCaption;
use crate::core::{CoreError, CoreResult, TimeSec, TIME_EPSILON};

// =============================================================================
// Transition Style
// =============================================================================

/// How captions enter and leave the frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransitionStyle {
    /// Fade in/out inside the caption's own window
    Smooth,
    /// Fade in/out, outgoing caption lingers to overlap the next one
    Crossfade,
    /// Slide up from below on entry, out to the top on exit
    Slide,
    /// Grow into place on entry, shrink on exit
    Scale,
    /// Crossfade, slide and scale together
    #[default]
    Combined,
}

impl TransitionStyle {
    pub const ALL: [TransitionStyle; 5] = [
        TransitionStyle::Smooth,
        TransitionStyle::Crossfade,
        TransitionStyle::Slide,
        TransitionStyle::Scale,
        TransitionStyle::Combined,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionStyle::Smooth => "smooth",
            TransitionStyle::Crossfade => "crossfade",
            TransitionStyle::Slide => "slide",
            TransitionStyle::Scale => "scale",
            TransitionStyle::Combined => "combined",
        }
    }

    /// Opacity ramps at entry and exit (otherwise opacity is binary)
    pub fn fades(&self) -> bool {
        matches!(
            self,
            TransitionStyle::Smooth | TransitionStyle::Crossfade | TransitionStyle::Combined
        )
    }

    /// Window extends past the raw end to overlap the next caption
    pub fn overlaps(&self) -> bool {
        matches!(self, TransitionStyle::Crossfade | TransitionStyle::Combined)
    }

    pub fn slides(&self) -> bool {
        matches!(self, TransitionStyle::Slide | TransitionStyle::Combined)
    }

    pub fn scales(&self) -> bool {
        matches!(self, TransitionStyle::Scale | TransitionStyle::Combined)
    }
}

impl fmt::Display for TransitionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransitionStyle {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransitionStyle::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                CoreError::InvalidConfiguration(format!(
                    "unknown transition style {s:?} (expected one of smooth, crossfade, slide, scale, combined)"
                ))
            })
    }
}

// =============================================================================
// Transition Spec
// =============================================================================

/// Constant transition configuration for a run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransitionSpec {
    pub style: TransitionStyle,
    /// Entry/exit ramp length, 0.15..=0.25 s
    pub fade_duration: TimeSec,
    /// How far a caption may linger into the next one, 0.10..=0.15 s
    pub overlap_duration: TimeSec,
    /// Peak scale delta is `scale_factor - 1`, 1.03..=1.05
    pub scale_factor: f64,
    /// Vertical slide in pixels, 30..=50
    pub slide_distance: f64,
    pub min_caption_duration: TimeSec,
    pub max_caption_duration: TimeSec,
}

impl Default for TransitionSpec {
    fn default() -> Self {
        Self {
            style: TransitionStyle::Combined,
            fade_duration: 0.2,
            overlap_duration: 0.12,
            scale_factor: 1.04,
            slide_distance: 40.0,
            min_caption_duration: 0.8,
            max_caption_duration: 3.0,
        }
    }
}

impl TransitionSpec {
    pub fn with_style(style: TransitionStyle) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    /// Rejects durations the engine cannot schedule
    pub fn validate(&self) -> CoreResult<()> {
        let durations = [
            ("fade duration", self.fade_duration),
            ("overlap duration", self.overlap_duration),
            ("min caption duration", self.min_caption_duration),
            ("max caption duration", self.max_caption_duration),
        ];
        for (label, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::InvalidConfiguration(format!(
                    "{label} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.max_caption_duration <= 0.0 {
            return Err(CoreError::InvalidConfiguration(
                "max caption duration must be positive".to_string(),
            ));
        }
        if self.min_caption_duration > self.max_caption_duration {
            return Err(CoreError::InvalidConfiguration(format!(
                "min caption duration {} exceeds max {}",
                self.min_caption_duration, self.max_caption_duration
            )));
        }
        if !self.scale_factor.is_finite() || !self.slide_distance.is_finite() {
            return Err(CoreError::InvalidConfiguration(
                "scale factor and slide distance must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Curves
// =============================================================================

/// A single keyframe
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: TimeSec,
    pub value: f64,
}

/// Piecewise-linear curve over absolute time.
///
/// Keyframe times are non-decreasing. Outside the keyframe range the curve
/// holds its first/last value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub keyframes: Vec<Keyframe>,
}

impl Curve {
    pub fn from_points(points: &[(TimeSec, f64)]) -> Self {
        Self {
            keyframes: points
                .iter()
                .map(|&(time, value)| Keyframe { time, value })
                .collect(),
        }
    }

    /// A curve that holds `value` across [start, end]
    pub fn constant(start: TimeSec, end: TimeSec, value: f64) -> Self {
        Self::from_points(&[(start, value), (end, value)])
    }

    /// Returns true if every keyframe carries the same value
    pub fn is_constant(&self) -> bool {
        self.keyframes
            .windows(2)
            .all(|pair| (pair[0].value - pair[1].value).abs() < f64::EPSILON)
    }

    pub fn value_at(&self, t: TimeSec) -> f64 {
        let (Some(first), Some(last)) = (self.keyframes.first(), self.keyframes.last()) else {
            return 0.0;
        };
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        for pair in self.keyframes.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t >= a.time && t < b.time {
                let span = b.time - a.time;
                if span <= TIME_EPSILON {
                    return b.value;
                }
                let progress = (t - a.time) / span;
                return a.value + (b.value - a.value) * progress;
            }
        }
        last.value
    }
}

// =============================================================================
// Envelope
// =============================================================================

/// Where a caption is within its on-screen lifetime
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipPhase {
    Appearing,
    Steady,
    Disappearing,
}

/// Timing window and animation curves for one caption
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEnvelope {
    pub effective_start: TimeSec,
    /// End after duration clamping, before overlap extension
    pub clamped_end: TimeSec,
    /// End including overlap extension
    pub effective_end: TimeSec,
    /// Ramp length actually used (fade duration, shortened for short windows)
    pub ramp: TimeSec,
    pub opacity_curve: Curve,
    /// Vertical offset in pixels from the resting placement; positive is down
    pub position_curve: Curve,
    pub scale_curve: Curve,
}

impl TransitionEnvelope {
    pub fn duration(&self) -> TimeSec {
        self.effective_end - self.effective_start
    }

    /// Returns true within the half-open window [start, end)
    pub fn is_visible_at(&self, t: TimeSec) -> bool {
        t >= self.effective_start && t < self.effective_end
    }

    pub fn phase_at(&self, t: TimeSec) -> Option<ClipPhase> {
        if !self.is_visible_at(t) {
            return None;
        }
        if t < self.effective_start + self.ramp {
            Some(ClipPhase::Appearing)
        } else if t < self.effective_end - self.ramp {
            Some(ClipPhase::Steady)
        } else {
            Some(ClipPhase::Disappearing)
        }
    }

    /// Opacity in [0, 1]; zero outside the window
    pub fn opacity_at(&self, t: TimeSec) -> f64 {
        if !self.is_visible_at(t) {
            return 0.0;
        }
        self.opacity_curve.value_at(t).clamp(0.0, 1.0)
    }

    pub fn offset_at(&self, t: TimeSec) -> f64 {
        self.position_curve.value_at(t)
    }

    pub fn scale_at(&self, t: TimeSec) -> f64 {
        self.scale_curve.value_at(t)
    }
}

// =============================================================================
// Timed Clip
// =============================================================================

/// A rendered caption with its on-screen window and transition curves
#[derive(Clone, Debug, PartialEq)]
pub struct TimedClip {
    /// Position in the schedule, zero-based
    pub index: usize,
    pub rendered: RenderedCaption,
    pub envelope: TransitionEnvelope,
}

impl TimedClip {
    pub fn effective_start(&self) -> TimeSec {
        self.envelope.effective_start
    }

    pub fn effective_end(&self) -> TimeSec {
        self.envelope.effective_end
    }

    pub fn text(&self) -> &str {
        &self.rendered.group.text
    }

    pub fn is_visible_at(&self, t: TimeSec) -> bool {
        self.envelope.is_visible_at(t)
    }

    pub fn opacity_at(&self, t: TimeSec) -> f64 {
        self.envelope.opacity_at(t)
    }

    /// Top-left frame position at `t`, after slide offset and scaling
    /// about the caption center
    pub fn position_at(&self, t: TimeSec) -> (f64, f64) {
        let placement = self.rendered.placement;
        let (cx, cy) = placement.center();
        let scale = self.envelope.scale_at(t);
        let x = cx - placement.width as f64 * scale / 2.0;
        let y = cy - placement.height as f64 * scale / 2.0 + self.envelope.offset_at(t);
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Style Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_style_parse_and_display() {
        for style in TransitionStyle::ALL {
            assert_eq!(style.to_string().parse::<TransitionStyle>().unwrap(), style);
        }
        assert_eq!(
            " Crossfade ".parse::<TransitionStyle>().unwrap(),
            TransitionStyle::Crossfade
        );
        assert!("wipe".parse::<TransitionStyle>().is_err());
    }

    #[test]
    fn test_style_capabilities() {
        assert!(TransitionStyle::Smooth.fades());
        assert!(!TransitionStyle::Smooth.overlaps());
        assert!(!TransitionStyle::Slide.fades());
        assert!(TransitionStyle::Slide.slides());
        assert!(TransitionStyle::Scale.scales());
        let combined = TransitionStyle::Combined;
        assert!(combined.fades() && combined.overlaps() && combined.slides() && combined.scales());
    }

    #[test]
    fn test_style_serialization() {
        let json = serde_json::to_string(&TransitionStyle::Crossfade).unwrap();
        assert_eq!(json, "\"crossfade\"");
        assert_eq!(TransitionStyle::default(), TransitionStyle::Combined);
    }

    // -------------------------------------------------------------------------
    // Spec Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_spec_defaults() {
        let spec = TransitionSpec::default();
        assert_eq!(spec.min_caption_duration, 0.8);
        assert_eq!(spec.max_caption_duration, 3.0);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_spec_validation() {
        let spec = TransitionSpec {
            min_caption_duration: 4.0,
            ..Default::default()
        };
        assert!(spec.validate().is_err());

        let spec = TransitionSpec {
            fade_duration: f64::NAN,
            ..Default::default()
        };
        assert!(spec.validate().is_err());
    }

    // -------------------------------------------------------------------------
    // Curve Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_curve_interpolation() {
        let curve = Curve::from_points(&[(1.0, 0.0), (1.2, 1.0), (2.0, 1.0), (2.2, 0.0)]);
        assert_eq!(curve.value_at(0.0), 0.0);
        assert!((curve.value_at(1.1) - 0.5).abs() < 1e-9);
        assert_eq!(curve.value_at(1.5), 1.0);
        assert!((curve.value_at(2.15) - 0.25).abs() < 1e-9);
        assert_eq!(curve.value_at(3.0), 0.0);
    }

    #[test]
    fn test_curve_zero_length_segment() {
        let curve = Curve::from_points(&[(0.0, 0.0), (0.5, 1.0), (0.5, 1.0), (1.0, 0.0)]);
        assert_eq!(curve.value_at(0.5), 1.0);
        assert!((curve.value_at(0.75) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_constant_curve() {
        let curve = Curve::constant(0.0, 1.0, 1.0);
        assert!(curve.is_constant());
        assert_eq!(curve.value_at(0.5), 1.0);
        assert_eq!(Curve { keyframes: vec![] }.value_at(0.5), 0.0);
    }

    // -------------------------------------------------------------------------
    // Envelope Tests
    // -------------------------------------------------------------------------

    fn envelope() -> TransitionEnvelope {
        TransitionEnvelope {
            effective_start: 1.0,
            clamped_end: 2.0,
            effective_end: 2.0,
            ramp: 0.2,
            opacity_curve: Curve::from_points(&[(1.0, 0.0), (1.2, 1.0), (1.8, 1.0), (2.0, 0.0)]),
            position_curve: Curve::constant(1.0, 2.0, 0.0),
            scale_curve: Curve::constant(1.0, 2.0, 1.0),
        }
    }

    #[test]
    fn test_envelope_phases() {
        let env = envelope();
        assert_eq!(env.phase_at(0.9), None);
        assert_eq!(env.phase_at(1.1), Some(ClipPhase::Appearing));
        assert_eq!(env.phase_at(1.5), Some(ClipPhase::Steady));
        assert_eq!(env.phase_at(1.9), Some(ClipPhase::Disappearing));
        assert_eq!(env.phase_at(2.0), None);
    }

    #[test]
    fn test_envelope_opacity_outside_window() {
        let env = envelope();
        assert_eq!(env.opacity_at(0.5), 0.0);
        assert_eq!(env.opacity_at(1.5), 1.0);
        assert_eq!(env.opacity_at(2.5), 0.0);
    }
}
