//! Caption Pipeline
//!
//! Wires the stages together for one run:
//!
//! ```text
//! words ─▶ start filter ─▶ segment ─▶ render ─▶ transitions ─▶ ClipSchedule
//! ```
//!
//! Each stage runs to completion over the whole sequence before the next
//! one starts. The schedule is handed to an external compositor, either
//! directly or through its serialized [`ScheduleManifest`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::captions::{filter_from, segment, CaptionGroup, WordTiming};
use crate::core::fs::caption_file_name;
use crate::core::render::CaptionRenderer;
use crate::core::settings::CaptionSettings;
use crate::core::text::{FontFace, MissingFont, TextRasterizer};
use crate::core::transitions::{Curve, TimedClip, TransitionEngine, TransitionStyle};
use crate::core::{CoreError, CoreResult, FrameSize, Placement, TimeSec};

// =============================================================================
// Pipeline
// =============================================================================

/// Runs word timings through segmentation, rendering and transitions
#[derive(Debug)]
pub struct CaptionPipeline {
    settings: CaptionSettings,
    renderer: CaptionRenderer,
    engine: TransitionEngine,
}

impl CaptionPipeline {
    /// Creates a pipeline over an already loaded rasterizer.
    ///
    /// Settings are validated here; nothing downstream re-checks them.
    pub fn new(settings: CaptionSettings, rasterizer: Arc<dyn TextRasterizer>) -> CoreResult<Self> {
        settings.validate()?;
        let renderer = CaptionRenderer::new(settings.render_spec(), rasterizer);
        let engine = TransitionEngine::new(settings.transition_spec());
        Ok(Self {
            settings,
            renderer,
            engine,
        })
    }

    /// Creates a pipeline using the configured font, the system default or
    /// the built-in face.
    ///
    /// When not even the built-in face loads, segmentation falls back to estimated
    /// widths and `FontUnavailable` surfaces only once a caption has to be
    /// rendered.
    pub fn from_settings(settings: CaptionSettings) -> CoreResult<Self> {
        settings.validate()?;
        let rasterizer: Arc<dyn TextRasterizer> =
            match FontFace::load_or_default(settings.render.font_path.as_deref()) {
                Ok(face) => Arc::new(face),
                Err(CoreError::FontUnavailable) => {
                    warn!("No font available, caption widths will be estimated");
                    Arc::new(MissingFont)
                }
                Err(e) => return Err(e),
            };
        Self::new(settings, rasterizer)
    }

    pub fn settings(&self) -> &CaptionSettings {
        &self.settings
    }

    pub fn renderer(&self) -> &CaptionRenderer {
        &self.renderer
    }

    /// Applies the start-time filter and groups the words
    pub fn segment(&self, words: Vec<WordTiming>) -> Vec<CaptionGroup> {
        let words = match self.settings.transcript.start_time {
            Some(start) => filter_from(words, start),
            None => words,
        };
        let measurer = self.renderer.rasterizer();
        segment(&words, &measurer, &self.settings.segment_options())
    }

    /// Runs every stage and returns the clip schedule (possibly empty)
    pub fn run(&self, words: Vec<WordTiming>) -> CoreResult<ClipSchedule> {
        let groups = self.segment(words);
        let rendered = self.renderer.render_all(&groups)?;
        let clips = self.engine.apply(rendered);

        info!(
            "Caption pipeline produced {} clips for a {}x{} frame",
            clips.len(),
            self.settings.frame.width,
            self.settings.frame.height
        );

        Ok(ClipSchedule {
            frame: self.settings.frame_size(),
            style: self.engine.spec().style,
            clips,
        })
    }
}

// =============================================================================
// Clip Schedule
// =============================================================================

/// Ordered timed clips for one video
#[derive(Clone, Debug, PartialEq)]
pub struct ClipSchedule {
    pub frame: FrameSize,
    pub style: TransitionStyle,
    pub clips: Vec<TimedClip>,
}

impl ClipSchedule {
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Fails with `NoCaptions` when there is nothing to composite
    pub fn ensure_not_empty(self) -> CoreResult<Self> {
        if self.is_empty() {
            return Err(CoreError::NoCaptions);
        }
        Ok(self)
    }

    pub fn groups(&self) -> impl Iterator<Item = &CaptionGroup> {
        self.clips.iter().map(|clip| &clip.rendered.group)
    }

    /// Clips on screen at `t`, in schedule order
    pub fn visible_at(&self, t: TimeSec) -> impl Iterator<Item = &TimedClip> {
        self.clips.iter().filter(move |clip| clip.is_visible_at(t))
    }

    /// Latest effective end across all clips
    pub fn end_time(&self) -> TimeSec {
        self.clips
            .iter()
            .map(|clip| clip.effective_end())
            .fold(0.0, f64::max)
    }

    pub fn manifest(&self) -> ScheduleManifest {
        ScheduleManifest {
            frame: self.frame,
            style: self.style,
            clips: self
                .clips
                .iter()
                .map(|clip| {
                    let group = &clip.rendered.group;
                    let envelope = &clip.envelope;
                    ClipManifest {
                        index: clip.index,
                        file: caption_file_name(clip.index),
                        text: group.text.clone(),
                        words: group.words.clone(),
                        start: group.start,
                        end: group.end,
                        effective_start: envelope.effective_start,
                        effective_end: envelope.effective_end,
                        placement: clip.rendered.placement,
                        opacity: envelope.opacity_curve.clone(),
                        position: envelope.position_curve.clone(),
                        scale: envelope.scale_curve.clone(),
                    }
                })
                .collect(),
        }
    }
}

/// Serializable description of a schedule for the compositor
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleManifest {
    pub frame: FrameSize,
    pub style: TransitionStyle,
    pub clips: Vec<ClipManifest>,
}

/// One clip in a [`ScheduleManifest`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipManifest {
    pub index: usize,
    /// Bitmap file name relative to the captions directory
    pub file: String,
    pub text: String,
    pub words: Vec<WordTiming>,
    /// Raw group timing
    pub start: TimeSec,
    pub end: TimeSec,
    pub effective_start: TimeSec,
    pub effective_end: TimeSec,
    pub placement: Placement,
    pub opacity: Curve,
    /// Vertical offset in pixels
    pub position: Curve,
    pub scale: Curve,
}
