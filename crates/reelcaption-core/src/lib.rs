//! ReelCaption Core Library
//!
//! Turns a time-stamped word transcript into positioned, timed caption
//! overlays: segmentation into caption groups, bitmap layout, and
//! entrance/exit transition envelopes for an external compositor.

pub mod core;

pub use crate::core::{
    captions::{segment, CaptionGroup, SegmentOptions, WordTiming},
    pipeline::{CaptionPipeline, ClipSchedule, ScheduleManifest},
    render::{CaptionRenderer, RenderSpec, RenderedCaption},
    settings::CaptionSettings,
    text::{FontFace, TextMeasurer, TextRasterizer},
    transitions::{TimedClip, TransitionEngine, TransitionSpec, TransitionStyle},
    CoreError, CoreResult,
};
