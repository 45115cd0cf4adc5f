//! Command-line arguments.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use reelcaption_core::{CaptionSettings, TransitionStyle};

use crate::output::Subtitles;

/// Generate timed caption overlays from a word-level transcript
#[derive(Debug, Parser)]
#[command(name = "reelcaption", version, about)]
pub struct Args {
    /// Word-timing transcript (JSON array or recognizer result chunks)
    pub transcript: PathBuf,

    /// Settings file (JSON); built-in defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for caption bitmaps and the clip schedule
    #[arg(short, long, default_value = "captions_out")]
    pub out_dir: PathBuf,

    /// Font file for captions
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Font size in pixels
    #[arg(long)]
    pub font_size: Option<u32>,

    #[arg(long)]
    pub frame_width: Option<u32>,

    #[arg(long)]
    pub frame_height: Option<u32>,

    /// smooth, crossfade, slide, scale or combined
    #[arg(long)]
    pub transition_style: Option<TransitionStyle>,

    /// Border thickness in pixels
    #[arg(long, allow_hyphen_values = true)]
    pub border_size: Option<i32>,

    /// Fraction of the frame width a caption may span
    #[arg(long)]
    pub max_text_width_ratio: Option<f64>,

    /// Silence (seconds) that always starts a new caption
    #[arg(long)]
    pub pause_threshold: Option<f64>,

    /// Longest span (seconds) of a two-word caption
    #[arg(long)]
    pub max_duration: Option<f64>,

    /// Drop words starting before this time (seconds)
    #[arg(long)]
    pub start_at: Option<f64>,

    /// Also write captions.srt
    #[arg(long)]
    pub srt: bool,

    /// Also write captions.vtt
    #[arg(long)]
    pub vtt: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Parallel bitmap writers (defaults to the number of CPUs)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Write daily-rolling log files to this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Loads the config file (if any) and applies command-line overrides
    pub fn load_settings(&self) -> anyhow::Result<CaptionSettings> {
        let mut settings = match &self.config {
            Some(path) => CaptionSettings::load(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => CaptionSettings::default(),
        };
        self.apply_overrides(&mut settings);
        settings.normalize();
        Ok(settings)
    }

    fn apply_overrides(&self, settings: &mut CaptionSettings) {
        if let Some(font) = &self.font {
            settings.render.font_path = Some(font.clone());
        }
        if let Some(size) = self.font_size {
            settings.render.font_size = size;
        }
        if let Some(border) = self.border_size {
            settings.render.border_size = border;
        }
        if let Some(width) = self.frame_width {
            settings.frame.width = width;
        }
        if let Some(height) = self.frame_height {
            settings.frame.height = height;
        }
        if let Some(style) = self.transition_style {
            settings.transitions.style = style;
        }
        if let Some(ratio) = self.max_text_width_ratio {
            settings.segmentation.max_text_width_ratio = ratio;
        }
        if let Some(pause) = self.pause_threshold {
            settings.segmentation.pause_threshold = pause;
        }
        if let Some(duration) = self.max_duration {
            settings.segmentation.max_duration = duration;
        }
        if let Some(start) = self.start_at {
            settings.transcript.start_time = Some(start);
        }
    }

    pub fn subtitles(&self) -> Subtitles {
        Subtitles {
            srt: self.srt,
            vtt: self.vtt,
        }
    }

    pub fn jobs(&self) -> usize {
        self.jobs.unwrap_or_else(num_cpus::get).max(1)
    }
}
