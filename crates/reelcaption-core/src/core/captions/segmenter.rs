//! Caption Segmentation
//!
//! Partitions an ordered word transcript into caption groups of one or two
//! words in a single left-to-right greedy pass.
//!
//! For every word that opens a group, the following word is tested as a join
//! candidate against three break conditions, in this order:
//!
//! 1. **pause**: silence between the words exceeds `pause_threshold`
//! 2. **duration**: the joined group would span more than `max_duration`
//! 3. **width**: the joined text would render wider than
//!    `frame_width × max_width_ratio`
//!
//! The first condition that fires keeps the group at one word. Width only
//! ever blocks a join; a lone word that overflows is still emitted.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::models::{join_words, CaptionGroup, WordTiming};
use crate::core::text::{FallbackMeasurer, TextMeasurer};
use crate::core::{CoreError, CoreResult, TimeSec};

/// Upper bound on words per caption group
pub const MAX_WORDS_PER_GROUP: usize = 2;

// =============================================================================
// Options
// =============================================================================

/// Segmentation constraints
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentOptions {
    /// Frame width in pixels
    pub frame_width: u32,
    /// Font size in pixels used to measure joined text
    pub font_size: f32,
    /// Silence longer than this forces a break (seconds)
    pub pause_threshold: TimeSec,
    /// Longest span a two-word group may cover (seconds)
    pub max_duration: TimeSec,
    /// Fraction of the frame width text may occupy, in (0, 1]
    pub max_width_ratio: f64,
}

impl SegmentOptions {
    /// Creates options with the default pause/duration/width constraints
    pub fn new(frame_width: u32, font_size: f32) -> Self {
        Self {
            frame_width,
            font_size,
            pause_threshold: 0.3,
            max_duration: 1.5,
            max_width_ratio: 0.9,
        }
    }

    pub fn with_pause_threshold(mut self, seconds: TimeSec) -> Self {
        self.pause_threshold = seconds;
        self
    }

    pub fn with_max_duration(mut self, seconds: TimeSec) -> Self {
        self.max_duration = seconds;
        self
    }

    pub fn with_max_width_ratio(mut self, ratio: f64) -> Self {
        self.max_width_ratio = ratio;
        self
    }

    /// Widest joined text allowed, in pixels
    pub fn max_text_width(&self) -> f64 {
        self.frame_width as f64 * self.max_width_ratio
    }

    /// Rejects constraints the algorithm cannot honor
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.max_width_ratio > 0.0 && self.max_width_ratio <= 1.0) {
            return Err(CoreError::InvalidConfiguration(format!(
                "max text width ratio must be in (0, 1], got {}",
                self.max_width_ratio
            )));
        }
        if self.frame_width == 0 {
            return Err(CoreError::InvalidConfiguration(
                "frame width must be positive".to_string(),
            ));
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(CoreError::InvalidConfiguration(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        if !self.pause_threshold.is_finite() || self.pause_threshold < 0.0 {
            return Err(CoreError::InvalidConfiguration(format!(
                "pause threshold must be a non-negative number, got {}",
                self.pause_threshold
            )));
        }
        if !self.max_duration.is_finite() || self.max_duration <= 0.0 {
            return Err(CoreError::InvalidConfiguration(format!(
                "max caption duration must be positive, got {}",
                self.max_duration
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Break Decisions
// =============================================================================

/// Why a join candidate was rejected
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BreakReason {
    Pause { gap: TimeSec },
    Duration { span: TimeSec },
    Width { width: u32 },
}

fn break_reason(
    current: &[WordTiming],
    next: &WordTiming,
    measurer: &FallbackMeasurer<&dyn TextMeasurer>,
    options: &SegmentOptions,
) -> Option<BreakReason> {
    let first = &current[0];
    let last = &current[current.len() - 1];

    let gap = next.start - last.end;
    if gap > options.pause_threshold {
        return Some(BreakReason::Pause { gap });
    }

    let span = next.end - first.start;
    if span > options.max_duration {
        return Some(BreakReason::Duration { span });
    }

    let candidate = format!("{} {}", join_words(current), next.word);
    let width = measurer
        .measure_or_estimate(&candidate, options.font_size)
        .width;
    if width as f64 > options.max_text_width() {
        return Some(BreakReason::Width { width });
    }

    None
}

// =============================================================================
// Segmentation
// =============================================================================

/// Partitions `words` into caption groups.
///
/// Pure and deterministic: identical inputs always produce identical output.
/// `words` must be non-decreasing in `start`; it is not re-sorted.
/// Options are expected to have passed [`SegmentOptions::validate`].
pub fn segment(
    words: &[WordTiming],
    measurer: &dyn TextMeasurer,
    options: &SegmentOptions,
) -> Vec<CaptionGroup> {
    if words.is_empty() {
        return Vec::new();
    }

    let measurer = FallbackMeasurer::new(measurer);
    let mut groups = Vec::with_capacity(words.len() / 2 + 1);
    let mut cursor = 0;

    while cursor < words.len() {
        let mut len = 1;

        while len < MAX_WORDS_PER_GROUP && cursor + len < words.len() {
            let current = &words[cursor..cursor + len];
            let next = &words[cursor + len];
            match break_reason(current, next, &measurer, options) {
                Some(reason) => {
                    debug!("Breaking before {:?}: {:?}", next.word, reason);
                    break;
                }
                None => {
                    debug!("Joining {:?} to {:?}", next.word, join_words(current));
                    len += 1;
                }
            }
        }

        let slice = &words[cursor..cursor + len];
        if let Some(group) = CaptionGroup::from_words(slice) {
            debug!(
                "Caption {}: {:?} ({:.2}s)",
                groups.len() + 1,
                group.text,
                group.duration()
            );
            groups.push(group);
        }
        cursor += len;
    }

    info!(
        "Grouped {} words into {} captions (max {} words per caption)",
        words.len(),
        groups.len(),
        MAX_WORDS_PER_GROUP
    );
    groups
}

// =============================================================================
// Tests
// =============================================================================
