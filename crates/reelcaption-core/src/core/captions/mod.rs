//! Caption System Module
//!
//! Word-level transcript input and its partition into caption groups:
//! - Data models (WordTiming, CaptionGroup, Color)
//! - Greedy two-word segmentation under pause/duration/width constraints
//! - Transcript JSON loading
//! - SRT and VTT export
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Caption System                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  models.rs      - Data structures (WordTiming, CaptionGroup)    │
//! │  segmenter.rs   - Word timing → caption group partition         │
//! │  transcript.rs  - Recognizer JSON → word timings                │
//! │  formats.rs     - SRT/VTT export                                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use reelcaption_core::core::captions::{load_word_timings, segment, SegmentOptions};
//!
//! let words = load_word_timings(Path::new("words.json"))?;
//! let groups = segment(&words, &face, &SegmentOptions::new(1080, 110.0));
//! ```

mod formats;
mod models;
mod segmenter;
mod transcript;

// Re-export models
pub use models::{CaptionGroup, Color, WordTiming};

// Re-export segmentation
pub use segmenter::{segment, BreakReason, SegmentOptions, MAX_WORDS_PER_GROUP};

// Re-export transcript loading
pub use transcript::{filter_from, load_word_timings, parse_word_timings};

// Re-export format functions
pub use formats::{export_srt, export_vtt};
