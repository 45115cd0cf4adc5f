//! Caption Data Models
//!
//! Defines the word-level input and the caption-group output of segmentation,
//! plus the color type shared by the render stage.

use serde::{Deserialize, Serialize};

use crate::core::TimeSec;

// =============================================================================
// Word Timing
// =============================================================================

/// A transcribed word with its offsets in the source audio
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    /// The word as transcribed
    pub word: String,
    /// Start time in seconds
    pub start: TimeSec,
    /// End time in seconds (`end >= start`)
    pub end: TimeSec,
}

impl WordTiming {
    /// Creates a new word timing
    pub fn new(word: impl Into<String>, start: TimeSec, end: TimeSec) -> Self {
        Self {
            word: word.into(),
            start,
            end,
        }
    }

    /// Returns the spoken duration of this word in seconds
    pub fn duration(&self) -> TimeSec {
        self.end - self.start
    }
}

// =============================================================================
// Caption Group
// =============================================================================

/// One or two consecutive words shown together as a single caption
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaptionGroup {
    /// Words joined by a single space
    pub text: String,
    /// First word's start
    pub start: TimeSec,
    /// Last word's end
    pub end: TimeSec,
    /// Contiguous slice of the input transcript
    pub words: Vec<WordTiming>,
}

impl CaptionGroup {
    /// Builds a group from a non-empty run of consecutive words.
    ///
    /// Returns `None` for an empty slice.
    pub fn from_words(words: &[WordTiming]) -> Option<Self> {
        let first = words.first()?;
        let last = words.last()?;
        Some(Self {
            text: join_words(words),
            start: first.start,
            end: last.end,
            words: words.to_vec(),
        })
    }

    /// Returns the raw duration of this group in seconds
    pub fn duration(&self) -> TimeSec {
        self.end - self.start
    }

    /// Returns the number of words in this group
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if the group carries no words
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Joins words with a single space
pub(crate) fn join_words(words: &[WordTiming]) -> String {
    words
        .iter()
        .map(|w| w.word.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// Caption Styling
// =============================================================================

/// RGBA color value (0-255 for each component)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Creates a new color from RGBA components
    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color from RGB components
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// White color
    pub fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    /// Converts to hex string (e.g., "FFFFFF" or "FFFFFFFF" with alpha)
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::white()
    }
}

// =============================================================================
// Tests
// =============================================================================
