//! Transcript Loading
//!
//! Reads word timings produced by an external speech recognizer. Two JSON
//! shapes are accepted:
//!
//! ```text
//! [{"word": "hello", "start": 0.0, "end": 0.4}, ...]
//!
//! [{"result": [{"conf": 1.0, "word": "hello", "start": 0.0, "end": 0.4}], "text": "hello"},
//!  {"text": ""}, ...]
//! ```
//!
//! The second form is a list of recognizer result chunks; chunks without a
//! `result` array are skipped and the rest are flattened in order.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use super::models::WordTiming;
use crate::core::{CoreError, CoreResult, TimeSec};

#[derive(Deserialize)]
struct RawWord {
    word: String,
    start: f64,
    end: f64,
}

/// Strict so a malformed flat word list is not mistaken for empty chunks
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawChunk {
    #[serde(default)]
    result: Option<Vec<RawWord>>,
    #[serde(default)]
    #[allow(dead_code)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTranscript {
    Words(Vec<RawWord>),
    Chunks(Vec<RawChunk>),
}

/// Parses word timings from a JSON transcript
pub fn parse_word_timings(json: &str) -> CoreResult<Vec<WordTiming>> {
    let raw: RawTranscript = serde_json::from_str(json)
        .map_err(|e| CoreError::TranscriptParse(format!("unrecognized transcript: {e}")))?;

    let raw_words: Vec<RawWord> = match raw {
        RawTranscript::Words(words) => words,
        RawTranscript::Chunks(chunks) => chunks.into_iter().filter_map(|c| c.result).flatten().collect(),
    };

    let mut words = Vec::with_capacity(raw_words.len());
    for (index, raw) in raw_words.into_iter().enumerate() {
        if !raw.start.is_finite() || !raw.end.is_finite() || raw.start < 0.0 {
            return Err(CoreError::TranscriptParse(format!(
                "word {index} ({:?}) has invalid times {}..{}",
                raw.word, raw.start, raw.end
            )));
        }
        if raw.end < raw.start {
            return Err(CoreError::TranscriptParse(format!(
                "word {index} ({:?}) ends before it starts ({} < {})",
                raw.word, raw.end, raw.start
            )));
        }
        words.push(WordTiming::new(raw.word, raw.start, raw.end));
    }

    warn_if_unordered(&words);
    Ok(words)
}

/// Reads and parses a transcript file
pub fn load_word_timings(path: &Path) -> CoreResult<Vec<WordTiming>> {
    let content = std::fs::read_to_string(path)?;
    let words = parse_word_timings(&content)?;
    info!("Loaded {} words from {}", words.len(), path.display());
    Ok(words)
}

/// Keeps only words that start at or after `start_time`
pub fn filter_from(words: Vec<WordTiming>, start_time: TimeSec) -> Vec<WordTiming> {
    let total = words.len();
    let kept: Vec<_> = words.into_iter().filter(|w| w.start >= start_time).collect();
    info!(
        "Filtered words to start from {}s, {} of {} words remain",
        start_time,
        kept.len(),
        total
    );
    kept
}

/// Segmentation assumes chronological input and does not sort.
fn warn_if_unordered(words: &[WordTiming]) {
    if let Some(pos) = words.windows(2).position(|pair| pair[1].start < pair[0].start) {
        warn!(
            "Transcript is not chronological at word {} ({:?} starts before {:?})",
            pos + 1,
            words[pos + 1].word,
            words[pos].word
        );
    }
}
