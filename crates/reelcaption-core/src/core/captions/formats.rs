//! Caption Format Exporters
//!
//! Writes segmented caption groups as soft subtitles:
//! - SRT (SubRip)
//! - VTT (WebVTT)
//!
//! # Example
//!
//! ```rust,ignore
//! let groups = segment(&words, &face, &options);
//! std::fs::write("captions.srt", export_srt(&groups))?;
//! ```

use super::CaptionGroup;

// =============================================================================
// SRT Format
// =============================================================================

/// Exports caption groups to SRT format
///
/// ```text
/// 1
/// 00:00:00,000 --> 00:00:00,450
/// an gero
/// ```
pub fn export_srt(groups: &[CaptionGroup]) -> String {
    let mut output = String::new();

    for (index, group) in groups.iter().enumerate() {
        output.push_str(&format!("{}\n", index + 1));

        let start = format_timestamp(group.start, ',');
        let end = format_timestamp(group.end, ',');
        output.push_str(&format!("{} --> {}\n", start, end));

        output.push_str(&group.text);
        output.push_str("\n\n");
    }

    output.trim_end().to_string()
}

// =============================================================================
// VTT Format
// =============================================================================

/// Exports caption groups to WebVTT format
pub fn export_vtt(groups: &[CaptionGroup]) -> String {
    let mut output = String::from("WEBVTT\n\n");

    for group in groups {
        let start = format_timestamp(group.start, '.');
        let end = format_timestamp(group.end, '.');
        output.push_str(&format!("{} --> {}\n", start, end));

        output.push_str(&group.text);
        output.push_str("\n\n");
    }

    output.trim_end().to_string()
}

/// Formats seconds as HH:MM:SS<sep>mmm
fn format_timestamp(seconds: f64, ms_separator: char) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        hours, mins, secs, ms_separator, ms
    )
}

// =============================================================================
// Tests
// =============================================================================
