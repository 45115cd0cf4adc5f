//! Writes a clip schedule to disk.
//!
//! Layout of the output directory:
//!
//! ```text
//! out/
//! ├── captions/caption_0001.png ...
//! ├── schedule.json
//! ├── captions.srt        (with --srt)
//! └── captions.vtt        (with --vtt)
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use reelcaption_core::core::captions::{export_srt, export_vtt};
use reelcaption_core::core::fs::{
    atomic_write_bytes, atomic_write_json_pretty, caption_file_name, prepare_output_dir,
};
use reelcaption_core::{CaptionGroup, ClipSchedule, CoreError};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

pub const CAPTIONS_DIR: &str = "captions";
pub const SCHEDULE_FILE: &str = "schedule.json";
pub const SRT_FILE: &str = "captions.srt";
pub const VTT_FILE: &str = "captions.vtt";

/// Output failures
#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to write {}: {}", .path.display(), .source)]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: CoreError,
    },

    #[error("output task failed: {0}")]
    TaskFailed(String),
}

/// Subtitle files written next to the schedule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Subtitles {
    pub srt: bool,
    pub vtt: bool,
}

/// What a run wrote
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSummary {
    pub bitmaps: usize,
    pub schedule: PathBuf,
    pub srt: Option<PathBuf>,
    pub vtt: Option<PathBuf>,
}

/// Writes bitmaps, the schedule manifest and any requested subtitle files
pub async fn write_outputs(
    schedule: Arc<ClipSchedule>,
    out_dir: &Path,
    jobs: usize,
    subtitles: Subtitles,
) -> Result<OutputSummary, CliError> {
    let out_dir = prepare_output_dir(out_dir).map_err(|source| CliError::WriteFailed {
        path: out_dir.to_path_buf(),
        source,
    })?;
    let captions_dir = out_dir.join(CAPTIONS_DIR);
    prepare_output_dir(&captions_dir).map_err(|source| CliError::WriteFailed {
        path: captions_dir.clone(),
        source,
    })?;

    let bitmaps = write_bitmaps(Arc::clone(&schedule), &captions_dir, jobs).await?;

    // Manifest last: a present schedule.json means every bitmap is in place.
    let schedule_path = out_dir.join(SCHEDULE_FILE);
    atomic_write_json_pretty(&schedule_path, &schedule.manifest()).map_err(|source| {
        CliError::WriteFailed {
            path: schedule_path.clone(),
            source,
        }
    })?;

    let groups: Vec<CaptionGroup> = schedule.groups().cloned().collect();
    let srt_path = if subtitles.srt {
        Some(write_text(&out_dir.join(SRT_FILE), &export_srt(&groups))?)
    } else {
        None
    };
    let vtt_path = if subtitles.vtt {
        Some(write_text(&out_dir.join(VTT_FILE), &export_vtt(&groups))?)
    } else {
        None
    };

    info!(
        "Wrote {} caption bitmaps and {}",
        bitmaps,
        schedule_path.display()
    );
    Ok(OutputSummary {
        bitmaps,
        schedule: schedule_path,
        srt: srt_path,
        vtt: vtt_path,
    })
}

fn write_text(path: &Path, text: &str) -> Result<PathBuf, CliError> {
    atomic_write_bytes(path, text.as_bytes()).map_err(|source| CliError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Wrote {}", path.display());
    Ok(path.to_path_buf())
}

/// Encodes every clip's bitmap on the blocking pool, at most `jobs` at once
pub async fn write_bitmaps(
    schedule: Arc<ClipSchedule>,
    dir: &Path,
    jobs: usize,
) -> Result<usize, CliError> {
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let mut tasks = JoinSet::new();

    for index in 0..schedule.clips.len() {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|e| CliError::TaskFailed(e.to_string()))?;
        let schedule = Arc::clone(&schedule);
        let path = dir.join(caption_file_name(schedule.clips[index].index));

        tasks.spawn_blocking(move || {
            let _permit = permit;
            let clip = &schedule.clips[index];
            clip.rendered
                .write_png(&path)
                .map_err(|source| CliError::WriteFailed {
                    path: path.clone(),
                    source,
                })?;
            debug!("Wrote {}", path.display());
            Ok::<_, CliError>(())
        });
    }

    let mut written = 0;
    while let Some(result) = tasks.join_next().await {
        result.map_err(|e| CliError::TaskFailed(e.to_string()))??;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelcaption_core::core::text::{GlyphMask, TextExtent};
    use reelcaption_core::core::pipeline::ScheduleManifest;
    use reelcaption_core::{
        CaptionPipeline, CaptionSettings, CoreResult, TextMeasurer, TextRasterizer, WordTiming,
    };
    use tempfile::TempDir;

    /// Solid 10px-wide cells, no font needed
    struct Blocks;

    impl TextMeasurer for Blocks {
        fn measure(&self, text: &str, font_size: f32) -> CoreResult<TextExtent> {
            Ok(TextExtent::new(
                text.chars().count() as u32 * 10,
                font_size as u32,
            ))
        }
    }

    impl TextRasterizer for Blocks {
        fn rasterize(&self, text: &str, font_size: f32) -> CoreResult<GlyphMask> {
            let extent = self.measure(text, font_size)?;
            let mut mask = GlyphMask::new(extent.width, extent.height);
            mask.coverage.fill(255);
            Ok(mask)
        }
    }

    fn schedule() -> Arc<ClipSchedule> {
        let words = vec![
            WordTiming::new("first", 0.0, 0.4),
            WordTiming::new("words", 0.45, 0.9),
            WordTiming::new("later", 3.0, 3.5),
        ];
        let pipeline = CaptionPipeline::new(CaptionSettings::default(), Arc::new(Blocks)).unwrap();
        Arc::new(pipeline.run(words).unwrap())
    }

    #[tokio::test]
    async fn test_write_outputs_layout() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");

        let subtitles = Subtitles {
            srt: true,
            vtt: false,
        };
        let summary = write_outputs(schedule(), &out, 2, subtitles).await.unwrap();

        assert_eq!(summary.bitmaps, 2);
        assert!(out.join("captions/caption_0001.png").is_file());
        assert!(out.join("captions/caption_0002.png").is_file());
        assert!(!out.join("captions/caption_0003.png").exists());

        let manifest: ScheduleManifest =
            serde_json::from_str(&std::fs::read_to_string(&summary.schedule).unwrap()).unwrap();
        assert_eq!(manifest.clips.len(), 2);
        assert_eq!(manifest.clips[0].text, "first words");

        let srt = std::fs::read_to_string(summary.srt.unwrap()).unwrap();
        assert!(srt.contains("00:00:00,000 --> 00:00:00,900"));
        assert!(srt.contains("later"));
        assert!(summary.vtt.is_none());
    }

    #[tokio::test]
    async fn test_write_vtt() {
        let dir = TempDir::new().unwrap();
        let subtitles = Subtitles {
            srt: false,
            vtt: true,
        };
        let summary = write_outputs(schedule(), dir.path(), 1, subtitles)
            .await
            .unwrap();

        assert!(summary.srt.is_none());
        let path = summary.vtt.unwrap();
        assert_eq!(path, dir.path().join(VTT_FILE));
        let vtt = std::fs::read_to_string(path).unwrap();
        assert!(vtt.starts_with("WEBVTT\n\n"));
        assert!(vtt.contains("00:00:00.000 --> 00:00:00.900\nfirst words"));
        assert!(vtt.contains("later"));
    }

    #[tokio::test]
    async fn test_subtitles_are_optional() {
        let dir = TempDir::new().unwrap();
        let summary = write_outputs(schedule(), dir.path(), 1, Subtitles::default())
            .await
            .unwrap();
        assert!(summary.srt.is_none());
        assert!(summary.vtt.is_none());
        assert!(!dir.path().join(SRT_FILE).exists());
        assert!(!dir.path().join(VTT_FILE).exists());
    }

    #[tokio::test]
    async fn test_output_path_must_be_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("occupied");
        std::fs::write(&file, "x").unwrap();

        let result = write_outputs(schedule(), &file, 1, Subtitles::default()).await;
        assert!(matches!(result, Err(CliError::WriteFailed { .. })));
    }
}
