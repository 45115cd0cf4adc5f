//! ReelCaption CLI
//!
//! Reads a word-timing transcript, runs the caption pipeline and writes the
//! caption bitmaps plus a clip schedule for an external compositor.

mod args;
mod logging;
mod output;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use reelcaption_core::core::captions::load_word_timings;
use reelcaption_core::{CaptionPipeline, CoreError};
use tracing::{error, info};

use crate::args::Args;
use crate::output::OutputSummary;

/// Exit code when the transcript yields no captions
const EXIT_NO_CAPTIONS: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_logging(args.debug, args.log_dir.as_deref());
    let json = args.json;

    match run(args).await {
        Ok(summary) if json => match serde_json::to_string_pretty(&summary) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        },
        Ok(summary) => {
            println!(
                "{} captions written, schedule at {}",
                summary.bitmaps,
                summary.schedule.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) if matches!(e.downcast_ref::<CoreError>(), Some(CoreError::NoCaptions)) => {
            eprintln!("no captions produced");
            ExitCode::from(EXIT_NO_CAPTIONS)
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<OutputSummary> {
    let settings = args.load_settings()?;
    let transcript = args.transcript.clone();
    info!("Captioning {}", transcript.display());

    let schedule = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let words = load_word_timings(&transcript)
            .with_context(|| format!("failed to read transcript {}", transcript.display()))?;
        let pipeline = CaptionPipeline::from_settings(settings)?;
        Ok(pipeline.run(words)?.ensure_not_empty()?)
    })
    .await
    .context("caption pipeline task failed")??;

    let summary = output::write_outputs(
        Arc::new(schedule),
        &args.out_dir,
        args.jobs(),
        args.subtitles(),
    )
    .await?;
    Ok(summary)
}
