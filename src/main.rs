mod chapters;
mod error;
mod export;
mod ffmpeg;
mod planner;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::ChapterError;
use crate::ffmpeg::FfmpegRunner;

/// Split a media file into one file per chapter, stream-copying with ffmpeg.
#[derive(Parser, Debug)]
#[command(name = "chapter-split", version, long_about = None)]
struct Args {
    /// Input media file
    #[arg(value_name = "FILE", required_unless_present = "file")]
    input: Option<PathBuf>,

    /// Input media file (alternative to the positional argument)
    #[arg(short, long, value_name = "FILE", conflicts_with = "input")]
    file: Option<PathBuf>,

    /// Directory the chapter files are written to
    #[arg(short, long, value_name = "DIR", default_value = "output")]
    output_dir: PathBuf,

    /// ffmpeg executable used for inspection and extraction
    #[arg(long, env = "CHAPTER_SPLIT_FFMPEG", default_value = ffmpeg::FFMPEG_EXECUTABLE)]
    ffmpeg: PathBuf,

    /// Reject inputs whose extension differs, e.g. `m4b`
    #[arg(long, value_name = "EXT")]
    require_ext: Option<String>,

    /// Print the extraction plan without running it
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chapter_split=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when at least one chapter failed to export.
fn run(args: Args) -> Result<bool> {
    let Some(input) = args.file.or(args.input) else {
        bail!(ChapterError::InvalidInput("no input file given".to_string()));
    };

    planner::validate_input(&input, args.require_ext.as_deref())?;

    let runner = FfmpegRunner::new(args.ffmpeg);
    let markers = chapters::detect(&runner, &input)
        .with_context(|| format!("detecting chapters in {}", input.display()))?;
    if markers.is_empty() {
        tracing::warn!("no chapters found in {}", input.display());
    } else {
        tracing::info!("found {} chapters in {}", markers.len(), input.display());
    }

    let jobs = planner::plan(&markers, &input, &args.output_dir)?;
    for job in &jobs {
        println!(
            "{}: {} -> {}  {}",
            job.chapter,
            ffmpeg::format_seconds(job.start_seconds),
            ffmpeg::format_seconds(job.end_seconds),
            job.output_path.display()
        );
    }

    if args.dry_run {
        return Ok(true);
    }

    let report = export::export(&runner, &jobs)?;

    let exported = report.exported().count();
    let failures: Vec<_> = report.failures().collect();
    println!("Exported {} of {} chapters", exported, jobs.len());
    for failure in &failures {
        eprintln!("Failed: {}", failure);
    }

    Ok(report.is_success())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_input_with_defaults() {
        let args = Args::try_parse_from(["chapter-split", "book.m4b"]).unwrap();
        assert_eq!(args.input, Some(PathBuf::from("book.m4b")));
        assert_eq!(args.output_dir, PathBuf::from("output"));
        assert!(!args.dry_run);
    }

    #[test]
    fn file_flag_is_accepted() {
        let args =
            Args::try_parse_from(["chapter-split", "-f", "book.m4b", "-o", "chapters"]).unwrap();
        assert_eq!(args.file, Some(PathBuf::from("book.m4b")));
        assert_eq!(args.output_dir, PathBuf::from("chapters"));
    }

    #[test]
    fn input_is_required() {
        assert!(Args::try_parse_from(["chapter-split"]).is_err());
    }
}
