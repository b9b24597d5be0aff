use regex::Regex;
use std::path::Path;

use crate::error::ChapterError;
use crate::ffmpeg::{self, CommandRunner};

const CHAPTER_PATTERN: &str = r"Chapter #(\d+:\d+): start (\d+\.\d+), end (\d+\.\d+)";

/// One chapter as ffmpeg reports it, e.g. `Chapter #0:3: start 12.000000, end 80.500000`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterMarker {
    /// `<stream-index>:<chapter-index>`, unique within one detection run.
    pub identifier: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl ChapterMarker {
    /// The part of the identifier after the `:`, used verbatim for naming.
    pub fn sub_index(&self) -> &str {
        self.identifier
            .split_once(':')
            .map(|(_, sub)| sub)
            .unwrap_or(&self.identifier)
    }
}

/// Runs `ffmpeg -i <input>` and reads the chapter markers from its diagnostics.
///
/// ffmpeg exits non-zero here because no output file is given, so the exit
/// status is logged and otherwise ignored.
pub fn detect(runner: &dyn CommandRunner, input_file: &Path) -> Result<Vec<ChapterMarker>, ChapterError> {
    let output = runner.run(&ffmpeg::inspect_args(input_file))?;
    if !output.success {
        tracing::debug!("inspection exited with {:?}", output.code);
    }
    tracing::debug!("inspection output:\n{}", output.text);

    let markers = parse_chapters(&output.text)?;
    for marker in &markers {
        tracing::debug!(
            "chapter {}: {} -> {}",
            marker.identifier,
            marker.start_seconds,
            marker.end_seconds
        );
    }
    Ok(markers)
}

pub fn parse_chapters(output: &str) -> Result<Vec<ChapterMarker>, ChapterError> {
    let pattern = Regex::new(CHAPTER_PATTERN)?;

    Ok(output
        .lines()
        .filter_map(|line| pattern.captures(line))
        .filter_map(|cap| {
            let start_seconds = cap[2].parse::<f64>().ok()?;
            let end_seconds = cap[3].parse::<f64>().ok()?;
            Some(ChapterMarker {
                identifier: cap[1].to_string(),
                start_seconds,
                end_seconds,
            })
        })
        .collect())
}
