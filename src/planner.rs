use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::chapters::ChapterMarker;
use crate::error::ChapterError;

/// One chapter's worth of work for the exporter.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterExtractionJob {
    pub chapter: String,
    pub source_file: PathBuf,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub output_path: PathBuf,
}

/// Fails fast on a source file that cannot be handed to ffmpeg.
///
/// `required_ext` is compared case-insensitively and may carry a leading dot.
pub fn validate_input(input_file: &Path, required_ext: Option<&str>) -> Result<(), ChapterError> {
    let metadata = fs::metadata(input_file).map_err(|e| {
        ChapterError::InvalidInput(format!("{}: {}", input_file.display(), e))
    })?;
    if !metadata.is_file() {
        return Err(ChapterError::InvalidInput(format!(
            "{} is not a file",
            input_file.display()
        )));
    }
    fs::File::open(input_file).map_err(|e| {
        ChapterError::InvalidInput(format!("{} is not readable: {}", input_file.display(), e))
    })?;

    if let Some(required) = required_ext {
        let required = required.trim_start_matches('.');
        let actual = input_file.extension().and_then(|s| s.to_str()).unwrap_or("");
        if !actual.eq_ignore_ascii_case(required) {
            return Err(ChapterError::InvalidInput(format!(
                "{} does not have the .{} extension",
                input_file.display(),
                required
            )));
        }
    }
    Ok(())
}

/// Builds one job per marker and makes sure `output_dir` exists.
///
/// Output files are named `<sub-index> <source file name>`. When two markers
/// share a sub-index (chapters on different streams) those jobs fall back to
/// the full identifier, `<stream>-<chapter> <source file name>`.
pub fn plan(
    markers: &[ChapterMarker],
    source_file: &Path,
    output_dir: &Path,
) -> Result<Vec<ChapterExtractionJob>, ChapterError> {
    let file_name = source_file.file_name().ok_or_else(|| {
        ChapterError::InvalidInput(format!("{} has no file name", source_file.display()))
    })?;

    for marker in markers {
        if marker.start_seconds < 0.0 || marker.start_seconds >= marker.end_seconds {
            return Err(ChapterError::InvalidInput(format!(
                "chapter {} has an empty or inverted range ({} -> {})",
                marker.identifier, marker.start_seconds, marker.end_seconds
            )));
        }
    }

    let mut sub_index_counts: HashMap<&str, usize> = HashMap::new();
    for marker in markers {
        *sub_index_counts.entry(marker.sub_index()).or_default() += 1;
    }

    let mut seen = HashSet::new();
    let mut jobs = Vec::with_capacity(markers.len());
    for marker in markers {
        let token = if sub_index_counts[marker.sub_index()] > 1 {
            marker.identifier.replace(':', "-")
        } else {
            marker.sub_index().to_string()
        };
        if !seen.insert(token.clone()) {
            return Err(ChapterError::InvalidInput(format!(
                "duplicate chapter identifier {}",
                marker.identifier
            )));
        }

        let mut name = OsString::from(format!("{} ", token));
        name.push(file_name);

        jobs.push(ChapterExtractionJob {
            chapter: marker.identifier.clone(),
            source_file: source_file.to_path_buf(),
            start_seconds: marker.start_seconds,
            end_seconds: marker.end_seconds,
            output_path: output_dir.join(name),
        });
    }

    fs::create_dir_all(output_dir).map_err(|source| ChapterError::PlanningFilesystem {
        path: output_dir.to_path_buf(),
        source,
    })?;

    Ok(jobs)
}
