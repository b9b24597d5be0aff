use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::ChapterError;

pub const FFMPEG_EXECUTABLE: &str = "ffmpeg";

/// Everything a finished subprocess left behind. `text` holds stdout followed
/// by stderr; ffmpeg writes its diagnostics to the latter.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub success: bool,
    pub text: String,
}

/// Runs one external command to completion and captures its output.
///
/// A non-zero exit is not an error at this level; callers decide what the
/// exit status means. Only a failure to start the process is reported as
/// `ChapterError::ExecutionUnavailable`.
pub trait CommandRunner {
    fn run(&self, args: &[OsString]) -> Result<CommandOutput, ChapterError>;

    fn program(&self) -> &OsStr;

    fn command_line(&self, args: &[OsString]) -> String {
        format!(
            "{} {}",
            self.program().to_string_lossy(),
            args.iter()
                .map(|arg| arg.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        )
    }
}

pub struct FfmpegRunner {
    executable: OsString,
}

impl FfmpegRunner {
    pub fn new(executable: impl Into<OsString>) -> Self {
        FfmpegRunner {
            executable: executable.into(),
        }
    }
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        FfmpegRunner::new(FFMPEG_EXECUTABLE)
    }
}

impl CommandRunner for FfmpegRunner {
    fn run(&self, args: &[OsString]) -> Result<CommandOutput, ChapterError> {
        tracing::info!("Executing: {}", self.command_line(args));

        let output = Command::new(&self.executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| ChapterError::ExecutionUnavailable {
                program: self.executable.to_string_lossy().into_owned(),
                source,
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CommandOutput {
            code: output.status.code(),
            success: output.status.success(),
            text,
        })
    }

    fn program(&self) -> &OsStr {
        &self.executable
    }
}

/// `ffmpeg -i <input>`: no output file, so ffmpeg prints the container
/// metadata (chapters included) and exits non-zero.
pub fn inspect_args(input_file: &Path) -> Vec<OsString> {
    vec!["-i".into(), input_file.into()]
}

/// Stream-copies `[start, end)` of `input_file` into `output_file`.
pub fn extract_args(input_file: &Path, start: f64, end: f64, output_file: &Path) -> Vec<OsString> {
    vec![
        "-i".into(),
        input_file.into(),
        "-vcodec".into(),
        "copy".into(),
        "-acodec".into(),
        "copy".into(),
        "-ss".into(),
        format_seconds(start).into(),
        "-to".into(),
        format_seconds(end).into(),
        output_file.into(),
    ]
}

pub fn format_seconds(seconds: f64) -> String {
    format!("{:.6}", seconds)
}
