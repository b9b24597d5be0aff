use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChapterError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("could not execute {program}: {source}")]
    ExecutionUnavailable {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("could not create output directory {}: {source}", .path.display())]
    PlanningFilesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("chapter {chapter}: command '{command}' returned with error (code {}): {diagnostics}", format_code(.code))]
    ExportFailed {
        chapter: String,
        command: String,
        code: Option<i32>,
        diagnostics: String,
    },

    #[error("chapter pattern: {0}")]
    Pattern(#[from] regex::Error),
}

fn format_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}
