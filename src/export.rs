use std::path::PathBuf;

use crate::error::ChapterError;
use crate::ffmpeg::{self, CommandRunner};
use crate::planner::ChapterExtractionJob;

/// Success carries the written file; failure is always `ChapterError::ExportFailed`.
pub type ExportResult = Result<PathBuf, ChapterError>;

#[derive(Debug, Default)]
pub struct ExportReport {
    pub results: Vec<ExportResult>,
}

impl ExportReport {
    pub fn exported(&self) -> impl Iterator<Item = &PathBuf> {
        self.results.iter().filter_map(|r| r.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ChapterError> {
        self.results.iter().filter_map(|r| r.as_ref().err())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Runs one stream-copy extraction per job, in plan order.
///
/// A job that exits non-zero is recorded and the next job is still attempted.
/// Only a tool that cannot be started at all aborts the whole export.
pub fn export(runner: &dyn CommandRunner, jobs: &[ChapterExtractionJob]) -> Result<ExportReport, ChapterError> {
    let mut report = ExportReport::default();

    for job in jobs {
        let args = ffmpeg::extract_args(
            &job.source_file,
            job.start_seconds,
            job.end_seconds,
            &job.output_path,
        );
        let output = runner.run(&args)?;

        if output.success {
            tracing::info!("chapter {} written to {}", job.chapter, job.output_path.display());
            report.results.push(Ok(job.output_path.clone()));
        } else {
            let err = ChapterError::ExportFailed {
                chapter: job.chapter.clone(),
                command: runner.command_line(&args),
                code: output.code,
                diagnostics: output.text,
            };
            tracing::warn!("{}", err);
            report.results.push(Err(err));
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffmpeg::fake::FakeRunner;
    use std::io;
    use std::path::Path;

    fn job(chapter: &str, start: f64, end: f64, output: &str) -> ChapterExtractionJob {
        ChapterExtractionJob {
            chapter: chapter.to_string(),
            source_file: PathBuf::from("book.m4b"),
            start_seconds: start,
            end_seconds: end,
            output_path: PathBuf::from(output),
        }
    }

    #[test]
    fn exports_every_job_in_order() {
        let runner = FakeRunner::new().respond(0, "").respond(0, "");
        let jobs = vec![
            job("0:0", 0.0, 125.5, "output/0 book.m4b"),
            job("0:1", 125.5, 300.0, "output/1 book.m4b"),
        ];

        let report = export(&runner, &jobs).unwrap();

        assert!(report.is_success());
        assert_eq!(
            report.exported().collect::<Vec<_>>(),
            vec![Path::new("output/0 book.m4b"), Path::new("output/1 book.m4b")]
        );
        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0][7], "0.000000");
        assert_eq!(calls[0][9], "125.500000");
        assert_eq!(calls[1][10], "output/1 book.m4b");
    }

    #[test]
    fn failed_job_does_not_stop_the_rest() {
        let runner = FakeRunner::new()
            .respond(1, "No such filter")
            .respond(0, "");
        let jobs = vec![
            job("0:0", 0.0, 10.0, "output/0 a.mkv"),
            job("0:1", 10.0, 20.0, "output/1 a.mkv"),
        ];

        let report = export(&runner, &jobs).unwrap();

        assert!(!report.is_success());
        assert_eq!(runner.calls.borrow().len(), 2);
        match &report.results[0] {
            Err(ChapterError::ExportFailed {
                chapter,
                command,
                code,
                diagnostics,
            }) => {
                assert_eq!(chapter, "0:0");
                assert_eq!(*code, Some(1));
                assert_eq!(diagnostics, "No such filter");
                assert!(command.starts_with("fake-ffmpeg -i book.m4b -vcodec copy"));
            }
            other => panic!("expected ExportFailed, got {:?}", other),
        }
        assert!(report.results[1].is_ok());
    }

    #[test]
    fn missing_tool_aborts_export() {
        let runner = FakeRunner::new().fail_to_start(io::ErrorKind::PermissionDenied);
        let jobs = vec![
            job("0:0", 0.0, 10.0, "output/0 a.mkv"),
            job("0:1", 10.0, 20.0, "output/1 a.mkv"),
        ];

        let err = export(&runner, &jobs).unwrap_err();

        assert!(matches!(err, ChapterError::ExecutionUnavailable { .. }));
        assert_eq!(runner.calls.borrow().len(), 1);
    }

    #[test]
    fn no_jobs_is_a_successful_empty_report() {
        let runner = FakeRunner::new();
        let report = export(&runner, &[]).unwrap();
        assert!(report.is_success());
        assert!(report.results.is_empty());
    }
}
