//! Output writer for report artifacts.
//!
//! Writes two files to the output directory, named after the engine:
//! - `<engine>-feature-report.json` - The machine-readable report
//! - `<engine>-feature-report.md` - The Markdown view of it

use std::path::{Path, PathBuf};

use fprobe_fs::{Filesystem, FsError};
use fprobe_harness::Report;
use thiserror::Error;

/// Errors from output writing.
#[derive(Debug, Error)]
pub enum OutputWriterError {
    #[error("failed to create output directory: {0}")]
    CreateDir(#[source] FsError),

    #[error("failed to write {file}: {source}")]
    Write {
        file: String,
        #[source]
        source: FsError,
    },
}

/// Paths of the artifacts written by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    pub json: PathBuf,
    pub markdown: PathBuf,
}

/// Output writer that writes artifacts to a directory.
pub struct OutputWriter<'a, F: Filesystem> {
    fs: &'a F,
    out_dir: &'a Path,
}

impl<'a, F: Filesystem> OutputWriter<'a, F> {
    pub fn new(fs: &'a F, out_dir: &'a Path) -> Self {
        Self { fs, out_dir }
    }

    /// Ensure the output directory exists.
    pub fn ensure_dir(&self) -> Result<(), OutputWriterError> {
        self.fs
            .create_dir_all(self.out_dir)
            .map_err(OutputWriterError::CreateDir)
    }

    /// Write the JSON report, then its Markdown view.
    pub fn write_all(
        &self,
        report: &Report,
        markdown: &str,
    ) -> Result<WrittenFiles, OutputWriterError> {
        self.ensure_dir()?;

        let json = self.write(&report.json_file_name(), &report.to_json())?;
        let markdown = self.write(&report.markdown_file_name(), markdown)?;

        Ok(WrittenFiles { json, markdown })
    }

    fn write(&self, file: &str, content: &str) -> Result<PathBuf, OutputWriterError> {
        let path = self.out_dir.join(file);
        self.fs
            .write_atomic(&path, content.as_bytes())
            .map_err(|e| OutputWriterError::Write {
                file: file.to_string(),
                source: e,
            })?;
        Ok(path)
    }
}
