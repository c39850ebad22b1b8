//! CI job summary sink.
//!
//! Appends the Markdown report to the file named by `GITHUB_STEP_SUMMARY`
//! (or `--step-summary`). Earlier content from other steps is preserved.

use std::path::Path;

use fprobe_fs::{Filesystem, FsError};

pub struct StepSummary<'a, F: Filesystem> {
    fs: &'a F,
    path: &'a Path,
}

impl<'a, F: Filesystem> StepSummary<'a, F> {
    pub fn new(fs: &'a F, path: &'a Path) -> Self {
        Self { fs, path }
    }

    /// Append `markdown`, ending it with a newline if it lacks one.
    pub fn append(&self, markdown: &str) -> Result<(), FsError> {
        let mut content = markdown.to_string();
        if !content.ends_with('\n') {
            content.push('\n');
        }
        self.fs.append(self.path, content.as_bytes())
    }
}
