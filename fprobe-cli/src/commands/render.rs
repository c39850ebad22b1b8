//! Render command: Markdown from a previously written JSON report.

use fprobe_fs::Filesystem;
use fprobe_harness::{render_markdown, Report};

use crate::cli::{CliError, RenderArgs};

use super::CommandResult;

/// Execute the render command, returning the Markdown.
pub fn execute_render<F: Filesystem>(args: &RenderArgs, fs: &F) -> CommandResult<String> {
    if !fs.exists(&args.report) {
        return Err(CliError::ReportNotFound(args.report.clone()).into());
    }
    let json = fs.read_file(&args.report)?;
    let report = Report::from_json(&json)?;
    Ok(render_markdown(&report))
}
