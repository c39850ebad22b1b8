//! IO helpers for CLI operations.
//!
//! Provides utilities for:
//! - Writing report artifacts (`<engine>-feature-report.json` and `.md`)
//! - Appending the Markdown report to a CI job summary

pub mod output_writer;
pub mod step_summary;

pub use output_writer::{OutputWriter, OutputWriterError, WrittenFiles};
pub use step_summary::StepSummary;
