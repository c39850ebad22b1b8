//! Exit codes for the fprobe CLI.
//!
//! A completed run exits 0 when clean and 1 when it found discrepancies or
//! errors. Higher codes mean the run could not complete.

use fprobe_harness::RunError;

use crate::commands::CommandError;

/// Exit code constants.
pub mod codes {
    /// Clean run, or a successful render/list.
    pub const SUCCESS: i32 = 0;
    /// Run completed with discrepancies or errored probes.
    pub const DIRTY_RUN: i32 = 1;
    /// Invalid arguments (clap also exits 2).
    pub const INVALID_ARGS: i32 = 2;
    /// Catalog could not be loaded.
    pub const CATALOG_ERROR: i32 = 3;
    /// Manifest could not be loaded or registered.
    pub const MANIFEST_ERROR: i32 = 4;
    /// IO error, including unwritable output and unreadable reports.
    pub const IO_ERROR: i32 = 5;
    /// Internal software error (EX_SOFTWARE).
    pub const INTERNAL_ERROR: i32 = 70;
    /// Interrupted by signal (128 + signal number).
    pub const SIGINT: i32 = 130;
}

/// Map a CommandError to an exit code.
pub fn exit_code(error: &CommandError) -> i32 {
    match error {
        CommandError::InvalidArgument(_) => codes::INVALID_ARGS,
        CommandError::Catalog(_) => codes::CATALOG_ERROR,
        CommandError::Manifest(_) | CommandError::Registry(_) => codes::MANIFEST_ERROR,
        CommandError::Filesystem(_)
        | CommandError::WorkDir(_)
        | CommandError::Output(_)
        | CommandError::Report(_) => codes::IO_ERROR,
        CommandError::Run(RunError::Interrupted { .. }) => codes::SIGINT,
        CommandError::Run(RunError::AlreadyRun(_)) => codes::INTERNAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliError;
    use crate::io::OutputWriterError;
    use fprobe_fs::FsError;
    use fprobe_harness::{CatalogError, ManifestError, RegistryError, ReportError, RunState};
    use fprobe_schema::SpecTrack;
    use std::path::PathBuf;

    #[test]
    fn test_exit_code_invalid_argument() {
        let error = CommandError::InvalidArgument(CliError::InvalidTimeout(0));
        assert_eq!(exit_code(&error), codes::INVALID_ARGS);
        let error = CommandError::InvalidArgument(CliError::ManifestNotFound(PathBuf::from("m")));
        assert_eq!(exit_code(&error), codes::INVALID_ARGS);
    }

    #[test]
    fn test_exit_code_catalog() {
        let error = CommandError::Catalog(CatalogError::NotAnObject);
        assert_eq!(exit_code(&error), codes::CATALOG_ERROR);
    }

    #[test]
    fn test_exit_code_manifest_and_registry() {
        let error = CommandError::Manifest(ManifestError::Invalid("no probes".to_string()));
        assert_eq!(exit_code(&error), codes::MANIFEST_ERROR);
        let error = CommandError::Registry(RegistryError::Duplicate {
            feature_id: "x".to_string(),
            spec_track: SpecTrack::primary(),
        });
        assert_eq!(exit_code(&error), codes::MANIFEST_ERROR);
    }

    #[test]
    fn test_exit_code_io() {
        let errors = [
            CommandError::Filesystem(FsError::Path("test".to_string())),
            CommandError::WorkDir(std::io::Error::other("full")),
            CommandError::Output(OutputWriterError::CreateDir(FsError::Path("x".to_string()))),
            CommandError::Report(ReportError::SummaryMismatch),
        ];
        for error in &errors {
            assert_eq!(exit_code(error), codes::IO_ERROR, "{}", error);
        }
    }

    #[test]
    fn test_exit_code_interrupted() {
        let error = CommandError::Run(RunError::Interrupted { completed: 2, total: 5 });
        assert_eq!(exit_code(&error), codes::SIGINT);
    }

    #[test]
    fn test_exit_code_already_run() {
        let error = CommandError::Run(RunError::AlreadyRun(RunState::Completed));
        assert_eq!(exit_code(&error), codes::INTERNAL_ERROR);
    }

    #[test]
    fn test_exit_codes_fit_in_u8() {
        for code in [
            codes::SUCCESS,
            codes::DIRTY_RUN,
            codes::INVALID_ARGS,
            codes::CATALOG_ERROR,
            codes::MANIFEST_ERROR,
            codes::IO_ERROR,
            codes::INTERNAL_ERROR,
            codes::SIGINT,
        ] {
            assert!((0..=255).contains(&code));
        }
    }
}
