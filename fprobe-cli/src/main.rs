//! fprobe CLI binary.
//!
//! Entry point for the `fprobe` command-line tool.

use std::process::ExitCode;

use clap::Parser;
use fprobe_cli::exit::{codes, exit_code};
use fprobe_cli::{
    execute_list, execute_render, execute_run, Cli, Command, CommandError, ListArgs, RenderArgs,
    RunArgs, ShutdownFlag,
};
use fprobe_clock::SystemClock;
use fprobe_fs::RealFilesystem;
use fprobe_harness::StderrLogger;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run(args) => run_run(args),
        Command::Render(args) => run_render(args).map(|()| codes::SUCCESS),
        Command::List(args) => run_list(args).map(|()| codes::SUCCESS),
    };

    match result {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(exit_code(&e) as u8)
        }
    }
}

/// Run the run command. The exit code reflects the verdict.
fn run_run(args: RunArgs) -> Result<i32, CommandError> {
    // Ctrl+C ends the run once the current probe returns
    let shutdown = ShutdownFlag::new();
    let logger = StderrLogger::new(args.verbosity());
    let clock = SystemClock;
    let fs = RealFilesystem;

    let outcome = execute_run(&args, &fs, &clock, &logger, &shutdown)?;
    let summary = &outcome.report.summary;

    println!("{} {}:", outcome.report.engine.name, outcome.report.engine.version);
    println!(
        "  {} passed, {} failed, {} skipped, {} errors, {} partial ({} total)",
        summary.passed, summary.failed, summary.skipped, summary.errors, summary.partial, summary.total
    );
    println!("  Discrepancies: {}", summary.discrepancies);
    for r in outcome.report.discrepancies() {
        println!(
            "    {} ({}): probe={}, declared={}",
            r.result.feature_id, r.result.spec_track, r.result.outcome, r.declared_level
        );
    }
    println!();
    println!("Output files:");
    println!("  JSON: {}", outcome.written.json.display());
    println!("  Markdown: {}", outcome.written.markdown.display());
    if let Some(path) = &outcome.step_summary {
        println!("  Step summary: {}", path.display());
    }

    Ok(outcome.verdict.exit_code())
}

fn run_render(args: RenderArgs) -> Result<(), CommandError> {
    let fs = RealFilesystem;
    let markdown = execute_render(&args, &fs)?;
    print!("{}", markdown);
    Ok(())
}

fn run_list(args: ListArgs) -> Result<(), CommandError> {
    let fs = RealFilesystem;
    for entry in execute_list(&args, &fs)? {
        println!("{}", entry.line());
    }
    Ok(())
}
