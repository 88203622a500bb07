pub mod args;

use std::process::ExitCode;

use anyhow::{Context, Result};
use emdrv_runtest::render_failure_report;

pub use args::ReportArgs;

pub fn handle_report(args: ReportArgs) -> Result<ExitCode> {
    let summary = render_failure_report(&args.results, &args.output, &args.options())
        .with_context(|| format!("Failed to build report from {}", args.results.display()))?;

    if !summary.files_skipped.is_empty() {
        println!(
            "{} result file(s) could not be read and were left out",
            summary.files_skipped.len()
        );
    }
    println!("Report: {}", args.output.display());

    Ok(ExitCode::SUCCESS)
}
