pub mod args;

use std::process::ExitCode;

use anyhow::{Context, Result};
use emdrv_runtest::{
    CommandRunner, JsonDescriptorParser, ModuleCatalog, Runner, TestReporter, console,
    select_tests,
};

pub use args::RunArgs;

pub fn handle_run(args: RunArgs, verbose: bool) -> Result<ExitCode> {
    let selection = args.selection.to_selection();
    let config = args.run_config(verbose);

    let mut reporter = TestReporter::new(selection.kit.as_str());
    let tests = select_tests(
        &args.selection.root,
        &ModuleCatalog::emdrv(),
        &selection,
        &JsonDescriptorParser::emdrv(),
        &mut reporter,
    )
    .context("Failed to collect tests")?;

    log::debug!(
        "Running with {} ({}), flasher {}",
        config.compiler.as_str(),
        config.build_config.as_str(),
        config.flasher.as_str()
    );

    let mut runner = CommandRunner::new(&args.runner, config);
    runner
        .run(&tests, &mut reporter)
        .context("Test run aborted")?;

    let report_path = reporter
        .write_report(&args.out)
        .context("Failed to write XML report")?;

    console::print_rule();
    eprintln!("Human readable report:");
    console::print_statistics(&reporter);
    console::print_failures(&reporter);
    log::info!("XML report written to {}", report_path.display());

    if reporter.has_failures() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
