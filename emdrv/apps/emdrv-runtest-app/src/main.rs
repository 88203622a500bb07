//! emdrv regression test CLI
//!
//! Runs the driver regression suite on a kit through the external toolchain
//! and turns XML results into an HTML failure summary.

mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "emdrv-runtest",
    version,
    about = "Run emdrv regression tests.",
    after_help = "Example: emdrv-runtest run --kit EFM32TG_STK3300 --compiler iar --runner ./toolchain"
)]
struct Cli {
    /// Verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run tests on a kit and write the XML report
    Run(commands::run::RunArgs),
    /// List the tests a run would execute
    List(commands::list::ListArgs),
    /// Render an HTML table of failed test cases from XML results
    Report(commands::report::ReportArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Run(args) => commands::run::handle_run(args, cli.verbose),
        Command::List(args) => commands::list::handle_list(args),
        Command::Report(args) => commands::report::handle_report(args),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// `info` by default, `debug` with `--verbose`; `RUST_LOG` overrides both
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}
