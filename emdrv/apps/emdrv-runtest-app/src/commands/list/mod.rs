pub mod args;

use std::process::ExitCode;

use anyhow::{Context, Result};
use emdrv_runtest::{JsonDescriptorParser, ModuleCatalog, Outcome, TestReporter, select_tests};

pub use args::ListArgs;

/// Print what `run` would execute with the same selection flags
pub fn handle_list(args: ListArgs) -> Result<ExitCode> {
    let selection = args.selection.to_selection();
    let mut reporter = TestReporter::new(selection.kit.as_str());
    let tests = select_tests(
        &args.selection.root,
        &ModuleCatalog::emdrv(),
        &selection,
        &JsonDescriptorParser::emdrv(),
        &mut reporter,
    )
    .context("Failed to collect tests")?;

    if args.json {
        let json = serde_json::to_string_pretty(&tests).context("Failed to serialize tests")?;
        println!("{json}");
        return Ok(ExitCode::SUCCESS);
    }

    for test in &tests {
        println!("{}/{}", test.module, test.name);
    }
    for record in reporter.records() {
        if let Outcome::Skipped(reason) = &record.outcome {
            println!("skipped {}/{}: {reason}", record.module, record.test);
        }
    }

    Ok(ExitCode::SUCCESS)
}
