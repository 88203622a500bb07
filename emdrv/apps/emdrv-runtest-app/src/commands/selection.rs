//! Test selection flags shared by `run` and `list`

use std::path::PathBuf;

use clap::Args;
use emdrv_runtest::TestSelection;

#[derive(Debug, Clone, Args)]
pub struct SelectionArgs {
    /// Which kit to run on
    #[arg(long, default_value = "EFM32GG_STK3700")]
    pub kit: String,

    /// Only run a specific test
    #[arg(long = "test")]
    pub test_name: Option<String>,

    /// Run tests except the ones listed
    #[arg(long = "skip-tests", num_args = 1..)]
    pub skip_tests: Vec<String>,

    /// Only run tests for a specific module
    #[arg(long)]
    pub module: Option<String>,

    /// Run tests for modules except the ones listed
    #[arg(long = "skip-modules", num_args = 1..)]
    pub skip_modules: Vec<String>,

    /// Directory holding the driver module directories
    #[arg(long, default_value = "..")]
    pub root: PathBuf,
}

impl SelectionArgs {
    pub fn to_selection(&self) -> TestSelection {
        TestSelection {
            module_filter: self.module.clone(),
            test_filter: self.test_name.clone(),
            skip_modules: self.skip_modules.iter().cloned().collect(),
            skip_tests: self.skip_tests.iter().cloned().collect(),
            kit: self.kit.clone(),
        }
    }
}
