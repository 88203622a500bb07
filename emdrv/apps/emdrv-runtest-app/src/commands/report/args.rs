use std::path::PathBuf;

use clap::Args;
use emdrv_runtest::ReportOptions;

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Directory holding one XML result document per family
    #[arg(long, default_value = "./out")]
    pub results: PathBuf,

    /// HTML file to write
    #[arg(long, short, default_value = "./scripts/emdrvreportfile.html")]
    pub output: PathBuf,

    /// Skip result files that do not parse instead of aborting
    #[arg(long)]
    pub lenient: bool,

    /// Read every file in the results directory, not only `*.xml`
    #[arg(long = "any-extension")]
    pub any_extension: bool,

    /// Process result files in name order
    #[arg(long)]
    pub sorted: bool,
}

impl ReportArgs {
    pub fn options(&self) -> ReportOptions {
        ReportOptions {
            strict: !self.lenient,
            require_xml_extension: !self.any_extension,
            sort_files: self.sorted,
        }
    }
}
