use clap::Args;

use crate::commands::selection::SelectionArgs;

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Print the selected test descriptors as JSON
    #[arg(long)]
    pub json: bool,
}
